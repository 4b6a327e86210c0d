//! Rule validation.
//!
//! [`validate`] turns a coerced [`crate::types::DataSet`] into a list of [`Violation`]s;
//! [`verdicts`] folds that list into one [`RecordVerdict`] per record. A missing required column
//! is the only fatal outcome here; every other failure is a row-level violation.

pub mod rules;
pub mod validator;
pub mod violation;

pub use rules::RuleSet;
pub use validator::{check_required_columns, validate};
pub use violation::{verdicts, RecordVerdict, Violation, ViolationReason};
