//! Post-validation transformations over [`crate::types::DataSet`] values.
//!
//! - [`deduplicate()`]: drop exact duplicates on a composite key, first-seen wins
//! - [`split()`]: route records to the clean or quarantine set by verdict
//! - [`partition_by()`]: group the clean set by a time attribute
//!
//! Each function returns new datasets and leaves its input untouched.
//!
//! ## Example: dedup → split → partition
//!
//! ```rust
//! use cdi_quality_gate::processing::{deduplicate, partition_by, split, DedupKey};
//! use cdi_quality_gate::types::{DataSet, Value};
//! use cdi_quality_gate::validation::{RecordVerdict, ViolationReason};
//!
//! let ds = DataSet::new(
//!     vec!["YearStart".to_string(), "DataValue".to_string()],
//!     vec![
//!         vec![Value::Int64(1995), Value::Float64(10.0)],
//!         vec![Value::Int64(1995), Value::Float64(10.0)],
//!         vec![Value::Int64(2060), Value::Float64(20.0)],
//!     ],
//! );
//!
//! let deduped = deduplicate(&ds, &DedupKey::default());
//! assert_eq!(deduped.removed, 1);
//!
//! let verdicts = vec![
//!     RecordVerdict::default(),
//!     RecordVerdict { reasons: vec![ViolationReason::YearOutOfRange] },
//! ];
//! let routed = split(&deduped.dataset, &verdicts);
//! assert_eq!(routed.quarantine.row_count(), 1);
//!
//! let groups = partition_by(&routed.clean, "YearStart").unwrap();
//! assert_eq!(groups[0].key.label(), "1995");
//! ```

pub mod dedup;
pub mod partition;
pub mod split;

pub use dedup::{deduplicate, unique_indices, DedupKey, Deduplicated};
pub use partition::{partition_by, PartitionGroup, PartitionKey};
pub use split::{split, Split, ERROR_REASON_COLUMN};
