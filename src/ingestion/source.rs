//! Raw input selection.

use glob::Pattern;

use crate::error::{GateError, GateResult};
use crate::storage::ObjectStore;

/// Pick the raw input to process: the lexicographically greatest object name under `prefix/`.
///
/// Names ending in `/` (folder placeholders) are ignored. When `pattern` is given, only names
/// matching that glob (against the full object name) are considered.
pub fn select_latest(
    store: &dyn ObjectStore,
    prefix: &str,
    pattern: Option<&str>,
) -> GateResult<String> {
    let pattern = pattern
        .map(|p| {
            Pattern::new(p).map_err(|e| GateError::Config {
                message: format!("invalid raw input pattern '{p}': {e}"),
            })
        })
        .transpose()?;

    let dir = format!("{}/", prefix.trim_end_matches('/'));
    store
        .list(&dir)?
        .into_iter()
        .filter(|name| !name.ends_with('/'))
        .filter(|name| pattern.as_ref().is_none_or(|p| p.matches(name)))
        .max()
        .ok_or_else(|| GateError::NoRawInput {
            prefix: prefix.to_string(),
        })
}
