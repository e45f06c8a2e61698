//! Run a unit of work, substituting a fallback value when it fails.

use std::fmt::Display;
use tracing::warn;

/// Execute `work`; on `Err`, log it under `label` and return `fallback(&err)`.
///
/// ```
/// use design_patcher::fallback::run_with_fallback;
///
/// let n: u32 = run_with_fallback("parse", || "x".parse::<u32>(), |_| 0);
/// assert_eq!(n, 0);
/// ```
pub fn run_with_fallback<T, E, W, F>(label: &str, work: W, fallback: F) -> T
where
    E: Display,
    W: FnOnce() -> Result<T, E>,
    F: FnOnce(&E) -> T,
{
    match work() {
        Ok(value) => value,
        Err(err) => {
            warn!(target: "design_patcher", "{label} failed: {err}");
            fallback(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_success() {
        let value = run_with_fallback("ok", || Ok::<_, String>(7), |_| 0);
        assert_eq!(value, 7);
    }

    #[test]
    fn fallback_sees_error() {
        let value = run_with_fallback(
            "fail",
            || Err::<String, _>("boom".to_string()),
            |err| format!("recovered from {err}"),
        );
        assert_eq!(value, "recovered from boom");
    }
}
