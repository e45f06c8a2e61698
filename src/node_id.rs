//! Fallback workflow node ids.
//!
//! A node id is the first three decimal digits of the workflow id
//! (zero-padded on the left when shorter) followed by a millisecond
//! timestamp, read back as an integer.

use chrono::Utc;
use thiserror::Error;
use tracing::warn;

const PREFIX_LEN: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeIdError {
    #[error("timestamp {0} is before the Unix epoch")]
    NegativeTimestamp(i64),

    #[error("node id '{0}' does not fit in 64 bits")]
    Overflow(String),
}

/// Node id for `workflow_id` at `millis` since the epoch.
///
/// ```
/// use design_patcher::node_id::node_id_at;
///
/// assert_eq!(node_id_at(1128, 1_700_000_000_000).unwrap(), 1121700000000000);
/// assert_eq!(node_id_at(12, 5).unwrap(), 125);
/// ```
pub fn node_id_at(workflow_id: u64, millis: i64) -> Result<u64, NodeIdError> {
    if millis < 0 {
        return Err(NodeIdError::NegativeTimestamp(millis));
    }

    let padded = format!("{workflow_id:0>PREFIX_LEN$}");
    let digits = format!("{}{millis}", &padded[..PREFIX_LEN]);
    digits.parse().map_err(|_| NodeIdError::Overflow(digits))
}

/// Node id for `workflow_id` at the current time.
pub fn generate_node_id(workflow_id: u64) -> Result<u64, NodeIdError> {
    node_id_at(workflow_id, Utc::now().timestamp_millis())
}

/// The server-assigned id when there is one, otherwise a generated id.
pub fn resolve_node_id(server_id: Option<u64>, workflow_id: u64) -> Result<u64, NodeIdError> {
    match server_id {
        Some(id) => Ok(id),
        None => {
            let id = generate_node_id(workflow_id)?;
            warn!(workflow_id, node_id = id, "no server node id, using generated id");
            Ok(id)
        }
    }
}
