use serde::{Deserialize, Serialize};

/// Where the poll loop takes its initial cursor from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorMode {
    /// Start at the chain head observed at startup. Blocks produced while the
    /// process was down are never scanned.
    #[default]
    ChainHead,
    /// Persist the cursor after every height and resume from it on restart.
    Resume,
}
