/// Page status definitions for result records
///
/// Every attempted page ends in exactly one of these states.
use serde::Serialize;
use std::fmt;

/// Outcome of one page attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    /// Page was fetched and its metadata extracted
    Completed,

    /// Page fetch failed; no links were expanded from it
    Failed,
}

impl PageStatus {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// String used in result records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
