//! Error categories shared by every gate.

use std::fmt;

use serde::Serialize;

/// Broad category of a gate failure.
///
/// Every domain error maps onto one of these so CI logs can tell a bad
/// input apart from an upstream outage. All categories are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Empty or missing required input.
    Input,
    /// Input fails structural rules.
    Format,
    /// Nothing matched.
    Lookup,
    /// Upstream API call failed.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Lookup => write!(f, "lookup"),
            ErrorKind::Transport => write!(f, "transport"),
        }
    }
}
