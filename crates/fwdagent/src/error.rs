//! Error types for fwdagent.

use fwd_types::{ParseError, SwitchId};
use thiserror::Error;

/// Result type for fwdagent operations.
pub type FwdResult<T> = std::result::Result<T, FwdagentError>;

/// Forwarding engine daemon errors.
///
/// Normal topology mismatches (unknown destination, disconnected graph) are
/// handled by the flood policy and never surface here; these variants cover
/// contract violations and lifecycle failures only.
#[derive(Debug, Error)]
pub enum FwdagentError {
    /// An admin operation referenced a switch that has not joined.
    #[error("switch {0} is not joined")]
    UnknownSwitch(SwitchId),

    /// An event was submitted after the dispatcher shut down.
    #[error("event dispatcher is shut down")]
    DispatcherClosed,

    /// Malformed address or port at the input boundary.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_switch_display() {
        let err = FwdagentError::UnknownSwitch(SwitchId::new(0xab));
        assert_eq!(err.to_string(), "switch 00000000000000ab is not joined");
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = "nope".parse::<fwd_types::MacAddress>().unwrap_err();
        let err: FwdagentError = parse.into();
        assert!(matches!(err, FwdagentError::Parse(_)));
    }
}
