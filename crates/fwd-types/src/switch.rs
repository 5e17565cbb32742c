//! Datapath (switch) identifier type.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 64-bit datapath identifier.
///
/// Switches present their identity as a DPID; the text form is the
/// conventional 16-hex-digit zero-padded string.
///
/// # Examples
///
/// ```
/// use fwd_types::SwitchId;
///
/// let sw = SwitchId::new(1);
/// assert_eq!(sw.to_string(), "0000000000000001");
///
/// let parsed: SwitchId = "00000000000000ab".parse().unwrap();
/// assert_eq!(parsed.as_u64(), 0xab);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwitchId(u64);

impl SwitchId {
    /// Creates a datapath id from its raw value.
    pub const fn new(id: u64) -> Self {
        SwitchId(id)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SwitchId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 16 {
            return Err(ParseError::InvalidSwitchId(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(SwitchId)
            .map_err(|_| ParseError::InvalidSwitchId(s.to_string()))
    }
}

impl TryFrom<String> for SwitchId {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SwitchId> for String {
    fn from(id: SwitchId) -> String {
        id.to_string()
    }
}

impl From<u64> for SwitchId {
    fn from(id: u64) -> Self {
        SwitchId(id)
    }
}
