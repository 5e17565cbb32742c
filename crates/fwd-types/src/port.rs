//! Switch port number type with range validation.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A physical or logical switch port number.
///
/// OpenFlow reserves port numbers above `0xffffff00` for special targets
/// (FLOOD, CONTROLLER, ...). The engine models those targets explicitly in
/// its action types, so a `PortNo` is always a concrete port: construction
/// rejects the reserved range and zero.
///
/// # Examples
///
/// ```
/// use fwd_types::PortNo;
///
/// let port = PortNo::new(1).unwrap();
/// assert_eq!(port.as_u32(), 1);
///
/// assert!(PortNo::new(0).is_err());
/// assert!(PortNo::new(0xffff_fffb).is_err()); // OFPP_FLOOD
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PortNo(u32);

impl PortNo {
    /// Highest assignable port number (OFPP_MAX).
    pub const MAX: u32 = 0xffff_ff00;

    /// Creates a validated port number.
    ///
    /// # Errors
    ///
    /// Returns an error for zero or for values in the reserved range
    /// (`> 0xffffff00`).
    pub const fn new(no: u32) -> Result<Self, ParseError> {
        if no == 0 || no > Self::MAX {
            Err(ParseError::PortOutOfRange(no))
        } else {
            Ok(PortNo(no))
        }
    }

    /// Returns the raw port number.
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortNo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let no: u32 = s
            .parse()
            .map_err(|_| ParseError::InvalidPortNo(s.to_string()))?;
        PortNo::new(no)
    }
}

impl TryFrom<u32> for PortNo {
    type Error = ParseError;

    fn try_from(no: u32) -> Result<Self, Self::Error> {
        PortNo::new(no)
    }
}

impl From<PortNo> for u32 {
    fn from(port: PortNo) -> u32 {
        port.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_ports() {
        assert_eq!(PortNo::new(1).unwrap().as_u32(), 1);
        assert_eq!(PortNo::new(PortNo::MAX).unwrap().as_u32(), PortNo::MAX);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(PortNo::new(0), Err(ParseError::PortOutOfRange(0))));
    }

    #[test]
    fn test_reserved_range_rejected() {
        // OFPP_FLOOD, OFPP_CONTROLLER, OFPP_ANY all live above OFPP_MAX
        assert!(PortNo::new(0xffff_fffb).is_err());
        assert!(PortNo::new(0xffff_fffd).is_err());
        assert!(PortNo::new(u32::MAX).is_err());
    }

    #[test]
    fn test_parse() {
        let port: PortNo = "42".parse().unwrap();
        assert_eq!(port.as_u32(), 42);
        assert!("not-a-port".parse::<PortNo>().is_err());
        assert!("0".parse::<PortNo>().is_err());
    }
}
