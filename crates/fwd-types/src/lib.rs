//! Common types for the forwarding control plane.
//!
//! This crate provides type-safe representations of the network primitives
//! used throughout the controller:
//!
//! - [`MacAddress`]: 48-bit link-layer addresses, treated as opaque host keys
//! - [`SwitchId`]: 64-bit datapath identifiers (DPIDs)
//! - [`PortNo`]: switch port numbers, validated against the OpenFlow
//!   reserved range at construction

mod mac;
mod port;
mod switch;

pub use mac::MacAddress;
pub use port::PortNo;
pub use switch::SwitchId;

/// Common error type for parsing and validation failures.
///
/// A value that fails to construct here never enters the engine; malformed
/// input is rejected at the boundary instead of degrading silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid datapath id: {0}")]
    InvalidSwitchId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNo(String),

    #[error("port number {0:#x} is in the OpenFlow reserved range")]
    PortOutOfRange(u32),
}
