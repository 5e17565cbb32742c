//! Outbound instructions to the switch-control transport.

use crate::event::PacketPayload;
use fwd_types::{MacAddress, PortNo, SwitchId};
use serde::{Deserialize, Serialize};

/// Priority of the table-miss rule every switch gets on join.
pub const TABLE_MISS_PRIORITY: u16 = 0;

/// Priority of learned forwarding rules; sits above the table-miss entry so
/// matched flows bypass the controller.
pub const RULE_PRIORITY: u16 = 1;

/// Match criteria of an installed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleMatch {
    /// Matches every packet (table-miss entry).
    Any,
    /// Matches packets for `dst` arriving on `in_port`.
    DestOnPort { in_port: PortNo, dst: MacAddress },
}

/// Action of an installed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleAction {
    /// Emit on a concrete port.
    Output(PortNo),
    /// Punt to the controller (table-miss action).
    ToController,
}

/// An instruction for the transport to carry out on a switch.
///
/// Delivery is fire-and-forget from the engine's point of view; retry and
/// acknowledgement semantics belong to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Install (or overwrite) a flow rule.
    InstallRule {
        switch: SwitchId,
        mtch: RuleMatch,
        action: RuleAction,
        priority: u16,
    },
    /// Emit the triggering packet: unicast out one port, or flood out every
    /// port except the one it arrived on.
    PacketOut {
        switch: SwitchId,
        in_port: PortNo,
        flood: bool,
        out_port: Option<PortNo>,
        payload: PacketPayload,
    },
}

impl Command {
    /// Builds the learned-flow install for `(in_port, dst) -> out_port`.
    pub fn forward_rule(
        switch: SwitchId,
        in_port: PortNo,
        dst: MacAddress,
        out_port: PortNo,
    ) -> Self {
        Command::InstallRule {
            switch,
            mtch: RuleMatch::DestOnPort { in_port, dst },
            action: RuleAction::Output(out_port),
            priority: RULE_PRIORITY,
        }
    }

    /// Builds the table-miss install that punts unmatched traffic to the
    /// controller.
    pub fn table_miss(switch: SwitchId) -> Self {
        Command::InstallRule {
            switch,
            mtch: RuleMatch::Any,
            action: RuleAction::ToController,
            priority: TABLE_MISS_PRIORITY,
        }
    }

    /// Builds a unicast packet-out.
    pub fn unicast_out(
        switch: SwitchId,
        in_port: PortNo,
        out_port: PortNo,
        payload: PacketPayload,
    ) -> Self {
        Command::PacketOut {
            switch,
            in_port,
            flood: false,
            out_port: Some(out_port),
            payload,
        }
    }

    /// Builds a flood packet-out (all ports except `in_port`).
    pub fn flood_out(switch: SwitchId, in_port: PortNo, payload: PacketPayload) -> Self {
        Command::PacketOut {
            switch,
            in_port,
            flood: true,
            out_port: None,
            payload,
        }
    }

    /// The switch this command is addressed to.
    pub fn switch(&self) -> SwitchId {
        match self {
            Command::InstallRule { switch, .. } | Command::PacketOut { switch, .. } => *switch,
        }
    }

    /// Returns true for `InstallRule` commands.
    pub fn is_install(&self) -> bool {
        matches!(self, Command::InstallRule { .. })
    }
}
