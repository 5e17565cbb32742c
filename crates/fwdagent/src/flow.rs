//! Installed-rule bookkeeping.
//!
//! Tracks which forwarding rules have already been pushed to each switch so
//! an identical decision never emits a second install command. Entries are
//! dropped eagerly when topology changes invalidate them, never by expiry.

use fwd_types::{MacAddress, PortNo, SwitchId};
use std::collections::HashMap;

/// Identity of an installed forwarding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowKey {
    /// Switch the rule lives on.
    pub switch: SwitchId,
    /// Matched ingress port.
    pub in_port: PortNo,
    /// Matched destination address.
    pub dst: MacAddress,
}

impl FlowKey {
    /// Creates a rule identity.
    pub fn new(switch: SwitchId, in_port: PortNo, dst: MacAddress) -> Self {
        Self {
            switch,
            in_port,
            dst,
        }
    }
}

/// Outcome of recording a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// New entry; the install command must be emitted.
    Installed,
    /// Entry existed with a different egress; the overwrite must be emitted.
    Updated,
    /// Identical entry already present; nothing to emit.
    AlreadyInstalled,
}

impl InstallOutcome {
    /// Returns true when the caller should emit the install command.
    pub fn should_emit(&self) -> bool {
        !matches!(self, InstallOutcome::AlreadyInstalled)
    }
}

/// Running counters for the rule table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Rules recorded (new or overwritten).
    pub installed: u64,
    /// Re-installs suppressed by deduplication.
    pub suppressed: u64,
    /// Entries dropped by cascade invalidation.
    pub invalidated: u64,
}

/// The table of rules known to be installed in the network.
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    entries: HashMap<FlowKey, PortNo>,
    stats: FlowStats,
}

impl FlowTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the rule `(switch, in_port, dst) -> out_port`.
    pub fn install(
        &mut self,
        switch: SwitchId,
        in_port: PortNo,
        dst: MacAddress,
        out_port: PortNo,
    ) -> InstallOutcome {
        let key = FlowKey::new(switch, in_port, dst);
        match self.entries.insert(key, out_port) {
            Some(prev) if prev == out_port => {
                self.stats.suppressed += 1;
                InstallOutcome::AlreadyInstalled
            }
            Some(_) => {
                self.stats.installed += 1;
                InstallOutcome::Updated
            }
            None => {
                self.stats.installed += 1;
                InstallOutcome::Installed
            }
        }
    }

    /// The recorded egress for a rule, if present.
    pub fn egress(&self, key: &FlowKey) -> Option<PortNo> {
        self.entries.get(key).copied()
    }

    /// Drops one entry. Returns true if it existed.
    pub fn remove(&mut self, key: &FlowKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.invalidated += 1;
        }
        removed
    }

    /// Drops every entry installed on `switch`. Returns the count dropped.
    pub fn invalidate_switch(&mut self, switch: SwitchId) -> usize {
        self.invalidate_where(|key| key.switch == switch)
    }

    /// Drops every entry on `switch` targeting `dst`, across ingress ports.
    pub fn invalidate_destination(&mut self, switch: SwitchId, dst: MacAddress) -> usize {
        self.invalidate_where(|key| key.switch == switch && key.dst == dst)
    }

    /// Drops every entry targeting `dst` anywhere in the network.
    pub fn invalidate_destination_all(&mut self, dst: MacAddress) -> usize {
        self.invalidate_where(|key| key.dst == dst)
    }

    /// Snapshot of all rule identities, for revalidation sweeps.
    pub fn keys(&self) -> Vec<FlowKey> {
        self.entries.keys().copied().collect()
    }

    /// Number of recorded rules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no rule is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Running counters.
    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    fn invalidate_where<F: Fn(&FlowKey) -> bool>(&mut self, pred: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !pred(key));
        let dropped = before - self.entries.len();
        self.stats.invalidated += dropped as u64;
        dropped
    }
}
