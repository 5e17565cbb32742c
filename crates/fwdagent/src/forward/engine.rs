//! The forwarding engine.

use crate::error::{FwdResult, FwdagentError};
use crate::fdb::{FdbTable, Learn};
use crate::flow::FlowTable;
use crate::topology::{AttachmentChange, LinkUpsert, TopologyGraph};
use fwd_orch_common::{Command, CommandSink, PacketIn, TopologyEvent};
use fwd_types::{MacAddress, PortNo, SwitchId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Why a packet was flooded instead of forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodReason {
    /// The destination address has never been seen as a source.
    UnknownDestination,
    /// The destination is known but no path exists from this switch
    /// (stale or partitioned attachment).
    NoPath,
    /// Source and destination addresses are identical.
    SelfAddressed,
}

/// Outcome of handling one packet arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Broadcast out all ports except the ingress; no rule installed.
    Flood(FloodReason),
    /// Unicast along the computed path; a matching rule covers the flow.
    Forward {
        /// Egress port on the ingress switch.
        out_port: PortNo,
        /// Switch sequence of the computed path.
        hops: Vec<SwitchId>,
    },
}

/// Topology-aware forwarding engine.
///
/// Owns the three mutable stores behind separate locks so per-packet and
/// topology work contend only where they must. Lock acquisition order is
/// fixed: topology graph, then learning table, then flow table.
pub struct ForwardingEngine {
    graph: Mutex<TopologyGraph>,
    fdb: Mutex<FdbTable>,
    flows: Mutex<FlowTable>,
    sink: Arc<dyn CommandSink>,
}

impl ForwardingEngine {
    /// Creates an engine that emits commands into `sink`.
    pub fn new(sink: Arc<dyn CommandSink>) -> Self {
        Self {
            graph: Mutex::new(TopologyGraph::new()),
            fdb: Mutex::new(FdbTable::new()),
            flows: Mutex::new(FlowTable::new()),
            sink,
        }
    }

    /// Handles one packet arrival: learn the source, resolve the
    /// destination, emit the decision.
    ///
    /// The triggering packet is always answered with an explicit packet-out,
    /// whether or not a rule was also installed; the switch has not matched
    /// the new rule for this packet.
    #[instrument(skip_all, fields(switch = %pkt.switch, src = %pkt.src, dst = %pkt.dst))]
    pub fn handle_packet_in(&self, pkt: &PacketIn) -> Decision {
        let mut out = Vec::with_capacity(2);
        let decision = {
            let mut graph = self.graph.lock().expect("lock poisoned");
            let mut fdb = self.fdb.lock().expect("lock poisoned");

            let learn = fdb.observe(pkt.src, pkt.switch, pkt.in_port);
            self.apply_learn(&mut graph, pkt.src, pkt.switch, pkt.in_port, learn);

            let resolved = fdb.lookup(pkt.dst);
            drop(fdb);

            if pkt.src == pkt.dst {
                Decision::Flood(FloodReason::SelfAddressed)
            } else if resolved.is_none() {
                Decision::Flood(FloodReason::UnknownDestination)
            } else {
                match graph.shortest_path(pkt.switch, pkt.dst) {
                    None => Decision::Flood(FloodReason::NoPath),
                    Some(path) => Decision::Forward {
                        out_port: path.egress_port,
                        hops: path.hops,
                    },
                }
            }
        };

        match &decision {
            Decision::Flood(reason) => {
                debug!(?reason, "flood");
                out.push(Command::flood_out(
                    pkt.switch,
                    pkt.in_port,
                    pkt.payload.clone(),
                ));
            }
            Decision::Forward { out_port, hops } => {
                debug!(out_port = %out_port, hops = hops.len(), "forward");
                let outcome = self
                    .flows
                    .lock()
                    .expect("lock poisoned")
                    .install(pkt.switch, pkt.in_port, pkt.dst, *out_port);
                if outcome.should_emit() {
                    out.push(Command::forward_rule(
                        pkt.switch,
                        pkt.in_port,
                        pkt.dst,
                        *out_port,
                    ));
                }
                out.push(Command::unicast_out(
                    pkt.switch,
                    pkt.in_port,
                    *out_port,
                    pkt.payload.clone(),
                ));
            }
        }

        for cmd in out {
            self.sink.submit(cmd);
        }
        decision
    }

    /// Applies a topology notification to the graph and cascades rule
    /// invalidation.
    #[instrument(skip_all, fields(event = ?event))]
    pub fn handle_topology_event(&self, event: &TopologyEvent) {
        match event {
            TopologyEvent::SwitchJoined { switch } => {
                if self.graph.lock().expect("lock poisoned").add_switch(*switch) {
                    info!(switch = %switch, "switch joined");
                    self.sink.submit(Command::table_miss(*switch));
                } else {
                    debug!(switch = %switch, "duplicate join");
                }
            }
            TopologyEvent::SwitchLeft { switch } => {
                let mut graph = self.graph.lock().expect("lock poisoned");
                let removal = graph.remove_switch(*switch);
                let dropped = self.revalidate_flows(&graph);
                info!(
                    switch = %switch,
                    detached_hosts = removal.detached_hosts.len(),
                    dropped_rules = dropped,
                    "switch left"
                );
            }
            TopologyEvent::LinkUp {
                src,
                dst,
                src_port,
            } => {
                let mut graph = self.graph.lock().expect("lock poisoned");
                match graph.upsert_link(*src, *dst, *src_port) {
                    LinkUpsert::Added => {
                        info!(src = %src, dst = %dst, src_port = %src_port, "link up");
                    }
                    LinkUpsert::Updated => {
                        // The old edge was replaced; rules that relied on the
                        // previous port annotation are stale.
                        let dropped = self.revalidate_flows(&graph);
                        info!(src = %src, dst = %dst, src_port = %src_port, dropped_rules = dropped, "link port changed");
                    }
                    LinkUpsert::MissingEndpoint => {
                        warn!(src = %src, dst = %dst, "link up for unknown switch, ignored");
                    }
                }
            }
            TopologyEvent::LinkDown { src, dst } => {
                let mut graph = self.graph.lock().expect("lock poisoned");
                if graph.remove_link(*src, *dst) {
                    let dropped = self.revalidate_flows(&graph);
                    info!(src = %src, dst = %dst, dropped_rules = dropped, "link down");
                } else {
                    debug!(src = %src, dst = %dst, "link down for unknown link");
                }
            }
        }
    }

    /// Address -> port mapping of one switch's learning table.
    ///
    /// Admin read surface; takes the same locks as traffic handling.
    pub fn mac_table(&self, switch: SwitchId) -> FwdResult<BTreeMap<MacAddress, PortNo>> {
        let graph = self.graph.lock().expect("lock poisoned");
        if !graph.contains_switch(switch) {
            return Err(FwdagentError::UnknownSwitch(switch));
        }
        let fdb = self.fdb.lock().expect("lock poisoned");
        Ok(fdb.mac_table(switch))
    }

    /// Force-overwrites one address -> port mapping on a switch.
    ///
    /// Admin mutation surface. When the port is not yet occupied in that
    /// switch's table, forwarding rules between the new entry and each
    /// existing entry are pre-installed in both directions, so traffic
    /// between the pinned host and its neighbors skips the controller
    /// entirely.
    #[instrument(skip(self), fields(switch = %switch, mac = %mac, port = %port))]
    pub fn set_mac_entry(
        &self,
        switch: SwitchId,
        mac: MacAddress,
        port: PortNo,
    ) -> FwdResult<Learn> {
        let mut out = Vec::new();
        let learn = {
            let mut graph = self.graph.lock().expect("lock poisoned");
            if !graph.contains_switch(switch) {
                return Err(FwdagentError::UnknownSwitch(switch));
            }
            let mut fdb = self.fdb.lock().expect("lock poisoned");

            let preinstall = !fdb.port_in_use(switch, port);
            let neighbors: Vec<(MacAddress, PortNo)> = fdb
                .mac_table(switch)
                .into_iter()
                .filter(|(other, _)| *other != mac)
                .collect();

            let learn = fdb.observe(mac, switch, port);
            drop(fdb);
            self.apply_learn(&mut graph, mac, switch, port, learn);

            if preinstall {
                let mut flows = self.flows.lock().expect("lock poisoned");
                for (other, other_port) in neighbors {
                    if flows.install(switch, other_port, mac, port).should_emit() {
                        out.push(Command::forward_rule(switch, other_port, mac, port));
                    }
                    if flows.install(switch, port, other, other_port).should_emit() {
                        out.push(Command::forward_rule(switch, port, other, other_port));
                    }
                }
            }
            learn
        };

        for cmd in out {
            self.sink.submit(cmd);
        }
        info!(?learn, "mac entry set");
        Ok(learn)
    }

    /// Removes a host everywhere: learning table, graph, installed rules.
    ///
    /// The explicit host lifecycle entry point; there is no automatic aging.
    /// Returns true if the host was known.
    #[instrument(skip(self), fields(mac = %mac))]
    pub fn forget_host(&self, mac: MacAddress) -> bool {
        let mut graph = self.graph.lock().expect("lock poisoned");
        let in_graph = graph.remove_host(mac);
        let in_fdb = self
            .fdb
            .lock()
            .expect("lock poisoned")
            .forget(mac)
            .is_some();
        let dropped = self
            .flows
            .lock()
            .expect("lock poisoned")
            .invalidate_destination_all(mac);
        if in_graph || in_fdb {
            info!(dropped_rules = dropped, "host forgotten");
        }
        in_graph || in_fdb
    }

    /// Learning-side graph maintenance shared by traffic and admin paths.
    ///
    /// On a move, rules toward the host anywhere in the network depended on
    /// the attachment edge that was just replaced and are dropped.
    fn apply_learn(
        &self,
        graph: &mut TopologyGraph,
        mac: MacAddress,
        switch: SwitchId,
        port: PortNo,
        learn: Learn,
    ) {
        match learn {
            Learn::Refreshed => {}
            Learn::NewHost => {
                if graph.upsert_attachment(mac, switch, port) == AttachmentChange::MissingSwitch {
                    warn!(switch = %switch, mac = %mac, "traffic from unjoined switch, attachment not recorded");
                }
            }
            Learn::Moved { from } => {
                debug!(
                    mac = %mac,
                    from_switch = %from.switch,
                    from_port = %from.port,
                    "host moved"
                );
                if graph.upsert_attachment(mac, switch, port) == AttachmentChange::MissingSwitch {
                    warn!(switch = %switch, mac = %mac, "traffic from unjoined switch, attachment not recorded");
                }
                let dropped = self
                    .flows
                    .lock()
                    .expect("lock poisoned")
                    .invalidate_destination_all(mac);
                if dropped > 0 {
                    debug!(mac = %mac, dropped_rules = dropped, "dropped rules toward moved host");
                }
            }
        }
    }

    /// Drops every recorded rule whose egress no longer matches the current
    /// shortest path. Called under the graph lock after any edge removal so
    /// an entry can never outlive the edge it depended on.
    fn revalidate_flows(&self, graph: &TopologyGraph) -> usize {
        let mut flows = self.flows.lock().expect("lock poisoned");
        let mut dropped = 0;
        for key in flows.keys() {
            let current = graph.shortest_path(key.switch, key.dst);
            let valid = current
                .map(|p| Some(p.egress_port) == flows.egress(&key))
                .unwrap_or(false);
            if !valid && flows.remove(&key) {
                dropped += 1;
            }
        }
        dropped
    }
}
