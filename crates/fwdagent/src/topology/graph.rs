//! Directed topology graph with port-annotated edges.

use super::types::{AttachmentChange, HostPath, LinkUpsert, NodeId, SwitchRemoval};
use fwd_types::{MacAddress, PortNo, SwitchId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A directed out-edge. `port` is the egress port on the owning node for
/// switch sources, and the ingress port on the attachment switch for host
/// sources (both directions of an attachment carry the same port).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    to: NodeId,
    port: PortNo,
}

/// The topology graph: switches, learned hosts, links, and attachments.
///
/// Out-edge lists keep insertion order; an upsert for an existing (from, to)
/// pair overwrites the port annotation in place, so the graph never holds
/// parallel edges and breadth-first traversal order is stable across calls.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    adj: HashMap<NodeId, Vec<Edge>>,
}

impl TopologyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the switch is present.
    pub fn contains_switch(&self, id: SwitchId) -> bool {
        self.adj.contains_key(&NodeId::Switch(id))
    }

    /// Returns true if the host is present.
    pub fn contains_host(&self, mac: MacAddress) -> bool {
        self.adj.contains_key(&NodeId::Host(mac))
    }

    /// Number of switch vertices.
    pub fn switch_count(&self) -> usize {
        self.adj.keys().filter(|n| n.is_switch()).count()
    }

    /// Number of host vertices.
    pub fn host_count(&self) -> usize {
        self.adj.keys().filter(|n| !n.is_switch()).count()
    }

    /// Adds a switch vertex. Idempotent.
    ///
    /// Returns true if the switch was not present before.
    pub fn add_switch(&mut self, id: SwitchId) -> bool {
        let node = NodeId::Switch(id);
        if self.adj.contains_key(&node) {
            return false;
        }
        self.adj.insert(node, Vec::new());
        true
    }

    /// Removes a switch and everything hanging off it: incident links in
    /// both directions and any host whose attachment was this switch.
    pub fn remove_switch(&mut self, id: SwitchId) -> SwitchRemoval {
        let node = NodeId::Switch(id);
        if self.adj.remove(&node).is_none() {
            return SwitchRemoval::default();
        }

        let mut detached: Vec<MacAddress> = self
            .adj
            .iter()
            .filter_map(|(k, edges)| match k {
                NodeId::Host(mac) if edges.iter().any(|e| e.to == node) => Some(*mac),
                _ => None,
            })
            .collect();
        detached.sort();

        for mac in &detached {
            self.adj.remove(&NodeId::Host(*mac));
        }
        for edges in self.adj.values_mut() {
            edges.retain(|e| e.to != node);
        }

        SwitchRemoval {
            detached_hosts: detached,
        }
    }

    /// Sets or overwrites the directed link `src -> dst` with its egress
    /// port on `src`. The reverse direction is a separate edge with its own
    /// port and its own event.
    pub fn upsert_link(&mut self, src: SwitchId, dst: SwitchId, src_port: PortNo) -> LinkUpsert {
        let src_node = NodeId::Switch(src);
        let dst_node = NodeId::Switch(dst);
        if !self.adj.contains_key(&src_node) || !self.adj.contains_key(&dst_node) {
            return LinkUpsert::MissingEndpoint;
        }
        if self.set_edge(src_node, dst_node, src_port) {
            LinkUpsert::Added
        } else {
            LinkUpsert::Updated
        }
    }

    /// Removes the directed link `src -> dst`. Returns true if it existed.
    pub fn remove_link(&mut self, src: SwitchId, dst: SwitchId) -> bool {
        self.unset_edge(NodeId::Switch(src), NodeId::Switch(dst))
    }

    /// Sets or moves a host's attachment: a host->switch edge and a
    /// switch->host edge, both annotated with the ingress port.
    ///
    /// A host has exactly one attachment; re-observation elsewhere replaces
    /// the old pair of edges rather than adding a second attachment.
    pub fn upsert_attachment(
        &mut self,
        host: MacAddress,
        switch: SwitchId,
        port: PortNo,
    ) -> AttachmentChange {
        let sw_node = NodeId::Switch(switch);
        let host_node = NodeId::Host(host);
        if !self.adj.contains_key(&sw_node) {
            return AttachmentChange::MissingSwitch;
        }

        let change = match self.attachment(host) {
            None => {
                self.adj.insert(host_node, Vec::new());
                AttachmentChange::New
            }
            Some((prev_switch, prev_port)) if prev_switch == switch && prev_port == port => {
                AttachmentChange::Unchanged
            }
            Some((prev_switch, _)) => {
                if prev_switch != switch {
                    self.unset_edge(host_node, NodeId::Switch(prev_switch));
                    self.unset_edge(NodeId::Switch(prev_switch), host_node);
                }
                AttachmentChange::Moved
            }
        };

        self.set_edge(host_node, sw_node, port);
        self.set_edge(sw_node, host_node, port);
        change
    }

    /// The host's current attachment, if any.
    pub fn attachment(&self, host: MacAddress) -> Option<(SwitchId, PortNo)> {
        self.adj
            .get(&NodeId::Host(host))?
            .iter()
            .find_map(|e| match e.to {
                NodeId::Switch(id) => Some((id, e.port)),
                NodeId::Host(_) => None,
            })
    }

    /// Removes a host vertex and its attachment edges. Returns true if the
    /// host was present.
    pub fn remove_host(&mut self, host: MacAddress) -> bool {
        let host_node = NodeId::Host(host);
        if self.adj.remove(&host_node).is_none() {
            return false;
        }
        for edges in self.adj.values_mut() {
            edges.retain(|e| e.to != host_node);
        }
        true
    }

    /// The port annotation of the directed link `src -> dst`, if present.
    pub fn link_port(&self, src: SwitchId, dst: SwitchId) -> Option<PortNo> {
        self.adj
            .get(&NodeId::Switch(src))?
            .iter()
            .find(|e| e.to == NodeId::Switch(dst))
            .map(|e| e.port)
    }

    /// Minimum-hop path from `from` to the host `dst`.
    ///
    /// Unweighted breadth-first search; equal-length alternatives resolve to
    /// the first-discovered parent, which edge insertion order makes stable
    /// for a fixed graph snapshot. Returns `None` when the host is not in
    /// the graph or no path exists.
    pub fn shortest_path(&self, from: SwitchId, dst: MacAddress) -> Option<HostPath> {
        let start = NodeId::Switch(from);
        let goal = NodeId::Host(dst);
        if !self.adj.contains_key(&start) || !self.adj.contains_key(&goal) {
            return None;
        }

        let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        seen.insert(start);
        queue.push_back(start);

        let mut found = false;
        while let Some(cur) = queue.pop_front() {
            if cur == goal {
                found = true;
                break;
            }
            // Hosts are leaves; traffic never transits through one.
            if !cur.is_switch() {
                continue;
            }
            for edge in self.adj.get(&cur).map(Vec::as_slice).unwrap_or(&[]) {
                if seen.insert(edge.to) {
                    prev.insert(edge.to, cur);
                    queue.push_back(edge.to);
                }
            }
        }
        if !found {
            return None;
        }

        let mut nodes = vec![goal];
        let mut cur = goal;
        while cur != start {
            cur = *prev.get(&cur)?;
            nodes.push(cur);
        }
        nodes.reverse();

        let first_hop = nodes.get(1)?;
        let egress_port = self
            .adj
            .get(&start)?
            .iter()
            .find(|e| e.to == *first_hop)
            .map(|e| e.port)?;

        let hops = nodes
            .iter()
            .filter_map(|n| match n {
                NodeId::Switch(id) => Some(*id),
                NodeId::Host(_) => None,
            })
            .collect();

        Some(HostPath { hops, egress_port })
    }

    /// Inserts or overwrites the edge `from -> to`. Returns true when a new
    /// edge was created. The `from` vertex must exist.
    fn set_edge(&mut self, from: NodeId, to: NodeId, port: PortNo) -> bool {
        let edges = self.adj.entry(from).or_default();
        match edges.iter_mut().find(|e| e.to == to) {
            Some(edge) => {
                edge.port = port;
                false
            }
            None => {
                edges.push(Edge { to, port });
                true
            }
        }
    }

    /// Removes the edge `from -> to`. Returns true if it existed.
    fn unset_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        match self.adj.get_mut(&from) {
            Some(edges) => {
                let before = edges.len();
                edges.retain(|e| e.to != to);
                edges.len() != before
            }
            None => false,
        }
    }
}
