//! End-to-end engine tests: topology events in, decisions and commands out.

use fwd_orch_common::{
    Command, PacketIn, PacketPayload, RecordingSink, RuleAction, RuleMatch, TopologyEvent,
    RULE_PRIORITY,
};
use fwd_types::{MacAddress, PortNo, SwitchId};
use fwdagent::{Decision, FloodReason, ForwardingEngine, FwdagentError};
use std::sync::Arc;

fn sw(id: u64) -> SwitchId {
    SwitchId::new(id)
}

fn port(no: u32) -> PortNo {
    PortNo::new(no).unwrap()
}

fn host_a() -> MacAddress {
    "aa:aa:aa:aa:aa:01".parse().unwrap()
}

fn host_b() -> MacAddress {
    "bb:bb:bb:bb:bb:02".parse().unwrap()
}

fn host_c() -> MacAddress {
    "cc:cc:cc:cc:cc:03".parse().unwrap()
}

fn engine() -> (Arc<RecordingSink>, ForwardingEngine) {
    let sink = Arc::new(RecordingSink::new());
    let engine = ForwardingEngine::new(sink.clone());
    (sink, engine)
}

fn pkt(switch: SwitchId, in_port: PortNo, src: MacAddress, dst: MacAddress) -> PacketIn {
    PacketIn {
        switch,
        in_port,
        src,
        dst,
        payload: PacketPayload::Buffered(7),
    }
}

/// S1 and S2 joined, linked S1 port 2 <-> S2 port 1.
fn two_switch_fabric(engine: &ForwardingEngine) {
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(2) });
    engine.handle_topology_event(&TopologyEvent::LinkUp {
        src: sw(1),
        dst: sw(2),
        src_port: port(2),
    });
    engine.handle_topology_event(&TopologyEvent::LinkUp {
        src: sw(2),
        dst: sw(1),
        src_port: port(1),
    });
}

fn installs(commands: &[Command]) -> Vec<&Command> {
    commands.iter().filter(|c| c.is_install()).collect()
}

// Scenario 1: unknown destination floods, learns the source, installs no rule.
#[test]
fn test_unknown_destination_floods_and_learns() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    sink.take();

    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    assert_eq!(decision, Decision::Flood(FloodReason::UnknownDestination));
    let cmds = sink.take();
    assert_eq!(cmds.len(), 1);
    assert_eq!(
        cmds[0],
        Command::flood_out(sw(1), port(1), PacketPayload::Buffered(7))
    );

    let table = engine.mac_table(sw(1)).unwrap();
    assert_eq!(table.get(&host_a()), Some(&port(1)));
}

// Scenario 2: known destination forwards along the shortest path and
// installs exactly one rule.
#[test]
fn test_known_destination_forwards_and_installs() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    sink.take();

    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    assert_eq!(
        decision,
        Decision::Forward {
            out_port: port(2),
            hops: vec![sw(1), sw(2)],
        }
    );
    let cmds = sink.take();
    assert_eq!(cmds.len(), 2);
    assert_eq!(cmds[0], Command::forward_rule(sw(1), port(1), host_b(), port(2)));
    assert_eq!(
        cmds[1],
        Command::unicast_out(sw(1), port(1), port(2), PacketPayload::Buffered(7))
    );
}

#[test]
fn test_installed_rule_priority_sits_above_table_miss() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    let cmds = sink.take();
    let rule = cmds
        .iter()
        .rev()
        .find(|c| c.is_install())
        .expect("a forward rule was installed");
    match rule {
        Command::InstallRule {
            mtch,
            action,
            priority,
            ..
        } => {
            assert_eq!(
                *mtch,
                RuleMatch::DestOnPort {
                    in_port: port(1),
                    dst: host_b()
                }
            );
            assert_eq!(*action, RuleAction::Output(port(2)));
            assert_eq!(*priority, RULE_PRIORITY);
        }
        Command::PacketOut { .. } => unreachable!(),
    }
}

// Scenario 3: link down invalidates the installed rule and the decision
// reverts to flooding.
#[test]
fn test_link_down_reverts_to_flood() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    sink.take();

    engine.handle_topology_event(&TopologyEvent::LinkDown {
        src: sw(1),
        dst: sw(2),
    });
    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    assert_eq!(decision, Decision::Flood(FloodReason::NoPath));
    // no rule on flood
    assert!(installs(&sink.take()).is_empty());
}

// After the link comes back the path re-forms and the rule is re-installed.
#[test]
fn test_link_recovery_reinstalls() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    engine.handle_topology_event(&TopologyEvent::LinkDown {
        src: sw(1),
        dst: sw(2),
    });
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    sink.take();

    engine.handle_topology_event(&TopologyEvent::LinkUp {
        src: sw(1),
        dst: sw(2),
        src_port: port(2),
    });
    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    assert!(matches!(decision, Decision::Forward { .. }));
    assert_eq!(installs(&sink.take()).len(), 1);
}

// Scenario 4: a self-addressed packet floods regardless of topology.
#[test]
fn test_self_addressed_floods() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_c()));
    sink.take();

    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_a()));

    assert_eq!(decision, Decision::Flood(FloodReason::SelfAddressed));
    assert!(installs(&sink.take()).is_empty());
}

// Scenario 5: a host re-observed elsewhere moves; stale rules toward it are
// dropped and new paths go to the new attachment.
#[test]
fn test_host_mobility() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_c()));
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));

    // B -> A installs a cross-fabric rule on S2
    let before = engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_a()));
    assert_eq!(
        before,
        Decision::Forward {
            out_port: port(1),
            hops: vec![sw(2), sw(1)],
        }
    );

    // A shows up on S2 port 5
    engine.handle_packet_in(&pkt(sw(2), port(5), host_a(), host_c()));
    sink.take();

    let after = engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_a()));
    assert_eq!(
        after,
        Decision::Forward {
            out_port: port(5),
            hops: vec![sw(2)],
        }
    );
    // the stale rule was invalidated, so the new one is emitted
    let cmds = sink.take();
    assert_eq!(
        installs(&cmds),
        vec![&Command::forward_rule(sw(2), port(3), host_a(), port(5))]
    );
}

// P1: joining a switch twice leaves the same state as joining once.
#[test]
fn test_duplicate_join_is_idempotent() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });

    // only the first join installs the table-miss entry
    assert_eq!(sink.install_count(), 1);
    assert!(engine.mac_table(sw(1)).unwrap().is_empty());
}

#[test]
fn test_table_miss_installed_on_join() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(9) });
    assert_eq!(sink.take(), vec![Command::table_miss(sw(9))]);
}

// P2: removing a switch cascades into links, attachments, and rules.
#[test]
fn test_switch_removal_cascades() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    sink.take();

    engine.handle_topology_event(&TopologyEvent::SwitchLeft { switch: sw(2) });

    // the learner still remembers B (stale attachment), but the graph no
    // longer holds it, so the decision degrades to flood with no install
    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    assert_eq!(decision, Decision::Flood(FloodReason::NoPath));
    assert!(installs(&sink.take()).is_empty());

    assert!(matches!(
        engine.mac_table(sw(2)),
        Err(FwdagentError::UnknownSwitch(_))
    ));
}

// P6: an identical decision never emits a second install.
#[test]
fn test_identical_rule_installs_once() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    sink.take();

    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));

    let cmds = sink.take();
    assert_eq!(installs(&cmds).len(), 1);
    // every packet still gets its own packet-out
    assert_eq!(cmds.iter().filter(|c| !c.is_install()).count(), 3);
}

#[test]
fn test_raw_payload_is_carried_through() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    sink.take();

    let payload = PacketPayload::Raw(vec![0xde, 0xad, 0xbe, 0xef]);
    engine.handle_packet_in(&PacketIn {
        switch: sw(1),
        in_port: port(1),
        src: host_a(),
        dst: host_b(),
        payload: payload.clone(),
    });

    assert_eq!(sink.take(), vec![Command::flood_out(sw(1), port(1), payload)]);
}

#[test]
fn test_set_mac_entry_preinstalls_pairwise_rules() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_c()));
    sink.take();

    engine.set_mac_entry(sw(1), host_b(), port(2)).unwrap();

    let cmds = sink.take();
    assert_eq!(
        cmds,
        vec![
            Command::forward_rule(sw(1), port(1), host_b(), port(2)),
            Command::forward_rule(sw(1), port(2), host_a(), port(1)),
        ]
    );

    // traffic matching the pre-installed rule emits no second install
    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    assert!(matches!(decision, Decision::Forward { .. }));
    assert!(installs(&sink.take()).is_empty());
}

#[test]
fn test_set_mac_entry_occupied_port_skips_preinstall() {
    let (sink, engine) = engine();
    engine.handle_topology_event(&TopologyEvent::SwitchJoined { switch: sw(1) });
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_c()));
    sink.take();

    engine.set_mac_entry(sw(1), host_b(), port(1)).unwrap();

    assert!(installs(&sink.take()).is_empty());
    assert_eq!(
        engine.mac_table(sw(1)).unwrap().get(&host_b()),
        Some(&port(1))
    );
}

#[test]
fn test_set_mac_entry_unknown_switch_is_rejected() {
    let (_sink, engine) = engine();
    let err = engine.set_mac_entry(sw(9), host_a(), port(1)).unwrap_err();
    assert!(matches!(err, FwdagentError::UnknownSwitch(_)));
}

#[test]
fn test_forget_host_removes_everything() {
    let (sink, engine) = engine();
    two_switch_fabric(&engine);
    engine.handle_packet_in(&pkt(sw(2), port(3), host_b(), host_c()));
    engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    sink.take();

    assert!(engine.forget_host(host_b()));

    let decision = engine.handle_packet_in(&pkt(sw(1), port(1), host_a(), host_b()));
    assert_eq!(decision, Decision::Flood(FloodReason::UnknownDestination));
    assert!(installs(&sink.take()).is_empty());

    assert!(!engine.forget_host(host_b()));
}
