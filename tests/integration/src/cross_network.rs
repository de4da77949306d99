//! Networks that trigger each other through the propagation driver

use crate::test_utils::{at, red, Circuit, TestNode};
use signalmesh::{Channel, Signal, SignalNetwork};
use signalmesh_core::{Direction, EngineConfig, Position};

/// Two single-member networks facing each other across x = 0 / x = 1
fn facing_pair(config: &EngineConfig, b_open: bool) -> (Circuit, signalmesh::MemberId) {
    let mut circuit = Circuit::new(config);
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::East, red(15)));
    let b = if b_open {
        circuit.place(TestNode::new(at(1)).open(Direction::West))
    } else {
        circuit.place(TestNode::new(at(1)))
    };
    circuit.form_network(&[a]);
    circuit.form_network(&[b]);
    circuit.discard_pending();
    (circuit, a)
}

#[test]
fn test_ping_pong_stops_at_depth_bound() {
    let config = EngineConfig {
        max_propagation_depth: 6,
        ..Default::default()
    };
    let (mut circuit, a) = facing_pair(&config, true);

    assert!(circuit.refresh(a));
    let stats = circuit.settle();

    assert_eq!(stats.delivered, 6);
    assert_eq!(stats.max_depth_seen, 6);
    assert!(stats.dropped_depth > 0);
    assert!(stats.truncated());
    assert_eq!(circuit.propagator.pending(), 0);
}

#[test]
fn test_ping_pong_stops_at_run_budget() {
    let config = EngineConfig {
        max_propagation_depth: 10_000,
        max_notifications_per_run: 10,
        ..Default::default()
    };
    let (mut circuit, a) = facing_pair(&config, true);

    assert!(circuit.refresh(a));
    let stats = circuit.settle();

    assert_eq!(stats.delivered, 10);
    assert_eq!(stats.dropped_budget, 1);
    assert_eq!(stats.dropped_depth, 0);
    assert_eq!(circuit.propagator.pending(), 0);
}

#[test]
fn test_closed_neighbour_settles_quietly() {
    let (mut circuit, a) = facing_pair(&EngineConfig::default(), false);

    assert!(circuit.refresh(a));
    let stats = circuit.settle();

    assert_eq!(stats.delivered, 1);
    assert!(!stats.truncated());

    // A second run has nothing left to do
    assert_eq!(circuit.settle().delivered, 0);
}

#[test]
fn test_merge_after_destroying_both_halves() {
    let mut circuit = Circuit::new(&EngineConfig::default());
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::Up, red(3)));
    let b = circuit.place(
        TestNode::new(Position::new(5, 0, 0)).with_input(Direction::Up, Signal::new(Channel::Blue, 8)),
    );
    let left = circuit.form_network(&[a]);
    let right = circuit.form_network(&[b]);
    circuit.destroy(left);
    circuit.destroy(right);
    circuit.discard_pending();
    assert_eq!(circuit.network_of(a), None);

    let settings = circuit.settings;
    let merged = circuit
        .networks
        .insert_with_key(|id| SignalNetwork::new(id, settings));
    let scope = circuit.networks[merged].begin_merge();
    for member in [a, b] {
        circuit.networks[merged].add_member(member, &scope, &mut circuit.members, &mut circuit.propagator);
    }
    // Joining only told each member's own neighbours
    assert_eq!(circuit.propagator.pending(), 2);

    circuit.networks[merged].finish_merge(scope, &circuit.members, &mut circuit.propagator);
    let stats = circuit.settle();
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.coalesced, 2);

    let net = &circuit.networks[merged];
    assert_eq!(net.max_signal_strength(Channel::Red), 3);
    assert_eq!(net.max_signal_strength(Channel::Blue), 8);
    assert_eq!(circuit.network_of(a), Some(merged));
    assert_eq!(circuit.network_of(b), Some(merged));
    assert_eq!(circuit.member_at(Position::new(5, 0, 0)), Some(b));
    assert!(circuit.members[a].active && circuit.members[b].active);
}
