//! Convergence Scenarios
//!
//! End-to-end behaviour of a single network driven through the public API:
//!
//! 1. **Join and close**: a member's input appears on join and vanishes when
//!    its side closes
//! 2. **Unload recovery**: unloading the middle of a line keeps the ends
//! 3. **Opaque fan-out**: an opaque neighbour passes the change on, a veto
//!    there stops only the fan-out
//! 4. **Teardown**: destroying a network leaves nothing behind
//! 5. **Mixed members**: networks work over trait objects

use crate::test_utils::{at, red, Circuit, TestNode};
use signalmesh::{
    Broadcast, Channel, MemberArena, NetworkId, NetworkSettings, NodeConnector, Phase,
    Propagator, Signal, SignalNetwork, SignalSet,
};
use signalmesh_core::{Config, Direction, DirectionSet, EngineConfig, Position};
use slotmap::SlotMap;

fn circuit() -> Circuit {
    Circuit::new(&EngineConfig::default())
}

#[test]
fn test_red_input_appears_on_join_and_clears_on_close() {
    let mut circuit = circuit();
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::East, red(15)));
    let b = circuit.place(TestNode::new(at(1)));
    let network = circuit.form_network(&[a, b]);

    assert_eq!(circuit.networks[network].max_signal_strength(Channel::Red), 15);
    assert!(circuit.members[b].active);

    circuit.members[a].open.remove(Direction::East);
    assert!(circuit.refresh(a));

    let net = &circuit.networks[network];
    assert_eq!(net.max_signal_strength(Channel::Red), 0);
    assert!(!net.any_active());
    assert!(!circuit.members[a].active && !circuit.members[b].active);
}

#[test]
fn test_unloading_middle_of_line_keeps_ends() {
    let mut circuit = circuit();
    let line: Vec<_> = (0..3)
        .map(|x| {
            circuit.place(
                TestNode::new(at(x))
                    .with_input(Direction::Up, red(5 + x as u8))
                    .with_input(Direction::Down, Signal::new(Channel::Blue, 2)),
            )
        })
        .collect();
    let old = circuit.form_network(&line);
    let old_members = circuit.networks[old].members();
    let old_table = circuit.networks[old].read_table().clone();
    assert_eq!(old_table.len(), 6);

    // The chunk with the middle member goes away; the old network is dropped
    // without a teardown broadcast, as a host does on unload
    circuit.networks.remove(old);
    circuit.discard_pending();
    circuit.propagator.world_mut().unloaded.insert(at(1));

    let settings = circuit.settings;
    let recovered = circuit
        .networks
        .insert_with_key(|id| SignalNetwork::new(id, settings));
    let recovery = circuit.networks[recovered].after_unload(
        &old_members,
        old_table,
        &mut circuit.members,
        &mut circuit.propagator,
    );

    assert_eq!(recovery.readmitted, 2);
    assert_eq!(recovery.dropped_entries, 2);
    assert_eq!(recovery.kept_entries, 4);
    assert!(recovery.broadcast);

    let net = &circuit.networks[recovered];
    assert_eq!(net.members(), vec![line[0], line[2]]);
    assert!(net.read_table().sources().all(|s| s.position != at(1)));
    assert_eq!(net.max_signal_strength(Channel::Red), 7);
    assert_eq!(circuit.network_of(line[1]), Some(old));

    // Exactly one broadcast: Up and Down of each of the two readmitted members
    let stats = circuit.discard_pending();
    assert_eq!(stats.delivered, 4);
}

#[test]
fn test_opaque_neighbour_fans_out_and_veto_stops_it() {
    let mut circuit = circuit();
    let origin = at(0);
    let wall = at(1);
    circuit.propagator.world_mut().opaque.insert(wall);
    let a = circuit.place(TestNode::new(origin).open(Direction::East));
    let network = circuit.form_network(&[a]);
    circuit.discard_pending();

    circuit.networks[network].notify_member(a, &circuit.members, &mut circuit.propagator);
    let mut targets = Vec::new();
    circuit.propagator.run(|n, _| targets.push(n.target));
    assert_eq!(targets.len(), 6);
    assert_eq!(targets[0], wall);
    assert!(!targets.contains(&origin));
    assert!(wall.neighbors().filter(|p| *p != origin).all(|p| targets.contains(&p)));

    circuit.propagator.veto(wall);
    circuit.networks[network].notify_member(a, &circuit.members, &mut circuit.propagator);
    let mut targets = Vec::new();
    circuit.propagator.run(|n, _| targets.push(n.target));
    assert_eq!(targets, vec![wall]);
}

#[test]
fn test_destroy_broadcasts_loss_and_releases_members() {
    let mut circuit = circuit();
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::West, red(15)));
    let b = circuit.place(TestNode::new(at(1)).with_input(Direction::East, red(9)));
    let network = circuit.form_network(&[a, b]);
    circuit.discard_pending();

    let mut net = circuit.networks.remove(network).unwrap();
    net.destroy(&mut circuit.members, &mut circuit.propagator);

    assert_eq!(net.phase(), Phase::Destroyed);
    assert!(net.read_table().is_empty());
    assert_eq!(net.member_count(), 0);
    for member in [a, b] {
        assert!(!circuit.members[member].active);
        assert_eq!(circuit.members[member].network, None);
    }

    let mut targets = Vec::new();
    circuit.propagator.run(|n, _| targets.push(n.target));
    targets.sort();
    assert_eq!(targets, vec![at(-1), at(2)]);
}

#[test]
fn test_show_state_follows_config() {
    let config = Config::from_toml_str(
        r#"
        [engine]
        show_state = false
        "#,
    )
    .unwrap();
    let mut circuit = Circuit::new(&config.engine);
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::Up, red(15)));
    let network = circuit.form_network(&[a]);

    assert_eq!(circuit.networks[network].max_signal_strength(Channel::Red), 15);
    assert!(!circuit.members[a].active);
}

/// A member type unrelated to `TestNode`
struct Torch {
    position: Position,
    network: Option<NetworkId>,
}

impl NodeConnector for Torch {
    fn position(&self) -> Position {
        self.position
    }

    fn external_connections(&self) -> DirectionSet {
        DirectionSet::only(Direction::Down)
    }

    fn input_signals(&self, _direction: Direction, network: &SignalNetwork) -> SignalSet {
        // Inverts whatever the network shows; the gate keeps this from
        // reading the torch's own contribution
        if network.any_active() {
            SignalSet::new()
        } else {
            SignalSet::from([Signal::new(Channel::Yellow, 15)])
        }
    }

    fn set_active(&mut self, _active: bool) {}

    fn network(&self) -> Option<NetworkId> {
        self.network
    }

    fn set_network(&mut self, network: Option<NetworkId>) {
        self.network = network;
    }
}

#[test]
fn test_network_over_trait_objects() {
    let mut members: MemberArena<Box<dyn NodeConnector>> = MemberArena::with_key();
    let torch = members.insert(Box::new(Torch {
        position: at(0),
        network: None,
    }));
    let wire = members.insert(Box::new(TestNode::new(at(1)).with_input(Direction::East, red(4))));

    let mut networks: SlotMap<NetworkId, SignalNetwork> = SlotMap::with_key();
    let id = networks.insert_with_key(|id| SignalNetwork::new(id, NetworkSettings::default()));
    let mut propagator = Propagator::new(crate::test_utils::TestWorld::default(), 16, 1024);

    networks[id].init(&[torch, wire], &mut members, &mut propagator);
    assert_eq!(networks[id].max_signal_strength(Channel::Yellow), 15);
    assert_eq!(networks[id].max_signal_strength(Channel::Red), 4);

    // Re-reading the torch still sees an empty table, so it stays lit
    networks[id].refresh_member(torch, Broadcast::Immediate, &mut members, &mut propagator);
    assert_eq!(networks[id].max_signal_strength(Channel::Yellow), 15);
    assert_eq!(members[torch].network(), Some(id));
}

#[test]
fn test_snapshot_exports_members_and_signals() {
    let mut circuit = circuit();
    let a = circuit.place(TestNode::new(at(0)).with_input(Direction::Up, red(3)));
    let b = circuit.place(TestNode::new(at(4)));
    let network = circuit.form_network(&[a, b]);

    let json = circuit.networks[network]
        .snapshot(&circuit.members)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["phase"], "Active");
    assert_eq!(value["members"].as_array().unwrap().len(), 2);
    assert_eq!(value["signals"][0]["signal"]["channel"], "red");
    assert_eq!(value["signals"][0]["signal"]["strength"], 3);
    assert_eq!(value["signals"][0]["source"]["direction"], "up");
}
