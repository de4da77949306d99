//! Line Circuit - walk one signal network through its lifecycle
//!
//! Builds a line of wire members with a lever on one end, toggles the lever,
//! unloads the middle of the line and recovers, then tears the network down.
//!
//! Run with: cargo run --example line_circuit

use signalmesh::{
    Broadcast, Channel, MemberArena, MemberId, NetworkId, NetworkSettings, NodeConnector,
    Propagator, Signal, SignalNetwork, SignalSet, World,
};
use signalmesh_core::{logging, Config, Direction, DirectionSet, Position};
use slotmap::SlotMap;
use std::collections::HashSet;

/// A wire segment; the first one also carries a lever on its west side
struct Wire {
    position: Position,
    lever: Option<u8>,
    active: bool,
    network: Option<NetworkId>,
}

impl NodeConnector for Wire {
    fn position(&self) -> Position {
        self.position
    }

    fn external_connections(&self) -> DirectionSet {
        match self.lever {
            Some(_) => DirectionSet::only(Direction::West),
            None => DirectionSet::empty(),
        }
    }

    fn input_signals(&self, _direction: Direction, _network: &SignalNetwork) -> SignalSet {
        self.lever
            .map(|strength| SignalSet::from([Signal::new(Channel::Red, strength)]))
            .unwrap_or_default()
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn network(&self) -> Option<NetworkId> {
        self.network
    }

    fn set_network(&mut self, network: Option<NetworkId>) {
        self.network = network;
    }
}

/// A world where some positions are unloaded
#[derive(Default)]
struct ChunkedWorld {
    unloaded: HashSet<Position>,
}

impl World for ChunkedWorld {
    fn is_loaded(&self, position: Position) -> bool {
        !self.unloaded.contains(&position)
    }

    fn is_opaque(&self, _position: Position) -> bool {
        false
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::default_config();
    logging::init_from_config(&config.logging);

    let mut members = MemberArena::with_key();
    let wires: Vec<MemberId> = (0..5)
        .map(|x| {
            members.insert(Wire {
                position: Position::new(x, 64, 0),
                lever: (x == 0).then_some(15),
                active: false,
                network: None,
            })
        })
        .collect();

    let settings = NetworkSettings::from(&config.engine);
    let mut networks: SlotMap<NetworkId, SignalNetwork> = SlotMap::with_key();
    let line = networks.insert_with_key(|id| SignalNetwork::new(id, settings));
    let mut propagator = Propagator::from_config(ChunkedWorld::default(), &config.engine);

    networks[line].init(&wires, &mut members, &mut propagator);
    println!("[init]    {}", networks[line]);
    println!("[init]    notifications: {:?}", propagator.run(|_, _| {}));

    // Pull the lever down
    members[wires[0]].lever = Some(0);
    networks[line].refresh_member(wires[0], Broadcast::Immediate, &mut members, &mut propagator);
    println!("[lever]   {} (active: {})", networks[line], members[wires[0]].active);

    // And back up
    members[wires[0]].lever = Some(15);
    networks[line].refresh_member(wires[0], Broadcast::Immediate, &mut members, &mut propagator);
    println!("[lever]   red = {}", networks[line].max_signal_strength(Channel::Red));
    propagator.run(|_, _| {});

    // Unload the lever's chunk and rebuild from what was known
    let previous_members = networks[line].members();
    let previous_table = networks[line].read_table().clone();
    networks[line].destroy(&mut members, &mut propagator);
    networks.remove(line);
    propagator.run(|_, _| {});

    propagator.world_mut().unloaded.insert(Position::new(0, 64, 0));
    let recovered = networks.insert_with_key(|id| SignalNetwork::new(id, settings));
    let recovery =
        networks[recovered].after_unload(&previous_members, previous_table, &mut members, &mut propagator);
    println!("[unload]  {:?}", recovery);
    println!("[unload]  {}", networks[recovered].snapshot(&members).to_json()?);

    networks[recovered].destroy(&mut members, &mut propagator);
    println!("[destroy] phase = {:?}", networks[recovered].phase());

    Ok(())
}
