//! SignalMesh - Signal propagation through dynamically assembled networks
//!
//! Nodes join and leave at runtime, parts of the world load and unload, and
//! every node may both emit and consume signals. Each connected group of
//! nodes forms a [`SignalNetwork`] that records what its members read from
//! outside and tells neighbouring positions when that changes, so adjacent
//! networks converge on a consistent state.
//!
//! # Core Components
//!
//! - **Signal / SignalSource**: channel + strength, and where it enters
//! - **SignalTable**: multi-valued map from sources to signals
//! - **NetworkTopology**: live membership of one network
//! - **SignalNetwork**: convergence passes, neighbour notification, the
//!   feedback gate and partial-unload recovery
//! - **Propagator**: depth-bounded queue that carries notifications between
//!   networks
//!
//! # Design Principles
//!
//! 1. **Capabilities, not node types**: members, the world and the transport
//!    are traits implemented by the host
//! 2. **Skip, don't fail**: unloaded positions and closed sides are no-ops
//! 3. **Guards always release**: reentrancy and feedback flags are scoped
//!
//! # Example Usage
//!
//! ```rust
//! use signalmesh::{
//!     Channel, MemberArena, NetworkId, NetworkSettings, NodeConnector, Propagator, Signal,
//!     SignalNetwork, SignalSet, World,
//! };
//! use signalmesh_core::{Direction, DirectionSet, Position};
//! use slotmap::SlotMap;
//!
//! struct Lever {
//!     position: Position,
//!     network: Option<NetworkId>,
//! }
//!
//! impl NodeConnector for Lever {
//!     fn position(&self) -> Position {
//!         self.position
//!     }
//!     fn external_connections(&self) -> DirectionSet {
//!         DirectionSet::only(Direction::Up)
//!     }
//!     fn input_signals(&self, _direction: Direction, _network: &SignalNetwork) -> SignalSet {
//!         SignalSet::from([Signal::new(Channel::Red, 15)])
//!     }
//!     fn set_active(&mut self, _active: bool) {}
//!     fn network(&self) -> Option<NetworkId> {
//!         self.network
//!     }
//!     fn set_network(&mut self, network: Option<NetworkId>) {
//!         self.network = network;
//!     }
//! }
//!
//! struct Flat;
//!
//! impl World for Flat {
//!     fn is_loaded(&self, _position: Position) -> bool {
//!         true
//!     }
//!     fn is_opaque(&self, _position: Position) -> bool {
//!         false
//!     }
//! }
//!
//! let mut members = MemberArena::with_key();
//! let lever = members.insert(Lever { position: Position::new(0, 64, 0), network: None });
//!
//! let mut networks: SlotMap<NetworkId, SignalNetwork> = SlotMap::with_key();
//! let id = networks.insert_with_key(|id| SignalNetwork::new(id, NetworkSettings::default()));
//!
//! let mut propagator = Propagator::new(Flat, 64, 1024);
//! networks[id].init(&[lever], &mut members, &mut propagator);
//!
//! assert_eq!(networks[id].max_signal_strength(Channel::Red), 15);
//! assert_eq!(propagator.pending(), 1);
//! ```

#![warn(missing_docs)]

pub mod connector;
pub mod error;
pub mod guard;
pub mod id;
pub mod network;
pub mod propagation;
pub mod signal;
pub mod table;
pub mod topology;

// Re-export main types
pub use connector::{Environment, NeighborNotifier, NodeConnector, World};
pub use error::{MeshError, MeshResult};
pub use guard::ScopedFlag;
pub use id::{MemberArena, MemberId, NetworkId};
pub use network::{
    Broadcast, MergeScope, NetworkSettings, NetworkSnapshot, Phase, RemovalOutcome, SignalEntry,
    SignalNetwork, UnloadRecovery,
};
pub use propagation::{Notification, PropagationStats, Propagator};
pub use signal::{Channel, Signal, SignalSet, SignalSource, MAX_STRENGTH};
pub use table::SignalTable;
pub use topology::NetworkTopology;
