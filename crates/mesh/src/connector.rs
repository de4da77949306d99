//! Capabilities the network consumes from its surroundings.
//!
//! Members, the world and the notification transport are all owned by the
//! host. The network only talks to them through these traits and never
//! depends on a concrete node type.

use crate::id::NetworkId;
use crate::network::SignalNetwork;
use crate::signal::SignalSet;
use signalmesh_core::{Direction, DirectionSet, Position};

/// Capability every network member implements.
pub trait NodeConnector {
    /// Grid position of the member.
    fn position(&self) -> Position;

    /// Sides currently connected to something outside the network.
    fn external_connections(&self) -> DirectionSet;

    /// Signals the member currently reads from outside on `direction`.
    ///
    /// `network` is the member's own network with its gate closed, so
    /// [`SignalNetwork::read_table`] returns an empty table here. A member
    /// that derives its input from the world therefore never reads its
    /// own output back as input.
    fn input_signals(&self, direction: Direction, network: &SignalNetwork) -> SignalSet;

    /// Display flag. Written by the network, never read by it.
    fn set_active(&mut self, active: bool);

    /// Network this member belongs to, if any.
    fn network(&self) -> Option<NetworkId>;

    /// Called by the network when membership changes.
    fn set_network(&mut self, network: Option<NetworkId>);
}

impl<T: NodeConnector + ?Sized> NodeConnector for Box<T> {
    fn position(&self) -> Position {
        (**self).position()
    }

    fn external_connections(&self) -> DirectionSet {
        (**self).external_connections()
    }

    fn input_signals(&self, direction: Direction, network: &SignalNetwork) -> SignalSet {
        (**self).input_signals(direction, network)
    }

    fn set_active(&mut self, active: bool) {
        (**self).set_active(active)
    }

    fn network(&self) -> Option<NetworkId> {
        (**self).network()
    }

    fn set_network(&mut self, network: Option<NetworkId>) {
        (**self).set_network(network)
    }
}

/// Positional queries against the host world.
pub trait World {
    /// Whether `position` can be touched safely right now.
    fn is_loaded(&self, position: Position) -> bool;

    /// Whether `position` holds a solid, opaque block.
    fn is_opaque(&self, position: Position) -> bool;
}

/// Transport that tells neighbouring blocks and networks about a change.
pub trait NeighborNotifier {
    /// Something at `origin` changed; whatever is at `position` should re-evaluate.
    fn notify_changed(&mut self, position: Position, origin: Position);

    /// Ask listeners whether notifying out of `position` along `directions`
    /// should be cancelled. `true` suppresses the fan-out.
    fn notify_veto(&mut self, position: Position, directions: DirectionSet) -> bool;
}

/// Everything a convergence pass needs from the host besides its members.
pub trait Environment: World + NeighborNotifier {}

impl<T: World + NeighborNotifier + ?Sized> Environment for T {}
