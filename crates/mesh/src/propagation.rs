//! In-process propagation driver
//!
//! Networks never call each other. A change notification produced by one
//! network's pass is queued here and delivered later to a host handler,
//! which typically refreshes whichever network sits at the target position.
//! That refresh queues further notifications one hop deeper.
//!
//! Mutual triggering between networks has no natural bound, so the driver
//! caps the hop depth and the number of deliveries per run. Identical
//! pending notifications are coalesced.

use crate::connector::{NeighborNotifier, World};
use signalmesh_core::{DirectionSet, EngineConfig, Position};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace, warn};

/// A queued "something changed at `origin`" message for `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    /// Position that should re-evaluate
    pub target: Position,
    /// Position whose change caused the notification
    pub origin: Position,
    /// Hops from the change that started the run
    pub depth: u32,
}

/// Counters for one [`Propagator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    /// Notifications handed to the handler
    pub delivered: usize,
    /// Notifications merged into an identical pending one
    pub coalesced: usize,
    /// Notifications beyond the depth bound
    pub dropped_depth: usize,
    /// Notifications left undelivered when the run budget ran out
    pub dropped_budget: usize,
    /// Deepest notification delivered
    pub max_depth_seen: u32,
}

impl PropagationStats {
    /// Whether anything was dropped by a bound.
    pub fn truncated(&self) -> bool {
        self.dropped_depth > 0 || self.dropped_budget > 0
    }
}

/// Queueing [`NeighborNotifier`] wrapped around a host [`World`].
#[derive(Debug)]
pub struct Propagator<W> {
    world: W,
    pending: VecDeque<Notification>,
    /// `(target, origin)` pairs currently queued
    pending_keys: HashSet<(Position, Position)>,
    /// Positions whose listeners cancel outward fan-out
    vetoed: HashSet<Position>,
    /// Depth of the notification being handled, 0 outside a run
    current_depth: u32,
    max_depth: u32,
    max_notifications: usize,
    stats: PropagationStats,
}

impl<W: World> Propagator<W> {
    /// Create a driver with explicit bounds.
    pub fn new(world: W, max_depth: u32, max_notifications: usize) -> Self {
        Self {
            world,
            pending: VecDeque::new(),
            pending_keys: HashSet::new(),
            vetoed: HashSet::new(),
            current_depth: 0,
            max_depth,
            max_notifications,
            stats: PropagationStats::default(),
        }
    }

    /// Create a driver bounded by the engine configuration.
    pub fn from_config(world: W, config: &EngineConfig) -> Self {
        Self::new(
            world,
            config.max_propagation_depth,
            config.max_notifications_per_run,
        )
    }

    /// The wrapped world
    pub fn world(&self) -> &W {
        &self.world
    }

    /// The wrapped world, mutably
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Cancel fan-out out of `position` until [`allow`](Self::allow) is called.
    pub fn veto(&mut self, position: Position) {
        self.vetoed.insert(position);
    }

    /// Lift a veto.
    pub fn allow(&mut self, position: Position) {
        self.vetoed.remove(&position);
    }

    /// Notifications waiting for delivery
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Deliver queued notifications until none remain or a bound is hit.
    ///
    /// The handler receives the driver itself so the passes it runs can
    /// queue follow-up notifications.
    pub fn run<F>(&mut self, mut handler: F) -> PropagationStats
    where
        F: FnMut(&Notification, &mut Self),
    {
        while let Some(notification) = self.pending.pop_front() {
            self.pending_keys
                .remove(&(notification.target, notification.origin));

            if self.stats.delivered >= self.max_notifications {
                self.stats.dropped_budget += 1 + self.pending.len();
                self.pending.clear();
                self.pending_keys.clear();
                warn!(
                    budget = self.max_notifications,
                    dropped = self.stats.dropped_budget,
                    "Propagation budget exhausted"
                );
                break;
            }

            self.stats.delivered += 1;
            self.stats.max_depth_seen = self.stats.max_depth_seen.max(notification.depth);
            self.current_depth = notification.depth;
            trace!(
                destination = %notification.target,
                origin = %notification.origin,
                depth = notification.depth,
                "Delivering notification"
            );
            handler(&notification, self);
        }
        self.current_depth = 0;

        let stats = std::mem::take(&mut self.stats);
        debug!(
            delivered = stats.delivered,
            coalesced = stats.coalesced,
            dropped_depth = stats.dropped_depth,
            dropped_budget = stats.dropped_budget,
            "Propagation run finished"
        );
        stats
    }
}

impl<W: World> World for Propagator<W> {
    fn is_loaded(&self, position: Position) -> bool {
        self.world.is_loaded(position)
    }

    fn is_opaque(&self, position: Position) -> bool {
        self.world.is_opaque(position)
    }
}

impl<W: World> NeighborNotifier for Propagator<W> {
    fn notify_changed(&mut self, position: Position, origin: Position) {
        let depth = self.current_depth.saturating_add(1);
        if depth > self.max_depth {
            self.stats.dropped_depth += 1;
            debug!(destination = %position, origin = %origin, depth, "Notification beyond depth bound dropped");
            return;
        }
        if !self.pending_keys.insert((position, origin)) {
            self.stats.coalesced += 1;
            return;
        }
        self.pending.push_back(Notification {
            target: position,
            origin,
            depth,
        });
    }

    fn notify_veto(&mut self, position: Position, _directions: DirectionSet) -> bool {
        self.vetoed.contains(&position)
    }
}
