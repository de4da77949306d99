//! Signal Network - convergence of one connected network
//!
//! A network owns the [`SignalTable`] of everything its members read from
//! outside, and decides which neighbouring positions must hear about a
//! change. Every change runs the same cycle:
//!
//! 1. mute outward effects and tell the member's neighbours it has no signals
//! 2. ask the member what it reads on each open side, with the network gate
//!    closed so it cannot read its own output back
//! 3. replace the member's table entries
//! 4. broadcast the change from every member so downstream networks rerun
//!    the same cycle
//!
//! Networks never call each other directly. Convergence across networks
//! happens through the [`NeighborNotifier`](crate::NeighborNotifier) the
//! host provides.

use crate::connector::{Environment, NodeConnector};
use crate::error::MeshResult;
use crate::guard::ScopedFlag;
use crate::id::{MemberArena, MemberId, NetworkId};
use crate::signal::{Channel, Signal, SignalSet, SignalSource};
use crate::table::SignalTable;
use crate::topology::NetworkTopology;
use serde::{Deserialize, Serialize};
use signalmesh_core::{Direction, DirectionSet, EngineConfig, Position};
use slotmap::SecondaryMap;
use std::cell::Cell;
use std::fmt;
use tracing::{debug, info, trace, warn};

/// What a disabled network shows to readers.
static EMPTY_TABLE: SignalTable = SignalTable::new();

/// Lifecycle of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created, no members adopted yet
    Uninitialized,
    /// Holding members and converging on change
    Active,
    /// Torn down; must not be reused
    Destroyed,
}

/// Whether a refresh broadcasts its result to the whole network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Broadcast {
    /// Notify every member's neighbours at the end of the pass
    Immediate,
    /// The caller broadcasts later
    Deferred,
}

/// Proof that a merge is in progress on a network.
///
/// [`SignalNetwork::add_member`] never broadcasts; it requires this token so
/// the caller cannot forget that [`SignalNetwork::finish_merge`] owes the
/// network one broadcast.
#[must_use = "a merge must be finished to broadcast the merged inputs"]
#[derive(Debug)]
pub struct MergeScope {
    network: NetworkId,
}

impl MergeScope {
    /// Network the merge belongs to.
    pub fn network(&self) -> NetworkId {
        self.network
    }
}

/// Result of [`SignalNetwork::remove_member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The member did not belong to this network
    NotMember,
    /// Removed; other members remain
    Removed,
    /// Removed the last member; the caller should destroy the network
    NowEmpty,
}

/// Summary of [`SignalNetwork::after_unload`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnloadRecovery {
    /// Members whose position was still loaded
    pub readmitted: usize,
    /// Members left out because they are unloaded or gone
    pub skipped: usize,
    /// Table entries carried over verbatim
    pub kept_entries: usize,
    /// Table entries whose source position is unloaded
    pub dropped_entries: usize,
    /// Whether the loss was broadcast
    pub broadcast: bool,
}

/// Per-network settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Mirror "any signal active" onto members after each refresh
    pub show_state: bool,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self { show_state: true }
    }
}

impl From<&EngineConfig> for NetworkSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            show_state: config.show_state,
        }
    }
}

/// One connected network of signal-carrying members.
#[derive(Debug)]
pub struct SignalNetwork {
    /// Arena key, handed to members as their back-reference
    id: NetworkId,
    settings: NetworkSettings,
    /// Signals read by members from outside the network
    table: SignalTable,
    topology: NetworkTopology<MemberId>,
    /// Where each member last sourced entries from
    positions: SecondaryMap<MemberId, Position>,
    phase: Phase,
    /// True while a convergence pass runs
    updating: Cell<bool>,
    /// When false, readers see an empty table
    enabled: Cell<bool>,
}

impl SignalNetwork {
    /// Create an empty, uninitialized network
    pub fn new(id: NetworkId, settings: NetworkSettings) -> Self {
        Self {
            id,
            settings,
            table: SignalTable::new(),
            topology: NetworkTopology::new(),
            positions: SecondaryMap::new(),
            phase: Phase::Uninitialized,
            updating: Cell::new(false),
            enabled: Cell::new(true),
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Adopt the initial members, read their inputs, then broadcast once.
    pub fn init<N, E>(&mut self, members: &[MemberId], arena: &mut MemberArena<N>, env: &mut E)
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if self.phase != Phase::Uninitialized {
            warn!(network = ?self.id, phase = ?self.phase, "Ignoring init of a network already initialized");
            return;
        }
        self.phase = Phase::Active;

        let scope = self.begin_merge();
        for &member in members {
            self.add_member(member, &scope, arena, env);
        }
        self.finish_merge(scope, arena, env);

        info!(
            network = ?self.id,
            members = self.topology.len(),
            entries = self.table.len(),
            "Signal network initialized"
        );
    }

    /// Drop every signal, let the neighbours know, and release all members.
    ///
    /// The network must not be used afterwards.
    pub fn destroy<N, E>(&mut self, arena: &mut MemberArena<N>, env: &mut E)
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if self.phase == Phase::Destroyed {
            warn!(network = ?self.id, "Network destroyed twice");
            return;
        }

        {
            let _pass = ScopedFlag::set(&self.updating, true);
            for member in self.topology.iter() {
                if let Some(node) = arena.get_mut(member) {
                    node.set_active(false);
                }
            }
            self.table.clear();
            self.broadcast(arena, env);
        }

        for member in self.topology.drain() {
            if let Some(node) = arena.get_mut(member) {
                if node.network() == Some(self.id) {
                    node.set_network(None);
                }
            }
        }
        self.positions.clear();
        self.phase = Phase::Destroyed;
        info!(network = ?self.id, "Signal network destroyed");
    }

    /// Start merging members into this network.
    pub fn begin_merge(&self) -> MergeScope {
        MergeScope { network: self.id }
    }

    /// End a merge with the broadcast that [`add_member`](Self::add_member) deferred.
    pub fn finish_merge<N, E>(&mut self, scope: MergeScope, arena: &MemberArena<N>, env: &mut E)
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if scope.network != self.id {
            warn!(network = ?self.id, scope = ?scope.network, "Finishing a merge opened on another network");
        }
        if !self.ensure_live("finish_merge") {
            return;
        }
        let _pass = ScopedFlag::set(&self.updating, true);
        self.broadcast(arena, env);
    }

    /// Add a member during a merge and read its inputs.
    ///
    /// Does not broadcast; the enclosing merge does.
    pub fn add_member<N, E>(
        &mut self,
        member: MemberId,
        scope: &MergeScope,
        arena: &mut MemberArena<N>,
        env: &mut E,
    ) where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if scope.network != self.id {
            warn!(network = ?self.id, scope = ?scope.network, "Adding a member under another network's merge");
        }
        if !self.ensure_live("add_member") {
            return;
        }
        let Some(node) = arena.get_mut(member) else {
            warn!(network = ?self.id, member = ?member, "Cannot add a member missing from the arena");
            return;
        };

        if !self.topology.add(member) {
            trace!(network = ?self.id, member = ?member, "Member already present, refreshing inputs");
        }
        self.positions.insert(member, node.position());
        node.set_network(Some(self.id));
        self.refresh_member(member, Broadcast::Deferred, arena, env);
    }

    /// Drop a member and purge every table entry it sourced.
    ///
    /// Entries are found through the position recorded when the member
    /// joined, so the host may already have freed the member itself.
    /// Does not broadcast. When the last member leaves the caller is
    /// expected to [`destroy`](Self::destroy) the network.
    pub fn remove_member<N>(&mut self, member: MemberId, arena: &mut MemberArena<N>) -> RemovalOutcome
    where
        N: NodeConnector,
    {
        if !self.topology.remove(member) {
            return RemovalOutcome::NotMember;
        }

        let purged = self
            .positions
            .remove(member)
            .map_or(0, |position| self.table.remove_position(position));
        match arena.get_mut(member) {
            Some(node) if node.network() == Some(self.id) => node.set_network(None),
            Some(_) => {}
            None => trace!(network = ?self.id, member = ?member, "Removed member already gone from the arena"),
        }
        debug!(network = ?self.id, member = ?member, purged, "Member removed");

        if self.topology.is_empty() {
            RemovalOutcome::NowEmpty
        } else {
            RemovalOutcome::Removed
        }
    }

    // =========================================================================
    // CONVERGENCE
    // =========================================================================

    /// Re-read every input of one member.
    ///
    /// The member's neighbours are told first, so they re-evaluate as if it
    /// carried no signals. Closed sides never keep an entry.
    pub fn refresh_member<N, E>(
        &mut self,
        member: MemberId,
        broadcast: Broadcast,
        arena: &mut MemberArena<N>,
        env: &mut E,
    ) where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if !self.ensure_live("refresh_member") {
            return;
        }
        if !self.topology.contains(member) {
            warn!(network = ?self.id, member = ?member, "Ignoring refresh of a member from another network");
            return;
        }
        let Some(node) = arena.get(member) else {
            warn!(network = ?self.id, member = ?member, "Cannot refresh a member missing from the arena");
            return;
        };
        let position = node.position();
        let open = node.external_connections();

        let _pass = ScopedFlag::set(&self.updating, true);
        notify_node_neighbours(node, env);

        let mut inputs: Vec<(Direction, Option<SignalSet>)> = Vec::with_capacity(Direction::ALL.len());
        {
            let _gate = ScopedFlag::set(&self.enabled, false);
            let view: &SignalNetwork = self;
            for direction in Direction::ALL {
                let signals = open
                    .contains(direction)
                    .then(|| node.input_signals(direction, view));
                inputs.push((direction, signals));
            }
        }

        if let Some(previous) = self.positions.insert(member, position) {
            if previous != position {
                self.table.remove_position(previous);
            }
        }
        for (direction, signals) in inputs {
            let source = SignalSource::new(position, direction);
            match signals {
                Some(signals) => self.table.replace(source, signals),
                None => {
                    self.table.remove(&source);
                }
            }
        }

        if broadcast == Broadcast::Immediate {
            self.broadcast(arena, env);
        }
        if self.settings.show_state {
            self.update_active_state(arena);
        }

        debug!(
            network = ?self.id,
            member = ?member,
            position = %position,
            open = ?open,
            entries = self.table.len(),
            "Member inputs refreshed"
        );
    }

    /// Tell the neighbours of every member that this network's output changed.
    ///
    /// Works on a snapshot of the member list.
    pub fn broadcast<N, E>(&self, arena: &MemberArena<N>, env: &mut E)
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        let members = self.topology.snapshot();
        for member in &members {
            match arena.get(*member) {
                Some(node) => notify_node_neighbours(node, env),
                None => trace!(network = ?self.id, member = ?member, "Skipping member missing from the arena"),
            }
        }
        debug!(network = ?self.id, members = members.len(), "Signal update broadcast");
    }

    /// Notify the neighbours of a single member.
    pub fn notify_member<N, E>(&self, member: MemberId, arena: &MemberArena<N>, env: &mut E)
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        if let Some(node) = arena.get(member) {
            notify_node_neighbours(node, env);
        }
    }

    /// Apply "any signal active" to every member's display flag.
    pub fn update_active_state<N>(&self, arena: &mut MemberArena<N>) -> bool
    where
        N: NodeConnector,
    {
        let active = self.table.any_active();
        for member in self.topology.iter() {
            if let Some(node) = arena.get_mut(member) {
                node.set_active(active);
            }
        }
        active
    }

    /// Rebuild after part of the world became unreachable.
    ///
    /// Only members at loaded positions are readmitted, and old entries are
    /// kept verbatim unless their source position is unloaded. Nothing is
    /// re-read from members, since some of them may not exist yet. Any loss
    /// is broadcast once.
    pub fn after_unload<N, E>(
        &mut self,
        previous_members: &[MemberId],
        previous_table: SignalTable,
        arena: &mut MemberArena<N>,
        env: &mut E,
    ) -> UnloadRecovery
    where
        N: NodeConnector,
        E: Environment + ?Sized,
    {
        let mut recovery = UnloadRecovery::default();
        if !self.ensure_live("after_unload") {
            return recovery;
        }

        for &member in previous_members {
            match arena.get_mut(member) {
                Some(node) if env.is_loaded(node.position()) => {
                    self.topology.add(member);
                    self.positions.insert(member, node.position());
                    node.set_network(Some(self.id));
                    recovery.readmitted += 1;
                }
                _ => recovery.skipped += 1,
            }
        }

        self.table = previous_table;
        recovery.dropped_entries = self.table.retain_sources(|source| env.is_loaded(source.position));
        recovery.kept_entries = self.table.len();

        if recovery.dropped_entries > 0 {
            let _pass = ScopedFlag::set(&self.updating, true);
            self.broadcast(arena, env);
            recovery.broadcast = true;
        }

        info!(
            network = ?self.id,
            readmitted = recovery.readmitted,
            skipped = recovery.skipped,
            dropped = recovery.dropped_entries,
            "Network recovered after unload"
        );
        recovery
    }

    // =========================================================================
    // GATE
    // =========================================================================

    /// Show the table to readers again.
    pub fn enable(&self) {
        self.enabled.set(true);
    }

    /// Hide the table from readers.
    pub fn disable(&self) {
        self.enabled.set(false);
    }

    /// Hide the table until the returned guard is dropped.
    pub fn disabled_scope(&self) -> ScopedFlag<'_> {
        ScopedFlag::set(&self.enabled, false)
    }

    /// Whether readers currently see the table
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// The table as readers see it: empty while the network is disabled.
    pub fn read_table(&self) -> &SignalTable {
        if self.enabled.get() {
            &self.table
        } else {
            &EMPTY_TABLE
        }
    }

    /// Strongest visible signal on `channel`.
    pub fn max_signal_strength(&self, channel: Channel) -> u8 {
        self.read_table().max_strength(channel)
    }

    /// Whether any visible signal has strength above zero.
    pub fn any_active(&self) -> bool {
        self.read_table().any_active()
    }

    /// Whether a convergence pass is running on this network.
    pub fn is_updating(&self) -> bool {
        self.updating.get()
    }

    /// Snapshot of the member list
    pub fn members(&self) -> Vec<MemberId> {
        self.topology.snapshot()
    }

    /// Whether `member` belongs to this network
    pub fn contains(&self, member: MemberId) -> bool {
        self.topology.contains(member)
    }

    /// Member count
    pub fn member_count(&self) -> usize {
        self.topology.len()
    }

    /// Arena key of this network
    pub fn id(&self) -> NetworkId {
        self.id
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Settings this network runs with
    pub fn settings(&self) -> NetworkSettings {
        self.settings
    }

    /// Serializable view of members and raw table contents.
    pub fn snapshot<N>(&self, arena: &MemberArena<N>) -> NetworkSnapshot
    where
        N: NodeConnector,
    {
        NetworkSnapshot {
            phase: self.phase,
            enabled: self.enabled.get(),
            members: self
                .topology
                .iter()
                .filter_map(|m| arena.get(m).map(|node| node.position()))
                .collect(),
            signals: self
                .table
                .entries()
                .map(|(source, signal)| SignalEntry {
                    source: *source,
                    signal: *signal,
                })
                .collect(),
        }
    }

    fn ensure_live(&mut self, operation: &str) -> bool {
        match self.phase {
            Phase::Destroyed => {
                warn!(network = ?self.id, operation, "Operation on a destroyed network ignored");
                false
            }
            Phase::Uninitialized => {
                self.phase = Phase::Active;
                true
            }
            Phase::Active => true,
        }
    }
}

impl fmt::Display for SignalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalNetwork [signals=")?;
        for signal in self.table.signals() {
            write!(f, "<{}>", signal)?;
        }
        write!(f, ", members={}]", self.topology.len())
    }
}

/// Tell whatever sits next to `node`'s open sides that it changed.
///
/// Unloaded positions are never touched. When the adjacent block is opaque
/// its own neighbours are told as well, except the way back to `node`,
/// since an opaque block can carry the change further. The transport may
/// veto the whole member, or only the fan-out through one opaque block.
fn notify_node_neighbours<N, E>(node: &N, env: &mut E)
where
    N: NodeConnector + ?Sized,
    E: Environment + ?Sized,
{
    let origin = node.position();
    if !env.is_loaded(origin) {
        trace!(position = %origin, "Member unloaded, skipping neighbour notification");
        return;
    }

    let open = node.external_connections();
    if env.notify_veto(origin, open) {
        trace!(position = %origin, "Neighbour notification vetoed");
        return;
    }

    for direction in open.iter() {
        let adjacent = origin.offset(direction);
        if !env.is_loaded(adjacent) {
            continue;
        }
        env.notify_changed(adjacent, origin);

        if env.is_opaque(adjacent) && !env.notify_veto(adjacent, DirectionSet::all()) {
            for next in adjacent.neighbors() {
                if next != origin && env.is_loaded(next) {
                    env.notify_changed(next, origin);
                }
            }
        }
    }
}

/// One `(source, signal)` pair of a [`NetworkSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEntry {
    /// Where the signal enters
    pub source: SignalSource,
    /// The signal itself
    pub signal: Signal,
}

/// Diagnostic view of a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// Lifecycle phase
    pub phase: Phase,
    /// Gate state at snapshot time
    pub enabled: bool,
    /// Member positions in join order
    pub members: Vec<Position>,
    /// Raw table contents in key order
    pub signals: Vec<SignalEntry>,
}

impl NetworkSnapshot {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> MeshResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
