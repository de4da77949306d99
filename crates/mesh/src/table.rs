//! Signal Table - what a network currently broadcasts
//!
//! Multi-valued mapping from directional sources to the signals asserted
//! there. The table is the only authoritative record of a network's output;
//! it never notifies anyone about its own changes.

use crate::signal::{Channel, Signal, SignalSet, SignalSource};
use signalmesh_core::{Direction, Position};
use std::collections::BTreeMap;

/// Signals asserted per source, kept in key order so scans are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalTable {
    /// Sources with at least one signal. Empty sets are never stored.
    entries: BTreeMap<SignalSource, SignalSet>,
}

impl SignalTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Drop whatever `source` held and store `signals` in its place.
    ///
    /// An empty set leaves no entry behind.
    pub fn replace<I>(&mut self, source: SignalSource, signals: I)
    where
        I: IntoIterator<Item = Signal>,
    {
        let signals: SignalSet = signals.into_iter().collect();
        if signals.is_empty() {
            self.entries.remove(&source);
        } else {
            self.entries.insert(source, signals);
        }
    }

    /// Add one signal to `source` without touching its other signals.
    pub fn insert(&mut self, source: SignalSource, signal: Signal) {
        self.entries.entry(source).or_default().insert(signal);
    }

    /// Drop every signal for `source`. Returns what was stored.
    pub fn remove(&mut self, source: &SignalSource) -> Option<SignalSet> {
        self.entries.remove(source)
    }

    /// Drop every direction of `position`. Returns the number of entries dropped.
    pub fn remove_position(&mut self, position: Position) -> usize {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.entries.remove(&SignalSource::new(position, d)))
            .map(|set| set.len())
            .sum()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only sources for which `keep` returns true.
    ///
    /// Returns the number of signal entries dropped.
    pub fn retain_sources<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&SignalSource) -> bool,
    {
        let before = self.len();
        self.entries.retain(|source, _| keep(source));
        before - self.len()
    }

    /// Signals stored for `source`
    pub fn get(&self, source: &SignalSource) -> Option<&SignalSet> {
        self.entries.get(source)
    }

    /// Whether `source` has any stored signal
    pub fn contains_source(&self, source: &SignalSource) -> bool {
        self.entries.contains_key(source)
    }

    /// Sources with at least one signal, in key order
    pub fn sources(&self) -> impl Iterator<Item = &SignalSource> {
        self.entries.keys()
    }

    /// Every `(source, signal)` pair, in key order
    pub fn entries(&self) -> impl Iterator<Item = (&SignalSource, &Signal)> {
        self.entries
            .iter()
            .flat_map(|(source, set)| set.iter().map(move |signal| (source, signal)))
    }

    /// Every stored signal
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.entries.values().flatten()
    }

    /// Greatest strength on `channel`, 0 if the channel is absent.
    pub fn max_strength(&self, channel: Channel) -> u8 {
        self.signals()
            .filter(|s| s.channel() == channel)
            .map(Signal::strength)
            .max()
            .unwrap_or(0)
    }

    /// True iff some stored signal has strength above zero.
    pub fn any_active(&self) -> bool {
        self.signals().any(Signal::is_active)
    }

    /// Total number of `(source, signal)` entries
    pub fn len(&self) -> usize {
        self.entries.values().map(|set| set.len()).sum()
    }

    /// Number of distinct sources
    pub fn source_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(SignalSource, Signal)> for SignalTable {
    fn from_iter<I: IntoIterator<Item = (SignalSource, Signal)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (source, signal) in iter {
            table.insert(source, signal);
        }
        table
    }
}
