//! Network Topology - live membership of one connected network
//!
//! Keeps members in join order and rejects duplicates. Holds keys only;
//! the members themselves live in the host's arena.

/// Membership set of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTopology<K> {
    /// Members in join order
    members: Vec<K>,
}

impl<K> Default for NetworkTopology<K> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> NetworkTopology<K> {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add(&mut self, member: K) -> bool {
        if self.contains(member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove(&mut self, member: K) -> bool {
        match self.members.iter().position(|m| *m == member) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `member` belongs to this network
    pub fn contains(&self, member: K) -> bool {
        self.members.contains(&member)
    }

    /// Iterate members in join order
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.members.iter().copied()
    }

    /// Copy of the member list, safe to hold across membership changes
    pub fn snapshot(&self) -> Vec<K> {
        self.members.clone()
    }

    /// Remove and return every member
    pub fn drain(&mut self) -> Vec<K> {
        std::mem::take(&mut self.members)
    }

    /// Member count
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the network has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
