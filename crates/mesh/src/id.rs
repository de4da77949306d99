//! Arena keys for networks and their members.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a [`SignalNetwork`](crate::SignalNetwork) in a caller-owned arena.
    pub struct NetworkId;

    /// Handle to a network member in a [`MemberArena`].
    pub struct MemberId;
}

/// Caller-owned storage for network members.
///
/// Networks refer to members only by [`MemberId`]; members refer back to
/// their network only by [`NetworkId`].
pub type MemberArena<N> = SlotMap<MemberId, N>;
