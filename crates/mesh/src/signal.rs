//! Signal values and the directional sources they enter a network through.

use crate::error::{MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use signalmesh_core::{Direction, Position};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Strongest signal a source can assert.
pub const MAX_STRENGTH: u8 = 15;

/// Set of signals asserted at one source.
pub type SignalSet = BTreeSet<Signal>;

/// Channel tag carried by a signal.
///
/// The network never interprets channels beyond comparing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Channel {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    Silver,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl Channel {
    /// All channels in index order.
    pub const ALL: [Channel; 16] = [
        Channel::White,
        Channel::Orange,
        Channel::Magenta,
        Channel::LightBlue,
        Channel::Yellow,
        Channel::Lime,
        Channel::Pink,
        Channel::Gray,
        Channel::Silver,
        Channel::Cyan,
        Channel::Purple,
        Channel::Blue,
        Channel::Brown,
        Channel::Green,
        Channel::Red,
        Channel::Black,
    ];

    /// Stable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Channel::White => "white",
            Channel::Orange => "orange",
            Channel::Magenta => "magenta",
            Channel::LightBlue => "light_blue",
            Channel::Yellow => "yellow",
            Channel::Lime => "lime",
            Channel::Pink => "pink",
            Channel::Gray => "gray",
            Channel::Silver => "silver",
            Channel::Cyan => "cyan",
            Channel::Purple => "purple",
            Channel::Blue => "blue",
            Channel::Brown => "brown",
            Channel::Green => "green",
            Channel::Red => "red",
            Channel::Black => "black",
        }
    }

    /// Channel at `index` in [`Channel::ALL`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| MeshError::UnknownChannel(s.to_string()))
    }
}

/// A signal: a channel tag with a strength in `0..=MAX_STRENGTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Signal {
    channel: Channel,
    strength: u8,
}

impl Signal {
    /// Create a signal, clamping `strength` to [`MAX_STRENGTH`].
    pub fn new(channel: Channel, strength: u8) -> Self {
        Self {
            channel,
            strength: strength.min(MAX_STRENGTH),
        }
    }

    /// Create a signal, rejecting out-of-range strengths.
    pub fn try_new(channel: Channel, strength: u32) -> MeshResult<Self> {
        if strength > u32::from(MAX_STRENGTH) {
            return Err(MeshError::StrengthOutOfRange {
                strength,
                max: MAX_STRENGTH,
            });
        }
        Ok(Self {
            channel,
            strength: strength as u8,
        })
    }

    /// Channel tag.
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Strength, `0..=MAX_STRENGTH`.
    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// Whether the signal carries any strength.
    pub fn is_active(&self) -> bool {
        self.strength > 0
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.strength)
    }
}

/// Where, and facing which way, a signal enters a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalSource {
    /// Position of the member reading the input
    pub position: Position,
    /// Side of the member the input is read from
    pub direction: Direction,
}

impl SignalSource {
    /// Create a new source key.
    pub const fn new(position: Position, direction: Direction) -> Self {
        Self {
            position,
            direction,
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.position, self.direction)
    }
}
