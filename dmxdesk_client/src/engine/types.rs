use serde::{Deserialize, Serialize};

use super::ConsoleError;

/// Number of addressable channels in a single universe
pub const CHANNELS_PER_UNIVERSE: usize = 512;

/// A single channel or master intensity
pub type DmxValue = u8;

/// sACN-style universe number
pub type UniverseId = u16;

pub type GroupId = u32;

pub type SceneId = u32;

/// Identifies a member within its group. Allocated by the group, unique within it.
pub type MemberId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifies a channel within the console. Channels are numbered `1..=512`.
pub struct ChannelAddress {
	pub universe: UniverseId,
	pub channel: u16,
}
impl ChannelAddress {
	/// Creates a validated channel address
	pub fn new(universe: UniverseId, channel: u16) -> Result<Self, ConsoleError> {
		if channel == 0 || channel as usize > CHANNELS_PER_UNIVERSE {
			return Err(ConsoleError::ChannelOutOfRange(channel));
		}
		return Ok(ChannelAddress { universe, channel });
	}

	/// Whether the channel number falls within `1..=512`
	pub fn is_valid(&self) -> bool {
		return self.channel >= 1 && self.channel as usize <= CHANNELS_PER_UNIVERSE;
	}

	/// Zero-based index into a universe array. Only meaningful for valid addresses.
	pub fn index(&self) -> usize {
		return self.channel as usize - 1;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
/// A control that can be written locally, dragged, or lit up by an indicator
pub enum ControlKey {
	Channel(ChannelAddress),
	Group(GroupId),
}

impl From<ChannelAddress> for ControlKey {
	fn from(address: ChannelAddress) -> Self {
		return ControlKey::Channel(address);
	}
}

impl std::fmt::Display for ChannelAddress {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		return write!(f, "{}/{}", self.universe, self.channel);
	}
}
