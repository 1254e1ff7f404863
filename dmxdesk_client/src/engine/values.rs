//! The client's record of "last known value" for every channel and master.
//!
//! Each value is held twice: the last value the server confirmed, and an
//! optional optimistic value written by local intent that has not been
//! superseded yet. Readers always see the optimistic value when one exists.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::{
	types::{ChannelAddress, DmxValue, UniverseId, CHANNELS_PER_UNIVERSE},
	ConsoleError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// A value with an authoritative tier and an optimistic local tier
pub struct TieredValue {
	pub authoritative: DmxValue,
	pub local: Option<DmxValue>,
}
impl TieredValue {
	pub fn new(authoritative: DmxValue) -> Self {
		return TieredValue {
			authoritative,
			local: None,
		};
	}

	/// The value that should be shown right now
	pub fn current(&self) -> DmxValue {
		return self.local.unwrap_or(self.authoritative);
	}

	/// Records a confirmed value. The optimistic value is dropped unless `retain_local` is set.
	pub fn confirm(&mut self, value: DmxValue, retain_local: bool) {
		self.authoritative = value;
		if !retain_local {
			self.local = None;
		}
	}
}

struct UniverseValues {
	authoritative: [DmxValue; CHANNELS_PER_UNIVERSE],
	local: FxHashMap<usize, DmxValue>,
}
impl UniverseValues {
	fn new() -> Self {
		return UniverseValues {
			authoritative: [0; CHANNELS_PER_UNIVERSE],
			local: FxHashMap::default(),
		};
	}
}

/// Per-universe channel intensities plus the universe and global masters
pub struct ValueStore {
	universes: FxHashMap<UniverseId, UniverseValues>,
	universe_masters: FxHashMap<UniverseId, TieredValue>,
	global_master: TieredValue,
}

impl Default for ValueStore {
	fn default() -> Self {
		return ValueStore {
			universes: FxHashMap::default(),
			universe_masters: FxHashMap::default(),
			global_master: TieredValue::new(u8::MAX),
		};
	}
}

impl ValueStore {
	pub fn new() -> Self {
		return Self::default();
	}

	// ┌──────────────────────┐
	// │    Universe Setup    │
	// └──────────────────────┘

	/// Creates a zeroed universe with its master at full. Returns false if it already existed.
	pub fn provision_universe(&mut self, universe: UniverseId) -> bool {
		if self.universes.contains_key(&universe) {
			return false;
		}
		self.universes.insert(universe, UniverseValues::new());
		self.universe_masters.insert(universe, TieredValue::new(u8::MAX));
		return true;
	}

	/// Tears down a universe and its master. Returns false if it did not exist.
	pub fn remove_universe(&mut self, universe: UniverseId) -> bool {
		self.universe_masters.remove(&universe);
		return self.universes.remove(&universe).is_some();
	}

	pub fn has_universe(&self, universe: UniverseId) -> bool {
		return self.universes.contains_key(&universe);
	}

	/// Provisioned universes in ascending order
	pub fn universe_ids(&self) -> Vec<UniverseId> {
		let mut ids: Vec<UniverseId> = self.universes.keys().copied().collect();
		ids.sort();
		return ids;
	}

	// ┌────────────────┐
	// │    Channels    │
	// └────────────────┘

	/// The value shown for a channel, or `None` if the channel does not exist
	pub fn get(&self, address: ChannelAddress) -> Option<DmxValue> {
		if !address.is_valid() {
			return None;
		}
		let universe = self.universes.get(&address.universe)?;
		return Some(
			universe
				.local
				.get(&address.index())
				.copied()
				.unwrap_or(universe.authoritative[address.index()]),
		);
	}

	/// The last value confirmed by the server
	pub fn authoritative(&self, address: ChannelAddress) -> Option<DmxValue> {
		if !address.is_valid() {
			return None;
		}
		return self
			.universes
			.get(&address.universe)
			.map(|universe| universe.authoritative[address.index()]);
	}

	pub fn has_local(&self, address: ChannelAddress) -> bool {
		return address.is_valid()
			&& self
				.universes
				.get(&address.universe)
				.map(|universe| universe.local.contains_key(&address.index()))
				.unwrap_or(false);
	}

	/// Current values for a whole universe
	pub fn universe(&self, universe: UniverseId) -> Option<[DmxValue; CHANNELS_PER_UNIVERSE]> {
		let values = self.universes.get(&universe)?;
		let mut output = values.authoritative;
		for (index, value) in values.local.iter() {
			output[*index] = *value;
		}
		return Some(output);
	}

	/// Writes an optimistic value ahead of server confirmation
	pub fn set_local(&mut self, address: ChannelAddress, value: DmxValue) -> Result<(), ConsoleError> {
		let universe = self.universe_mut(address)?;
		universe.local.insert(address.index(), value);
		return Ok(());
	}

	/// Discards the optimistic value for a channel, falling back to the authoritative one
	pub fn drop_local(&mut self, address: ChannelAddress) {
		if !address.is_valid() {
			return;
		}
		if let Some(universe) = self.universes.get_mut(&address.universe) {
			universe.local.remove(&address.index());
		}
	}

	/// Records a server-confirmed value
	pub fn confirm(
		&mut self,
		address: ChannelAddress,
		value: DmxValue,
		retain_local: bool,
	) -> Result<(), ConsoleError> {
		let universe = self.universe_mut(address)?;
		universe.authoritative[address.index()] = value;
		if !retain_local {
			universe.local.remove(&address.index());
		}
		return Ok(());
	}

	/// Applies a full or partial universe snapshot starting at channel 1.
	///
	/// Entries that are `None` are left untouched. `retain_local` decides per channel whether
	/// an optimistic value survives the update. Returns the addresses whose value was written.
	pub fn apply_snapshot<F>(
		&mut self,
		universe: UniverseId,
		values: impl IntoIterator<Item = Option<DmxValue>>,
		retain_local: F,
	) -> Result<Vec<ChannelAddress>, ConsoleError>
	where
		F: Fn(ChannelAddress) -> bool,
	{
		let target = self
			.universes
			.get_mut(&universe)
			.ok_or(ConsoleError::UnknownUniverse(universe))?;
		let mut written = Vec::new();
		for (index, value) in values.into_iter().take(CHANNELS_PER_UNIVERSE).enumerate() {
			if let Some(value) = value {
				let address = ChannelAddress {
					universe,
					channel: index as u16 + 1,
				};
				target.authoritative[index] = value;
				if !retain_local(address) {
					target.local.remove(&index);
				}
				written.push(address);
			}
		}
		return Ok(written);
	}

	fn universe_mut(&mut self, address: ChannelAddress) -> Result<&mut UniverseValues, ConsoleError> {
		if !address.is_valid() {
			return Err(ConsoleError::ChannelOutOfRange(address.channel));
		}
		return self
			.universes
			.get_mut(&address.universe)
			.ok_or(ConsoleError::UnknownUniverse(address.universe));
	}

	// ┌───────────────┐
	// │    Masters    │
	// └───────────────┘

	pub fn universe_master(&self, universe: UniverseId) -> Option<DmxValue> {
		return self.universe_masters.get(&universe).map(TieredValue::current);
	}

	pub fn universe_master_mut(&mut self, universe: UniverseId) -> Result<&mut TieredValue, ConsoleError> {
		return self
			.universe_masters
			.get_mut(&universe)
			.ok_or(ConsoleError::UnknownUniverse(universe));
	}

	pub fn global_master(&self) -> DmxValue {
		return self.global_master.current();
	}

	pub fn global_master_mut(&mut self) -> &mut TieredValue {
		return &mut self.global_master;
	}
}
