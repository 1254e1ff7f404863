use rustc_hash::{FxHashMap, FxHashSet};

use crate::engine::types::{ChannelAddress, DmxValue, UniverseId};

#[derive(Debug, Default, Clone)]
/// Solo state: which channels are highlighted, and whether highlighting is on
pub struct HighlightState {
	pub active: bool,
	channels: FxHashSet<ChannelAddress>,
}
impl HighlightState {
	pub fn contains(&self, address: ChannelAddress) -> bool {
		return self.channels.contains(&address);
	}

	/// Highlighted channels in address order
	pub fn channels(&self) -> Vec<ChannelAddress> {
		let mut channels: Vec<ChannelAddress> = self.channels.iter().copied().collect();
		channels.sort();
		return channels;
	}

	/// Adds or removes a channel. Highlight stays active while any channel is highlighted.
	pub fn toggle(&mut self, address: ChannelAddress) -> bool {
		let highlighted = if self.channels.remove(&address) {
			false
		} else {
			self.channels.insert(address);
			true
		};
		self.active = !self.channels.is_empty();
		return highlighted;
	}

	pub fn remove(&mut self, address: ChannelAddress) -> bool {
		let removed = self.channels.remove(&address);
		self.active = !self.channels.is_empty();
		return removed;
	}

	/// Sets the highlighted state of several channels at once
	pub fn set_many(&mut self, addresses: &[ChannelAddress], highlighted: bool) {
		for address in addresses {
			if highlighted {
				self.channels.insert(*address);
			} else {
				self.channels.remove(address);
			}
		}
		self.active = !self.channels.is_empty();
	}

	/// Replaces the whole highlight state with what the server reports
	pub fn replace(&mut self, active: bool, channels: impl IntoIterator<Item = ChannelAddress>) {
		self.channels = channels.into_iter().collect();
		self.active = active;
	}

	pub fn clear(&mut self) {
		self.channels.clear();
		self.active = false;
	}
}

#[derive(Debug, Default, Clone)]
/// The three override layers that sit on top of stored values
pub struct OverrideLayers {
	pub blackout: bool,
	parked: FxHashMap<ChannelAddress, DmxValue>,
	pub highlight: HighlightState,
}
impl OverrideLayers {
	pub fn new() -> Self {
		return Self::default();
	}

	/// The locked value for a channel. Unknown channels are simply not parked.
	pub fn parked_value(&self, address: ChannelAddress) -> Option<DmxValue> {
		return self.parked.get(&address).copied();
	}

	pub fn is_parked(&self, address: ChannelAddress) -> bool {
		return self.parked.contains_key(&address);
	}

	pub fn park(&mut self, address: ChannelAddress, value: DmxValue) {
		self.parked.insert(address, value);
	}

	pub fn unpark(&mut self, address: ChannelAddress) -> bool {
		return self.parked.remove(&address).is_some();
	}

	/// Parked channels in address order
	pub fn parked(&self) -> Vec<(ChannelAddress, DmxValue)> {
		let mut parked: Vec<(ChannelAddress, DmxValue)> =
			self.parked.iter().map(|(address, value)| (*address, *value)).collect();
		parked.sort();
		return parked;
	}

	/// Drops every override tied to a universe that no longer exists
	pub fn forget_universe(&mut self, universe: UniverseId) {
		self.parked.retain(|address, _| address.universe != universe);
		let remaining: Vec<ChannelAddress> = self
			.highlight
			.channels()
			.into_iter()
			.filter(|address| address.universe != universe)
			.collect();
		let active = self.highlight.active && !remaining.is_empty();
		self.highlight.replace(active, remaining);
	}
}
