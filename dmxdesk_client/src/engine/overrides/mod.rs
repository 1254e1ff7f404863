mod state;

pub use state::{HighlightState, OverrideLayers};

use super::types::{ChannelAddress, DmxValue, UniverseId, CHANNELS_PER_UNIVERSE};

/// Output of a non-highlighted channel while highlight is active
pub const HIGHLIGHT_DIM_VALUE: DmxValue = 0;

/// Output of a highlighted channel while highlight is active
pub const HIGHLIGHT_FULL_VALUE: DmxValue = 255;

/// Computes the value to display for a channel.
///
/// Precedence, highest first: blackout, park, highlight, raw value.
/// Park sits above highlight so a locked look survives someone else soloing.
pub fn resolve(raw: DmxValue, address: ChannelAddress, layers: &OverrideLayers) -> DmxValue {
	if layers.blackout {
		return 0;
	}
	if let Some(locked) = layers.parked_value(address) {
		return locked;
	}
	if layers.highlight.active {
		return if layers.highlight.contains(address) {
			HIGHLIGHT_FULL_VALUE
		} else {
			HIGHLIGHT_DIM_VALUE
		};
	}
	return raw;
}

/// Resolves every channel of a universe
pub fn resolve_universe(
	universe: UniverseId,
	raw: &[DmxValue; CHANNELS_PER_UNIVERSE],
	layers: &OverrideLayers,
) -> [DmxValue; CHANNELS_PER_UNIVERSE] {
	let mut output = [0; CHANNELS_PER_UNIVERSE];
	for (index, value) in raw.iter().enumerate() {
		let address = ChannelAddress {
			universe,
			channel: index as u16 + 1,
		};
		output[index] = resolve(*value, address, layers);
	}
	return output;
}
