use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	engine::{
		groups::Group,
		indicators::IndicatorKind,
		types::{ChannelAddress, DmxValue, GroupId, SceneId, UniverseId},
	},
	value_utils::{color::Hsl, scaling::clamp_dmx},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Label the server attaches to a value change, naming who caused it
pub enum ChangeSource {
	Local,
	Remote,
	RemoteInput,
	Input,
	Group,
	GroupReject,
	Reject,
	Scene,
	Unknown(String),
}
impl ChangeSource {
	/// The server refused a local value and is reporting the one that stands
	pub fn is_reject(&self) -> bool {
		return matches!(self, ChangeSource::GroupReject | ChangeSource::Reject);
	}

	/// Changes from an external input outrank a local drag on a group
	pub fn is_input(&self) -> bool {
		return matches!(self, ChangeSource::Input | ChangeSource::RemoteInput);
	}

	/// Which indicator a change from this source should light
	pub fn indicator_kind(&self) -> IndicatorKind {
		return match self {
			ChangeSource::Group | ChangeSource::GroupReject => IndicatorKind::Group,
			_ => IndicatorKind::Remote,
		};
	}
}
impl From<String> for ChangeSource {
	fn from(label: String) -> Self {
		return match label.as_str() {
			"local" => ChangeSource::Local,
			"remote" => ChangeSource::Remote,
			"remote-input" => ChangeSource::RemoteInput,
			"input" => ChangeSource::Input,
			"group" => ChangeSource::Group,
			"group-reject" => ChangeSource::GroupReject,
			"reject" => ChangeSource::Reject,
			"scene" => ChangeSource::Scene,
			_ => ChangeSource::Unknown(label),
		};
	}
}
impl From<ChangeSource> for String {
	fn from(source: ChangeSource) -> Self {
		return match source {
			ChangeSource::Local => "local".into(),
			ChangeSource::Remote => "remote".into(),
			ChangeSource::RemoteInput => "remote-input".into(),
			ChangeSource::Input => "input".into(),
			ChangeSource::Group => "group".into(),
			ChangeSource::GroupReject => "group-reject".into(),
			ChangeSource::Reject => "reject".into(),
			ChangeSource::Scene => "scene".into(),
			ChangeSource::Unknown(label) => label,
		};
	}
}

/// Marks an input-snapshot entry as outside the input's range. Any negative value is treated the same.
pub const INPUT_UNTOUCHED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Values for one universe, starting at channel 1
pub struct UniverseFrame {
	pub universe: UniverseId,
	pub values: Vec<i32>,
}
impl UniverseFrame {
	/// Clamped values, ready for the store
	pub fn clamped(&self) -> impl Iterator<Item = Option<DmxValue>> + '_ {
		return self.values.iter().map(|value| Some(clamp_dmx(*value)));
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
/// Everything the server pushes to a client
pub enum InboundEvent {
	UniverseProvisioned {
		universe: UniverseId,
	},
	UniverseRemoved {
		universe: UniverseId,
	},
	/// Full (or leading partial) set of values for a universe
	UniverseSnapshot {
		universe: UniverseId,
		values: Vec<i32>,
	},
	ChannelChanged {
		universe: UniverseId,
		channel: u16,
		value: i32,
		source: ChangeSource,
		/// The client whose intent caused the change, if any
		#[serde(default)]
		origin: Option<Uuid>,
	},
	/// Values read from an external DMX input. Negative entries are out of the input's range.
	InputSnapshot {
		universe: UniverseId,
		values: Vec<i32>,
	},
	BlackoutChanged {
		active: bool,
	},
	GroupValueChanged {
		group: GroupId,
		value: i32,
		source: ChangeSource,
		#[serde(default)]
		origin: Option<Uuid>,
	},
	GroupUpserted {
		group: Group,
	},
	GroupRemoved {
		group: GroupId,
	},
	GroupColorChanged {
		group: GroupId,
		color: Hsl,
	},
	SceneRecalled {
		scene: SceneId,
		#[serde(default)]
		transition_ms: u64,
		#[serde(default)]
		universes: Vec<UniverseFrame>,
	},
	ActiveSceneChanged {
		scene: Option<SceneId>,
	},
	ParkChanged {
		address: ChannelAddress,
		value: Option<DmxValue>,
	},
	HighlightChanged {
		active: bool,
		#[serde(default)]
		channels: Vec<ChannelAddress>,
	},
	UniverseMasterChanged {
		universe: UniverseId,
		value: i32,
	},
	GlobalMasterChanged {
		value: i32,
	},
}
impl InboundEvent {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		return serde_json::from_str(text);
	}
}
