use serde::{Deserialize, Serialize};

use crate::{
	engine::types::{ChannelAddress, DmxValue, GroupId, MemberId, UniverseId},
	value_utils::color::{hsl_to_rgb, rgb_to_hsl, ColorRole, Hsl, Rgb},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a group's master drives its members
pub enum GroupMode {
	/// Members scale their base value by the master
	Proportional,
	/// Members mirror the master exactly
	Follow,
	/// The master is brightness; the group's color decides each member's share
	ColorMixer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// What a member writes to when the group's master moves
pub enum MemberTarget {
	Channel {
		address: ChannelAddress,
		#[serde(default)]
		base_value: DmxValue,
		#[serde(default)]
		color_role: Option<ColorRole>,
	},
	UniverseMaster {
		universe: UniverseId,
	},
	GlobalMaster,
}
impl MemberTarget {
	pub fn channel(&self) -> Option<ChannelAddress> {
		return match self {
			MemberTarget::Channel { address, .. } => Some(*address),
			_ => None,
		};
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
	pub id: MemberId,
	pub target: MemberTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a computed member output lands
pub enum OutputSink {
	Channel(ChannelAddress),
	UniverseMaster(UniverseId),
	GlobalMaster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberOutput {
	pub member: MemberId,
	pub sink: OutputSink,
	pub value: DmxValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Hsl", into = "Hsl")]
/// The color of a color-mixer group. The RGB triple is always derived from the HSL values.
pub struct ColorState {
	hsl: Hsl,
	rgb: Rgb,
}
impl ColorState {
	pub fn new(hsl: Hsl) -> Self {
		let hsl = Hsl::new(hsl.hue, hsl.saturation, hsl.lightness);
		return ColorState {
			hsl,
			rgb: hsl_to_rgb(hsl),
		};
	}

	/// Builds the color closest to an RGB triple
	pub fn from_rgb(rgb: Rgb) -> Self {
		return Self::new(rgb_to_hsl(rgb));
	}

	pub fn hsl(&self) -> Hsl {
		return self.hsl;
	}

	pub fn rgb(&self) -> Rgb {
		return self.rgb;
	}

	pub fn set_hsl(&mut self, hsl: Hsl) {
		*self = Self::new(hsl);
	}

	pub fn set_hue(&mut self, hue: f64) {
		self.set_hsl(Hsl { hue, ..self.hsl });
	}

	pub fn set_saturation(&mut self, saturation: f64) {
		self.set_hsl(Hsl { saturation, ..self.hsl });
	}

	pub fn set_lightness(&mut self, lightness: f64) {
		self.set_hsl(Hsl { lightness, ..self.hsl });
	}
}
impl Default for ColorState {
	/// White, so every role starts at full
	fn default() -> Self {
		return Self::new(Hsl::new(0f64, 0f64, 100f64));
	}
}
impl From<Hsl> for ColorState {
	fn from(hsl: Hsl) -> Self {
		return Self::new(hsl);
	}
}
impl From<ColorState> for Hsl {
	fn from(color: ColorState) -> Self {
		return color.hsl;
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A group and its members.
///
/// `master` is the last value the server confirmed. `local_master` holds an
/// optimistic value from a local drag or trigger until the server catches up.
pub struct Group {
	pub id: GroupId,
	#[serde(default)]
	pub name: String,
	pub mode: GroupMode,
	#[serde(default)]
	pub master: DmxValue,
	#[serde(default)]
	pub members: Vec<GroupMember>,
	#[serde(default)]
	pub color: ColorState,
	#[serde(skip)]
	pub local_master: Option<DmxValue>,
}
impl Group {
	pub fn new(id: GroupId, name: impl Into<String>, mode: GroupMode) -> Self {
		return Group {
			id,
			name: name.into(),
			mode,
			master: 0,
			members: Vec::new(),
			color: ColorState::default(),
			local_master: None,
		};
	}

	pub fn current_master(&self) -> DmxValue {
		return self.local_master.unwrap_or(self.master);
	}

	pub fn member(&self, member: MemberId) -> Option<&GroupMember> {
		return self.members.iter().find(|candidate| candidate.id == member);
	}

	pub fn member_mut(&mut self, member: MemberId) -> Option<&mut GroupMember> {
		return self.members.iter_mut().find(|candidate| candidate.id == member);
	}

	/// Channels targeted by channel members, in member order
	pub fn channels(&self) -> Vec<ChannelAddress> {
		return self
			.members
			.iter()
			.filter_map(|member| member.target.channel())
			.collect();
	}

	/// One past the highest ID in use. Once that would overflow, the lowest free ID is handed out instead.
	pub(super) fn next_member_id(&self) -> MemberId {
		let highest = match self.members.iter().map(|member| member.id).max() {
			Some(highest) => highest,
			None => return 1,
		};
		if let Some(next) = highest.checked_add(1) {
			return next;
		}

		// At most `members.len()` IDs are taken, so one of the first `len + 1` is free
		let mut candidate: MemberId = 1;
		while self.member(candidate).is_some() {
			candidate += 1;
		}
		return candidate;
	}
}
