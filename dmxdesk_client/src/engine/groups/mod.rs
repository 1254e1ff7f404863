mod types;

pub use types::{ColorState, Group, GroupMember, GroupMode, MemberOutput, MemberTarget, OutputSink};

use rustc_hash::FxHashMap;

use super::{
	types::{ChannelAddress, DmxValue, GroupId, MemberId, UniverseId},
	ConsoleError,
};
use crate::value_utils::{
	color::{role_intensity, ColorRole, Hsl, Rgb},
	scaling::scale_by,
};

/// Computes what each member of a group should output for a master value.
///
/// Universe-master and global-master members always follow the master. Channel
/// members depend on the mode; color-mixer members without a role produce nothing.
pub fn compute_outputs(
	mode: GroupMode,
	members: &[GroupMember],
	color: &ColorState,
	master: DmxValue,
) -> Vec<MemberOutput> {
	let mut outputs = Vec::with_capacity(members.len());
	for member in members {
		let (sink, value) = match member.target {
			MemberTarget::UniverseMaster { universe } => (OutputSink::UniverseMaster(universe), master),
			MemberTarget::GlobalMaster => (OutputSink::GlobalMaster, master),
			MemberTarget::Channel {
				address,
				base_value,
				color_role,
			} => {
				let value = match mode {
					GroupMode::Proportional => scale_by(base_value, master),
					GroupMode::Follow => master,
					GroupMode::ColorMixer => match color_role {
						Some(role) => scale_by(role_intensity(role, color.rgb()), master),
						None => continue,
					},
				};
				(OutputSink::Channel(address), value)
			}
		};
		outputs.push(MemberOutput {
			member: member.id,
			sink,
			value,
		});
	}
	return outputs;
}

#[derive(Default)]
/// Owns every group known to this client
pub struct GroupEngine {
	groups: FxHashMap<GroupId, Group>,
}

impl GroupEngine {
	pub fn new() -> Self {
		return Self::default();
	}

	pub fn get(&self, group: GroupId) -> Result<&Group, ConsoleError> {
		return self.groups.get(&group).ok_or(ConsoleError::UnknownGroup(group));
	}

	pub fn get_mut(&mut self, group: GroupId) -> Result<&mut Group, ConsoleError> {
		return self.groups.get_mut(&group).ok_or(ConsoleError::UnknownGroup(group));
	}

	pub fn contains(&self, group: GroupId) -> bool {
		return self.groups.contains_key(&group);
	}

	/// Group IDs in ascending order
	pub fn ids(&self) -> Vec<GroupId> {
		let mut ids: Vec<GroupId> = self.groups.keys().copied().collect();
		ids.sort();
		return ids;
	}

	/// Groups with a channel member on `address`
	pub fn groups_containing(&self, address: ChannelAddress) -> Vec<GroupId> {
		let mut ids: Vec<GroupId> = self
			.groups
			.values()
			.filter(|group| group.members.iter().any(|member| member.target.channel() == Some(address)))
			.map(|group| group.id)
			.collect();
		ids.sort();
		return ids;
	}

	/// Inserts or replaces a group.
	///
	/// With `retain_local`, an optimistic master already held for the group survives the replacement.
	pub fn upsert(&mut self, mut group: Group, retain_local: bool) {
		if retain_local {
			if let Some(existing) = self.groups.get(&group.id) {
				group.local_master = existing.local_master;
			}
		}
		self.groups.insert(group.id, group);
	}

	pub fn remove(&mut self, group: GroupId) -> Option<Group> {
		return self.groups.remove(&group);
	}

	/// Member outputs at the group's current master
	pub fn outputs(&self, group: GroupId) -> Result<Vec<MemberOutput>, ConsoleError> {
		let group = self.get(group)?;
		return Ok(compute_outputs(
			group.mode,
			&group.members,
			&group.color,
			group.current_master(),
		));
	}

	// ┌────────────────────────┐
	// │    Member Editing      │
	// └────────────────────────┘

	/// Appends a member, returning its new ID
	pub fn add_member(&mut self, group: GroupId, target: MemberTarget) -> Result<MemberId, ConsoleError> {
		let group = self.get_mut(group)?;
		let id = group.next_member_id();
		group.members.push(GroupMember { id, target });
		return Ok(id);
	}

	pub fn remove_member(&mut self, group: GroupId, member: MemberId) -> Result<GroupMember, ConsoleError> {
		let group_ref = self.get_mut(group)?;
		let position = group_ref
			.members
			.iter()
			.position(|candidate| candidate.id == member)
			.ok_or(ConsoleError::UnknownMember { group, member })?;
		return Ok(group_ref.members.remove(position));
	}

	/// Points an existing member somewhere else, keeping its ID and position
	pub fn retarget_member(
		&mut self,
		group: GroupId,
		member: MemberId,
		target: MemberTarget,
	) -> Result<(), ConsoleError> {
		self.member_mut(group, member)?.target = target;
		return Ok(());
	}

	pub fn set_member_base(&mut self, group: GroupId, member: MemberId, value: DmxValue) -> Result<(), ConsoleError> {
		match self.member_mut(group, member)?.target {
			MemberTarget::Channel {
				ref mut base_value, ..
			} => {
				*base_value = value;
				return Ok(());
			}
			_ => return Err(ConsoleError::NotAChannelMember { group, member }),
		}
	}

	pub fn set_member_role(
		&mut self,
		group: GroupId,
		member: MemberId,
		role: Option<ColorRole>,
	) -> Result<(), ConsoleError> {
		match self.member_mut(group, member)?.target {
			MemberTarget::Channel {
				ref mut color_role, ..
			} => {
				*color_role = role;
				return Ok(());
			}
			_ => return Err(ConsoleError::NotAChannelMember { group, member }),
		}
	}

	fn member_mut(&mut self, group: GroupId, member: MemberId) -> Result<&mut GroupMember, ConsoleError> {
		return self
			.get_mut(group)?
			.member_mut(member)
			.ok_or(ConsoleError::UnknownMember { group, member });
	}

	// ┌────────────────────────┐
	// │    Mode and Color      │
	// └────────────────────────┘

	/// Changes the mode. Base values and roles are left exactly as they were.
	pub fn set_mode(&mut self, group: GroupId, mode: GroupMode) -> Result<(), ConsoleError> {
		self.get_mut(group)?.mode = mode;
		return Ok(());
	}

	pub fn set_color_hsl(&mut self, group: GroupId, hsl: Hsl) -> Result<&ColorState, ConsoleError> {
		let group = self.get_mut(group)?;
		group.color.set_hsl(hsl);
		return Ok(&group.color);
	}

	pub fn set_color_rgb(&mut self, group: GroupId, rgb: Rgb) -> Result<&ColorState, ConsoleError> {
		let group = self.get_mut(group)?;
		group.color = ColorState::from_rgb(rgb);
		return Ok(&group.color);
	}

	/// Forgets the members of every group that point into a removed universe
	pub fn forget_universe(&mut self, universe: UniverseId) {
		for group in self.groups.values_mut() {
			group.members.retain(|member| match member.target {
				MemberTarget::Channel { address, .. } => address.universe != universe,
				MemberTarget::UniverseMaster { universe: target } => target != universe,
				MemberTarget::GlobalMaster => true,
			});
		}
	}
}
