mod coalescer;
mod config;
mod groups;
mod requests;
mod runtime;

use tokio::time::Instant;

use crate::{
	config::ConsoleConfig,
	engine::{
		console::ConsoleState,
		groups::{Group, GroupMode, MemberTarget},
		types::{ChannelAddress, DmxValue, GroupId},
	},
};

pub fn address(universe: u16, channel: u16) -> ChannelAddress {
	return ChannelAddress { universe, channel };
}

/// A console with universe 1 provisioned
pub fn console() -> (ConsoleState, Instant) {
	let mut state = ConsoleState::new(&ConsoleConfig::default());
	state.provision_universe(1);
	return (state, Instant::now());
}

/// A group whose channel members sit on universe 1 with the given base values
pub fn channel_group(id: GroupId, mode: GroupMode, members: &[(u16, DmxValue)]) -> Group {
	let mut group = Group::new(id, format!("Group {}", id), mode);
	for (index, (channel, base_value)) in members.iter().enumerate() {
		group.members.push(crate::engine::groups::GroupMember {
			id: index as u32 + 1,
			target: MemberTarget::Channel {
				address: address(1, *channel),
				base_value: *base_value,
				color_role: None,
			},
		});
	}
	return group;
}
