use super::{address, channel_group};
use crate::{
	engine::{
		groups::{compute_outputs, ColorState, GroupEngine, GroupMember, GroupMode, MemberTarget, OutputSink},
		ConsoleError,
	},
	value_utils::color::{ColorRole, Hsl, Rgb},
};

fn color_member(id: u32, channel: u16, role: Option<ColorRole>) -> GroupMember {
	return GroupMember {
		id,
		target: MemberTarget::Channel {
			address: address(1, channel),
			base_value: 0,
			color_role: role,
		},
	};
}

#[test]
fn proportional_members_scale_their_base() {
	let group = channel_group(1, GroupMode::Proportional, &[(1, 200), (2, 255)]);
	let outputs = compute_outputs(group.mode, &group.members, &group.color, 128);
	assert_eq!(outputs[0].value, 100);
	assert_eq!(outputs[1].value, 128);
	assert_eq!(outputs[0].sink, OutputSink::Channel(address(1, 1)));
}

#[test]
fn follow_members_mirror_the_master() {
	let group = channel_group(1, GroupMode::Follow, &[(1, 200), (2, 10)]);
	let outputs = compute_outputs(group.mode, &group.members, &group.color, 77);
	assert!(outputs.iter().all(|output| output.value == 77));
}

#[test]
fn proportional_outputs_for_every_base_and_master() {
	let members: Vec<(u16, u8)> = (0..=255u8).map(|base| (base as u16 + 1, base)).collect();
	let group = channel_group(1, GroupMode::Proportional, &members);
	for master in 0..=255u8 {
		let outputs = compute_outputs(group.mode, &group.members, &group.color, master);
		assert_eq!(outputs.len(), 256);
		for (base, output) in outputs.iter().enumerate() {
			let expected = (base as f64 * master as f64 / 255.0 + 0.5).floor() as u8;
			assert_eq!(output.value, expected, "base {} at master {}", base, master);
		}
	}
}

#[test]
fn follow_outputs_equal_every_master() {
	let group = channel_group(1, GroupMode::Follow, &[(1, 0), (2, 128), (3, 255)]);
	for master in 0..=255u8 {
		let outputs = compute_outputs(group.mode, &group.members, &group.color, master);
		assert_eq!(outputs.len(), 3);
		assert!(
			outputs.iter().all(|output| output.value == master),
			"follow outputs {:?} at master {}",
			outputs,
			master
		);
	}
}

#[test]
fn master_members_always_follow() {
	let members = vec![
		GroupMember {
			id: 1,
			target: MemberTarget::UniverseMaster { universe: 3 },
		},
		GroupMember {
			id: 2,
			target: MemberTarget::GlobalMaster,
		},
	];
	let outputs = compute_outputs(GroupMode::Proportional, &members, &ColorState::default(), 64);
	assert_eq!(outputs[0].sink, OutputSink::UniverseMaster(3));
	assert_eq!(outputs[0].value, 64);
	assert_eq!(outputs[1].sink, OutputSink::GlobalMaster);
	assert_eq!(outputs[1].value, 64);
}

#[test]
fn color_mixer_splits_by_role() {
	let members = vec![
		color_member(1, 1, Some(ColorRole::Red)),
		color_member(2, 2, Some(ColorRole::Green)),
		color_member(3, 3, None),
	];
	let red = ColorState::new(Hsl::new(0.0, 100.0, 50.0));

	let outputs = compute_outputs(GroupMode::ColorMixer, &members, &red, 255);
	assert_eq!(outputs.len(), 2, "members without a role produce nothing");
	assert_eq!(outputs[0].value, 255);
	assert_eq!(outputs[1].value, 0);

	let outputs = compute_outputs(GroupMode::ColorMixer, &members, &red, 128);
	assert_eq!(outputs[0].value, 128);
}

#[test]
fn member_ids_are_unique() {
	let mut engine = GroupEngine::new();
	engine.upsert(channel_group(4, GroupMode::Follow, &[]), false);
	let first = engine.add_member(4, MemberTarget::GlobalMaster).unwrap();
	let second = engine.add_member(4, MemberTarget::UniverseMaster { universe: 1 }).unwrap();
	assert_ne!(first, second);
	engine.remove_member(4, first).unwrap();
	let third = engine.add_member(4, MemberTarget::GlobalMaster).unwrap();
	assert_ne!(third, second);
}

#[test]
fn member_ids_survive_the_highest_id() {
	let mut engine = GroupEngine::new();
	let mut group = channel_group(4, GroupMode::Follow, &[(1, 0), (2, 0)]);
	group.members[1].id = u32::MAX;
	engine.upsert(group, false);

	let first = engine.add_member(4, MemberTarget::GlobalMaster).unwrap();
	assert_eq!(first, 2);
	let second = engine.add_member(4, MemberTarget::GlobalMaster).unwrap();
	assert_eq!(second, 3);
}

#[test]
fn editing_errors() {
	let mut engine = GroupEngine::new();
	assert_eq!(engine.get(9).unwrap_err(), ConsoleError::UnknownGroup(9));

	engine.upsert(channel_group(1, GroupMode::Proportional, &[(1, 100)]), false);
	assert_eq!(
		engine.remove_member(1, 42).unwrap_err(),
		ConsoleError::UnknownMember { group: 1, member: 42 }
	);

	let master = engine.add_member(1, MemberTarget::GlobalMaster).unwrap();
	assert_eq!(
		engine.set_member_base(1, master, 10).unwrap_err(),
		ConsoleError::NotAChannelMember { group: 1, member: master }
	);
	assert_eq!(
		engine.set_member_role(1, master, Some(ColorRole::Red)).unwrap_err(),
		ConsoleError::NotAChannelMember { group: 1, member: master }
	);
}

#[test]
fn mode_change_keeps_member_settings() {
	let mut engine = GroupEngine::new();
	engine.upsert(channel_group(1, GroupMode::Proportional, &[(1, 150)]), false);
	engine.set_member_role(1, 1, Some(ColorRole::Blue)).unwrap();
	engine.set_mode(1, GroupMode::ColorMixer).unwrap();
	engine.set_mode(1, GroupMode::Proportional).unwrap();
	let member = engine.get(1).unwrap().member(1).unwrap();
	assert_eq!(
		member.target,
		MemberTarget::Channel {
			address: address(1, 1),
			base_value: 150,
			color_role: Some(ColorRole::Blue),
		}
	);
}

#[test]
fn rgb_color_is_stored_as_hsl() {
	let mut engine = GroupEngine::new();
	engine.upsert(channel_group(1, GroupMode::ColorMixer, &[]), false);
	let color = engine.set_color_rgb(1, Rgb::new(0, 0, 255)).unwrap();
	assert_eq!(color.hsl(), Hsl::new(240.0, 100.0, 50.0));
	assert_eq!(color.rgb(), Rgb::new(0, 0, 255));
}

#[test]
fn upsert_can_keep_the_optimistic_master() {
	let mut engine = GroupEngine::new();
	engine.upsert(channel_group(1, GroupMode::Follow, &[]), false);
	engine.get_mut(1).unwrap().local_master = Some(90);

	engine.upsert(channel_group(1, GroupMode::Follow, &[]), true);
	assert_eq!(engine.get(1).unwrap().current_master(), 90);

	engine.upsert(channel_group(1, GroupMode::Follow, &[]), false);
	assert_eq!(engine.get(1).unwrap().current_master(), 0);
}

#[test]
fn forgetting_a_universe_prunes_members() {
	let mut engine = GroupEngine::new();
	let mut group = channel_group(1, GroupMode::Follow, &[(1, 0)]);
	group.members.push(GroupMember {
		id: 2,
		target: MemberTarget::UniverseMaster { universe: 1 },
	});
	group.members.push(GroupMember {
		id: 3,
		target: MemberTarget::GlobalMaster,
	});
	engine.upsert(group, false);
	engine.forget_universe(1);
	let remaining: Vec<u32> = engine.get(1).unwrap().members.iter().map(|member| member.id).collect();
	assert_eq!(remaining, vec![3]);
}

#[test]
fn groups_containing_a_channel() {
	let mut engine = GroupEngine::new();
	engine.upsert(channel_group(1, GroupMode::Follow, &[(5, 0)]), false);
	engine.upsert(channel_group(2, GroupMode::Follow, &[(5, 0), (6, 0)]), false);
	engine.upsert(channel_group(3, GroupMode::Follow, &[(6, 0)]), false);
	let mut containing = engine.groups_containing(address(1, 5));
	containing.sort();
	assert_eq!(containing, vec![1, 2]);
}
