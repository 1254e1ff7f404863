use serde_json::{json, Value};
use uuid::Uuid;

use super::{address, channel_group};
use crate::{
	api_utilities::requests::{ChannelWrite, GroupEdit, OutboundRequest, OverrideRequest},
	engine::groups::{GroupMember, GroupMode, MemberTarget},
	value_utils::color::{ColorRole, Hsl},
};

/// Serializes a request, checks that it decodes back to itself, and returns the JSON
fn wire(request: &OutboundRequest) -> Value {
	let value = serde_json::to_value(request).unwrap();
	let decoded: OutboundRequest = serde_json::from_value(value.clone()).unwrap();
	assert_eq!(&decoded, request, "{} decoded differently", value);
	return value;
}

#[test]
fn every_request_kind_has_a_fixed_shape() {
	let batch = Uuid::new_v4();
	let cases = vec![
		(
			OutboundRequest::WriteChannels {
				batch,
				writes: vec![ChannelWrite {
					address: address(1, 3),
					value: 40,
				}],
			},
			json!({
				"kind": "write_channels",
				"batch": batch.to_string(),
				"writes": [{ "address": { "universe": 1, "channel": 3 }, "value": 40 }],
			}),
		),
		(
			OutboundRequest::TriggerGroup { group: 2, value: 128 },
			json!({ "kind": "trigger_group", "group": 2, "value": 128 }),
		),
		(
			OutboundRequest::EditGroup {
				edit: GroupEdit::SetMode {
					group: 2,
					mode: GroupMode::ColorMixer,
				},
			},
			json!({
				"kind": "edit_group",
				"edit": { "edit": "set_mode", "group": 2, "mode": "color_mixer" },
			}),
		),
		(
			OutboundRequest::SetActiveScene { scene: None },
			json!({ "kind": "set_active_scene", "scene": null }),
		),
		(
			OutboundRequest::SetActiveScene { scene: Some(4) },
			json!({ "kind": "set_active_scene", "scene": 4 }),
		),
		(
			OutboundRequest::SetOverride {
				request: OverrideRequest::Blackout { active: true },
			},
			json!({
				"kind": "set_override",
				"request": { "layer": "blackout", "active": true },
			}),
		),
		(
			OutboundRequest::SetOverride {
				request: OverrideRequest::Park {
					address: address(2, 512),
					value: None,
				},
			},
			json!({
				"kind": "set_override",
				"request": { "layer": "park", "address": { "universe": 2, "channel": 512 }, "value": null },
			}),
		),
		(
			OutboundRequest::SetOverride {
				request: OverrideRequest::Highlight {
					active: true,
					channels: vec![address(1, 1), address(1, 2)],
				},
			},
			json!({
				"kind": "set_override",
				"request": {
					"layer": "highlight",
					"active": true,
					"channels": [{ "universe": 1, "channel": 1 }, { "universe": 1, "channel": 2 }],
				},
			}),
		),
	];

	for (request, expected) in cases {
		assert_eq!(wire(&request), expected);
	}
}

#[test]
fn group_edits_survive_the_wire() {
	let mut group = channel_group(3, GroupMode::Proportional, &[(1, 200), (2, 50)]);
	group.master = 90;
	let edits = vec![
		GroupEdit::Upsert { group },
		GroupEdit::Delete { group: 3 },
		GroupEdit::AddMember {
			group: 3,
			member: GroupMember {
				id: 7,
				target: MemberTarget::UniverseMaster { universe: 2 },
			},
		},
		GroupEdit::AddMember {
			group: 3,
			member: GroupMember {
				id: 8,
				target: MemberTarget::GlobalMaster,
			},
		},
		GroupEdit::RemoveMember { group: 3, member: 7 },
		GroupEdit::RetargetMember {
			group: 3,
			member: 1,
			target: MemberTarget::Channel {
				address: address(4, 10),
				base_value: 255,
				color_role: Some(ColorRole::Amber),
			},
		},
		GroupEdit::SetMemberBase {
			group: 3,
			member: 1,
			base_value: 12,
		},
		GroupEdit::SetMemberRole {
			group: 3,
			member: 1,
			color_role: None,
		},
		GroupEdit::SetMode {
			group: 3,
			mode: GroupMode::Follow,
		},
		GroupEdit::SetColor {
			group: 3,
			color: Hsl::new(210.0, 40.0, 60.0),
		},
	];

	for edit in edits {
		let value = wire(&OutboundRequest::EditGroup { edit });
		assert_eq!(value["kind"], "edit_group");
		assert!(value["edit"]["edit"].is_string(), "edit is untagged: {}", value);
	}
}
