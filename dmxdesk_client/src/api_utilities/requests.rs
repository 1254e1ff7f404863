use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	engine::{
		coalescer::PendingBatch,
		groups::{Group, GroupMember, GroupMode, MemberTarget},
		types::{ChannelAddress, DmxValue, GroupId, MemberId, SceneId},
	},
	value_utils::color::{ColorRole, Hsl},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelWrite {
	pub address: ChannelAddress,
	pub value: DmxValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
/// Group and member CRUD
pub enum GroupEdit {
	Upsert { group: Group },
	Delete { group: GroupId },
	AddMember { group: GroupId, member: GroupMember },
	RemoveMember { group: GroupId, member: MemberId },
	RetargetMember { group: GroupId, member: MemberId, target: MemberTarget },
	SetMemberBase { group: GroupId, member: MemberId, base_value: DmxValue },
	SetMemberRole { group: GroupId, member: MemberId, color_role: Option<ColorRole> },
	SetMode { group: GroupId, mode: GroupMode },
	SetColor { group: GroupId, color: Hsl },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum OverrideRequest {
	Blackout { active: bool },
	/// `None` unparks
	Park { address: ChannelAddress, value: Option<DmxValue> },
	Highlight { active: bool, channels: Vec<ChannelAddress> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Everything a client asks of the server
pub enum OutboundRequest {
	WriteChannels { batch: Uuid, writes: Vec<ChannelWrite> },
	TriggerGroup { group: GroupId, value: DmxValue },
	EditGroup { edit: GroupEdit },
	SetActiveScene { scene: Option<SceneId> },
	SetOverride { request: OverrideRequest },
}

impl OutboundRequest {
	/// Splits a flushed batch into one channel write plus one trigger per group
	pub fn from_batch(batch: PendingBatch) -> Vec<OutboundRequest> {
		let mut requests = Vec::with_capacity(batch.groups.len() + 1);
		if !batch.channels.is_empty() {
			requests.push(OutboundRequest::WriteChannels {
				batch: batch.id,
				writes: batch
					.channels
					.into_iter()
					.map(|(address, value)| ChannelWrite { address, value })
					.collect(),
			});
		}
		for (group, value) in batch.groups {
			requests.push(OutboundRequest::TriggerGroup { group, value });
		}
		return requests;
	}
}
