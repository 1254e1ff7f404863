pub mod coalescer;
pub mod console;
pub mod drags;
pub mod groups;
pub mod indicators;
pub mod long_press;
pub mod overrides;
pub mod reconciler;
pub mod runtime;
pub mod scene_grace;
pub mod types;
pub mod values;

use thiserror::Error;

use types::{ChannelAddress, ControlKey, GroupId, MemberId, UniverseId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// An error returned by a local operation. Remote events never produce one.
pub enum ConsoleError {
	#[error("Universe {0} has not been provisioned")]
	UnknownUniverse(UniverseId),
	#[error("Channel {0} is outside of 1-512")]
	ChannelOutOfRange(u16),
	#[error("Group {0} does not exist")]
	UnknownGroup(GroupId),
	#[error("Group {group} has no member {member}")]
	UnknownMember { group: GroupId, member: MemberId },
	#[error("Member {member} of group {group} does not target a channel")]
	NotAChannelMember { group: GroupId, member: MemberId },
	#[error("Channel {0} is parked")]
	ChannelParked(ChannelAddress),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Something the UI layer needs to react to
pub enum ConsoleNotice {
	/// The server overrode a control that was being dragged. The UI should release it.
	DragCancelled(ControlKey),
	/// A color fader was held long enough to open its picker
	OpenColorPicker(GroupId),
	/// A local edit cleared the active scene marker
	ActiveSceneCleared,
}
