//! The client-side console model.
//!
//! `ConsoleState` owns every piece of local state and is driven entirely by
//! explicit timestamps. Local gestures mutate it synchronously and queue
//! outbound requests; remote events are merged in by the reconciler. Nothing
//! here performs I/O: the runtime drains [`ConsoleState::take_outbox`] and
//! [`ConsoleState::take_notices`] after every update and calls
//! [`ConsoleState::poll`] whenever [`ConsoleState::next_deadline`] passes.

use rustc_hash::FxHashSet;
use tokio::time::Instant;
use uuid::Uuid;

use super::{
	coalescer::WriteCoalescer,
	drags::ActiveDrags,
	groups::{Group, GroupEngine, GroupMember, GroupMode, MemberTarget, OutputSink},
	indicators::{IndicatorKind, IndicatorTimer},
	long_press::{LongPressGate, PressRelease, PressTarget},
	overrides::{self, OverrideLayers},
	scene_grace::SceneGracePeriod,
	types::{ChannelAddress, ControlKey, DmxValue, GroupId, MemberId, SceneId, UniverseId, CHANNELS_PER_UNIVERSE},
	values::ValueStore,
	ConsoleError, ConsoleNotice,
};
use crate::{
	api_utilities::requests::{GroupEdit, OutboundRequest, OverrideRequest},
	config::ConsoleConfig,
	value_utils::{
		color::{ColorRole, Hsl, Rgb},
		scaling::nudge,
	},
};

/// Sinks that must keep their optimistic value through an authoritative update
#[derive(Debug, Default)]
pub(super) struct HeldSinks {
	pub channels: FxHashSet<ChannelAddress>,
	pub universe_masters: FxHashSet<UniverseId>,
	pub global_master: bool,
}

pub struct ConsoleState {
	pub(super) client_id: Uuid,
	pub(super) values: ValueStore,
	pub(super) overrides: OverrideLayers,
	pub(super) groups: GroupEngine,
	pub(super) coalescer: WriteCoalescer,
	pub(super) drags: ActiveDrags,
	pub(super) indicators: IndicatorTimer,
	pub(super) presses: LongPressGate<PressTarget>,
	pub(super) scene_grace: SceneGracePeriod,
	pub(super) active_scene: Option<SceneId>,
	pub(super) outbox: Vec<OutboundRequest>,
	pub(super) notices: Vec<ConsoleNotice>,
}

impl ConsoleState {
	pub fn new(config: &ConsoleConfig) -> Self {
		return Self::with_client_id(config, Uuid::new_v4());
	}

	/// Creates the state with a fixed client ID, used to recognize echoes of our own writes
	pub fn with_client_id(config: &ConsoleConfig, client_id: Uuid) -> Self {
		return ConsoleState {
			client_id,
			values: ValueStore::new(),
			overrides: OverrideLayers::new(),
			groups: GroupEngine::new(),
			coalescer: WriteCoalescer::new(config.debounce_interval()),
			drags: ActiveDrags::default(),
			indicators: IndicatorTimer::new(config.indicator_timeout()),
			presses: LongPressGate::new(config.long_press_threshold()),
			scene_grace: SceneGracePeriod::new(),
			active_scene: None,
			outbox: Vec::new(),
			notices: Vec::new(),
		};
	}

	pub fn client_id(&self) -> Uuid {
		return self.client_id;
	}

	pub fn values(&self) -> &ValueStore {
		return &self.values;
	}

	pub fn overrides(&self) -> &OverrideLayers {
		return &self.overrides;
	}

	pub fn groups(&self) -> &GroupEngine {
		return &self.groups;
	}

	pub fn active_scene(&self) -> Option<SceneId> {
		return self.active_scene;
	}

	// ┌───────────────────┐
	// │    Universes      │
	// └───────────────────┘

	/// Makes a universe known locally. Normally driven by the server.
	pub fn provision_universe(&mut self, universe: UniverseId) -> bool {
		return self.values.provision_universe(universe);
	}

	/// Forgets a universe along with everything attached to it
	pub fn remove_universe(&mut self, universe: UniverseId) -> bool {
		let removed = self.values.remove_universe(universe);
		self.overrides.forget_universe(universe);
		self.groups.forget_universe(universe);
		let in_universe = |key: &ControlKey| matches!(key, ControlKey::Channel(address) if address.universe == universe);
		self.coalescer.discard_where(in_universe);
		self.drags.retain(|key| !in_universe(key));
		return removed;
	}

	// ┌───────────────────┐
	// │    Display        │
	// └───────────────────┘

	/// The value a fader for this channel should show, overrides excluded
	pub fn raw_value(&self, address: ChannelAddress) -> Result<DmxValue, ConsoleError> {
		if !address.is_valid() {
			return Err(ConsoleError::ChannelOutOfRange(address.channel));
		}
		return self
			.values
			.get(address)
			.ok_or(ConsoleError::UnknownUniverse(address.universe));
	}

	/// The value the channel is producing once blackout, park and highlight are applied
	pub fn displayed_value(&self, address: ChannelAddress) -> Result<DmxValue, ConsoleError> {
		let raw = self.raw_value(address)?;
		return Ok(overrides::resolve(raw, address, &self.overrides));
	}

	pub fn displayed_universe(&self, universe: UniverseId) -> Result<[DmxValue; CHANNELS_PER_UNIVERSE], ConsoleError> {
		let raw = self
			.values
			.universe(universe)
			.ok_or(ConsoleError::UnknownUniverse(universe))?;
		return Ok(overrides::resolve_universe(universe, &raw, &self.overrides));
	}

	pub fn group_master(&self, group: GroupId) -> Result<DmxValue, ConsoleError> {
		return Ok(self.groups.get(group)?.current_master());
	}

	pub fn is_dragging(&self, key: ControlKey) -> bool {
		return self.drags.is_dragging(&key);
	}

	pub fn has_pending_write(&self, key: ControlKey) -> bool {
		return self.coalescer.is_pending(&key);
	}

	pub fn indicator_active(&self, key: ControlKey, kind: IndicatorKind, now: Instant) -> bool {
		return self.indicators.is_active(key, kind, now);
	}

	pub fn active_indicators(&self, key: ControlKey, now: Instant) -> Vec<IndicatorKind> {
		return self.indicators.active_kinds(key, now);
	}

	// ┌───────────────────────┐
	// │    Channel Writes     │
	// └───────────────────────┘

	pub fn set_channel(&mut self, address: ChannelAddress, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		return self.stage_channel(address, value, now);
	}

	/// Moves a channel by `delta` steps, clamped to 0-255. Returns the new value.
	pub fn nudge_channel(&mut self, address: ChannelAddress, delta: i16, now: Instant) -> Result<DmxValue, ConsoleError> {
		let value = nudge(self.raw_value(address)?, delta);
		self.stage_channel(address, value, now)?;
		return Ok(value);
	}

	/// Writes one value to many channels. Parked channels are skipped.
	///
	/// Every address is validated before anything is staged. Returns the number of channels written.
	pub fn set_channels(&mut self, addresses: &[ChannelAddress], value: DmxValue, now: Instant) -> Result<usize, ConsoleError> {
		for address in addresses {
			self.raw_value(*address)?;
		}
		let mut written = 0;
		for address in addresses {
			if self.overrides.is_parked(*address) {
				continue;
			}
			self.stage_channel(*address, value, now)?;
			written += 1;
		}
		return Ok(written);
	}

	/// Marks a control as held under a pointer
	pub fn begin_drag(&mut self, key: ControlKey) -> Result<(), ConsoleError> {
		match key {
			ControlKey::Channel(address) => {
				self.raw_value(address)?;
			}
			ControlKey::Group(group) => {
				self.groups.get(group)?;
			}
		}
		self.drags.begin(key);
		return Ok(());
	}

	pub fn drag_channel(&mut self, address: ChannelAddress, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		self.stage_channel(address, value, now)?;
		self.drags.begin(ControlKey::Channel(address));
		return Ok(());
	}

	pub fn drag_group(&mut self, group: GroupId, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		self.stage_group(group, value, now)?;
		self.drags.begin(ControlKey::Group(group));
		return Ok(());
	}

	/// Releases a control. Any staged value still flushes on schedule.
	pub fn end_drag(&mut self, key: ControlKey) -> bool {
		return self.drags.end(&key);
	}

	/// Single-shot group write, such as a button or keyboard trigger
	pub fn trigger_group(&mut self, group: GroupId, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		return self.stage_group(group, value, now);
	}

	fn stage_channel(&mut self, address: ChannelAddress, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		if self.overrides.is_parked(address) {
			return Err(ConsoleError::ChannelParked(address));
		}
		self.values.set_local(address, value)?;
		let key = ControlKey::Channel(address);
		self.coalescer.stage(key, value, now);
		self.indicators.pulse(key, IndicatorKind::Local, now);
		self.note_manual_edit(now);
		return Ok(());
	}

	fn stage_group(&mut self, group: GroupId, value: DmxValue, now: Instant) -> Result<(), ConsoleError> {
		self.groups.get_mut(group)?.local_master = Some(value);
		self.write_group_outputs(group, now)?;
		let key = ControlKey::Group(group);
		self.coalescer.stage(key, value, now);
		self.indicators.pulse(key, IndicatorKind::Local, now);
		self.note_manual_edit(now);
		return Ok(());
	}

	/// Writes a group's member outputs into the optimistic tier so members move with the fader
	fn write_group_outputs(&mut self, group: GroupId, now: Instant) -> Result<(), ConsoleError> {
		for output in self.groups.outputs(group)? {
			match output.sink {
				OutputSink::Channel(address) => {
					if self.overrides.is_parked(address) {
						continue;
					}
					if let Err(error) = self.values.set_local(address, output.value) {
						tracing::debug!(%address, %error, "Skipping group output");
						continue;
					}
					self.indicators.pulse(ControlKey::Channel(address), IndicatorKind::Group, now);
				}
				OutputSink::UniverseMaster(universe) => match self.values.universe_master_mut(universe) {
					Ok(master) => master.local = Some(output.value),
					Err(error) => tracing::debug!(universe, %error, "Skipping group output"),
				},
				OutputSink::GlobalMaster => {
					self.values.global_master_mut().local = Some(output.value);
				}
			}
		}
		return Ok(());
	}

	/// Drops optimistic values a group wrote into its members.
	///
	/// Sinks that are still held, whether directly or through another group, keep theirs.
	/// Call after the group's own interaction has ended.
	pub(super) fn drop_group_overlay(&mut self, group: GroupId) {
		let outputs = match self.groups.outputs(group) {
			Ok(outputs) => outputs,
			Err(_) => return,
		};
		let held = self.held_sinks();
		for output in outputs {
			match output.sink {
				OutputSink::Channel(address) => {
					if !held.channels.contains(&address) {
						self.values.drop_local(address);
					}
				}
				OutputSink::UniverseMaster(universe) => {
					if held.universe_masters.contains(&universe) {
						continue;
					}
					if let Ok(master) = self.values.universe_master_mut(universe) {
						master.local = None;
					}
				}
				OutputSink::GlobalMaster => {
					if !held.global_master {
						self.values.global_master_mut().local = None;
					}
				}
			}
		}
	}

	/// A local edit outside a scene's transition means the stage no longer matches that scene
	fn note_manual_edit(&mut self, now: Instant) {
		if self.active_scene.is_none() || self.scene_grace.is_active(now) {
			return;
		}
		tracing::debug!(scene = ?self.active_scene, "Local edit cleared the active scene");
		self.active_scene = None;
		self.outbox.push(OutboundRequest::SetActiveScene { scene: None });
		self.notices.push(ConsoleNotice::ActiveSceneCleared);
	}

	// ┌───────────────────────┐
	// │    Held Controls      │
	// └───────────────────────┘

	/// A control is held while it is dragged or has a write waiting to flush
	pub(super) fn is_held(&self, key: &ControlKey) -> bool {
		return self.drags.is_dragging(key) || self.coalescer.is_pending(key);
	}

	/// Every sink whose optimistic value is still owned by a local gesture
	pub(super) fn held_sinks(&self) -> HeldSinks {
		let mut held = HeldSinks::default();
		let keys = self.drags.keys().chain(self.coalescer.pending_keys());
		for key in keys {
			match key {
				ControlKey::Channel(address) => {
					held.channels.insert(*address);
				}
				ControlKey::Group(group) => {
					let group = match self.groups.get(*group) {
						Ok(group) => group,
						Err(_) => continue,
					};
					for member in group.members.iter() {
						match member.target {
							MemberTarget::Channel { address, .. } => {
								held.channels.insert(address);
							}
							MemberTarget::UniverseMaster { universe } => {
								held.universe_masters.insert(universe);
							}
							MemberTarget::GlobalMaster => held.global_master = true,
						}
					}
				}
			}
		}
		return held;
	}

	/// Ends any local interaction with `key` because the server overrode it
	pub(super) fn cancel_interaction(&mut self, key: ControlKey) {
		self.coalescer.discard(&key);
		if self.drags.end(&key) {
			tracing::info!(?key, "Drag cancelled by the server");
			self.notices.push(ConsoleNotice::DragCancelled(key));
		}
	}

	/// The server refused a group trigger: return the group and its members to their confirmed values
	pub fn reject_group_trigger(&mut self, group: GroupId) {
		let key = ControlKey::Group(group);
		self.cancel_interaction(key);
		self.drop_group_overlay(group);
		if let Ok(group) = self.groups.get_mut(group) {
			group.local_master = None;
		}
	}

	// ┌───────────────────┐
	// │    Overrides      │
	// └───────────────────┘

	/// Asks the server to toggle blackout. Applied locally right away.
	pub fn request_blackout(&mut self, active: bool) {
		self.overrides.blackout = active;
		self.outbox.push(OutboundRequest::SetOverride {
			request: OverrideRequest::Blackout { active },
		});
	}

	/// Locks a channel at its current raw value. Returns the parked value.
	pub fn park_channel(&mut self, address: ChannelAddress) -> Result<DmxValue, ConsoleError> {
		let value = self.raw_value(address)?;
		self.overrides.park(address, value);
		self.outbox.push(OutboundRequest::SetOverride {
			request: OverrideRequest::Park {
				address,
				value: Some(value),
			},
		});
		return Ok(value);
	}

	pub fn unpark_channel(&mut self, address: ChannelAddress) -> bool {
		if !self.overrides.unpark(address) {
			return false;
		}
		self.outbox.push(OutboundRequest::SetOverride {
			request: OverrideRequest::Park { address, value: None },
		});
		return true;
	}

	/// Returns whether the channel is parked afterwards
	pub fn toggle_park(&mut self, address: ChannelAddress) -> Result<bool, ConsoleError> {
		if self.unpark_channel(address) {
			return Ok(false);
		}
		self.park_channel(address)?;
		return Ok(true);
	}

	/// Parks every channel member, or unparks them all when every one is already parked.
	/// Returns whether the group's channels are parked afterwards.
	pub fn toggle_group_park(&mut self, group: GroupId) -> Result<bool, ConsoleError> {
		let channels = self.groups.get(group)?.channels();
		if !channels.is_empty() && channels.iter().all(|address| self.overrides.is_parked(*address)) {
			for address in channels {
				self.unpark_channel(address);
			}
			return Ok(false);
		}
		for address in channels {
			if self.overrides.is_parked(address) {
				continue;
			}
			if let Err(error) = self.park_channel(address) {
				tracing::debug!(%address, %error, "Could not park group member");
			}
		}
		return Ok(true);
	}

	/// Returns whether the channel is highlighted afterwards
	pub fn toggle_highlight(&mut self, address: ChannelAddress) -> Result<bool, ConsoleError> {
		self.raw_value(address)?;
		let highlighted = self.overrides.highlight.toggle(address);
		self.push_highlight();
		return Ok(highlighted);
	}

	/// Highlights every channel member, or removes them all when every one is already highlighted
	pub fn toggle_group_highlight(&mut self, group: GroupId) -> Result<bool, ConsoleError> {
		let channels = self.groups.get(group)?.channels();
		let highlighted = !channels.iter().all(|address| self.overrides.highlight.contains(*address));
		self.overrides.highlight.set_many(&channels, highlighted);
		self.push_highlight();
		return Ok(highlighted);
	}

	pub fn clear_highlight(&mut self) {
		self.overrides.highlight.clear();
		self.push_highlight();
	}

	fn push_highlight(&mut self) {
		self.outbox.push(OutboundRequest::SetOverride {
			request: OverrideRequest::Highlight {
				active: self.overrides.highlight.active,
				channels: self.overrides.highlight.channels(),
			},
		});
	}

	// ┌───────────────────┐
	// │    Presses        │
	// └───────────────────┘

	pub fn press_start(&mut self, target: PressTarget, now: Instant) {
		self.presses.press_start(target, now);
	}

	pub fn press_end(&mut self, target: PressTarget, now: Instant) {
		match self.presses.press_end(&target, now) {
			PressRelease::ShortClick => self.on_short_click(target),
			PressRelease::LongPress => self.on_long_press(target),
			PressRelease::Nothing => {}
		}
	}

	/// Pointer movement on a pressed control. Returns whether it turned the press into a drag.
	pub fn press_moved(&mut self, target: PressTarget, now: Instant) -> bool {
		return self.presses.press_moved(&target, now);
	}

	pub fn press_cancel(&mut self, target: PressTarget) {
		self.presses.press_cancel(&target);
	}

	/// A short click only ever removes an override
	fn on_short_click(&mut self, target: PressTarget) {
		match target {
			PressTarget::ChannelPark(address) => {
				self.unpark_channel(address);
			}
			PressTarget::ChannelHighlight(address) => {
				if self.overrides.highlight.remove(address) {
					self.push_highlight();
				}
			}
			PressTarget::GroupPark(group) => {
				let channels = match self.groups.get(group) {
					Ok(group) => group.channels(),
					Err(_) => return,
				};
				for address in channels {
					self.unpark_channel(address);
				}
			}
			PressTarget::GroupHighlight(group) => {
				let channels = match self.groups.get(group) {
					Ok(group) => group.channels(),
					Err(_) => return,
				};
				if channels.iter().any(|address| self.overrides.highlight.contains(*address)) {
					self.overrides.highlight.set_many(&channels, false);
					self.push_highlight();
				}
			}
			PressTarget::ColorFader(_) => {}
		}
	}

	fn on_long_press(&mut self, target: PressTarget) {
		let result = match target {
			PressTarget::ChannelPark(address) => self.toggle_park(address).map(|_| ()),
			PressTarget::ChannelHighlight(address) => self.toggle_highlight(address).map(|_| ()),
			PressTarget::GroupPark(group) => self.toggle_group_park(group).map(|_| ()),
			PressTarget::GroupHighlight(group) => self.toggle_group_highlight(group).map(|_| ()),
			PressTarget::ColorFader(group) => {
				self.notices.push(ConsoleNotice::OpenColorPicker(group));
				Ok(())
			}
		};
		if let Err(error) = result {
			tracing::debug!(?target, %error, "Long press had no effect");
		}
	}

	// ┌───────────────────┐
	// │    Groups         │
	// └───────────────────┘

	pub fn upsert_group(&mut self, group: Group) {
		self.groups.upsert(group.clone(), true);
		self.push_edit(GroupEdit::Upsert { group });
	}

	pub fn delete_group(&mut self, group: GroupId) -> Result<Group, ConsoleError> {
		self.groups.get(group)?;
		let key = ControlKey::Group(group);
		self.coalescer.discard(&key);
		self.drags.end(&key);
		self.drop_group_overlay(group);
		let removed = self.groups.remove(group).ok_or(ConsoleError::UnknownGroup(group))?;
		self.push_edit(GroupEdit::Delete { group });
		return Ok(removed);
	}

	pub fn add_member(&mut self, group: GroupId, target: MemberTarget) -> Result<MemberId, ConsoleError> {
		let id = self.groups.add_member(group, target.clone())?;
		self.push_edit(GroupEdit::AddMember {
			group,
			member: GroupMember { id, target },
		});
		return Ok(id);
	}

	pub fn remove_member(&mut self, group: GroupId, member: MemberId) -> Result<GroupMember, ConsoleError> {
		let removed = self.groups.remove_member(group, member)?;
		self.push_edit(GroupEdit::RemoveMember { group, member });
		return Ok(removed);
	}

	pub fn retarget_member(&mut self, group: GroupId, member: MemberId, target: MemberTarget) -> Result<(), ConsoleError> {
		self.groups.retarget_member(group, member, target.clone())?;
		self.push_edit(GroupEdit::RetargetMember { group, member, target });
		return Ok(());
	}

	pub fn set_member_base(&mut self, group: GroupId, member: MemberId, base_value: DmxValue) -> Result<(), ConsoleError> {
		self.groups.set_member_base(group, member, base_value)?;
		self.push_edit(GroupEdit::SetMemberBase {
			group,
			member,
			base_value,
		});
		return Ok(());
	}

	pub fn set_member_role(
		&mut self,
		group: GroupId,
		member: MemberId,
		color_role: Option<ColorRole>,
	) -> Result<(), ConsoleError> {
		self.groups.set_member_role(group, member, color_role)?;
		self.push_edit(GroupEdit::SetMemberRole {
			group,
			member,
			color_role,
		});
		return Ok(());
	}

	pub fn set_group_mode(&mut self, group: GroupId, mode: GroupMode) -> Result<(), ConsoleError> {
		self.groups.set_mode(group, mode)?;
		self.push_edit(GroupEdit::SetMode { group, mode });
		return Ok(());
	}

	/// Recolors a color-mixer group. Members follow immediately at the current master.
	pub fn set_group_color_hsl(&mut self, group: GroupId, color: Hsl, now: Instant) -> Result<Hsl, ConsoleError> {
		let color = self.groups.set_color_hsl(group, color)?.hsl();
		self.after_color_change(group, color, now)?;
		return Ok(color);
	}

	/// Recolors a group from an RGB triple. The stored color is the closest HSL.
	pub fn set_group_color_rgb(&mut self, group: GroupId, color: Rgb, now: Instant) -> Result<Hsl, ConsoleError> {
		let color = self.groups.set_color_rgb(group, color)?.hsl();
		self.after_color_change(group, color, now)?;
		return Ok(color);
	}

	fn after_color_change(&mut self, group: GroupId, color: Hsl, now: Instant) -> Result<(), ConsoleError> {
		if self.groups.get(group)?.mode == GroupMode::ColorMixer {
			self.write_group_outputs(group, now)?;
		}
		self.push_edit(GroupEdit::SetColor { group, color });
		return Ok(());
	}

	fn push_edit(&mut self, edit: GroupEdit) {
		self.outbox.push(OutboundRequest::EditGroup { edit });
	}

	// ┌───────────────────┐
	// │    Scenes         │
	// └───────────────────┘

	pub fn mark_active_scene(&mut self, scene: SceneId) {
		self.active_scene = Some(scene);
		self.outbox.push(OutboundRequest::SetActiveScene { scene: Some(scene) });
	}

	pub fn clear_active_scene(&mut self) {
		self.active_scene = None;
		self.scene_grace.end();
		self.outbox.push(OutboundRequest::SetActiveScene { scene: None });
	}

	// ┌───────────────────┐
	// │    Timers         │
	// └───────────────────┘

	/// Runs every timer that expired by `now`: flushes staged writes, fires long presses and clears indicators
	pub fn poll(&mut self, now: Instant) {
		if let Some(batch) = self.coalescer.poll(now) {
			tracing::debug!(batch = %batch.id, writes = batch.len(), "Flushing staged writes");
			self.outbox.extend(OutboundRequest::from_batch(batch));
		}
		for target in self.presses.poll(now) {
			self.on_long_press(target);
		}
		self.indicators.expire(now);
	}

	/// Sends everything staged without waiting for the debounce interval
	pub fn flush_now(&mut self) {
		if let Some(batch) = self.coalescer.flush_now() {
			self.outbox.extend(OutboundRequest::from_batch(batch));
		}
	}

	/// The earliest instant at which [`ConsoleState::poll`] has work to do
	pub fn next_deadline(&self) -> Option<Instant> {
		return [
			self.coalescer.deadline(),
			self.presses.next_deadline(),
			self.indicators.next_deadline(),
		]
		.into_iter()
		.flatten()
		.min();
	}

	pub fn take_outbox(&mut self) -> Vec<OutboundRequest> {
		return std::mem::take(&mut self.outbox);
	}

	pub fn take_notices(&mut self) -> Vec<ConsoleNotice> {
		return std::mem::take(&mut self.notices);
	}
}
