//! Merges server-pushed events into the console state.
//!
//! Remote events are never refused. Anything that refers to an unknown
//! universe, channel or group is logged and dropped, and everything else is
//! recorded as authoritative. Optimistic values survive only while the control
//! that wrote them is still held locally.

use tokio::time::Instant;
use uuid::Uuid;

use super::{
	console::ConsoleState,
	indicators::IndicatorKind,
	types::{ChannelAddress, ControlKey, DmxValue, GroupId, UniverseId},
};
use crate::{
	api_utilities::events::{ChangeSource, InboundEvent, INPUT_UNTOUCHED},
	value_utils::scaling::clamp_dmx,
};

impl ConsoleState {
	/// Parses and applies a JSON event. Malformed text is logged and ignored.
	pub fn apply_event_json(&mut self, text: &str, now: Instant) -> bool {
		return match InboundEvent::from_json(text) {
			Ok(event) => {
				self.apply_event(event, now);
				true
			}
			Err(error) => {
				tracing::warn!(%error, "Dropping malformed event");
				false
			}
		};
	}

	pub fn apply_event(&mut self, event: InboundEvent, now: Instant) {
		tracing::trace!(?event, "Applying remote event");
		match event {
			InboundEvent::UniverseProvisioned { universe } => {
				self.provision_universe(universe);
			}
			InboundEvent::UniverseRemoved { universe } => {
				self.remove_universe(universe);
			}
			InboundEvent::UniverseSnapshot { universe, values } => {
				let values = values.into_iter().map(|value| Some(clamp_dmx(value)));
				self.apply_frame(universe, values, now);
			}
			InboundEvent::InputSnapshot { universe, values } => {
				let values = values
					.into_iter()
					.map(|value| if value <= INPUT_UNTOUCHED { None } else { Some(clamp_dmx(value)) });
				self.apply_frame(universe, values, now);
			}
			InboundEvent::ChannelChanged {
				universe,
				channel,
				value,
				source,
				origin,
			} => self.apply_channel_change(ChannelAddress { universe, channel }, clamp_dmx(value), source, origin, now),
			InboundEvent::BlackoutChanged { active } => {
				self.overrides.blackout = active;
			}
			InboundEvent::GroupValueChanged {
				group,
				value,
				source,
				origin,
			} => self.apply_group_change(group, clamp_dmx(value), source, origin, now),
			InboundEvent::GroupUpserted { group } => {
				let retain = self.is_held(&ControlKey::Group(group.id));
				self.groups.upsert(group, retain);
			}
			InboundEvent::GroupRemoved { group } => {
				if !self.groups.contains(group) {
					tracing::debug!(group, "Remote removal of an unknown group");
					return;
				}
				self.cancel_interaction(ControlKey::Group(group));
				self.drop_group_overlay(group);
				self.groups.remove(group);
			}
			InboundEvent::GroupColorChanged { group, color } => {
				if let Err(error) = self.groups.set_color_hsl(group, color) {
					tracing::debug!(group, %error, "Dropping remote color change");
				}
			}
			InboundEvent::SceneRecalled {
				scene,
				transition_ms,
				universes,
			} => {
				for frame in universes.iter() {
					self.apply_frame(frame.universe, frame.clamped(), now);
				}
				self.active_scene = Some(scene);
				self.scene_grace
					.begin(std::time::Duration::from_millis(transition_ms), now);
				tracing::debug!(scene, transition_ms, "Scene recalled");
			}
			InboundEvent::ActiveSceneChanged { scene } => {
				self.active_scene = scene;
			}
			InboundEvent::ParkChanged { address, value } => {
				if !address.is_valid() {
					tracing::warn!(%address, "Dropping park change for an invalid channel");
					return;
				}
				match value {
					Some(value) => self.overrides.park(address, value),
					None => {
						self.overrides.unpark(address);
					}
				}
			}
			InboundEvent::HighlightChanged { active, channels } => {
				let channels = channels.into_iter().filter(ChannelAddress::is_valid);
				self.overrides.highlight.replace(active, channels);
			}
			InboundEvent::UniverseMasterChanged { universe, value } => {
				let retain = self.held_sinks().universe_masters.contains(&universe);
				match self.values.universe_master_mut(universe) {
					Ok(master) => master.confirm(clamp_dmx(value), retain),
					Err(error) => tracing::debug!(universe, %error, "Dropping remote master change"),
				}
			}
			InboundEvent::GlobalMasterChanged { value } => {
				let retain = self.held_sinks().global_master;
				self.values.global_master_mut().confirm(clamp_dmx(value), retain);
			}
		}
	}

	/// Writes a run of values starting at channel 1, lighting the remote indicator for each one that moved
	fn apply_frame(&mut self, universe: UniverseId, values: impl IntoIterator<Item = Option<DmxValue>>, now: Instant) {
		let before = match self.values.universe(universe) {
			Some(before) => before,
			None => {
				tracing::debug!(universe, "Dropping values for an unknown universe");
				return;
			}
		};
		let held = self.held_sinks();
		let written = match self
			.values
			.apply_snapshot(universe, values, |address| held.channels.contains(&address))
		{
			Ok(written) => written,
			Err(error) => {
				tracing::debug!(universe, %error, "Dropping universe values");
				return;
			}
		};
		for address in written {
			if self.values.get(address) != Some(before[address.index()]) {
				self.indicators
					.pulse(ControlKey::Channel(address), IndicatorKind::Remote, now);
			}
		}
	}

	fn apply_channel_change(
		&mut self,
		address: ChannelAddress,
		value: DmxValue,
		source: ChangeSource,
		origin: Option<Uuid>,
		now: Instant,
	) {
		if !address.is_valid() || !self.values.has_universe(address.universe) {
			tracing::debug!(%address, "Dropping change for an unknown channel");
			return;
		}
		let key = ControlKey::Channel(address);
		if source.is_reject() {
			self.cancel_interaction(key);
		}
		let before = self.values.get(address);
		let retain = !source.is_reject() && self.held_sinks().channels.contains(&address);
		if let Err(error) = self.values.confirm(address, value, retain) {
			tracing::debug!(%address, %error, "Dropping channel change");
			return;
		}
		if origin != Some(self.client_id) && self.values.get(address) != before {
			self.indicators.pulse(key, source.indicator_kind(), now);
		}
	}

	/// Only the master is updated here. Member channels and masters arrive as their own events.
	fn apply_group_change(
		&mut self,
		group: GroupId,
		value: DmxValue,
		source: ChangeSource,
		origin: Option<Uuid>,
		now: Instant,
	) {
		if !self.groups.contains(group) {
			tracing::debug!(group, "Dropping change for an unknown group");
			return;
		}
		let key = ControlKey::Group(group);
		let before = self.groups.get(group).map(|target| target.current_master()).ok();
		let overridden = source.is_reject() || source.is_input();
		if overridden {
			self.cancel_interaction(key);
			self.drop_group_overlay(group);
		}
		let retain = !overridden && self.is_held(&key);
		if let Ok(target) = self.groups.get_mut(group) {
			target.master = value;
			if !retain {
				target.local_master = None;
			}
		}
		let after = self.groups.get(group).map(|target| target.current_master()).ok();
		if origin != Some(self.client_id) && after != before {
			self.indicators.pulse(key, IndicatorKind::Remote, now);
		}
	}
}
