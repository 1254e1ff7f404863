//! Collapses rapid local writes into one batched request.
//!
//! Staging a key replaces whatever was pending for it, so only the latest value
//! is ever sent. Every stage restarts the countdown: a fader that keeps moving
//! does not flush until it pauses.

use std::{collections::BTreeMap, time::Duration};

use rustc_hash::FxHashMap;
use tokio::time::Instant;
use uuid::Uuid;

use super::types::{ChannelAddress, ControlKey, DmxValue, GroupId};
use crate::value_utils::timer::TimerSlot;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything that was staged when the flush happened
pub struct PendingBatch {
	/// Correlates the batch across log lines
	pub id: Uuid,
	pub channels: BTreeMap<ChannelAddress, DmxValue>,
	pub groups: BTreeMap<GroupId, DmxValue>,
}
impl PendingBatch {
	pub fn len(&self) -> usize {
		return self.channels.len() + self.groups.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.len() == 0;
	}
}

pub struct WriteCoalescer {
	interval: Duration,
	pending: FxHashMap<ControlKey, DmxValue>,
	timer: TimerSlot,
}

impl WriteCoalescer {
	pub fn new(interval: Duration) -> Self {
		return WriteCoalescer {
			interval,
			pending: FxHashMap::default(),
			timer: TimerSlot::new(),
		};
	}

	/// Records the latest intended value for `key` and restarts the flush countdown
	pub fn stage(&mut self, key: ControlKey, value: DmxValue, now: Instant) {
		self.pending.insert(key, value);
		self.timer.restart(now, self.interval);
	}

	pub fn is_pending(&self, key: &ControlKey) -> bool {
		return self.pending.contains_key(key);
	}

	pub fn pending_value(&self, key: &ControlKey) -> Option<DmxValue> {
		return self.pending.get(key).copied();
	}

	/// Drops the pending value for `key` so it is never sent. The countdown keeps running for the rest.
	pub fn discard(&mut self, key: &ControlKey) -> bool {
		let removed = self.pending.remove(key).is_some();
		if self.pending.is_empty() {
			self.timer.cancel();
		}
		return removed;
	}

	/// Drops every pending value matching `predicate`
	pub fn discard_where(&mut self, mut predicate: impl FnMut(&ControlKey) -> bool) {
		self.pending.retain(|key, _| !predicate(key));
		if self.pending.is_empty() {
			self.timer.cancel();
		}
	}

	pub fn pending_keys(&self) -> impl Iterator<Item = &ControlKey> + '_ {
		return self.pending.keys();
	}

	pub fn deadline(&self) -> Option<Instant> {
		return self.timer.deadline();
	}

	/// Returns the batch once the countdown has run out
	pub fn poll(&mut self, now: Instant) -> Option<PendingBatch> {
		if self.timer.take_expired(now) {
			return self.flush_now();
		}
		return None;
	}

	/// Flushes immediately regardless of the countdown
	pub fn flush_now(&mut self) -> Option<PendingBatch> {
		self.timer.cancel();
		if self.pending.is_empty() {
			return None;
		}
		let mut batch = PendingBatch {
			id: Uuid::new_v4(),
			channels: BTreeMap::new(),
			groups: BTreeMap::new(),
		};
		for (key, value) in self.pending.drain() {
			match key {
				ControlKey::Channel(address) => {
					batch.channels.insert(address, value);
				}
				ControlKey::Group(group) => {
					batch.groups.insert(group, value);
				}
			}
		}
		return Some(batch);
	}
}
