//! Tells a short click apart from a sustained hold.

use std::{hash::Hash, time::Duration};

use rustc_hash::FxHashSet;
use tokio::time::Instant;

use super::types::{ChannelAddress, GroupId};
use crate::value_utils::timer::KeyedTimers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Controls whose press is routed through the gate
pub enum PressTarget {
	ChannelPark(ChannelAddress),
	ChannelHighlight(ChannelAddress),
	GroupPark(GroupId),
	GroupHighlight(GroupId),
	/// Hold opens the color picker, movement means a drag
	ColorFader(GroupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What a release means for the caller
pub enum PressRelease {
	/// Released before the threshold
	ShortClick,
	/// Released after the threshold but before the timer was polled. The long
	/// action has not fired yet and should run now.
	LongPress,
	/// The press was already resolved or never started
	Nothing,
}

pub struct LongPressGate<K: Eq + Hash + Clone> {
	threshold: Duration,
	timers: KeyedTimers<K>,
	/// Held presses that already fired or turned into a drag
	resolved: FxHashSet<K>,
}

impl<K: Eq + Hash + Clone> LongPressGate<K> {
	pub fn new(threshold: Duration) -> Self {
		return LongPressGate {
			threshold,
			timers: KeyedTimers::new(),
			resolved: FxHashSet::default(),
		};
	}

	pub fn press_start(&mut self, key: K, now: Instant) {
		self.resolved.remove(&key);
		self.timers.restart(key, now, self.threshold);
	}

	pub fn press_end(&mut self, key: &K, now: Instant) -> PressRelease {
		if self.timers.is_pending(key, now) {
			self.timers.cancel(key);
			return PressRelease::ShortClick;
		}
		if self.timers.cancel(key) {
			return PressRelease::LongPress;
		}
		self.resolved.remove(key);
		return PressRelease::Nothing;
	}

	/// Movement before the threshold abandons the long-press path. The eventual release does nothing.
	pub fn press_moved(&mut self, key: &K, now: Instant) -> bool {
		if self.timers.is_pending(key, now) {
			self.timers.cancel(key);
			self.resolved.insert(key.clone());
			return true;
		}
		return false;
	}

	/// The pointer left the control. No action is taken.
	pub fn press_cancel(&mut self, key: &K) {
		self.timers.cancel(key);
		self.resolved.remove(key);
	}

	/// Keys whose hold crossed the threshold since the last poll
	pub fn poll(&mut self, now: Instant) -> Vec<K> {
		let fired = self.timers.drain_expired(now);
		for key in fired.iter() {
			self.resolved.insert(key.clone());
		}
		return fired;
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		return self.timers.next_deadline();
	}

	pub fn is_held(&self, key: &K) -> bool {
		return self.timers.is_running(key) || self.resolved.contains(key);
	}
}
