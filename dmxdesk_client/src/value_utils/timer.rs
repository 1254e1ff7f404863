//! Deadline-based timers.
//!
//! Nothing here sleeps. Each timer records when it is due and the owner asks
//! whether it has fired by passing in the current time, which keeps every
//! component testable with a virtual clock. The runtime sleeps until the
//! earliest deadline reported by [`TimerSlot::deadline`] or
//! [`KeyedTimers::next_deadline`].

use std::hash::Hash;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tokio::time::Instant;

#[derive(Debug, Default, Clone)]
/// A single restartable timer
pub struct TimerSlot {
	deadline: Option<Instant>,
}
impl TimerSlot {
	pub fn new() -> Self {
		return TimerSlot { deadline: None };
	}

	/// Starts the timer, replacing any countdown already in progress
	pub fn restart(&mut self, now: Instant, duration: Duration) {
		self.deadline = Some(now + duration);
	}

	pub fn cancel(&mut self) {
		self.deadline = None;
	}

	pub fn is_running(&self) -> bool {
		return self.deadline.is_some();
	}

	pub fn deadline(&self) -> Option<Instant> {
		return self.deadline;
	}

	/// Running and not yet due
	pub fn is_pending(&self, now: Instant) -> bool {
		return matches!(self.deadline, Some(deadline) if now < deadline);
	}

	/// Returns true exactly once when the timer has fired, stopping it
	pub fn take_expired(&mut self, now: Instant) -> bool {
		match self.deadline {
			Some(deadline) if now >= deadline => {
				self.deadline = None;
				return true;
			}
			_ => return false,
		}
	}
}

#[derive(Debug, Clone)]
/// A set of independent timers, one per key
pub struct KeyedTimers<K: Eq + Hash + Clone> {
	deadlines: FxHashMap<K, Instant>,
}
impl<K: Eq + Hash + Clone> Default for KeyedTimers<K> {
	fn default() -> Self {
		return KeyedTimers {
			deadlines: FxHashMap::default(),
		};
	}
}
impl<K: Eq + Hash + Clone> KeyedTimers<K> {
	pub fn new() -> Self {
		return Self::default();
	}

	/// Starts or restarts the timer for `key`
	pub fn restart(&mut self, key: K, now: Instant, duration: Duration) {
		self.deadlines.insert(key, now + duration);
	}

	/// Stops the timer for `key`, returning whether it was running
	pub fn cancel(&mut self, key: &K) -> bool {
		return self.deadlines.remove(key).is_some();
	}

	pub fn is_running(&self, key: &K) -> bool {
		return self.deadlines.contains_key(key);
	}

	/// Running and not yet due
	pub fn is_pending(&self, key: &K, now: Instant) -> bool {
		return matches!(self.deadlines.get(key), Some(deadline) if now < *deadline);
	}

	/// Removes and returns every key whose timer has fired, earliest first
	pub fn drain_expired(&mut self, now: Instant) -> Vec<K> {
		let mut expired: Vec<(K, Instant)> = self
			.deadlines
			.iter()
			.filter(|(_, deadline)| now >= **deadline)
			.map(|(key, deadline)| (key.clone(), *deadline))
			.collect();
		expired.sort_by_key(|(_, deadline)| *deadline);
		for (key, _) in expired.iter() {
			self.deadlines.remove(key);
		}
		return expired.into_iter().map(|(key, _)| key).collect();
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		return self.deadlines.values().min().copied();
	}

	pub fn clear(&mut self) {
		self.deadlines.clear();
	}

	pub fn len(&self) -> usize {
		return self.deadlines.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.deadlines.is_empty();
	}
}
