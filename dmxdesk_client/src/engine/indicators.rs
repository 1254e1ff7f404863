//! Short-lived activity lights for channels and groups.
//!
//! Purely feedback. Nothing that computes a value ever reads these, so the
//! whole table can be dropped at any time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::types::ControlKey;
use crate::value_utils::timer::KeyedTimers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
	/// Changed by another client or an external input
	Remote,
	/// Changed by this client
	Local,
	/// Changed because a group drove it
	Group,
}

const ALL_KINDS: [IndicatorKind; 3] = [IndicatorKind::Remote, IndicatorKind::Local, IndicatorKind::Group];

pub struct IndicatorTimer {
	timeout: Duration,
	timers: KeyedTimers<(ControlKey, IndicatorKind)>,
}

impl IndicatorTimer {
	pub fn new(timeout: Duration) -> Self {
		return IndicatorTimer {
			timeout,
			timers: KeyedTimers::new(),
		};
	}

	/// Lights `kind` on `key`, restarting its window if it was already lit
	pub fn pulse(&mut self, key: ControlKey, kind: IndicatorKind, now: Instant) {
		self.timers.restart((key, kind), now, self.timeout);
	}

	pub fn is_active(&self, key: ControlKey, kind: IndicatorKind, now: Instant) -> bool {
		return self.timers.is_pending(&(key, kind), now);
	}

	/// Every kind currently lit on `key`
	pub fn active_kinds(&self, key: ControlKey, now: Instant) -> Vec<IndicatorKind> {
		return ALL_KINDS
			.iter()
			.copied()
			.filter(|kind| self.is_active(key, *kind, now))
			.collect();
	}

	/// Removes expired entries, returning what went dark
	pub fn expire(&mut self, now: Instant) -> Vec<(ControlKey, IndicatorKind)> {
		return self.timers.drain_expired(now);
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		return self.timers.next_deadline();
	}

	pub fn clear(&mut self) {
		self.timers.clear();
	}

	pub fn len(&self) -> usize {
		return self.timers.len();
	}
}
