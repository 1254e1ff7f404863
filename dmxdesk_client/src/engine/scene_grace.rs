use std::time::Duration;

use tokio::time::Instant;

use crate::value_utils::timer::TimerSlot;

#[derive(Debug, Default)]
/// Suppresses "clear active scene" while a recalled scene is still fading in,
/// so its settling values are not mistaken for manual edits
pub struct SceneGracePeriod {
	timer: TimerSlot,
}
impl SceneGracePeriod {
	pub fn new() -> Self {
		return Self::default();
	}

	/// Starts a window as long as the scene's transition. A zero-length
	/// transition ends any window in progress.
	pub fn begin(&mut self, duration: Duration, now: Instant) {
		if duration.is_zero() {
			self.timer.cancel();
		} else {
			self.timer.restart(now, duration);
		}
	}

	pub fn is_active(&self, now: Instant) -> bool {
		return self.timer.is_pending(now);
	}

	pub fn end(&mut self) {
		self.timer.cancel();
	}
}
