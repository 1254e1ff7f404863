use rustc_hash::FxHashSet;

use super::types::ControlKey;

#[derive(Debug, Default)]
/// Controls currently held under a pointer
pub struct ActiveDrags {
	keys: FxHashSet<ControlKey>,
}
impl ActiveDrags {
	pub fn begin(&mut self, key: ControlKey) -> bool {
		return self.keys.insert(key);
	}

	/// Ends a drag normally or through cancellation. Returns whether it was active.
	pub fn end(&mut self, key: &ControlKey) -> bool {
		return self.keys.remove(key);
	}

	pub fn is_dragging(&self, key: &ControlKey) -> bool {
		return self.keys.contains(key);
	}

	pub fn keys(&self) -> impl Iterator<Item = &ControlKey> + '_ {
		return self.keys.iter();
	}

	pub fn len(&self) -> usize {
		return self.keys.len();
	}

	pub fn is_empty(&self) -> bool {
		return self.keys.is_empty();
	}

	pub fn retain(&mut self, keep: impl FnMut(&ControlKey) -> bool) {
		self.keys.retain(keep);
	}
}
