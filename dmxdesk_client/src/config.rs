//! Tunable timings for a console client.

use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
	/// Quiet period before staged writes are sent
	pub debounce_interval_ms: u64,
	/// How long an activity indicator stays lit
	pub indicator_timeout_ms: u64,
	/// How long a press must be held to count as a long press
	pub long_press_ms: u64,
}
impl Default for ConsoleConfig {
	fn default() -> Self {
		return ConsoleConfig {
			debounce_interval_ms: 30,
			indicator_timeout_ms: 500,
			long_press_ms: 500,
		};
	}
}
impl ConsoleConfig {
	/// Parses a config. Missing keys take their default.
	pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
		let config: ConsoleConfig = serde_json::from_str(text).context("Console config is not valid JSON")?;
		return Ok(config);
	}

	pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("Could not read console config at {}", path.display()))?;
		return Self::from_json_str(&text).with_context(|| format!("Could not load {}", path.display()));
	}

	pub fn debounce_interval(&self) -> Duration {
		return Duration::from_millis(self.debounce_interval_ms);
	}

	pub fn indicator_timeout(&self) -> Duration {
		return Duration::from_millis(self.indicator_timeout_ms);
	}

	pub fn long_press_threshold(&self) -> Duration {
		return Duration::from_millis(self.long_press_ms);
	}
}
