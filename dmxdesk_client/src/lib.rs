pub mod api_utilities;
pub mod config;
pub mod engine;
pub mod init;
pub mod value_utils;

// Tests
#[cfg(test)]
mod tests;

// Re-exports
pub use config::ConsoleConfig;
pub use engine::{
	console::ConsoleState,
	runtime::{ConsoleHandle, ConsoleRuntime},
	types::{ChannelAddress, ControlKey, GroupId, SceneId, UniverseId, DmxValue, CHANNELS_PER_UNIVERSE},
	ConsoleError,
	ConsoleNotice,
};
pub use init::{init_logging, start_console};
