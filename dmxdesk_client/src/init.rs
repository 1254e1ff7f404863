use std::sync::Arc;

use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};

use crate::{
	api_utilities::transport::ConsoleTransport,
	config::ConsoleConfig,
	engine::{
		console::ConsoleState,
		runtime::{ConsoleHandle, ConsoleRuntime},
		ConsoleNotice,
	},
};

/// Installs a stderr subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Does nothing unless the `stderr-logging` feature is enabled, so an embedding
/// application stays in charge of its own subscriber.
pub fn init_logging() {
	#[cfg(feature = "stderr-logging")]
	{
		let filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(std::io::stderr)
			.try_init();
	}
}

/// Starts a console client on the current tokio runtime.
///
/// The returned task finishes after every clone of the handle has been dropped
/// and the last staged writes have been sent.
pub fn start_console(
	config: &ConsoleConfig,
	transport: Arc<dyn ConsoleTransport>,
) -> (ConsoleHandle, UnboundedReceiver<ConsoleNotice>, JoinHandle<()>) {
	let state = ConsoleState::new(config);
	tracing::info!(client = %state.client_id(), ?config, "Starting console client");
	let (runtime, handle, notices) = ConsoleRuntime::new(state, transport);
	let task = tokio::spawn(runtime.run());
	return (handle, notices, task);
}
