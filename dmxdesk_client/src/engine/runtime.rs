//! Drives a [`ConsoleState`] in real time.
//!
//! The runtime task sleeps until either the state's next timer deadline or an
//! update from a [`ConsoleHandle`]. Each time it wakes it polls the state,
//! forwards notices to the UI, and hands outbound requests to a dispatcher task
//! that sends them to the transport strictly in order.

use std::{future, sync::Arc};

use tokio::{
	select,
	sync::{
		mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender, WeakSender},
		RwLock,
	},
	time::{self, Instant},
};

use super::{
	console::ConsoleState,
	long_press::PressTarget,
	types::{ChannelAddress, ControlKey, DmxValue, GroupId},
	ConsoleError, ConsoleNotice,
};
use crate::api_utilities::{
	events::InboundEvent,
	requests::OutboundRequest,
	transport::{dispatch, ConsoleTransport, TransportError},
};

#[derive(Clone)]
/// Shared access to a running console.
///
/// Every mutation wakes the runtime so new deadlines and outbound requests are
/// picked up. The runtime shuts down once every handle has been dropped.
pub struct ConsoleHandle(Arc<RwLock<ConsoleState>>, Sender<()>);

impl ConsoleHandle {
	/// Runs `update` against the state at the current instant, then wakes the runtime
	pub async fn update<R>(&self, update: impl FnOnce(&mut ConsoleState, Instant) -> R) -> R {
		let mut state = self.0.write().await;
		let result = update(&mut state, Instant::now());
		drop(state);

		// A full queue already guarantees a wake-up
		let _ = self.1.try_send(());
		return result;
	}

	pub async fn read<R>(&self, read: impl FnOnce(&ConsoleState, Instant) -> R) -> R {
		let state = self.0.read().await;
		return read(&state, Instant::now());
	}

	// ┌────────────────────────┐
	// │    Remote Events       │
	// └────────────────────────┘

	pub async fn apply_event(&self, event: InboundEvent) {
		self.update(|state, now| state.apply_event(event, now)).await;
	}

	pub async fn apply_event_json(&self, text: &str) -> bool {
		return self.update(|state, now| state.apply_event_json(text, now)).await;
	}

	// ┌────────────────────────┐
	// │    Local Gestures      │
	// └────────────────────────┘

	pub async fn set_channel(&self, address: ChannelAddress, value: DmxValue) -> Result<(), ConsoleError> {
		return self.update(|state, now| state.set_channel(address, value, now)).await;
	}

	pub async fn drag_channel(&self, address: ChannelAddress, value: DmxValue) -> Result<(), ConsoleError> {
		return self.update(|state, now| state.drag_channel(address, value, now)).await;
	}

	pub async fn drag_group(&self, group: GroupId, value: DmxValue) -> Result<(), ConsoleError> {
		return self.update(|state, now| state.drag_group(group, value, now)).await;
	}

	pub async fn end_drag(&self, key: ControlKey) -> bool {
		return self.update(|state, _| state.end_drag(key)).await;
	}

	pub async fn trigger_group(&self, group: GroupId, value: DmxValue) -> Result<(), ConsoleError> {
		return self.update(|state, now| state.trigger_group(group, value, now)).await;
	}

	pub async fn press_start(&self, target: PressTarget) {
		self.update(|state, now| state.press_start(target, now)).await;
	}

	pub async fn press_end(&self, target: PressTarget) {
		self.update(|state, now| state.press_end(target, now)).await;
	}

	pub async fn press_moved(&self, target: PressTarget) -> bool {
		return self.update(|state, now| state.press_moved(target, now)).await;
	}

	pub async fn press_cancel(&self, target: PressTarget) {
		self.update(|state, _| state.press_cancel(target)).await;
	}

	// ┌────────────────────────┐
	// │    Display             │
	// └────────────────────────┘

	pub async fn displayed_value(&self, address: ChannelAddress) -> Result<DmxValue, ConsoleError> {
		return self.read(|state, _| state.displayed_value(address)).await;
	}

	pub async fn group_master(&self, group: GroupId) -> Result<DmxValue, ConsoleError> {
		return self.read(|state, _| state.group_master(group)).await;
	}
}

pub struct ConsoleRuntime {
	state: Arc<RwLock<ConsoleState>>,
	updates: Receiver<()>,
	wake: WeakSender<()>,
	notices: UnboundedSender<ConsoleNotice>,
	transport: Arc<dyn ConsoleTransport>,
}

impl ConsoleRuntime {
	/// Wraps a state for real-time use. The runtime does nothing until [`ConsoleRuntime::run`] is awaited.
	pub fn new(
		state: ConsoleState,
		transport: Arc<dyn ConsoleTransport>,
	) -> (Self, ConsoleHandle, UnboundedReceiver<ConsoleNotice>) {
		let state = Arc::new(RwLock::new(state));
		let (update_sender, updates) = mpsc::channel(1);
		let (notices, notice_receiver) = mpsc::unbounded_channel();
		let runtime = ConsoleRuntime {
			state: Arc::clone(&state),
			updates,
			wake: update_sender.downgrade(),
			notices,
			transport,
		};
		return (runtime, ConsoleHandle(state, update_sender), notice_receiver);
	}

	/// Services the state until every [`ConsoleHandle`] is dropped, then sends whatever is still staged
	pub async fn run(mut self) {
		let (outbound, requests) = mpsc::unbounded_channel();
		let dispatcher = tokio::spawn(dispatcher(
			Arc::clone(&self.transport),
			Arc::clone(&self.state),
			self.wake.clone(),
			requests,
		));

		loop {
			let deadline = self.service(&outbound).await;

			// Handle updates interrupt the wait for the next deadline
			select! {
				update = self.updates.recv() => if update.is_none() {
					break;
				},
				_ = sleep_until(deadline) => {},
			}
		}

		let remaining = {
			let mut state = self.state.write().await;
			state.flush_now();
			state.take_outbox()
		};
		if !remaining.is_empty() {
			tracing::debug!(requests = remaining.len(), "Flushing on shutdown");
			let _ = outbound.send(remaining);
		}
		drop(outbound);
		if let Err(error) = dispatcher.await {
			tracing::error!(%error, "Request dispatcher panicked");
		}
		tracing::info!("Console runtime stopped");
	}

	/// Runs expired timers and forwards everything produced since the last pass. Returns the next deadline.
	async fn service(&self, outbound: &UnboundedSender<Vec<OutboundRequest>>) -> Option<Instant> {
		let mut state = self.state.write().await;
		state.poll(Instant::now());
		let requests = state.take_outbox();
		let notices = state.take_notices();
		let deadline = state.next_deadline();
		drop(state);

		for notice in notices {
			if self.notices.send(notice).is_err() {
				tracing::trace!(?notice, "Notice dropped, nobody is listening");
			}
		}
		if !requests.is_empty() && outbound.send(requests).is_err() {
			tracing::error!("Request dispatcher is gone, outbound requests were lost");
		}
		return deadline;
	}
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => time::sleep_until(deadline).await,
		None => future::pending::<()>().await,
	}
}

/// Sends request batches one at a time, in the order they were produced
async fn dispatcher(
	transport: Arc<dyn ConsoleTransport>,
	state: Arc<RwLock<ConsoleState>>,
	wake: WeakSender<()>,
	mut requests: UnboundedReceiver<Vec<OutboundRequest>>,
) {
	while let Some(batch) = requests.recv().await {
		for request in batch {
			match dispatch(transport.as_ref(), request.clone()).await {
				Ok(()) => {}
				Err(TransportError::Rejected { reason }) => {
					tracing::warn!(?request, %reason, "Server rejected request");
					if let OutboundRequest::TriggerGroup { group, .. } = request {
						state.write().await.reject_group_trigger(group);

						// Deliver any cancellation notice without waiting for the next update
						if let Some(wake) = wake.upgrade() {
							let _ = wake.try_send(());
						}
					}
				}
				Err(error) => {
					tracing::warn!(?request, %error, "Failed to send request");
				}
			}
		}
	}
}
