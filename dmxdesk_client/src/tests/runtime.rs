use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use async_trait::async_trait;
use tokio::time;
use uuid::Uuid;

use super::{address, channel_group};
use crate::{
	api_utilities::{
		requests::{ChannelWrite, GroupEdit, OutboundRequest, OverrideRequest},
		transport::{ConsoleTransport, TransportError},
	},
	config::ConsoleConfig,
	engine::{
		console::ConsoleState,
		groups::GroupMode,
		long_press::PressTarget,
		runtime::ConsoleRuntime,
		types::{ControlKey, DmxValue, GroupId, SceneId},
		ConsoleNotice,
	},
};

#[derive(Default)]
struct RecordingTransport {
	sent: Mutex<Vec<OutboundRequest>>,
	reject_triggers: bool,
	fail_writes: bool,
}

impl RecordingTransport {
	fn sent(&self) -> Vec<OutboundRequest> {
		return self.sent.lock().unwrap().clone();
	}

	fn channel_writes(&self) -> Vec<Vec<ChannelWrite>> {
		return self
			.sent()
			.into_iter()
			.filter_map(|request| match request {
				OutboundRequest::WriteChannels { writes, .. } => Some(writes),
				_ => None,
			})
			.collect();
	}

	fn record(&self, request: OutboundRequest) {
		self.sent.lock().unwrap().push(request);
	}
}

#[async_trait]
impl ConsoleTransport for RecordingTransport {
	async fn write_channels(&self, batch: Uuid, writes: Vec<ChannelWrite>) -> Result<(), TransportError> {
		self.record(OutboundRequest::WriteChannels { batch, writes });
		if self.fail_writes {
			return Err(TransportError::Network(String::from("connection reset")));
		}
		return Ok(());
	}

	async fn trigger_group(&self, group: GroupId, value: DmxValue) -> Result<(), TransportError> {
		self.record(OutboundRequest::TriggerGroup { group, value });
		if self.reject_triggers {
			return Err(TransportError::Rejected {
				reason: String::from("group is locked"),
			});
		}
		return Ok(());
	}

	async fn edit_group(&self, edit: GroupEdit) -> Result<(), TransportError> {
		self.record(OutboundRequest::EditGroup { edit });
		return Ok(());
	}

	async fn set_active_scene(&self, scene: Option<SceneId>) -> Result<(), TransportError> {
		self.record(OutboundRequest::SetActiveScene { scene });
		return Ok(());
	}

	async fn set_override(&self, request: OverrideRequest) -> Result<(), TransportError> {
		self.record(OutboundRequest::SetOverride { request });
		return Ok(());
	}
}

fn state() -> ConsoleState {
	let mut state = ConsoleState::new(&ConsoleConfig::default());
	state.provision_universe(1);
	return state;
}

#[tokio::test(start_paused = true)]
async fn drag_burst_sends_one_write() {
	let transport = Arc::new(RecordingTransport::default());
	let (runtime, handle, _notices) = ConsoleRuntime::new(state(), transport.clone());
	let task = tokio::spawn(runtime.run());

	for value in [50, 80, 120] {
		handle.drag_channel(address(1, 10), value).await.unwrap();
		time::sleep(Duration::from_millis(5)).await;
	}
	assert!(transport.channel_writes().is_empty());

	time::sleep(Duration::from_millis(100)).await;
	assert_eq!(
		transport.channel_writes(),
		vec![vec![ChannelWrite {
			address: address(1, 10),
			value: 120,
		}]]
	);
	assert_eq!(handle.displayed_value(address(1, 10)).await, Ok(120));

	drop(handle);
	task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn rejected_trigger_cancels_the_drag() {
	let transport = Arc::new(RecordingTransport {
		reject_triggers: true,
		..Default::default()
	});
	let mut state = state();
	state.upsert_group(channel_group(2, GroupMode::Follow, &[(1, 0)]));
	let (runtime, handle, mut notices) = ConsoleRuntime::new(state, transport.clone());
	let task = tokio::spawn(runtime.run());

	handle.drag_group(2, 200).await.unwrap();
	assert_eq!(handle.displayed_value(address(1, 1)).await, Ok(200));

	let notice = time::timeout(Duration::from_secs(1), notices.recv()).await.unwrap();
	assert_eq!(notice, Some(ConsoleNotice::DragCancelled(ControlKey::Group(2))));
	assert_eq!(handle.group_master(2).await, Ok(0));
	assert_eq!(handle.displayed_value(address(1, 1)).await, Ok(0));

	drop(handle);
	task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_writes_are_not_retried() {
	let transport = Arc::new(RecordingTransport {
		fail_writes: true,
		..Default::default()
	});
	let (runtime, handle, _notices) = ConsoleRuntime::new(state(), transport.clone());
	let task = tokio::spawn(runtime.run());

	handle.set_channel(address(1, 1), 64).await.unwrap();
	time::sleep(Duration::from_secs(2)).await;
	assert_eq!(transport.channel_writes().len(), 1);
	assert_eq!(handle.displayed_value(address(1, 1)).await, Ok(64));

	drop(handle);
	task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn held_color_fader_opens_the_picker() {
	let transport = Arc::new(RecordingTransport::default());
	let (runtime, handle, mut notices) = ConsoleRuntime::new(state(), transport);
	let task = tokio::spawn(runtime.run());

	handle.press_start(PressTarget::ColorFader(3)).await;
	let notice = time::timeout(Duration::from_secs(1), notices.recv()).await.unwrap();
	assert_eq!(notice, Some(ConsoleNotice::OpenColorPicker(3)));
	handle.press_end(PressTarget::ColorFader(3)).await;

	drop(handle);
	task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn staged_writes_are_sent_on_shutdown() {
	let transport = Arc::new(RecordingTransport::default());
	let (runtime, handle, _notices) = ConsoleRuntime::new(state(), transport.clone());
	let task = tokio::spawn(runtime.run());

	handle.set_channel(address(1, 3), 77).await.unwrap();
	drop(handle);
	task.await.unwrap();

	assert_eq!(
		transport.channel_writes(),
		vec![vec![ChannelWrite {
			address: address(1, 3),
			value: 77,
		}]]
	);
}

#[tokio::test(start_paused = true)]
async fn requests_keep_their_order() {
	let transport = Arc::new(RecordingTransport::default());
	let (runtime, handle, _notices) = ConsoleRuntime::new(state(), transport.clone());
	let task = tokio::spawn(runtime.run());

	handle
		.update(|state, _| {
			state.upsert_group(channel_group(1, GroupMode::Follow, &[]));
			state.request_blackout(true);
			state.delete_group(1).unwrap();
		})
		.await;
	drop(handle);
	task.await.unwrap();

	let sent = transport.sent();
	assert_eq!(sent.len(), 3);
	assert!(matches!(sent[0], OutboundRequest::EditGroup { edit: GroupEdit::Upsert { .. } }));
	assert_eq!(
		sent[1],
		OutboundRequest::SetOverride {
			request: OverrideRequest::Blackout { active: true },
		}
	);
	assert_eq!(
		sent[2],
		OutboundRequest::EditGroup {
			edit: GroupEdit::Delete { group: 1 },
		}
	);
}

#[tokio::test(start_paused = true)]
async fn events_arrive_as_json() {
	let transport = Arc::new(RecordingTransport::default());
	let (runtime, handle, _notices) = ConsoleRuntime::new(state(), transport);
	let task = tokio::spawn(runtime.run());

	assert!(
		handle
			.apply_event_json(r#"{"event":"universe_snapshot","universe":1,"values":[9,8,7]}"#)
			.await
	);
	assert_eq!(handle.displayed_value(address(1, 3)).await, Ok(7));

	drop(handle);
	task.await.unwrap();
}
