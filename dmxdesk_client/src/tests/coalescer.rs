use std::time::Duration;

use tokio::time::Instant;

use super::address;
use crate::{
	api_utilities::requests::{ChannelWrite, OutboundRequest},
	engine::{coalescer::WriteCoalescer, types::ControlKey},
};

const INTERVAL: Duration = Duration::from_millis(30);

#[test]
fn only_the_latest_value_is_sent() {
	let start = Instant::now();
	let key = ControlKey::Channel(address(1, 10));
	let mut coalescer = WriteCoalescer::new(INTERVAL);
	coalescer.stage(key, 50, start);
	coalescer.stage(key, 80, start + Duration::from_millis(5));
	coalescer.stage(key, 120, start + Duration::from_millis(10));

	assert!(coalescer.poll(start + Duration::from_millis(39)).is_none());
	let batch = coalescer.poll(start + Duration::from_millis(40)).unwrap();
	assert_eq!(batch.len(), 1);
	assert_eq!(batch.channels.get(&address(1, 10)), Some(&120));
	assert!(coalescer.poll(start + Duration::from_millis(200)).is_none());
}

#[test]
fn every_stage_restarts_the_countdown() {
	let start = Instant::now();
	let mut coalescer = WriteCoalescer::new(INTERVAL);
	coalescer.stage(ControlKey::Channel(address(1, 1)), 1, start);
	coalescer.stage(ControlKey::Group(3), 2, start + Duration::from_millis(20));
	assert!(coalescer.poll(start + Duration::from_millis(35)).is_none());
	assert_eq!(coalescer.deadline(), Some(start + Duration::from_millis(50)));

	let batch = coalescer.poll(start + Duration::from_millis(50)).unwrap();
	assert_eq!(batch.channels.len(), 1);
	assert_eq!(batch.groups.get(&3), Some(&2));
}

#[test]
fn discarded_values_are_never_sent() {
	let start = Instant::now();
	let channel = ControlKey::Channel(address(1, 1));
	let group = ControlKey::Group(1);
	let mut coalescer = WriteCoalescer::new(INTERVAL);
	coalescer.stage(channel, 9, start);
	coalescer.stage(group, 10, start);
	assert!(coalescer.discard(&group));
	assert!(!coalescer.is_pending(&group));

	let batch = coalescer.poll(start + INTERVAL).unwrap();
	assert!(batch.groups.is_empty());

	coalescer.stage(group, 10, start);
	coalescer.discard(&group);
	assert_eq!(coalescer.deadline(), None);
}

#[test]
fn batches_split_into_requests() {
	let start = Instant::now();
	let mut coalescer = WriteCoalescer::new(INTERVAL);
	coalescer.stage(ControlKey::Channel(address(1, 2)), 20, start);
	coalescer.stage(ControlKey::Channel(address(1, 1)), 10, start);
	coalescer.stage(ControlKey::Group(7), 70, start);
	let batch = coalescer.flush_now().unwrap();
	let id = batch.id;

	let requests = OutboundRequest::from_batch(batch);
	assert_eq!(
		requests,
		vec![
			OutboundRequest::WriteChannels {
				batch: id,
				writes: vec![
					ChannelWrite {
						address: address(1, 1),
						value: 10,
					},
					ChannelWrite {
						address: address(1, 2),
						value: 20,
					},
				],
			},
			OutboundRequest::TriggerGroup { group: 7, value: 70 },
		]
	);
}
