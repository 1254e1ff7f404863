use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::requests::{ChannelWrite, GroupEdit, OutboundRequest, OverrideRequest};
use crate::engine::types::{DmxValue, GroupId, SceneId};

#[derive(Debug, Error)]
/// An error reported while delivering a request to the server
pub enum TransportError {
	/// The request may or may not have arrived. Nothing is retried.
	#[error("Network failure while contacting the server:\n{0}")]
	Network(String),
	/// The server refused the value outright
	#[error("The server rejected the request: {reason}")]
	Rejected { reason: String },
}

/// Carries requests to the authoritative server.
///
/// Implementations only need to deliver. Every request is sent at most once;
/// the next push from the server corrects anything lost on the way.
#[async_trait]
pub trait ConsoleTransport: Send + Sync + 'static {
	/// Writes a batch of channel values
	async fn write_channels(&self, batch: Uuid, writes: Vec<ChannelWrite>) -> Result<(), TransportError>;

	/// Moves a group's master
	async fn trigger_group(&self, group: GroupId, value: DmxValue) -> Result<(), TransportError>;

	/// Group and member CRUD
	async fn edit_group(&self, edit: GroupEdit) -> Result<(), TransportError>;

	/// Sets or clears the active scene marker
	async fn set_active_scene(&self, scene: Option<SceneId>) -> Result<(), TransportError>;

	/// Blackout, park, and highlight changes
	async fn set_override(&self, request: OverrideRequest) -> Result<(), TransportError>;
}

/// Routes a request to the matching transport call
pub async fn dispatch(transport: &dyn ConsoleTransport, request: OutboundRequest) -> Result<(), TransportError> {
	return match request {
		OutboundRequest::WriteChannels { batch, writes } => transport.write_channels(batch, writes).await,
		OutboundRequest::TriggerGroup { group, value } => transport.trigger_group(group, value).await,
		OutboundRequest::EditGroup { edit } => transport.edit_group(edit).await,
		OutboundRequest::SetActiveScene { scene } => transport.set_active_scene(scene).await,
		OutboundRequest::SetOverride { request } => transport.set_override(request).await,
	};
}
