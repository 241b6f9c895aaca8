//! Per-call session context used to correlate responses back to the right grant.

// self
use crate::{_prelude::*, grant::GrantStore, message::Message};

/// Ephemeral correlation context passed into response parsing.
///
/// Not persisted by the engine; the caller builds one per flow (or reuses one per client) and
/// keeps ownership of the grant store behind the `Arc`.
#[derive(Clone, Debug)]
pub struct SessionInfo {
	/// Client identifier the flow runs under.
	pub client_id: String,
	/// Issuer scoping grant lookups.
	pub issuer: String,
	/// Discovered provider metadata, when available.
	pub provider_info: Option<Message>,
	/// Shared grant table updated as responses are parsed.
	pub grant_store: Arc<GrantStore>,
}
impl SessionInfo {
	/// Creates a session for the client + issuer pair with a fresh grant store.
	pub fn new(client_id: impl Into<String>, issuer: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			issuer: issuer.into(),
			provider_info: None,
			grant_store: Arc::new(GrantStore::new()),
		}
	}

	/// Reuses an existing grant store.
	pub fn with_grant_store(mut self, store: Arc<GrantStore>) -> Self {
		self.grant_store = store;

		self
	}

	/// Attaches provider metadata.
	pub fn with_provider_info(mut self, info: Message) -> Self {
		self.provider_info = Some(info);

		self
	}
}
