//! Grant tracking: correlates issued authorization requests with later responses.
//!
//! The store is the engine's only shared mutable state. Entries are keyed by issuer + state so
//! a response from one authorization server can never enrich a grant created under another,
//! even when state values collide. Grant lifetime is caller-managed; nothing is evicted
//! automatically.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, message::Message};

/// Response fields that belong to a grant and get merged in as responses arrive.
const GRANT_FIELDS: &[&str] = &["code", "access_token", "token_type", "refresh_token", "id_token"];

/// One tracked authorization flow instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
	/// State value binding requests and responses together.
	pub state: String,
	/// Nonce issued alongside the authorization request, if any.
	pub nonce: Option<String>,
	/// Issuer the grant was created under.
	pub issuer: String,
	/// Authorization code from the authorization response.
	pub code: Option<String>,
	/// Access token from the token response.
	pub access_token: Option<String>,
	/// Token type from the token response.
	pub token_type: Option<String>,
	/// Refresh token from the token response.
	pub refresh_token: Option<String>,
	/// ID token from the token response.
	pub id_token: Option<String>,
	/// Instant the grant was created.
	pub issued_at: OffsetDateTime,
	/// Validity window used by [`is_valid`](Self::is_valid).
	pub lifetime: Duration,
}
impl Grant {
	/// Default validity window for freshly issued grants.
	pub const DEFAULT_LIFETIME: Duration = Duration::seconds(600);

	/// Creates a fresh grant for the issuer + state pair.
	pub fn new(issuer: impl Into<String>, state: impl Into<String>) -> Self {
		Self {
			state: state.into(),
			nonce: None,
			issuer: issuer.into(),
			code: None,
			access_token: None,
			token_type: None,
			refresh_token: None,
			id_token: None,
			issued_at: OffsetDateTime::now_utc(),
			lifetime: Self::DEFAULT_LIFETIME,
		}
	}

	/// Attaches a nonce.
	pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
		self.nonce = Some(nonce.into());

		self
	}

	/// Whether the grant is still inside its validity window.
	pub fn is_valid(&self, now: OffsetDateTime) -> bool {
		now - self.issued_at < self.lifetime
	}

	/// Merges the grant-relevant fields of a parsed response into the grant.
	///
	/// A token response carrying `expires_in` restarts the validity window from now.
	pub fn update_from_message(&mut self, message: &Message) {
		for &name in GRANT_FIELDS {
			if let Some(value) = message.get_str(name) {
				let slot = match name {
					"code" => &mut self.code,
					"access_token" => &mut self.access_token,
					"token_type" => &mut self.token_type,
					"refresh_token" => &mut self.refresh_token,
					_ => &mut self.id_token,
				};

				*slot = Some(value.into());
			}
		}
		if let Some(crate::message::FieldValue::Number(secs)) = message.get("expires_in") {
			self.issued_at = OffsetDateTime::now_utc();
			self.lifetime = Duration::seconds(*secs);
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct GrantKey {
	issuer: String,
	state: String,
}

/// Thread-safe in-memory grant table keyed by issuer + state.
#[derive(Debug, Default)]
pub struct GrantStore(RwLock<HashMap<GrantKey, Grant>>);
impl GrantStore {
	const STATE_LEN: usize = 32;

	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a grant under the issuer + state pair, replacing any previous entry.
	pub fn put(&self, issuer: &str, state: &str, grant: Grant) {
		let key = GrantKey { issuer: issuer.into(), state: state.into() };

		self.0.write().insert(key, grant);
	}

	/// Fetches a copy of the grant under the issuer + state pair.
	pub fn get(&self, issuer: &str, state: &str) -> Result<Grant> {
		let key = GrantKey { issuer: issuer.into(), state: state.into() };

		self.0.read().get(&key).cloned().ok_or_else(|| Error::NotFound {
			issuer: issuer.into(),
			state: state.into(),
		})
	}

	/// Merges response fields into an existing grant.
	pub fn update(&self, issuer: &str, state: &str, message: &Message) -> Result<()> {
		let key = GrantKey { issuer: issuer.into(), state: state.into() };
		let mut guard = self.0.write();
		let grant = guard.get_mut(&key).ok_or_else(|| Error::NotFound {
			issuer: issuer.into(),
			state: state.into(),
		})?;

		grant.update_from_message(message);

		Ok(())
	}

	/// Locates or creates the grant for the pair, then merges response fields into it.
	pub fn upsert_from_message(&self, issuer: &str, state: &str, message: &Message) {
		let key = GrantKey { issuer: issuer.into(), state: state.into() };
		let mut guard = self.0.write();
		let grant = guard.entry(key).or_insert_with(|| Grant::new(issuer, state));

		grant.update_from_message(message);
	}

	/// Issues a fresh grant under a randomly generated state value and returns the state.
	pub fn issue(&self, issuer: &str) -> String {
		let state = random_token(Self::STATE_LEN);

		self.put(issuer, &state, Grant::new(issuer, &state));

		state
	}

	/// Removes the grant for the pair, returning it when present.
	pub fn discard(&self, issuer: &str, state: &str) -> Option<Grant> {
		let key = GrantKey { issuer: issuer.into(), state: state.into() };

		self.0.write().remove(&key)
	}

	/// Number of tracked grants.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Whether the store tracks no grants.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

/// Generates an alphanumeric token suitable for state and nonce values.
pub fn random_token(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}
