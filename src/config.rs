//! Client configuration consumed read-only during request construction.

// self
use crate::{_prelude::*, message::Message};

/// Opaque credential-resolution capability.
///
/// Descriptors that need secret material (client secrets today, signed assertions once a JOSE
/// layer is plugged in) pull it through this trait instead of reading key bytes directly, so
/// callers can back it with a vault or signer without the engine knowing.
pub trait CredentialSource {
	/// Resolves the named credential to wire text, if the source holds it.
	fn credential(&self, name: &str) -> Option<String>;
}

/// Per-client configuration owned by the calling session.
///
/// Immutable for the duration of a single request construction; the engine only reads it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Registered client identifier.
	pub client_id: String,
	/// Client secret used for basic credential inclusion.
	pub client_secret: Option<String>,
	/// Registered redirect URIs; the first one is the construction default.
	pub redirect_uris: Vec<String>,
	/// Issuer of the authorization server, when known.
	pub issuer: Option<String>,
	/// Previously discovered provider metadata, when available.
	pub provider_info: Option<Message>,
}
impl ClientConfig {
	/// Creates a configuration with the mandatory client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self { client_id: client_id.into(), ..Default::default() }
	}

	/// Sets the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Appends a redirect URI.
	pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
		self.redirect_uris.push(uri.into());

		self
	}

	/// Sets the issuer.
	pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.issuer = Some(issuer.into());

		self
	}

	/// Stores discovered provider metadata.
	pub fn with_provider_info(mut self, info: Message) -> Self {
		self.provider_info = Some(info);

		self
	}

	/// Default redirect URI: the first registered one, if any.
	pub fn first_redirect_uri(&self) -> Option<&str> {
		self.redirect_uris.first().map(String::as_str)
	}
}
impl CredentialSource for ClientConfig {
	fn credential(&self, name: &str) -> Option<String> {
		match name {
			"client_secret" => self.client_secret.clone(),
			_ => None,
		}
	}
}
