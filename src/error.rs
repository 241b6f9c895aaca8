//! Engine-level error types shared across messages, requests, responses, and the grant store.

// self
use crate::{_prelude::*, message::MessageKind, response::BodyType};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical engine error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The factory has no descriptor registered under the requested name.
	#[error("Unknown operation `{name}`.")]
	UnknownOperation {
		/// Operation name the caller asked for.
		name: String,
	},
	/// A required field could not be resolved during construction, or a decoded response is
	/// missing a field its schema requires.
	#[error("Message `{kind}` is missing the required field `{field}`.")]
	MissingRequiredField {
		/// Message kind whose schema was violated.
		kind: MessageKind,
		/// Field the schema requires.
		field: &'static str,
	},
	/// The response declared a content type that does not match the expected body encoding.
	#[error("Expected a {expected} body but the response declared `{declared}`.")]
	WrongContentType {
		/// Encoding the caller asked for.
		expected: BodyType,
		/// Content type the server declared, parameters stripped.
		declared: String,
	},
	/// The response body could not be decoded with the resolved encoding.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// No grant exists under the requested issuer + state pair.
	#[error("No grant found for issuer `{issuer}` and state `{state}`.")]
	NotFound {
		/// Issuer scope of the lookup.
		issuer: String,
		/// State value of the lookup.
		state: String,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure reported by the injected HTTP collaborator.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Malformed-body failures raised while decoding a response.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON body could not be parsed into a flat field mapping.
	#[error("Response body is not valid JSON.")]
	Json(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// JSON body parsed but is not an object of schema-compatible leaf values.
	#[error("JSON value at `{path}` does not fit the message schema.")]
	UnsupportedJsonValue {
		/// Field path of the offending value.
		path: String,
	},
	/// URL-encoded body contains a pair that is not valid for the target field.
	#[error("URL-encoded value for `{field}` could not be coerced: {reason}.")]
	Coerce {
		/// Field whose value failed coercion.
		field: String,
		/// Human-readable coercion failure.
		reason: String,
	},
}

/// Configuration and validation failures raised while building requests.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Descriptor needs an endpoint but neither the descriptor nor the caller supplied one.
	#[error("Operation `{operation}` has no endpoint configured.")]
	MissingEndpoint {
		/// Operation whose endpoint is unresolved.
		operation: &'static str,
	},
	/// Discovery requires an issuer but the client configuration has none.
	#[error("Client configuration has no issuer; provider discovery needs one.")]
	MissingIssuer,
	/// Resolved endpoint is not a valid URL.
	#[error("Endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Transport-level failures surfaced by [`Transport`](crate::http::Transport) implementations.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
