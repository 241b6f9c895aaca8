//! Transport seam: wire request/response structs and the pluggable [`Transport`] capability.
//!
//! The engine builds a [`WireRequest`] and parses a [`RawResponse`]; everything in between
//! (connections, TLS, retries, timeouts) belongs to the injected transport implementation.

// self
use crate::{_prelude::*, error::TransportError};

/// HTTP method used by a request descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
	/// Parameters travel in the URI query string.
	#[default]
	Get,
	/// Parameters travel in the request body.
	Post,
}
impl HttpMethod {
	/// Wire spelling of the method.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully resolved request handed to a [`Transport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute request URI, query string included for GET-style operations.
	pub uri: String,
	/// Request body for POST-style operations.
	pub body: Option<String>,
	/// Headers the transport must send.
	pub headers: HashMap<String, String>,
}

/// Raw HTTP-like response handed back to the engine for parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status_code: u16,
	/// Body text.
	pub text: String,
	/// Response headers, names as received.
	pub headers: HashMap<String, String>,
}
impl RawResponse {
	/// Creates a response with a single `content-type` header.
	pub fn new(status_code: u16, text: impl Into<String>, content_type: &str) -> Self {
		let mut headers = HashMap::new();

		headers.insert("content-type".into(), content_type.into());

		Self { status_code, text: text.into(), headers }
	}

	/// Looks up a header case-insensitively and strips its parameters (`; charset=...`).
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.split(';').next().unwrap_or(value).trim())
	}
}

/// Pluggable HTTP transport capability.
///
/// Implementations own every network concern; the engine calls them synchronously and never
/// retries. Must be `Send + Sync` so one transport can serve concurrent flows.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Executes the request and returns the raw response.
	fn call(&self, request: &WireRequest) -> Result<RawResponse, TransportError>;
}

/// Blocking reqwest-backed [`Transport`].
#[cfg(feature = "reqwest")]
#[derive(Debug, Default)]
pub struct ReqwestTransport(reqwest::blocking::Client);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing blocking client.
	pub fn with_client(client: reqwest::blocking::Client) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn call(&self, request: &WireRequest) -> Result<RawResponse, TransportError> {
		let mut builder = match request.method {
			HttpMethod::Get => self.0.get(&request.uri),
			HttpMethod::Post => self.0.post(&request.uri),
		};

		for (name, value) in &request.headers {
			builder = builder.header(name, value);
		}
		if let Some(body) = &request.body {
			builder = builder.body(body.clone());
		}

		let response = builder.send()?;
		let status_code = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.to_string(), value.to_string()))
			})
			.collect();
		let text = response.text()?;

		Ok(RawResponse { status_code, text, headers })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn header_lookup_is_case_insensitive_and_strips_parameters() {
		let mut headers = HashMap::new();

		headers.insert("Content-Type".into(), "application/json; charset=utf-8".into());

		let response = RawResponse { status_code: 200, text: String::new(), headers };

		assert_eq!(response.header_value("content-type"), Some("application/json"));
		assert_eq!(response.header_value("retry-after"), None);
	}
}
