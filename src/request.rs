//! Request descriptors, the operation factory, and the request builder.
//!
//! A [`RequestDescriptor`] is the static definition of one protocol operation: which HTTP
//! method and body encoding it uses, where each field comes from, and how its endpoint is
//! resolved. [`RequestFactory`] maps operation names to descriptor prototypes; construction
//! then merges configuration defaults, descriptor constants, and caller arguments into a
//! schema-checked [`Message`] and a transport-ready [`TransportEnvelope`].

// self
use crate::{
	_prelude::*,
	config::{ClientConfig, CredentialSource},
	error::ConfigError,
	http::{HttpMethod, Transport, WireRequest},
	message::{FieldValue, Message, MessageKind},
	response::{self, BodyType},
	session::SessionInfo,
};

/// Well-known discovery path appended to the issuer.
pub const WELL_KNOWN_PATH: &str = "/.well-known/openid-configuration";

/// Body encoding used when an operation sends a request body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
	/// Operation sends no body; parameters travel in the query string.
	#[default]
	None,
	/// `application/x-www-form-urlencoded` body.
	UrlEncoded,
	/// `application/json` body.
	Json,
}
impl BodyEncoding {
	/// Content type declared for the encoding, if any.
	pub fn content_type(self) -> Option<&'static str> {
		match self {
			Self::None => None,
			Self::UrlEncoded => Some("application/x-www-form-urlencoded"),
			Self::Json => Some("application/json"),
		}
	}
}

/// Where a declaratively sourced field comes from when the caller does not supply it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSource {
	/// The configured client identifier.
	ConfigClientId,
	/// First registered redirect URI.
	FirstRedirectUri,
	/// Named credential pulled through [`CredentialSource`].
	Credential(&'static str),
	/// Fixed protocol constant (e.g. `grant_type`).
	Constant(&'static str),
}

/// One row of a descriptor's field-sourcing table.
///
/// Caller arguments always win over every source listed here; the table only fills gaps.
#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
	/// Field name to populate.
	pub name: &'static str,
	/// Fallback source consulted when the caller did not supply the field.
	pub source: FieldSource,
	/// Whether construction must end with the field resolved from some source.
	pub required: bool,
}

const fn rule(name: &'static str, source: FieldSource, required: bool) -> FieldRule {
	FieldRule { name, source, required }
}

/// How the operation's endpoint is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointSource {
	/// From an explicit override or the named provider-metadata field.
	Metadata(&'static str),
	/// Computed as `{issuer}{WELL_KNOWN_PATH}`.
	Discovery,
	/// Only an explicit override is accepted.
	ExplicitOnly,
}

/// Caller-supplied request arguments; highest-precedence field source.
#[derive(Clone, Debug, Default)]
pub struct RequestArgs(BTreeMap<String, FieldValue>);
impl RequestArgs {
	/// Creates an empty argument set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces an argument.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.0.insert(name.into(), value.into());
	}

	/// Builder-style [`set`](Self::set).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		self.set(name, value);

		self
	}

	/// Iterates `(name, value)` pairs in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.0.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Whether no arguments were supplied.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Transport-ready output of request construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportEnvelope {
	/// HTTP method the transport must use.
	pub method: HttpMethod,
	/// Request URI; carries the query string for bodyless operations.
	pub uri: String,
	/// Request body; populated only for operations that send one.
	pub body: Option<String>,
	/// The constructed message the envelope was serialized from.
	pub message: Message,
	/// Header arguments implied by the encoding.
	pub header_args: HashMap<String, String>,
}
impl TransportEnvelope {
	/// Flattens the envelope into a [`WireRequest`] with the given extra headers merged in.
	pub fn wire_request(&self, extra_headers: &HashMap<String, String>) -> WireRequest {
		let mut headers = self.header_args.clone();

		headers.extend(extra_headers.iter().map(|(k, v)| (k.clone(), v.clone())));

		WireRequest {
			method: self.method,
			uri: self.uri.clone(),
			body: self.body.clone(),
			headers,
		}
	}
}

/// Envelope augmented with transport arguments and algorithm-negotiation metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiatedRequest {
	/// The underlying envelope.
	pub envelope: TransportEnvelope,
	/// Extra transport arguments; empty unless the caller adds any.
	pub http_args: HashMap<String, String>,
	/// Algorithm-negotiation metadata declared by the descriptor; empty by default.
	pub algs: BTreeMap<String, String>,
}
impl InitiatedRequest {
	/// Flattens the initiated request into a [`WireRequest`].
	pub fn wire_request(&self) -> WireRequest {
		self.envelope.wire_request(&self.http_args)
	}
}

/// Static definition of one protocol operation's shape and encoding rules.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
	operation: &'static str,
	request_kind: MessageKind,
	response_kind: MessageKind,
	method: HttpMethod,
	body_encoding: BodyEncoding,
	endpoint_source: EndpointSource,
	rules: &'static [FieldRule],
	endpoint: Option<String>,
	algs: BTreeMap<String, String>,
}
impl RequestDescriptor {
	/// Registry name of the operation.
	pub fn operation(&self) -> &'static str {
		self.operation
	}

	/// Message kind produced by [`construct`](Self::construct).
	pub fn request_kind(&self) -> MessageKind {
		self.request_kind
	}

	/// Success message kind expected from the endpoint.
	pub fn response_kind(&self) -> MessageKind {
		self.response_kind
	}

	/// HTTP method of the operation.
	pub fn method(&self) -> HttpMethod {
		self.method
	}

	/// Overrides the endpoint for this descriptor instance.
	pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
		self.endpoint = Some(endpoint.into());
	}

	/// Builder-style [`set_endpoint`](Self::set_endpoint).
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.set_endpoint(endpoint);

		self
	}

	/// Declares an algorithm-negotiation entry carried by [`do_request_init`](Self::do_request_init).
	pub fn set_alg(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.algs.insert(name.into(), value.into());
	}

	/// Builds the request message by merging sourcing-table defaults with caller arguments.
	///
	/// Caller arguments override every table source; the tie-break holds for all descriptors.
	pub fn construct(&self, config: &ClientConfig, args: &RequestArgs) -> Result<Message> {
		let mut message = Message::new(self.request_kind);

		for rule in self.rules {
			let value = match rule.source {
				FieldSource::ConfigClientId => Some(config.client_id.clone()),
				FieldSource::FirstRedirectUri =>
					config.first_redirect_uri().map(ToOwned::to_owned),
				FieldSource::Credential(name) => config.credential(name),
				FieldSource::Constant(value) => Some(value.into()),
			};

			if let Some(value) = value {
				message.set(rule.name, value);
			}
		}
		for (name, value) in args.iter() {
			message.set(name, value.clone());
		}
		for rule in self.rules {
			if rule.required && !message.contains(rule.name) {
				return Err(Error::MissingRequiredField {
					kind: self.request_kind,
					field: rule.name,
				});
			}
		}

		message.verify()?;

		#[cfg(feature = "tracing")]
		tracing::debug!(operation = self.operation, fields = message.len(), "constructed request");

		Ok(message)
	}

	/// Builds the transport envelope: constructed message serialized per the encoding rule.
	pub fn request_info(&self, config: &ClientConfig, args: &RequestArgs) -> Result<TransportEnvelope> {
		let message = self.construct(config, args)?;
		let endpoint = self.resolve_endpoint(config)?;
		let mut header_args = HashMap::new();
		let (uri, body) = match self.body_encoding {
			BodyEncoding::None => {
				let uri = if message.is_empty() {
					endpoint
				} else {
					format!("{endpoint}?{}", message.to_urlencoded())
				};

				(uri, None)
			},
			BodyEncoding::UrlEncoded => (endpoint, Some(message.to_urlencoded())),
			BodyEncoding::Json => (endpoint, Some(message.to_json())),
		};

		if body.is_some()
			&& let Some(content_type) = self.body_encoding.content_type()
		{
			header_args.insert("Content-Type".into(), content_type.into());
		}

		Ok(TransportEnvelope { method: self.method, uri, body, message, header_args })
	}

	/// Builds the envelope and augments it with transport arguments and declared algorithms.
	pub fn do_request_init(
		&self,
		config: &ClientConfig,
		args: &RequestArgs,
	) -> Result<InitiatedRequest> {
		let envelope = self.request_info(config, args)?;

		Ok(InitiatedRequest { envelope, http_args: HashMap::new(), algs: self.algs.clone() })
	}

	/// Parses a raw endpoint response into the classified protocol message.
	///
	/// See [`response::parse_response`] for the negotiation and classification rules; the
	/// expected success shape is this descriptor's [`response_kind`](Self::response_kind).
	pub fn parse_request_response(
		&self,
		raw: &crate::http::RawResponse,
		session: &SessionInfo,
		body_type: Option<BodyType>,
	) -> Result<Message> {
		response::parse_response(self.response_kind, raw, session, body_type)
	}

	/// Runs the full lifecycle: init, dispatch over the transport, parse.
	pub fn do_request(
		&self,
		transport: &dyn Transport,
		config: &ClientConfig,
		args: &RequestArgs,
		session: &SessionInfo,
		body_type: Option<BodyType>,
	) -> Result<Message> {
		let initiated = self.do_request_init(config, args)?;
		let raw = transport.call(&initiated.wire_request())?;

		self.parse_request_response(&raw, session, body_type)
	}

	/// Extracts the parameter section of a URI: the query string, or the fragment when the
	/// response rode back on a fragment-encoded redirect.
	pub fn get_urlinfo(uri: &str) -> &str {
		uri.split_once('?').or_else(|| uri.split_once('#')).map(|(_, rest)| rest).unwrap_or(uri)
	}

	fn resolve_endpoint(&self, config: &ClientConfig) -> Result<String> {
		let endpoint = match self.endpoint_source {
			EndpointSource::Discovery => {
				let issuer = config.issuer.as_deref().ok_or(ConfigError::MissingIssuer)?;

				format!("{}{WELL_KNOWN_PATH}", issuer.trim_end_matches('/'))
			},
			EndpointSource::Metadata(field) => match &self.endpoint {
				Some(endpoint) => endpoint.clone(),
				None => config
					.provider_info
					.as_ref()
					.and_then(|info| info.get_str(field))
					.map(ToOwned::to_owned)
					.ok_or(ConfigError::MissingEndpoint { operation: self.operation })?,
			},
			EndpointSource::ExplicitOnly => self
				.endpoint
				.clone()
				.ok_or(ConfigError::MissingEndpoint { operation: self.operation })?,
		};

		Url::parse(&endpoint).map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(endpoint)
	}
}

static AUTHORIZATION_RULES: &[FieldRule] = &[
	rule("client_id", FieldSource::ConfigClientId, true),
	rule("redirect_uri", FieldSource::FirstRedirectUri, false),
];
static ACCESS_TOKEN_RULES: &[FieldRule] = &[
	rule("client_id", FieldSource::ConfigClientId, true),
	rule("client_secret", FieldSource::Credential("client_secret"), false),
	rule("grant_type", FieldSource::Constant("authorization_code"), true),
];
static REFRESH_TOKEN_RULES: &[FieldRule] = &[
	rule("client_id", FieldSource::ConfigClientId, true),
	rule("client_secret", FieldSource::Credential("client_secret"), false),
	rule("grant_type", FieldSource::Constant("refresh_token"), true),
];

fn builtin_descriptors() -> [(&'static str, RequestDescriptor); 5] {
	[
		("Request", RequestDescriptor {
			operation: "Request",
			request_kind: MessageKind::Plain,
			response_kind: MessageKind::Plain,
			method: HttpMethod::Get,
			body_encoding: BodyEncoding::None,
			endpoint_source: EndpointSource::ExplicitOnly,
			rules: &[],
			endpoint: None,
			algs: BTreeMap::new(),
		}),
		("AuthorizationRequest", RequestDescriptor {
			operation: "AuthorizationRequest",
			request_kind: MessageKind::AuthorizationRequest,
			response_kind: MessageKind::AuthorizationResponse,
			method: HttpMethod::Get,
			body_encoding: BodyEncoding::None,
			endpoint_source: EndpointSource::Metadata("authorization_endpoint"),
			rules: AUTHORIZATION_RULES,
			endpoint: None,
			algs: BTreeMap::new(),
		}),
		("AccessTokenRequest", RequestDescriptor {
			operation: "AccessTokenRequest",
			request_kind: MessageKind::AccessTokenRequest,
			response_kind: MessageKind::AccessTokenResponse,
			method: HttpMethod::Post,
			body_encoding: BodyEncoding::UrlEncoded,
			endpoint_source: EndpointSource::Metadata("token_endpoint"),
			rules: ACCESS_TOKEN_RULES,
			endpoint: None,
			algs: BTreeMap::new(),
		}),
		("RefreshAccessTokenRequest", RequestDescriptor {
			operation: "RefreshAccessTokenRequest",
			request_kind: MessageKind::RefreshAccessTokenRequest,
			response_kind: MessageKind::AccessTokenResponse,
			method: HttpMethod::Post,
			body_encoding: BodyEncoding::UrlEncoded,
			endpoint_source: EndpointSource::Metadata("token_endpoint"),
			rules: REFRESH_TOKEN_RULES,
			endpoint: None,
			algs: BTreeMap::new(),
		}),
		("ProviderInfoDiscovery", RequestDescriptor {
			operation: "ProviderInfoDiscovery",
			request_kind: MessageKind::Plain,
			response_kind: MessageKind::AsConfigurationResponse,
			method: HttpMethod::Get,
			body_encoding: BodyEncoding::None,
			endpoint_source: EndpointSource::Discovery,
			rules: &[],
			endpoint: None,
			algs: BTreeMap::new(),
		}),
	]
}

/// Registry mapping operation names to descriptor prototypes.
///
/// The built-in set covers the operation kinds the engine ships with; [`register`](Self::register)
/// extends the registry without touching lookup semantics.
#[derive(Clone, Debug)]
pub struct RequestFactory(HashMap<&'static str, RequestDescriptor>);
impl RequestFactory {
	/// Creates a factory preloaded with the built-in operations.
	pub fn new() -> Self {
		Self(builtin_descriptors().into_iter().collect())
	}

	/// Returns a fresh descriptor instance for the named operation.
	pub fn get(&self, name: &str) -> Result<RequestDescriptor> {
		self.0.get(name).cloned().ok_or_else(|| Error::UnknownOperation { name: name.into() })
	}

	/// Registers (or replaces) a descriptor prototype.
	pub fn register(&mut self, name: &'static str, descriptor: RequestDescriptor) {
		self.0.insert(name, descriptor);
	}

	/// Iterates registered operation names.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.0.keys().copied()
	}
}
impl Default for RequestFactory {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn test_config() -> ClientConfig {
		ClientConfig::new("client_id")
			.with_client_secret("password")
			.with_redirect_uri("https://example.com/cli/authz_cb")
	}

	#[test]
	fn factory_rejects_unknown_operations() {
		let factory = RequestFactory::new();
		let err = factory.get("IntrospectionRequest").expect_err("Unregistered name should fail.");

		assert!(matches!(err, Error::UnknownOperation { .. }));
	}

	#[test]
	fn factory_supports_registration() {
		let mut factory = RequestFactory::new();
		let custom = factory
			.get("Request")
			.expect("Plain request descriptor should be registered.")
			.with_endpoint("https://example.com/introspect");

		factory.register("IntrospectionRequest", custom);

		factory
			.get("IntrospectionRequest")
			.expect("Registered descriptor should resolve by name.");
	}

	#[test]
	fn args_override_config_sourced_fields() {
		let descriptor = RequestFactory::new()
			.get("AuthorizationRequest")
			.expect("Authorization descriptor should be registered.");
		let args = RequestArgs::new()
			.with("redirect_uri", "https://example.com/cli/override_cb")
			.with("client_id", "other_client");
		let message = descriptor
			.construct(&test_config(), &args)
			.expect("Construction with overrides should succeed.");

		assert_eq!(message.get_str("client_id"), Some("other_client"));
		assert_eq!(message.get_str("redirect_uri"), Some("https://example.com/cli/override_cb"));
	}

	#[test]
	fn construct_output_is_rules_plus_caller_args() {
		let descriptor = RequestFactory::new()
			.get("AuthorizationRequest")
			.expect("Authorization descriptor should be registered.");
		let args = RequestArgs::new().with("foo", "bar");
		let message = descriptor
			.construct(&test_config(), &args)
			.expect("Construction should succeed.");

		assert_eq!(message.keys().collect::<Vec<_>>(), vec!["client_id", "foo", "redirect_uri"]);
	}

	#[test]
	fn refresh_descriptor_requires_refresh_token() {
		let descriptor = RequestFactory::new()
			.get("RefreshAccessTokenRequest")
			.expect("Refresh descriptor should be registered.");
		let err = descriptor
			.construct(&test_config(), &RequestArgs::new())
			.expect_err("Missing refresh_token should fail construction.");

		assert!(matches!(
			err,
			Error::MissingRequiredField { field: "refresh_token", .. }
		));

		let message = descriptor
			.construct(&test_config(), &RequestArgs::new().with("refresh_token", "rt"))
			.expect("Construction with a refresh token should succeed.");

		assert_eq!(message.get_str("grant_type"), Some("refresh_token"));
	}

	#[test]
	fn request_info_requires_a_resolvable_endpoint() {
		let descriptor = RequestFactory::new()
			.get("AuthorizationRequest")
			.expect("Authorization descriptor should be registered.");
		let err = descriptor
			.request_info(&test_config(), &RequestArgs::new())
			.expect_err("No endpoint and no provider metadata should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingEndpoint { .. })));
	}

	#[test]
	fn request_info_falls_back_to_provider_metadata() {
		let descriptor = RequestFactory::new()
			.get("AccessTokenRequest")
			.expect("Token descriptor should be registered.");
		let provider_info = Message::new(MessageKind::AsConfigurationResponse)
			.with("issuer", "https://example.com/as")
			.with("token_endpoint", "https://example.com/as/token");
		let config = test_config().with_provider_info(provider_info);
		let envelope = descriptor
			.request_info(&config, &RequestArgs::new().with("code", "c"))
			.expect("Metadata-resolved endpoint should succeed.");

		assert_eq!(envelope.uri, "https://example.com/as/token");
	}

	#[test]
	fn invalid_endpoint_overrides_are_rejected() {
		let descriptor = RequestFactory::new()
			.get("AuthorizationRequest")
			.expect("Authorization descriptor should be registered.")
			.with_endpoint("not a url");
		let err = descriptor
			.request_info(&test_config(), &RequestArgs::new())
			.expect_err("Unparseable endpoint should fail.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidEndpoint { .. })));
	}

	#[test]
	fn do_request_init_carries_declared_algs() {
		let mut descriptor = RequestFactory::new()
			.get("AccessTokenRequest")
			.expect("Token descriptor should be registered.")
			.with_endpoint("https://example.com/token");

		descriptor.set_alg("sign", "RS256");

		let initiated = descriptor
			.do_request_init(&test_config(), &RequestArgs::new().with("code", "c"))
			.expect("Initialization should succeed.");

		assert!(initiated.http_args.is_empty());
		assert_eq!(initiated.algs.get("sign").map(String::as_str), Some("RS256"));

		let wire = initiated.wire_request();

		assert_eq!(wire.method, HttpMethod::Post);
		assert_eq!(
			wire.headers.get("Content-Type").map(String::as_str),
			Some("application/x-www-form-urlencoded")
		);
	}

	#[test]
	fn get_urlinfo_extracts_query_and_fragment() {
		assert_eq!(
			RequestDescriptor::get_urlinfo("https://example.com/authorize?code=c&state=s"),
			"code=c&state=s"
		);
		assert_eq!(
			RequestDescriptor::get_urlinfo("https://example.com/cb#access_token=t"),
			"access_token=t"
		);
		assert_eq!(RequestDescriptor::get_urlinfo("code=c"), "code=c");
	}

	#[test]
	fn discovery_endpoint_follows_the_well_known_convention() {
		let descriptor = RequestFactory::new()
			.get("ProviderInfoDiscovery")
			.expect("Discovery descriptor should be registered.");
		let config = test_config().with_issuer("https://example.com/as/");
		let envelope = descriptor
			.request_info(&config, &RequestArgs::new())
			.expect("Discovery envelope should build.");

		assert_eq!(envelope.uri, "https://example.com/as/.well-known/openid-configuration");
		assert_eq!(envelope.body, None);
		assert!(envelope.message.is_empty());
		assert!(envelope.header_args.is_empty());
	}

	#[test]
	fn discovery_without_issuer_fails() {
		let descriptor = RequestFactory::new()
			.get("ProviderInfoDiscovery")
			.expect("Discovery descriptor should be registered.");
		let err = descriptor
			.request_info(&test_config(), &RequestArgs::new())
			.expect_err("Discovery without an issuer should fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingIssuer)));
	}
}
