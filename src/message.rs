//! Protocol message type plus the schema registry constraining it.
//!
//! A [`Message`] is an ordered field mapping tagged with its [`MessageKind`]; the kind's
//! [`MessageSchema`] drives required-field verification, wire-value coercion, and post-decode
//! defaults. Both wire encodings round-trip: decoding the serialized form of a message through
//! the same schema reproduces an equal field mapping.

pub mod schema;

pub use schema::{FieldKind, FieldSpec, MessageSchema};

// std
use std::collections::btree_map;
// crates.io
use serde_json::{Map as JsonMap, Value as JsonValue};
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::DecodeError};

/// Closed set of message kinds the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
	/// Schema-less message; every field optional.
	Plain,
	/// Front-channel authorization request.
	AuthorizationRequest,
	/// Code-for-token exchange request.
	AccessTokenRequest,
	/// Refresh-token exchange request.
	RefreshAccessTokenRequest,
	/// Authorization endpoint success response.
	AuthorizationResponse,
	/// Token endpoint success response.
	AccessTokenResponse,
	/// Protocol error response.
	ErrorResponse,
	/// Authorization server metadata document.
	AsConfigurationResponse,
}
impl MessageKind {
	/// Returns the static schema bound to this kind.
	pub fn schema(self) -> &'static MessageSchema {
		match self {
			Self::Plain => &schema::PLAIN,
			Self::AuthorizationRequest => &schema::AUTHORIZATION_REQUEST,
			Self::AccessTokenRequest => &schema::ACCESS_TOKEN_REQUEST,
			Self::RefreshAccessTokenRequest => &schema::REFRESH_ACCESS_TOKEN_REQUEST,
			Self::AuthorizationResponse => &schema::AUTHORIZATION_RESPONSE,
			Self::AccessTokenResponse => &schema::ACCESS_TOKEN_RESPONSE,
			Self::ErrorResponse => &schema::ERROR_RESPONSE,
			Self::AsConfigurationResponse => &schema::AS_CONFIGURATION_RESPONSE,
		}
	}

	/// Human-readable kind name matching the operation registry.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Plain => "Message",
			Self::AuthorizationRequest => "AuthorizationRequest",
			Self::AccessTokenRequest => "AccessTokenRequest",
			Self::RefreshAccessTokenRequest => "RefreshAccessTokenRequest",
			Self::AuthorizationResponse => "AuthorizationResponse",
			Self::AccessTokenResponse => "AccessTokenResponse",
			Self::ErrorResponse => "ErrorResponse",
			Self::AsConfigurationResponse => "ASConfigurationResponse",
		}
	}
}
impl Display for MessageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Leaf value carried by a message field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	/// UTF-8 string.
	String(String),
	/// Integer.
	Number(i64),
	/// Boolean.
	Bool(bool),
	/// List of strings.
	List(Vec<String>),
}
impl FieldValue {
	/// Returns the string payload when the value is a string.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	/// Renders the value as flat wire text for the URL-encoded encoding.
	///
	/// Lists travel as JSON-array text inside a single pair, so the flat encoding stays free
	/// of nesting.
	pub fn to_wire(&self) -> String {
		match self {
			Self::String(s) => s.clone(),
			Self::Number(n) => n.to_string(),
			Self::Bool(b) => b.to_string(),
			Self::List(items) =>
				serde_json::to_string(items).unwrap_or_else(|_| String::from("[]")),
		}
	}

	fn to_json_value(&self) -> JsonValue {
		match self {
			Self::String(s) => JsonValue::String(s.clone()),
			Self::Number(n) => JsonValue::Number((*n).into()),
			Self::Bool(b) => JsonValue::Bool(*b),
			Self::List(items) =>
				JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect()),
		}
	}

	fn from_json_value(path: &str, value: JsonValue) -> Result<Self, DecodeError> {
		match value {
			JsonValue::String(s) => Ok(Self::String(s)),
			JsonValue::Bool(b) => Ok(Self::Bool(b)),
			JsonValue::Number(n) => n
				.as_i64()
				.map(Self::Number)
				.ok_or_else(|| DecodeError::UnsupportedJsonValue { path: path.into() }),
			JsonValue::Array(items) => {
				let mut list = Vec::with_capacity(items.len());

				for item in items {
					match item {
						JsonValue::String(s) => list.push(s),
						_ =>
							return Err(DecodeError::UnsupportedJsonValue { path: path.into() }),
					}
				}

				Ok(Self::List(list))
			},
			JsonValue::Null | JsonValue::Object(_) =>
				Err(DecodeError::UnsupportedJsonValue { path: path.into() }),
		}
	}

	fn coerce(field: &str, kind: FieldKind, raw: &str) -> Result<Self, DecodeError> {
		match kind {
			FieldKind::SingleString => Ok(Self::String(raw.into())),
			FieldKind::SingleNumber => raw.parse().map(Self::Number).map_err(|_| {
				DecodeError::Coerce { field: field.into(), reason: "not an integer".into() }
			}),
			FieldKind::SingleBool => match raw {
				"true" => Ok(Self::Bool(true)),
				"false" => Ok(Self::Bool(false)),
				_ => Err(DecodeError::Coerce {
					field: field.into(),
					reason: "not a boolean".into(),
				}),
			},
			FieldKind::StringList => serde_json::from_str(raw).map(Self::List).map_err(|_| {
				DecodeError::Coerce {
					field: field.into(),
					reason: "not a JSON string array".into(),
				}
			}),
		}
	}
}
impl From<&str> for FieldValue {
	fn from(s: &str) -> Self {
		Self::String(s.into())
	}
}
impl From<String> for FieldValue {
	fn from(s: String) -> Self {
		Self::String(s)
	}
}
impl From<i64> for FieldValue {
	fn from(n: i64) -> Self {
		Self::Number(n)
	}
}
impl From<Vec<String>> for FieldValue {
	fn from(items: Vec<String>) -> Self {
		Self::List(items)
	}
}

/// Ordered field mapping constrained by the schema of its kind.
///
/// Fields the schema does not declare are preserved untouched; protocol extensions routinely
/// piggyback extra parameters on standard messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
	kind: MessageKind,
	fields: BTreeMap<String, FieldValue>,
}
impl Message {
	/// Creates an empty message of the given kind.
	pub fn new(kind: MessageKind) -> Self {
		Self { kind, fields: BTreeMap::new() }
	}

	/// Kind tag of the message.
	pub fn kind(&self) -> MessageKind {
		self.kind
	}

	/// Inserts or replaces a field.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
		self.fields.insert(name.into(), value.into());
	}

	/// Builder-style [`set`](Self::set).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		self.set(name, value);

		self
	}

	/// Returns a field value, if present.
	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.fields.get(name)
	}

	/// Returns a field's string payload, if present and a string.
	pub fn get_str(&self, name: &str) -> Option<&str> {
		self.fields.get(name).and_then(FieldValue::as_str)
	}

	/// Checks field presence.
	pub fn contains(&self, name: &str) -> bool {
		self.fields.contains_key(name)
	}

	/// Iterates field names in order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(String::as_str)
	}

	/// Iterates `(name, value)` pairs in order.
	pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
		self.fields.iter()
	}

	/// Number of fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the message carries no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Verifies that every field the schema requires is present.
	pub fn verify(&self) -> Result<()> {
		for name in self.kind.schema().required() {
			if !self.fields.contains_key(name) {
				return Err(Error::MissingRequiredField { kind: self.kind, field: name });
			}
		}

		Ok(())
	}

	/// Fills in schema defaults for fields the wire payload omitted.
	pub fn apply_defaults(&mut self) {
		for &(name, value) in self.kind.schema().defaults {
			self.fields.entry(name.into()).or_insert_with(|| FieldValue::String(value.into()));
		}
	}

	/// Rebuilds the message as `kind`, keeping only fields the target schema declares.
	///
	/// Used when reclassifying decoded fields into the error shape.
	pub fn reshape(&self, kind: MessageKind) -> Self {
		let schema = kind.schema();
		let fields = self
			.fields
			.iter()
			.filter(|(name, _)| schema.declares(name))
			.map(|(name, value)| (name.clone(), value.clone()))
			.collect();

		Self { kind, fields }
	}

	/// Serializes the message as `application/x-www-form-urlencoded` pairs.
	pub fn to_urlencoded(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (name, value) in &self.fields {
			serializer.append_pair(name, &value.to_wire());
		}

		serializer.finish()
	}

	/// Decodes URL-encoded pairs into a message of the given kind.
	///
	/// Values are coerced per the schema's field kinds; undeclared fields stay strings.
	pub fn from_urlencoded(kind: MessageKind, raw: &str) -> Result<Self> {
		let schema = kind.schema();
		let mut message = Self::new(kind);

		for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
			let field_kind =
				schema.field(&name).map(|spec| spec.kind).unwrap_or(FieldKind::SingleString);
			let coerced = FieldValue::coerce(&name, field_kind, &value)?;

			message.fields.insert(name.into_owned(), coerced);
		}

		Ok(message)
	}

	/// Serializes the message as a JSON object.
	pub fn to_json(&self) -> String {
		let map: JsonMap<String, JsonValue> = self
			.fields
			.iter()
			.map(|(name, value)| (name.clone(), value.to_json_value()))
			.collect();

		JsonValue::Object(map).to_string()
	}

	/// Decodes a JSON object into a message of the given kind.
	pub fn from_json(kind: MessageKind, raw: &str) -> Result<Self> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);
		let value: JsonValue =
			serde_path_to_error::deserialize(&mut deserializer).map_err(DecodeError::Json)?;
		let JsonValue::Object(map) = value else {
			return Err(DecodeError::UnsupportedJsonValue { path: ".".into() }.into());
		};
		let mut message = Self::new(kind);

		for (name, value) in map {
			let coerced = FieldValue::from_json_value(&name, value)?;

			message.fields.insert(name, coerced);
		}

		Ok(message)
	}
}
