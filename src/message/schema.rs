//! Static per-kind schemas: required/optional fields, coercion kinds, and post-decode defaults.

// self
use crate::message::MessageKind;

/// Coercion target applied to a field when decoding wire text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
	/// Single UTF-8 string value.
	SingleString,
	/// Single integer value (e.g. `expires_in`).
	SingleNumber,
	/// Single boolean value.
	SingleBool,
	/// List of strings; travels as a JSON array in both encodings.
	StringList,
}

/// One field declaration inside a [`MessageSchema`].
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
	/// Wire name of the field.
	pub name: &'static str,
	/// Coercion kind used when decoding.
	pub kind: FieldKind,
	/// Whether a verified message must carry the field.
	pub required: bool,
}

/// Declarative field table for one message kind.
#[derive(Clone, Copy, Debug)]
pub struct MessageSchema {
	/// Kind the schema describes.
	pub kind: MessageKind,
	/// Declared fields, required first by convention.
	pub fields: &'static [FieldSpec],
	/// Defaults filled in after decoding when the wire payload omits them.
	pub defaults: &'static [(&'static str, &'static str)],
}
impl MessageSchema {
	/// Looks up the declaration for a field name, if the schema knows it.
	pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
		self.fields.iter().find(|spec| spec.name == name)
	}

	/// Iterates the names of all required fields.
	pub fn required(&self) -> impl Iterator<Item = &'static str> {
		self.fields.iter().filter(|spec| spec.required).map(|spec| spec.name)
	}

	/// Checks whether the schema declares the field at all.
	pub fn declares(&self, name: &str) -> bool {
		self.field(name).is_some()
	}
}

const fn req(name: &'static str) -> FieldSpec {
	FieldSpec { name, kind: FieldKind::SingleString, required: true }
}
const fn opt(name: &'static str) -> FieldSpec {
	FieldSpec { name, kind: FieldKind::SingleString, required: false }
}
const fn opt_num(name: &'static str) -> FieldSpec {
	FieldSpec { name, kind: FieldKind::SingleNumber, required: false }
}
const fn opt_list(name: &'static str) -> FieldSpec {
	FieldSpec { name, kind: FieldKind::StringList, required: false }
}

/// Schema-less carrier used by the plain `Request` operation and discovery requests.
pub static PLAIN: MessageSchema = MessageSchema { kind: MessageKind::Plain, fields: &[], defaults: &[] };

/// Front-channel authorization request.
///
/// `response_type` is declared optional so construction succeeds before the caller has picked
/// one; no configuration source can default it.
pub static AUTHORIZATION_REQUEST: MessageSchema = MessageSchema {
	kind: MessageKind::AuthorizationRequest,
	fields: &[
		req("client_id"),
		opt("response_type"),
		opt("redirect_uri"),
		opt("scope"),
		opt("state"),
		opt("nonce"),
	],
	defaults: &[],
};

/// Back-channel code-for-token exchange request.
pub static ACCESS_TOKEN_REQUEST: MessageSchema = MessageSchema {
	kind: MessageKind::AccessTokenRequest,
	fields: &[
		req("grant_type"),
		opt("code"),
		opt("redirect_uri"),
		opt("client_id"),
		opt("client_secret"),
		opt("state"),
		opt("scope"),
	],
	defaults: &[],
};

/// Refresh-token exchange request.
pub static REFRESH_ACCESS_TOKEN_REQUEST: MessageSchema = MessageSchema {
	kind: MessageKind::RefreshAccessTokenRequest,
	fields: &[
		req("grant_type"),
		req("refresh_token"),
		opt("client_id"),
		opt("client_secret"),
		opt("scope"),
	],
	defaults: &[],
};

/// Authorization endpoint success response.
pub static AUTHORIZATION_RESPONSE: MessageSchema = MessageSchema {
	kind: MessageKind::AuthorizationResponse,
	fields: &[req("code"), opt("state"), opt("iss")],
	defaults: &[],
};

/// Token endpoint success response.
pub static ACCESS_TOKEN_RESPONSE: MessageSchema = MessageSchema {
	kind: MessageKind::AccessTokenResponse,
	fields: &[
		req("access_token"),
		req("token_type"),
		opt_num("expires_in"),
		opt("refresh_token"),
		opt("scope"),
		opt("state"),
		opt("id_token"),
	],
	defaults: &[],
};

/// Protocol error response shared by every endpoint.
pub static ERROR_RESPONSE: MessageSchema = MessageSchema {
	kind: MessageKind::ErrorResponse,
	fields: &[req("error"), opt("error_description"), opt("error_uri"), opt("state")],
	defaults: &[],
};

/// Authorization server metadata document served by the discovery endpoint.
pub static AS_CONFIGURATION_RESPONSE: MessageSchema = MessageSchema {
	kind: MessageKind::AsConfigurationResponse,
	fields: &[
		req("issuer"),
		opt("version"),
		opt("authorization_endpoint"),
		opt("token_endpoint"),
		opt("jwks_uri"),
		opt("registration_endpoint"),
		opt_list("scopes_supported"),
		opt_list("response_types_supported"),
		opt_list("grant_types_supported"),
	],
	defaults: &[("version", "3.0")],
};
