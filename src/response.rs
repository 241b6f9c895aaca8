//! Response parsing and content negotiation.
//!
//! One call resolves the body encoding exactly once: the caller's expected [`BodyType`] is
//! checked against the declared content type, the body is decoded into a flat field mapping,
//! and the mapping is classified into the success shape or [`ErrorResponse`]. Classification
//! is driven solely by the presence of an `error` field; the HTTP status code never forces
//! either shape. The grant store is only touched after the message has fully verified, so a
//! failed parse leaves it untouched.
//!
//! [`ErrorResponse`]: MessageKind::ErrorResponse

// self
use crate::{
	_prelude::*,
	http::RawResponse,
	message::{Message, MessageKind},
	session::SessionInfo,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Expected response body encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
	/// `application/json` object body.
	Json,
	/// Flat `key=value` pair body.
	UrlEncoded,
}
impl BodyType {
	/// Wire-ish spelling used in error messages.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::UrlEncoded => "urlencoded",
		}
	}

	/// Encoding category implied by a declared content type, parameters already stripped.
	///
	/// `application/json` is the only JSON marker; everything else (including a missing
	/// header) is treated as URL-encoded, matching how authorization servers deliver
	/// redirect-style responses.
	pub fn implied_by(content_type: &str) -> Self {
		if content_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
			Self::Json
		} else {
			Self::UrlEncoded
		}
	}
}
impl Display for BodyType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Parses a raw endpoint response into the classified protocol message and updates the grant
/// store of `session` for state-carrying successes.
///
/// `success_kind` is the shape returned when the decoded fields carry no `error` field;
/// `body_type` is the caller's expected encoding, inferred from the declared content type when
/// unspecified.
pub fn parse_response(
	success_kind: MessageKind,
	raw: &RawResponse,
	session: &SessionInfo,
	body_type: Option<BodyType>,
) -> Result<Message> {
	let declared = raw.header_value("content-type").unwrap_or_default();
	let implied = BodyType::implied_by(declared);
	let resolved = match body_type {
		Some(expected) if expected != implied =>
			return Err(Error::WrongContentType { expected, declared: declared.into() }),
		Some(expected) => expected,
		None => implied,
	};
	let decoded = match resolved {
		BodyType::Json => Message::from_json(success_kind, &raw.text)?,
		BodyType::UrlEncoded => Message::from_urlencoded(success_kind, &raw.text)?,
	};
	let message = if decoded.contains("error") {
		decoded.reshape(MessageKind::ErrorResponse)
	} else {
		let mut message = decoded;

		message.apply_defaults();

		message
	};

	message.verify()?;

	#[cfg(feature = "tracing")]
	tracing::debug!(
		kind = %message.kind(),
		status = raw.status_code,
		encoding = resolved.as_str(),
		"classified response"
	);

	if message.kind() != MessageKind::ErrorResponse
		&& let Some(state) = message.get_str("state")
	{
		session.grant_store.upsert_from_message(&session.issuer, state, &message);
	}

	Ok(message)
}
