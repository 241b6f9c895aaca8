//! Full lifecycle against a mock provider through the blocking reqwest transport.

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_courier::{
	config::ClientConfig,
	http::ReqwestTransport,
	message::MessageKind,
	request::{RequestArgs, RequestFactory},
	response::BodyType,
	session::SessionInfo,
};

#[test]
fn token_exchange_round_trips_through_the_transport() {
	let server = MockServer::start();
	let mock = server.mock(|when, then| {
		when.method(POST)
			.path("/token")
			.header("content-type", "application/x-www-form-urlencoded")
			.body_contains("grant_type=authorization_code")
			.body_contains("code=access_code")
			.body_contains("client_id=client_id")
			.body_contains("client_secret=password");
		then.status(200).header("content-type", "application/json").body(
			r#"{"access_token":"2YotnFZFEjr1zCsicMWpAA","token_type":"Bearer","expires_in":3600,"state":"state"}"#,
		);
	});
	let descriptor = RequestFactory::new()
		.get("AccessTokenRequest")
		.expect("Token operation should be registered.")
		.with_endpoint(server.url("/token"));
	let config = ClientConfig::new("client_id")
		.with_client_secret("password")
		.with_redirect_uri("https://example.com/cli/authz_cb");
	let session = SessionInfo::new("client_id", "https://example.com/as");
	let args = RequestArgs::new()
		.with("code", "access_code")
		.with("redirect_uri", "https://example.com/cli/authz_cb");
	let transport = ReqwestTransport::default();
	let parsed = descriptor
		.do_request(&transport, &config, &args, &session, Some(BodyType::Json))
		.expect("Token exchange against the mock provider should succeed.");

	mock.assert();

	assert_eq!(parsed.kind(), MessageKind::AccessTokenResponse);
	assert_eq!(parsed.get_str("access_token"), Some("2YotnFZFEjr1zCsicMWpAA"));

	let grant = session
		.grant_store
		.get("https://example.com/as", "state")
		.expect("Token exchange should have created the grant.");

	assert_eq!(grant.access_token.as_deref(), Some("2YotnFZFEjr1zCsicMWpAA"));
}

#[test]
fn provider_discovery_round_trips_through_the_transport() {
	let server = MockServer::start();
	let issuer = server.base_url();
	let mock = server.mock(|when, then| {
		when.method(GET).path("/.well-known/openid-configuration");
		then.status(200).header("content-type", "application/json").body(format!(
			r#"{{"issuer":"{issuer}","response_types_supported":["code"],"grant_types_supported":["authorization_code"]}}"#
		));
	});
	let descriptor = RequestFactory::new()
		.get("ProviderInfoDiscovery")
		.expect("Discovery operation should be registered.");
	let config = ClientConfig::new("client_id").with_issuer(issuer.clone());
	let session = SessionInfo::new("client_id", issuer);
	let transport = ReqwestTransport::default();
	let parsed = descriptor
		.do_request(&transport, &config, &RequestArgs::new(), &session, Some(BodyType::Json))
		.expect("Discovery against the mock provider should succeed.");

	mock.assert();

	assert_eq!(parsed.kind(), MessageKind::AsConfigurationResponse);
	assert_eq!(parsed.get_str("version"), Some("3.0"));
}

#[test]
fn provider_error_payloads_surface_as_error_messages() {
	let server = MockServer::start();
	let _mock = server.mock(|when, then| {
		when.method(POST).path("/token");
		then.status(400)
			.header("content-type", "application/json")
			.body(r#"{"error":"invalid_grant","error_description":"expired code"}"#);
	});
	let descriptor = RequestFactory::new()
		.get("AccessTokenRequest")
		.expect("Token operation should be registered.")
		.with_endpoint(server.url("/token"));
	let config = ClientConfig::new("client_id").with_client_secret("password");
	let session = SessionInfo::new("client_id", "https://example.com/as");
	let args = RequestArgs::new().with("code", "stale");
	let transport = ReqwestTransport::default();
	let parsed = descriptor
		.do_request(&transport, &config, &args, &session, Some(BodyType::Json))
		.expect("Error payloads parse into the error shape rather than failing.");

	assert_eq!(parsed.kind(), MessageKind::ErrorResponse);
	assert_eq!(parsed.get_str("error"), Some("invalid_grant"));
	assert_eq!(parsed.get_str("error_description"), Some("expired code"));
	assert!(session.grant_store.is_empty());
}
