//! Grant store behavior under concurrent flows.

// std
use std::{sync::Arc, thread};
// self
use oauth2_courier::{
	grant::{Grant, GrantStore},
	message::{Message, MessageKind},
};

const ISSUER: &str = "https://example.com/as";

#[test]
fn concurrent_flows_update_independent_grants() {
	let store = Arc::new(GrantStore::new());
	let handles: Vec<_> = (0..8)
		.map(|idx| {
			let store = Arc::clone(&store);

			thread::spawn(move || {
				let state = format!("state-{idx}");

				store.put(ISSUER, &state, Grant::new(ISSUER, &state));

				let response = Message::new(MessageKind::AuthorizationResponse)
					.with("code", format!("code-{idx}"))
					.with("state", state.clone());

				store.update(ISSUER, &state, &response).expect("Update should find its own grant.");
			})
		})
		.collect();

	for handle in handles {
		handle.join().expect("Grant store worker should not panic.");
	}

	assert_eq!(store.len(), 8);

	for idx in 0..8 {
		let grant = store
			.get(ISSUER, &format!("state-{idx}"))
			.expect("Every worker's grant should be present.");

		assert_eq!(grant.code.as_deref(), Some(format!("code-{idx}").as_str()));
	}
}

#[test]
fn concurrent_upserts_on_one_key_serialize_cleanly() {
	let store = Arc::new(GrantStore::new());
	let handles: Vec<_> = (0..4)
		.map(|idx| {
			let store = Arc::clone(&store);

			thread::spawn(move || {
				let response = Message::new(MessageKind::AccessTokenResponse)
					.with("access_token", format!("token-{idx}"))
					.with("token_type", "Bearer")
					.with("state", "shared");

				store.upsert_from_message(ISSUER, "shared", &response);
			})
		})
		.collect();

	for handle in handles {
		handle.join().expect("Grant store worker should not panic.");
	}

	assert_eq!(store.len(), 1);

	let grant = store.get(ISSUER, "shared").expect("Shared grant should be present.");
	let token = grant.access_token.expect("One of the writers should have won.");

	assert!(token.starts_with("token-"));
	assert_eq!(grant.token_type.as_deref(), Some("Bearer"));
}
