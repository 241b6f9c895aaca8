//! Client-side OAuth 2.0/OIDC protocol engine—schema-checked messages, declarative request
//! descriptors, content-negotiated response parsing, and issuer-scoped grant tracking behind a
//! pluggable transport.
//!
//! The crate never opens a network connection itself. Callers resolve an operation through
//! [`request::RequestFactory`], hand the resulting [`request::TransportEnvelope`] to any
//! [`http::Transport`] implementation, then feed the raw response back through
//! [`request::RequestDescriptor::parse_request_response`] to obtain a typed protocol message
//! and keep the [`grant::GrantStore`] in sync.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod message;
pub mod request;
pub mod response;
pub mod session;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use httpmock as _;
