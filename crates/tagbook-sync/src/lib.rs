//! # tagbook-sync
//!
//! Remote adapters for tagbook: the HTTP note API client, the HTTP auth
//! provider, and deterministic mocks used by the store's tests.
//!
//! Both HTTP adapters read their base URL from `TAGBOOK_API_BASE` via
//! `from_env`, attach the bearer credential to every call, and treat any
//! call exceeding the 10 second bound as a definitive failure.

pub mod auth;
pub mod http;
pub mod mock;

pub use auth::HttpAuthProvider;
pub use http::HttpNoteApi;
pub use mock::{MockAuthProvider, MockCall, MockNoteApi};
