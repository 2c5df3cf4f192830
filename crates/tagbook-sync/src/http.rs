//! HTTP implementation of the remote note API.
//!
//! Maps the owner-scoped note endpoints to [`NoteApi`]: `GET /notes`
//! (envelope `{"notes": [...]}`, newest-updated-first), `GET /notes/:id`,
//! `GET /notes/tag/:name`, `POST /notes`, `PATCH /notes/:id`,
//! `DELETE /notes/:id`. Every call attaches the bearer credential and is
//! bounded by the 10 second client timeout.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use tagbook_core::defaults::{API_BASE_URL, API_TIMEOUT_SECS};
use tagbook_core::{Error, Note, NoteApi, NoteId, NotePayload, Result};

/// Environment variable overriding the remote API base URL.
pub const API_BASE_ENV: &str = "TAGBOOK_API_BASE";

#[derive(Debug, Deserialize)]
struct NotesEnvelope {
    #[serde(default)]
    notes: Vec<Note>,
}

/// HTTP client for the remote note store.
pub struct HttpNoteApi {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpNoteApi {
    /// Create a client against a base URL. A trailing slash is stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Create from environment variables (`TAGBOOK_API_BASE`), falling back
    /// to the default base URL.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_BASE_ENV).unwrap_or_else(|_| API_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Set or clear the bearer credential attached to every call.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().expect("token lock poisoned") = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.token.read().expect("token lock poisoned").as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, response.text().await.unwrap_or_default()));
        }
        Ok(response.json().await?)
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(error_for(status, response.text().await.unwrap_or_default()));
        }
        Ok(())
    }
}

fn error_for(status: StatusCode, body: String) -> Error {
    let detail = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(detail),
        StatusCode::NOT_FOUND => Error::NotFound(detail),
        _ => Error::Request(format!("{}: {}", status.as_u16(), detail)),
    }
}

#[async_trait]
impl NoteApi for HttpNoteApi {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Note>> {
        let envelope: NotesEnvelope = self.send_json(self.request(Method::GET, "/notes")).await?;
        debug!(result_count = envelope.notes.len(), "listed notes");
        Ok(envelope.notes)
    }

    async fn get(&self, id: &NoteId) -> Result<Note> {
        self.send_json(self.request(Method::GET, &format!("/notes/{}", id)))
            .await
    }

    async fn get_by_tag(&self, tag: &str) -> Result<Vec<Note>> {
        let envelope: NotesEnvelope = self
            .send_json(self.request(Method::GET, &format!("/notes/tag/{}", tag)))
            .await?;
        Ok(envelope.notes)
    }

    #[instrument(skip(self, payload))]
    async fn create(&self, payload: NotePayload) -> Result<Note> {
        self.send_json(self.request(Method::POST, "/notes").json(&payload))
            .await
    }

    #[instrument(skip(self, payload))]
    async fn update(&self, id: &NoteId, payload: NotePayload) -> Result<Note> {
        self.send_json(
            self.request(Method::PATCH, &format!("/notes/{}", id))
                .json(&payload),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &NoteId) -> Result<()> {
        self.send_empty(self.request(Method::DELETE, &format!("/notes/{}", id)))
            .await
    }
}
