//! HTTP implementation of the auth provider.
//!
//! Password-grant endpoints: `GET /auth/session`, `POST /auth/sign_in`,
//! `POST /auth/sign_up`, `POST /auth/sign_out`. Credential validation
//! (non-empty fields, minimum password length at sign-up) happens before any
//! network call. Every session transition, including the initial lookup, is
//! published on a watch channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument};

use tagbook_core::defaults::{API_BASE_URL, API_TIMEOUT_SECS, PASSWORD_MIN_LEN};
use tagbook_core::{AuthProvider, Error, Result, Session};

use crate::http::API_BASE_ENV;

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionEnvelope {
    #[serde(default)]
    session: Option<Session>,
}

/// HTTP auth provider against the managed auth endpoints.
pub struct HttpAuthProvider {
    client: Client,
    base_url: String,
    sender: watch::Sender<Option<Session>>,
}

impl HttpAuthProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        let (sender, _) = watch::channel(None);
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sender,
        }
    }

    /// Create from environment variables (`TAGBOOK_API_BASE`), falling back
    /// to the default base URL.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_BASE_ENV).unwrap_or_else(|_| API_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn publish(&self, session: Option<Session>) -> Option<Session> {
        self.sender.send_replace(session.clone());
        session
    }

    fn current_token(&self) -> Option<String> {
        self.sender.borrow().as_ref().map(|s| s.access_token.clone())
    }

    async fn post_credentials(&self, path: &str, email: &str, password: &str) -> Result<Option<Session>> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&CredentialsBody { email, password })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => Error::Unauthorized(body),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    Error::InvalidInput(body)
                }
                _ => Error::Request(format!("{}: {}", status.as_u16(), body)),
            });
        }
        let envelope: SessionEnvelope = response.json().await?;
        Ok(envelope.session)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(Error::InvalidInput("email and password are required".into()));
    }
    Ok(())
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    #[instrument(skip(self))]
    async fn session(&self) -> Result<Option<Session>> {
        let mut request = self
            .client
            .get(format!("{}/auth/session", self.base_url));
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            // Missing session reads as signed out, not as a failure.
            if status == StatusCode::UNAUTHORIZED {
                return Ok(self.publish(None));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!("{}: {}", status.as_u16(), body)));
        }
        let envelope: SessionEnvelope = response.json().await?;
        Ok(self.publish(envelope.session))
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        validate_credentials(email, password)?;
        let session = self
            .post_credentials("/auth/sign_in", email.trim(), password.trim())
            .await?
            .ok_or_else(|| Error::Unauthorized("sign-in returned no session".into()))?;
        info!(owner_id = %session.user.id, "signed in");
        self.publish(Some(session.clone()));
        Ok(session)
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        validate_credentials(email, password)?;
        if password.trim().len() < PASSWORD_MIN_LEN {
            return Err(Error::InvalidInput(format!(
                "password must be at least {} characters long",
                PASSWORD_MIN_LEN
            )));
        }
        // A provider requiring email confirmation returns no session yet.
        let session = self
            .post_credentials("/auth/sign_up", email.trim(), password.trim())
            .await?;
        if session.is_some() {
            self.publish(session.clone());
        }
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> Result<()> {
        let mut request = self
            .client
            .post(format!("{}/auth/sign_out", self.base_url));
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!("{}: {}", status.as_u16(), body)));
        }
        info!("signed out");
        self.publish(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_json() -> serde_json::Value {
        json!({
            "session": {
                "accessToken": "token-1",
                "user": { "id": "user-1", "email": "a@b.c" }
            }
        })
    }

    #[tokio::test]
    async fn test_sign_in_publishes_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign_in"))
            .and(body_partial_json(json!({"email": "a@b.c"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
            .mount(&server)
            .await;

        let auth = HttpAuthProvider::new(server.uri());
        let rx = auth.subscribe();
        let session = auth.sign_in("a@b.c", "secret-1").await.unwrap();
        assert_eq!(session.user.id, "user-1");
        assert_eq!(
            rx.borrow().as_ref().map(|s| s.access_token.clone()),
            Some("token-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_sign_in_rejects_empty_fields_before_network() {
        // No mock server: a network call would fail differently.
        let auth = HttpAuthProvider::new("http://127.0.0.1:1");
        assert!(matches!(
            auth.sign_in("", "secret").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            auth.sign_in("a@b.c", "  ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_up_enforces_password_length_before_network() {
        let auth = HttpAuthProvider::new("http://127.0.0.1:1");
        assert!(matches!(
            auth.sign_up("a@b.c", "short").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_up_without_session_means_confirmation_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign_up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session": null})))
            .mount(&server)
            .await;

        let auth = HttpAuthProvider::new(server.uri());
        let session = auth.sign_up("a@b.c", "secret-1").await.unwrap();
        assert!(session.is_none());
        assert!(auth.subscribe().borrow().is_none());
    }

    #[tokio::test]
    async fn test_session_lookup_unauthorized_reads_as_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/session"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let auth = HttpAuthProvider::new(server.uri());
        assert!(auth.session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_publishes_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign_in"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/sign_out"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let auth = HttpAuthProvider::new(server.uri());
        auth.sign_in("a@b.c", "secret-1").await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(auth.subscribe().borrow().is_none());
    }

    #[tokio::test]
    async fn test_invalid_credentials_map_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/sign_in"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid login"))
            .mount(&server)
            .await;

        let auth = HttpAuthProvider::new(server.uri());
        assert!(matches!(
            auth.sign_in("a@b.c", "wrong").await,
            Err(Error::Unauthorized(_))
        ));
    }
}
