//! Firebase Realtime Database adapter
//!
//! Reads single snapshots through the database's REST surface
//! (`GET {database_url}/{path}.json?access_token=...`), authenticating with
//! tokens minted from the service account. When the credential set is absent
//! the adapter is constructed in a disabled state and every read reports
//! [`DomainError::Unavailable`], so the guard at construction and the check
//! at use stay consistent.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use bubo::{DomainError, RealtimeStore};

use crate::adapters::google::{ServiceAccountAuth, TokenProvider};
use crate::config::FirebaseConfig;

/// Scopes the database REST surface accepts for OAuth2 tokens
const FIREBASE_SCOPES: &str =
    "https://www.googleapis.com/auth/firebase.database https://www.googleapis.com/auth/userinfo.email";

/// Realtime database client
pub struct RealtimeDb {
    inner: Option<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    auth: Option<Arc<dyn TokenProvider>>,
}

impl RealtimeDb {
    /// Client for a configured database, authenticating reads with the
    /// service account. A malformed private key fails here, at startup.
    pub fn new(config: &FirebaseConfig) -> Result<Self, DomainError> {
        let auth =
            ServiceAccountAuth::new(&config.client_email, &config.private_key, FIREBASE_SCOPES)?;
        Ok(Self::with_base_url(&config.database_url).with_token_provider(Arc::new(auth)))
    }

    /// Unauthenticated client against an explicit base URL (tests point this
    /// at a mock; also fits databases with public read rules).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            inner: Some(Inner {
                client: Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                auth: None,
            }),
        }
    }

    /// Attach a token source; each read then carries `access_token`.
    pub fn with_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        if let Some(inner) = &mut self.inner {
            inner.auth = Some(provider);
        }
        self
    }

    /// Client for an unconfigured environment; every read reports
    /// `Unavailable`.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait]
impl RealtimeStore for RealtimeDb {
    async fn get(&self, path: &str) -> Result<Value, DomainError> {
        let Some(inner) = &self.inner else {
            return Err(DomainError::Unavailable(
                "firebase realtime database is not configured".to_string(),
            ));
        };

        let url = format!("{}/{}.json", inner.base_url, path.trim_matches('/'));

        let mut request = inner.client.get(&url);
        if let Some(auth) = &inner.auth {
            let token = auth.access_token().await?;
            request = request.query(&[("access_token", token.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("realtime database: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "realtime database returned {}: {}",
                status, body
            )));
        }

        // Absent paths come back as JSON null; pass the sentinel through.
        response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("realtime database: {}", e)))
    }
}
