//! Google OAuth and Drive adapters
//!
//! `GoogleAuth` exchanges the stored refresh token for short-lived access
//! tokens (cached until close to expiry). `ServiceAccountAuth` mints tokens
//! from a service-account key via the JWT-bearer grant. `DriveClient` lists
//! file metadata through the Drive v3 API. Without a refresh token the OAuth
//! client stays constructible but every delegated call reports
//! [`DomainError::Unavailable`].

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use bubo::{DomainError, FileEntry, FileStore};

use crate::config::GoogleOauthConfig;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before their reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Lifetime claimed on signed assertions.
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);

/// Source of OAuth2 access tokens for Google APIs
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, DomainError>;
}

/// OAuth client holding the refresh-token credential
pub struct GoogleAuth {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: Option<String>,
    cached: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl GoogleAuth {
    pub fn new(config: &GoogleOauthConfig) -> Self {
        Self {
            client: Client::new(),
            token_url: TOKEN_URL.to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Overrides the token endpoint (tests point this at a mock).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn has_delegated_access(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// A valid access token, minted from the refresh token and cached.
    pub async fn access_token(&self) -> Result<String, DomainError> {
        let Some(refresh_token) = &self.refresh_token else {
            return Err(DomainError::Unavailable(
                "delegated access requires GOOGLE_REFRESH_TOKEN".to_string(),
            ));
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("token exchange: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "token exchange returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("token exchange: {}", e)))?;

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}

/// Auth client minting tokens from a service-account key
///
/// Signs an RS256 assertion with the account's private key and trades it for
/// an access token through the JWT-bearer grant. The key is parsed at
/// construction, so a malformed credential fails at startup rather than on
/// first use.
pub struct ServiceAccountAuth {
    client: Client,
    token_url: String,
    client_email: String,
    signing_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("token_url", &self.token_url)
            .field("client_email", &self.client_email)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

impl ServiceAccountAuth {
    pub fn new(
        client_email: &str,
        private_key_pem: &str,
        scope: &str,
    ) -> Result<Self, DomainError> {
        let signing_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| {
                DomainError::Validation(format!("service account private key: {}", e))
            })?;
        Ok(Self {
            client: Client::new(),
            token_url: TOKEN_URL.to_string(),
            client_email: client_email.to_string(),
            signing_key,
            scope: scope.to_string(),
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self) -> Result<String, DomainError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: &self.token_url,
            iat: now,
            exp: now + ASSERTION_LIFETIME.as_secs(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| DomainError::ExternalService(format!("assertion signing: {}", e)))
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, DomainError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let assertion = self.assertion()?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("token exchange: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "token exchange returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("token exchange: {}", e)))?;

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}

/// Drive v3 client backed by `GoogleAuth`
pub struct DriveClient {
    inner: Option<DriveInner>,
}

struct DriveInner {
    auth: Arc<GoogleAuth>,
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: Option<String>,
    modified_time: Option<String>,
}

impl DriveClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self {
            inner: Some(DriveInner {
                auth,
                client: Client::new(),
                base_url: DRIVE_BASE_URL.to_string(),
            }),
        }
    }

    /// Overrides the API base URL (tests point this at a mock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        if let Some(inner) = &mut self.inner {
            inner.base_url = url.into();
        }
        self
    }

    /// Client for an unconfigured environment; every listing reports
    /// `Unavailable`.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait]
impl FileStore for DriveClient {
    async fn list(&self, limit: u32) -> Result<Vec<FileEntry>, DomainError> {
        let Some(inner) = &self.inner else {
            return Err(DomainError::Unavailable(
                "google drive is not configured".to_string(),
            ));
        };

        let token = inner.auth.access_token().await?;

        let response = inner
            .client
            .get(format!("{}/files", inner.base_url))
            .query(&[
                ("pageSize", limit.to_string().as_str()),
                ("fields", "files(id,name,mimeType,modifiedTime)"),
            ])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(format!("drive listing: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::ExternalService(format!(
                "drive listing returned {}: {}",
                status, body
            )));
        }

        let listing: FileListResponse = response
            .json()
            .await
            .map_err(|e| DomainError::ExternalService(format!("drive listing: {}", e)))?;

        Ok(listing
            .files
            .into_iter()
            .take(limit as usize)
            .map(|f| FileEntry {
                id: f.id,
                name: f.name,
                mime_type: f.mime_type,
                modified_time: f.modified_time,
            })
            .collect())
    }
}
