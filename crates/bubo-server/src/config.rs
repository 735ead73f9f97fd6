//! Environment configuration
//!
//! All settings are read once at startup and immutable afterwards. Optional
//! integrations are gated on their credentials: a fully absent credential set
//! disables the integration, a partial one aborts startup.

use anyhow::{bail, Result};
use std::env;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_PATH: &str = "bubo_agent.db";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Credentials for the Firebase Realtime Database
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    pub database_url: String,
}

/// Google OAuth client credentials
#[derive(Debug, Clone)]
pub struct GoogleOauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Without a stored refresh token the client cannot mint delegated
    /// access tokens; dependent tools report themselves unavailable.
    pub refresh_token: Option<String>,
}

/// Server configuration, sourced from the process environment
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub firebase: Option<FirebaseConfig>,
    pub google: Option<GoogleOauthConfig>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup, so tests can supply
    /// settings without mutating process-level environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let Some(gemini_api_key) = lookup("GOOGLE_GENERATIVE_AI_API_KEY") else {
            bail!("GOOGLE_GENERATIVE_AI_API_KEY is required");
        };

        Ok(Self {
            port,
            database_path: lookup("BUBO_DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            firebase: firebase_from_lookup(&lookup)?,
            google: google_from_lookup(&lookup),
        })
    }
}

/// The private key gates the whole credential set; if it is present the
/// remaining fields are required.
fn firebase_from_lookup<F>(lookup: &F) -> Result<Option<FirebaseConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(private_key) = lookup("FIREBASE_PRIVATE_KEY") else {
        return Ok(None);
    };

    let require = |key: &str| -> Result<String> {
        lookup(key).ok_or_else(|| {
            anyhow::anyhow!("{key} is required when FIREBASE_PRIVATE_KEY is set")
        })
    };

    Ok(Some(FirebaseConfig {
        project_id: require("FIREBASE_PROJECT_ID")?,
        client_email: require("FIREBASE_CLIENT_EMAIL")?,
        // Keys arrive from .env files with literal backslash-n sequences
        private_key: private_key.replace("\\n", "\n"),
        database_url: require("FIREBASE_DATABASE_URL")?,
    }))
}

fn google_from_lookup<F>(lookup: &F) -> Option<GoogleOauthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let client_id = lookup("GOOGLE_CLIENT_ID")?;
    let client_secret = lookup("GOOGLE_CLIENT_SECRET")?;
    let redirect_uri = lookup("GOOGLE_REDIRECT_URI")?;

    Some(GoogleOauthConfig {
        client_id,
        client_secret,
        redirect_uri,
        refresh_token: lookup("GOOGLE_REFRESH_TOKEN"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("GOOGLE_GENERATIVE_AI_API_KEY", "k")])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, "bubo_agent.db");
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert!(config.firebase.is_none());
        assert!(config.google.is_none());
    }

    #[test]
    fn missing_gemini_key_aborts() {
        assert!(Config::from_lookup(lookup_from(&[])).is_err());
    }

    #[test]
    fn invalid_port_aborts() {
        let result = Config::from_lookup(lookup_from(&[
            ("GOOGLE_GENERATIVE_AI_API_KEY", "k"),
            ("PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn partial_firebase_credentials_abort() {
        let result = Config::from_lookup(lookup_from(&[
            ("GOOGLE_GENERATIVE_AI_API_KEY", "k"),
            ("FIREBASE_PRIVATE_KEY", "pk"),
            ("FIREBASE_PROJECT_ID", "p"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn full_firebase_credentials_unescape_the_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_GENERATIVE_AI_API_KEY", "k"),
            ("FIREBASE_PRIVATE_KEY", "line1\\nline2"),
            ("FIREBASE_PROJECT_ID", "p"),
            ("FIREBASE_CLIENT_EMAIL", "svc@p.iam"),
            ("FIREBASE_DATABASE_URL", "https://p.firebaseio.com"),
        ]))
        .unwrap();
        let firebase = config.firebase.unwrap();
        assert_eq!(firebase.private_key, "line1\nline2");
        assert_eq!(firebase.database_url, "https://p.firebaseio.com");
    }

    #[test]
    fn google_oauth_requires_the_full_trio() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_GENERATIVE_AI_API_KEY", "k"),
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        assert!(config.google.is_none());

        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_GENERATIVE_AI_API_KEY", "k"),
            ("GOOGLE_CLIENT_ID", "id"),
            ("GOOGLE_CLIENT_SECRET", "secret"),
            ("GOOGLE_REDIRECT_URI", "http://localhost/cb"),
        ]))
        .unwrap();
        let google = config.google.unwrap();
        assert_eq!(google.client_id, "id");
        assert!(google.refresh_token.is_none());
    }
}
