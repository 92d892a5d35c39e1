//! Google service-account authentication.
//!
//! A signed RS256 assertion is exchanged at the account's token endpoint for
//! a bearer token, which is cached until shortly before it expires.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use valuation_core::{DataError, Result};

/// Default OAuth token endpoint.
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Grant type for the JWT bearer flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// The parts of a service-account key file needed to sign assertions.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account e-mail, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a service-account key from its JSON text.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or lacks required fields.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| DataError::AuthenticationFailed(format!("invalid service account key: {e}")))
    }

    /// Read a service-account key file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DataError::AuthenticationFailed(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

/// JWT claims of a service-account assertion.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Issues and caches bearer tokens for one service account.
pub(crate) struct ServiceAccountAuth {
    client: Client,
    key: ServiceAccountKey,
    scopes: String,
    token: Mutex<Option<CachedToken>>,
}

impl fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.key.client_email)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl ServiceAccountAuth {
    pub(crate) fn new(client: Client, key: ServiceAccountKey, scopes: &[&str]) -> Self {
        Self {
            client,
            key,
            scopes: scopes.join(" "),
            token: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, requesting a new one when needed.
    pub(crate) async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token(now).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scopes,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| DataError::AuthenticationFailed(format!("invalid private key: {e}")))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| DataError::AuthenticationFailed(e.to_string()))
    }

    async fn request_token(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        let assertion = self.assertion(now)?;
        debug!(client_email = %self.key.client_email, "Requesting access token");

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::AuthenticationFailed(format!("HTTP {status}: {text}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
