//! Service-account credentials and OAuth 2.0 bearer tokens for Firestore.
//!
//! Tokens are obtained with the JWT-bearer grant: an RS256 assertion signed
//! with the service account's private key is exchanged at `token_uri` for a
//! short-lived access token, which is reused until shortly before it expires.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::db::StoreError;

const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;
/// Token the Firestore emulator accepts as an administrator.
const EMULATOR_TOKEN: &str = "owner";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// The subset of a Google service-account key file we need.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub async fn from_file(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
            .map_err(|e| StoreError::Credentials(format!("{}: {e}", path.display())))
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw)
            .map_err(|e| StoreError::Credentials(format!("invalid service account key: {e}")))
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Source of the `Authorization: Bearer` value for each Firestore call.
pub enum TokenSource {
    Emulator,
    ServiceAccount(ServiceAccountTokens),
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emulator => f.write_str("Emulator"),
            Self::ServiceAccount(tokens) => f
                .debug_tuple("ServiceAccount")
                .field(&tokens.key)
                .finish(),
        }
    }
}

impl TokenSource {
    pub fn service_account(key: ServiceAccountKey) -> Result<Self, StoreError> {
        ServiceAccountTokens::new(key).map(Self::ServiceAccount)
    }

    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String, StoreError> {
        match self {
            Self::Emulator => Ok(EMULATOR_TOKEN.to_owned()),
            Self::ServiceAccount(tokens) => tokens.bearer(http).await,
        }
    }
}

pub struct ServiceAccountTokens {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey) -> Result<Self, StoreError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StoreError::Credentials(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, exchanging a fresh assertion when the cached one
    /// is missing or about to expire. Concurrent callers wait on one exchange.
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String, StoreError> {
        let mut slot = self.cached.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.exchange(http).await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, StoreError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::Credentials(format!("cannot sign token assertion: {e}")))
    }

    async fn exchange(&self, http: &reqwest::Client) -> Result<CachedToken, StoreError> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;

        let response = http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Credentials(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            client_email = %self.key.client_email,
            expires_in = token.expires_in,
            "obtained Firestore access token"
        );
        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + TimeDelta::seconds(token.expires_in),
        })
    }
}
