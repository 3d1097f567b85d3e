use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::ExportError;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields we need from a Google service-account key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// # Errors
    ///
    /// Will return `Err` if the json is missing `client_email` or `private_key`
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        serde_json::from_str(json).map_err(|e| ExportError::Credentials(e.to_string()))
    }

    /// # Errors
    ///
    /// Will return `Err` if the file can't be read or isn't a service-account key
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExportError::Credentials(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Supplies bearer tokens for the Sheets API.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// # Errors
    /// Returns an error if no token could be obtained.
    async fn access_token(&self, client: &reqwest::Client) -> Result<String, ExportError>;
}

/// OAuth2 JWT-bearer flow for a service account. Tokens are reused until
/// shortly before they expire.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// # Errors
    ///
    /// Will return `Err` if the private key is not a PEM encoded RSA key
    pub fn new(key: ServiceAccountKey) -> Result<Self, ExportError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ExportError::Credentials(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    #[must_use]
    pub fn claims_at(&self, now: DateTime<Utc>) -> Claims {
        let iat = now.timestamp();
        Claims {
            iss: self.key.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Signed assertion sent to the token endpoint.
    ///
    /// # Errors
    ///
    /// Will return `Err` if signing fails
    pub fn assertion_at(&self, now: DateTime<Utc>) -> Result<String, ExportError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);
        jsonwebtoken::encode(&header, &self.claims_at(now), &self.encoding_key)
            .map_err(|e| ExportError::Credentials(format!("cannot sign assertion: {e}")))
    }

    async fn fetch_token(&self, client: &reqwest::Client) -> Result<CachedToken, ExportError> {
        let now = Utc::now();
        let assertion = self.assertion_at(now)?;
        let resp = client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ExportError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ExportError::Auth(format!("bad token response: {e}")))?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAuth {
    #[instrument(skip_all, fields(client_email = %self.key.client_email))]
    async fn access_token(&self, client: &reqwest::Client) -> Result<String, ExportError> {
        let mut cached = self.cached.lock().await;
        if let Some(tok) = cached.as_ref() {
            if tok.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(tok.token.clone());
            }
        }
        debug!("requesting new access token");
        let fresh = self.fetch_token(client).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_uri_defaults_to_google() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"logger@example.iam.gserviceaccount.com","private_key":"x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn missing_private_key_is_a_credentials_error() {
        let err = ServiceAccountKey::from_json(r#"{"client_email":"a@b.c"}"#).unwrap_err();
        assert!(matches!(err, ExportError::Credentials(_)));
    }

    #[test]
    fn garbage_pem_is_rejected() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"a@b.c","private_key":"not a key"}"#,
        )
        .unwrap();
        assert!(matches!(
            ServiceAccountAuth::new(key),
            Err(ExportError::Credentials(_))
        ));
    }
}
