use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::Error;
use crate::secret::SigningSecret;
use crate::types::UserId;

/// Default identity token lifetime.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

/// Claims carried by an identity token.
///
/// `user_id` is the subject. `sub` mirrors it for standard JWT tooling and is
/// not required on verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp, seconds). Informational, not checked.
    #[serde(default)]
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// Mints HS256 identity tokens for subjects authenticated elsewhere.
///
/// Does not authenticate anyone itself: whoever calls [`issue`](Self::issue)
/// vouches for the subject.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the token lifetime (default: 24 hours).
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token for `subject`, valid from now for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Token` if the subject is empty or signing fails.
    pub fn issue(&self, subject: &UserId) -> Result<String, Error> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(
        &self,
        subject: &UserId,
        issued_at: OffsetDateTime,
    ) -> Result<String, Error> {
        if subject.as_str().is_empty() {
            return Err(Error::Token("empty subject".into()));
        }

        let claims = Claims {
            user_id: subject.as_str().to_owned(),
            sub: Some(subject.as_str().to_owned()),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + self.ttl).unix_timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| Error::Token(e.to_string()))
    }
}

/// Validates identity tokens against the process signing secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies `token` and returns its subject.
    ///
    /// Returns `None` for an empty or malformed token, a signature mismatch,
    /// an expired token, or a missing/empty subject. Never fails otherwise.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<UserId> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub(crate) fn verify_at(&self, token: &str, now: OffsetDateTime) -> Option<UserId> {
        if token.is_empty() {
            return None;
        }

        let claims = match jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Token rejected");
                return None;
            }
        };

        // Valid only while now < exp.
        if claims.exp <= now.unix_timestamp() {
            tracing::debug!(exp = claims.exp, "Token rejected: expired");
            return None;
        }

        if claims.user_id.is_empty() {
            tracing::debug!("Token rejected: empty subject");
            return None;
        }

        Some(UserId(claims.user_id))
    }
}
