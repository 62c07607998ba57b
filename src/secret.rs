use std::fmt;
use std::sync::Arc;

/// Environment variable holding the token signing secret.
pub const SECRET_ENV: &str = "JWT_CODE";

/// Development fallback used when [`SECRET_ENV`] is unset or empty.
///
/// Tokens signed with it are forgeable by anyone who has read this file.
/// Never run a production deployment on it.
pub const DEV_FALLBACK_SECRET: &str = "dev-secret";

/// Symmetric key shared by [`TokenIssuer`](crate::token::TokenIssuer) and
/// [`TokenVerifier`](crate::token::TokenVerifier).
///
/// Immutable once built. Rotating it invalidates every outstanding token.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Arc<[u8]>,
    is_fallback: bool,
}

impl SigningSecret {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: Arc::from(secret.as_ref()),
            is_fallback: false,
        }
    }

    /// Resolves the process signing secret.
    ///
    /// This is the only place the secret is looked up: `JWT_CODE` when set to
    /// a non-empty value, otherwise [`DEV_FALLBACK_SECRET`] with a warning.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(SECRET_ENV).filter(|s| !s.is_empty()) {
            Some(secret) => Self::new(secret),
            None => {
                tracing::warn!(
                    env = SECRET_ENV,
                    "Signing secret not configured, using development fallback"
                );
                Self {
                    bytes: Arc::from(DEV_FALLBACK_SECRET.as_bytes()),
                    is_fallback: true,
                }
            }
        }
    }

    /// Resolves the secret from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether this is the development fallback rather than a configured secret.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("bytes", &"[REDACTED]")
            .field("is_fallback", &self.is_fallback)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_configured_secret() {
        let secret = SigningSecret::resolve(|key| {
            (key == SECRET_ENV).then(|| "prod-secret".to_string())
        });
        assert_eq!(secret.as_bytes(), b"prod-secret");
        assert!(!secret.is_fallback());
    }

    #[test]
    fn falls_back_when_unset() {
        let secret = SigningSecret::resolve(|_| None);
        assert_eq!(secret.as_bytes(), DEV_FALLBACK_SECRET.as_bytes());
        assert!(secret.is_fallback());
    }

    #[test]
    fn falls_back_when_empty() {
        let secret = SigningSecret::resolve(|_| Some(String::new()));
        assert!(secret.is_fallback());
    }

    #[test]
    fn debug_redacts_value() {
        let secret = SigningSecret::new("super-secret-value");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
    }
}
