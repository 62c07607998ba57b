use std::time::Duration;

use crate::error::Error;
use crate::secret::SigningSecret;
use crate::storage::{DEFAULT_BUCKET, ObjectStorage};
use crate::token::{DEFAULT_TOKEN_TTL, TokenIssuer, TokenVerifier};

use super::gate::AuthGate;

/// Shared gateway settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct GatewaySettings {
    pub(crate) allow_anonymous: bool,
    pub(crate) lookup_timeout: Duration,
    pub(crate) token_ttl: time::Duration,
}

impl GatewaySettings {
    fn defaults() -> Self {
        Self {
            allow_anonymous: true,
            lookup_timeout: Duration::from_secs(5),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}

/// Gateway configuration.
///
/// Required collaborators (`secret`, `storage`) are constructor parameters.
///
/// Use [`from_env()`](GatewayConfig::from_env) for convention-based setup,
/// or [`new()`](GatewayConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub(super) secret: SigningSecret,
    pub(super) storage: ObjectStorage,
    pub(super) settings: GatewaySettings,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(secret: SigningSecret, storage: ObjectStorage) -> Self {
        Self {
            secret,
            storage,
            settings: GatewaySettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `STORAGE_URL` (or `SUPABASE_URL`): object storage endpoint
    ///
    /// # Optional env vars
    /// - `JWT_CODE`: token signing secret (development fallback when unset)
    /// - `STORAGE_BUCKET`: bucket name (default `files`)
    /// - `AUTH_ALLOW_ANONYMOUS`: `"0"` or `"false"` rejects requests without a valid token
    /// - `TOKEN_TTL_HOURS`: token lifetime in hours (default 24)
    /// - `DOWNLOAD_LOOKUP_TIMEOUT_SECS`: file lookup timeout (default 5)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required var is missing or a value is invalid.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required var is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = SigningSecret::resolve(&lookup);

        let endpoint = lookup("STORAGE_URL")
            .or_else(|| lookup("SUPABASE_URL"))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("STORAGE_URL is required".into()))?;
        let bucket = lookup("STORAGE_BUCKET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let storage = ObjectStorage::parse(&endpoint, bucket)?;

        let mut config = Self::new(secret, storage);

        if let Some(value) = lookup("AUTH_ALLOW_ANONYMOUS") {
            config = config.with_allow_anonymous(!matches!(value.as_str(), "0" | "false"));
        }
        if let Some(value) = lookup("TOKEN_TTL_HOURS") {
            let hours: i64 = value
                .parse()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| Error::Config(format!("TOKEN_TTL_HOURS: invalid value '{value}'")))?;
            config = config.with_token_ttl(time::Duration::hours(hours));
        }
        if let Some(value) = lookup("DOWNLOAD_LOOKUP_TIMEOUT_SECS") {
            let secs: u64 = value.parse().ok().filter(|s| *s > 0).ok_or_else(|| {
                Error::Config(format!("DOWNLOAD_LOOKUP_TIMEOUT_SECS: invalid value '{value}'"))
            })?;
            config = config.with_lookup_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Whether requests without a valid token proceed as anonymous (default `true`).
    ///
    /// When `false`, the gate answers `401` instead. Public download links are
    /// never gated either way.
    #[must_use]
    pub fn with_allow_anonymous(mut self, allow: bool) -> Self {
        self.settings.allow_anonymous = allow;
        self
    }

    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.settings.lookup_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: time::Duration) -> Self {
        self.settings.token_ttl = ttl;
        self
    }

    #[must_use]
    pub fn allow_anonymous(&self) -> bool {
        self.settings.allow_anonymous
    }

    #[must_use]
    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    #[must_use]
    pub fn secret(&self) -> &SigningSecret {
        &self.secret
    }

    /// Token issuer for the login flow, sharing this gateway's secret.
    #[must_use]
    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(&self.secret).with_ttl(self.settings.token_ttl)
    }

    /// Authentication gate for this gateway's secret and anonymous policy.
    #[must_use]
    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(TokenVerifier::new(&self.secret), self.settings.allow_anonymous)
    }
}
