use std::env;

use market_messenger::{Raw, Redact};

use super::Result;

/// Settings for validating bearer tokens minted by the identity provider.
#[derive(Clone)]
pub struct Config {
    secret: Secret,
    issuer: Option<String>,
    audience: Option<String>,
}

impl Config {
    pub fn new(
        secret: impl Into<String>,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Self {
        Self {
            secret: Secret(secret.into()),
            issuer,
            audience,
        }
    }

    pub fn env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")?;
        let issuer = env::var("JWT_ISSUER").ok();
        let audience = env::var("JWT_AUDIENCE").ok();

        Ok(Self::new(secret, issuer, audience))
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.raw().as_bytes()
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret", &self.secret.redact())
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

#[derive(Clone)]
struct Secret(String);

impl Raw for Secret {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl Redact for Secret {}
