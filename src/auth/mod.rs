use std::fmt;
use std::sync::Arc;

use market_messenger::{Raw, Redact};
use serde::Deserialize;

use crate::user;

pub mod handler;
pub mod middleware;
pub mod service;

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::AuthService + Send + Sync>;

#[derive(Deserialize, Clone)]
struct TokenClaims {
    sub: String,
}

/// Caller of the current request, inserted as a request extension by
/// [`middleware::authorize`].
#[derive(Clone, Debug)]
pub struct User {
    id: user::Id,
}

impl User {
    pub fn new(id: user::Id) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> &user::Id {
        &self.id
    }
}

pub struct Token(String);

impl Token {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl Redact for Token {}

impl Raw for Token {
    fn raw(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.redact())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("token is malformed")]
    TokenMalformed,
    #[error("token subject is not a valid user id")]
    InvalidSubject,

    #[error(transparent)]
    _JsonWebtoken(#[from] jsonwebtoken::errors::Error),
}
