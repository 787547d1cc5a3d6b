use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use log::{debug, warn};
use market_messenger::Raw;
use uuid::Uuid;

use super::{Token, TokenClaims, User};

use crate::integration::idp;
use crate::user;

#[async_trait]
pub trait AuthService {
    async fn validate(&self, token: &Token) -> super::Result<User>;
}

#[derive(Clone)]
pub struct JwtAuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthService {
    pub fn new(cfg: &idp::Config) -> Self {
        let validation = {
            let mut v = Validation::new(Algorithm::HS256);
            v.set_required_spec_claims(&["exp", "sub"]);
            if let Some(issuer) = cfg.issuer() {
                v.set_issuer(&[issuer]);
            }
            match cfg.audience() {
                Some(audience) => v.set_audience(&[audience]),
                None => v.validate_aud = false,
            }
            v
        };

        Self {
            decoding_key: DecodingKey::from_secret(cfg.secret()),
            validation,
        }
    }
}

#[async_trait]
impl AuthService for JwtAuthService {
    async fn validate(&self, token: &Token) -> super::Result<User> {
        decode_header(token.raw()).map_err(|e| {
            warn!("Failed to decode JWT header of {token:?}: {e:?}");
            super::Error::TokenMalformed
        })?;

        let claims = decode::<TokenClaims>(token.raw(), &self.decoding_key, &self.validation)
            .map(|data| data.claims)?;

        let id = Uuid::parse_str(&claims.sub).map_err(|_| super::Error::InvalidSubject)?;
        debug!("Validated token for user '{id}'");

        Ok(User::new(user::Id::from(id)))
    }
}
