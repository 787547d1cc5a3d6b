use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use log::debug;

use crate::auth::{self, Token};

pub async fn authorize(
    auth_service: State<auth::Service>,
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> crate::Result<Response> {
    let auth_header = auth_header.map_err(|e| {
        debug!("Rejecting request to {}: {e}", req.uri().path());
        auth::Error::Unauthorized
    })?;

    let token = Token::new(auth_header.token());
    let auth_user = auth_service.validate(&token).await?;

    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
