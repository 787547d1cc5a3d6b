use log::{debug, info};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod auth;
mod conversation;
mod error;
mod integration;
mod message;
mod product;
mod router;
mod schema;
mod state;
mod user;

type Result<T> = std::result::Result<T, error::Error>;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = integration::Config::default();
    debug!("Token validation settings: {:?}", config.idp);

    let state = AppState::init(&config)?;

    let app = router::init(state)
        .layer(config.env.cors())
        .layer(TraceLayer::new_for_http());

    let addr = config.env.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
