use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, put},
};
use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repository::MessageRepository;
use service::MessageService;

use crate::{conversation, state::AppState};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn MessageRepository + Send + Sync>;
pub type Service = Arc<dyn MessageService + Send + Sync>;

pub const MAX_CONTENT_LEN: usize = 4096;
pub const MAX_PAGE_SIZE: i64 = 100;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/conversations/{id}",
            get(handler::api::find_all).post(handler::api::create),
        )
        .route("/conversations/{id}/read", put(handler::api::mark_as_read))
        .route("/messages/{id}", delete(handler::api::delete))
        .route("/unread-count", get(handler::api::unread_count))
        .with_state(s)
}

#[derive(
    Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord, FromSqlRow, AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Uuid)]
pub struct Id(Uuid);

impl Id {
    pub fn random() -> Self {
        Self(Uuid::now_v7())
    }
}

market_messenger::sql_uuid!(Id);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("message not found: {0}")]
    NotFound(Id),
    #[error("not owner of message")]
    NotOwner,
    #[error("message content is empty")]
    EmptyContent,
    #[error("message content exceeds {MAX_CONTENT_LEN} characters")]
    ContentTooLong,
    #[error("page size must be between 1 and {MAX_PAGE_SIZE}, got {0}")]
    InvalidLimit(i64),

    #[error(transparent)]
    _Conversation(#[from] conversation::Error),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
