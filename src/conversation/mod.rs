use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use diesel::{deserialize::FromSqlRow, expression::AsExpression};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use repository::ConversationRepository;
use service::ConversationService;

use crate::{message, state::AppState};

mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub(crate) type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn ConversationRepository + Send + Sync>;
pub type Service = Arc<dyn ConversationService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/conversations",
            get(handler::api::find_all).post(handler::api::create),
        )
        .route("/conversations/{id}/archive", put(handler::api::archive))
        .route("/conversations/{id}/restore", put(handler::api::restore))
        .with_state(s)
}

#[derive(Clone, Debug, Deserialize, Serialize, Hash, PartialEq, Eq, FromSqlRow, AsExpression)]
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
    #[error("conversation not found: {0}")]
    NotFound(Id),
    #[error("user is not a participant of the conversation")]
    NotMember,
    #[error("cannot start a conversation with oneself")]
    SelfReference,
    #[error("not enough participants: {0}")]
    NotEnoughParticipants(usize),

    #[error(transparent)]
    _Message(#[from] Box<message::Error>),
    #[error(transparent)]
    _R2d2(#[from] r2d2::Error),
    #[error(transparent)]
    _Diesel(#[from] diesel::result::Error),
}
