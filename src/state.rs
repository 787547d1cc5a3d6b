use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::service::JwtAuthService;
use crate::conversation::repository::PgConversationRepository;
use crate::conversation::service::ConversationServiceImpl;
use crate::integration;
use crate::message::repository::PgMessageRepository;
use crate::message::service::MessageServiceImpl;
use crate::{auth, conversation, message};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_service: auth::Service,
    pub conversation_service: conversation::Service,
    pub message_service: message::Service,
}

impl AppState {
    pub fn new(
        conversation_repo: conversation::Repository,
        message_repo: message::Repository,
        auth_service: auth::Service,
    ) -> Self {
        let conversation_service: conversation::Service = Arc::new(ConversationServiceImpl::new(
            conversation_repo,
            message_repo.clone(),
        ));
        let message_service: message::Service = Arc::new(MessageServiceImpl::new(
            message_repo,
            conversation_service.clone(),
        ));

        Self {
            auth_service,
            conversation_service,
            message_service,
        }
    }

    pub fn init(config: &integration::Config) -> crate::Result<Self> {
        let pool = config.db.connect()?;

        Ok(Self::new(
            Arc::new(PgConversationRepository::new(pool.clone())),
            Arc::new(PgMessageRepository::new(pool)),
            Arc::new(JwtAuthService::new(&config.idp)),
        ))
    }
}
