use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotOwner => Self::FORBIDDEN,
            super::Error::EmptyContent
            | super::Error::ContentTooLong
            | super::Error::InvalidLimit(_) => Self::BAD_REQUEST,
            super::Error::_Conversation(e) => Self::from(e),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::{Query, WithRejection};
    use serde::{Deserialize, Serialize};

    use crate::{
        auth, conversation, error,
        message::{self, model::MessageDto},
    };

    #[derive(Deserialize)]
    pub struct FindAllParams {
        limit: Option<i64>,
        before: Option<message::Id>,
    }

    pub async fn find_all(
        WithRejection(Path(id), _): WithRejection<Path<conversation::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        WithRejection(Query(params), _): WithRejection<Query<FindAllParams>, error::Error>,
        message_service: State<message::Service>,
    ) -> crate::Result<Json<Vec<MessageDto>>> {
        let msgs = message_service
            .find_by_conversation(auth_user.id(), &id, params.limit, params.before.as_ref())
            .await?;

        Ok(Json(msgs))
    }

    #[derive(Deserialize)]
    pub struct CreateParams {
        content: String,
    }

    pub async fn create(
        WithRejection(Path(id), _): WithRejection<Path<conversation::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
        WithRejection(Json(params), _): WithRejection<Json<CreateParams>, error::Error>,
    ) -> crate::Result<(StatusCode, Json<MessageDto>)> {
        let msg = message_service
            .send(auth_user.id(), &id, &params.content)
            .await?;

        Ok((StatusCode::CREATED, Json(msg)))
    }

    #[derive(Serialize)]
    pub struct MarkAsReadResponse {
        updated: usize,
    }

    pub async fn mark_as_read(
        WithRejection(Path(id), _): WithRejection<Path<conversation::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
    ) -> crate::Result<Json<MarkAsReadResponse>> {
        let updated = message_service.mark_as_read(auth_user.id(), &id).await?;
        Ok(Json(MarkAsReadResponse { updated }))
    }

    pub async fn delete(
        WithRejection(Path(id), _): WithRejection<Path<message::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
    ) -> crate::Result<StatusCode> {
        message_service.delete(auth_user.id(), &id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    #[derive(Serialize)]
    pub struct UnreadCountResponse {
        count: i64,
    }

    pub async fn unread_count(
        Extension(auth_user): Extension<auth::User>,
        message_service: State<message::Service>,
    ) -> crate::Result<Json<UnreadCountResponse>> {
        let count = message_service.unread_count(auth_user.id()).await?;
        Ok(Json(UnreadCountResponse { count }))
    }
}
