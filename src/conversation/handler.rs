use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::NotFound(_) => Self::NOT_FOUND,
            super::Error::NotMember => Self::FORBIDDEN,
            super::Error::SelfReference | super::Error::NotEnoughParticipants(_) => {
                Self::BAD_REQUEST
            }
            super::Error::_Message(e) => Self::from(*e),
            super::Error::_R2d2(_) | super::Error::_Diesel(_) => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(super) mod api {
    use axum::{
        Extension, Json,
        extract::{Path, State},
    };
    use axum_extra::extract::{Query, WithRejection};
    use serde::Deserialize;

    use crate::{
        auth,
        conversation::{self, model::ConversationDto},
        error, product, user,
    };

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateParams {
        participant_id: user::Id,
        product_id: Option<product::Id>,
    }

    pub async fn create(
        Extension(auth_user): Extension<auth::User>,
        conversation_service: State<conversation::Service>,
        WithRejection(Json(params), _): WithRejection<Json<CreateParams>, error::Error>,
    ) -> crate::Result<Json<ConversationDto>> {
        let c = conversation_service
            .find_or_create(
                auth_user.id(),
                &params.participant_id,
                params.product_id.as_ref(),
            )
            .await?;

        Ok(Json(c))
    }

    #[derive(Deserialize)]
    pub struct FindAllParams {
        #[serde(default)]
        archived: bool,
    }

    pub async fn find_all(
        Extension(auth_user): Extension<auth::User>,
        WithRejection(Query(params), _): WithRejection<Query<FindAllParams>, error::Error>,
        conversation_service: State<conversation::Service>,
    ) -> crate::Result<Json<Vec<ConversationDto>>> {
        let conversations = conversation_service
            .find_all(auth_user.id(), params.archived)
            .await?;

        Ok(Json(conversations))
    }

    pub async fn archive(
        WithRejection(Path(id), _): WithRejection<Path<conversation::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        conversation_service: State<conversation::Service>,
    ) -> crate::Result<Json<ConversationDto>> {
        let c = conversation_service.archive(&id, auth_user.id()).await?;
        Ok(Json(c))
    }

    pub async fn restore(
        WithRejection(Path(id), _): WithRejection<Path<conversation::Id>, error::Error>,
        Extension(auth_user): Extension<auth::User>,
        conversation_service: State<conversation::Service>,
    ) -> crate::Result<Json<ConversationDto>> {
        let c = conversation_service.restore(&id, auth_user.id()).await?;
        Ok(Json(c))
    }
}
