use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::QueryRejection;
use log::{debug, error};
use serde::Serialize;

use crate::{auth, conversation, integration, message};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _Conversation(#[from] conversation::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),

    #[error(transparent)]
    _Path(#[from] PathRejection),
    #[error(transparent)]
    _Json(#[from] JsonRejection),
    #[error(transparent)]
    _Query(#[from] QueryRejection),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let status = match self {
            Self::_Auth(e) => StatusCode::from(e),
            Self::_Conversation(e) => StatusCode::from(e),
            Self::_Message(e) => StatusCode::from(e),
            Self::_Integration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::_Path(_) | Self::_Json(_) | Self::_Query(_) => StatusCode::BAD_REQUEST,
        };

        let message = if status.is_server_error() {
            error!("{message}");
            "Internal server error".to_owned()
        } else {
            debug!("{status}: {message}");
            message
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
