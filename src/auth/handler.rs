use axum::http::StatusCode;

impl From<super::Error> for StatusCode {
    fn from(e: super::Error) -> Self {
        match e {
            super::Error::Unauthorized
            | super::Error::TokenMalformed
            | super::Error::InvalidSubject
            | super::Error::_JsonWebtoken(_) => Self::UNAUTHORIZED,
        }
    }
}
