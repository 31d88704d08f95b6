use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use std::error::Error as StdError;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("What are you doing?")]
    MissingReferer,

    #[error("Access denied")]
    RefererDenied,

    #[error("Invalid request")]
    InvalidRequest,

    #[error("Missing latitude, longitude, or language")]
    MissingParameters,

    #[error("No Mapbox API keys configured")]
    NoCredentials,

    /// Transport failure text with its cause chain; the URL (and its access token) is stripped.
    #[error("{0}")]
    Upstream(String),

    #[error("Not found")]
    NotFound,
}

impl ProxyError {
    pub fn upstream(err: reqwest::Error) -> Self {
        ProxyError::Upstream(error_chain(&err.without_url()))
    }
}

/// Joins an error with every `source()` below it, skipping repeated messages.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut text = err.to_string();
    let mut last = text.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if msg != last && !last.ends_with(&msg) {
            text.push_str(": ");
            text.push_str(&msg);
            last = msg;
        }
        source = cause.source();
    }
    text
}

/// JSON error body returned on every failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingReferer | ProxyError::RefererDenied => StatusCode::FORBIDDEN,
            ProxyError::InvalidRequest | ProxyError::MissingParameters => StatusCode::BAD_REQUEST,
            ProxyError::NoCredentials | ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody { error: self.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn renders_json_error_body() {
        let resp = ProxyError::RefererDenied.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Access denied" }));
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn error_chain_includes_every_cause() {
        let err = Outer(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused"));
        assert_eq!(error_chain(&err), "error sending request: Connection refused");
    }

    #[test]
    fn error_chain_skips_repeated_messages() {
        #[derive(Debug, Error)]
        #[error("tcp connect error")]
        struct Mid(#[source] std::io::Error);
        #[derive(Debug, Error)]
        #[error("tcp connect error")]
        struct Top(#[source] Mid);

        let err = Top(Mid(std::io::Error::other("timed out")));
        assert_eq!(error_chain(&err), "tcp connect error: timed out");
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ProxyError::MissingReferer.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ProxyError::InvalidRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::MissingParameters.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ProxyError::NoCredentials.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ProxyError::Upstream("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
