//! `MdGateError` -> HTTP response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use mdgate_core::error::{ClientCode, MdGateError};

use crate::obs::FailureKind;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Handler error. Renders `{"detail", "code"}` and tags the response with
/// [`FailureKind`] so the request middleware counts it as a failure.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub MdGateError);

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UpstreamError | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::NotFound => StatusCode::NOT_FOUND,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = Json(json!({
            "detail": self.0.to_string(),
            "code": code.as_str(),
        }));

        let mut resp = (status_for(code), body).into_response();
        resp.extensions_mut().insert(FailureKind(self.0.kind()));
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_are_client_errors() {
        assert_eq!(status_for(MdGateError::Upstream("x".into()).client_code()), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(MdGateError::Decode("x".into()).client_code()), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(MdGateError::SymbolNotFound("x".into()).client_code()), StatusCode::NOT_FOUND);
        assert_eq!(status_for(MdGateError::Internal("x".into()).client_code()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_is_tagged_with_failure_kind() {
        let resp = ApiError(MdGateError::NoData("AAPL".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.extensions().get::<FailureKind>(), Some(&FailureKind("no_data")));
    }
}
