//! HTTP error response conversion.
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; domain errors
//! convert into [`HttpAppError`] with `?` and render as a JSON
//! [`ErrorResponse`] with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kinotek_core::AppError;
use kinotek_services::UploadError;
use kinotek_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper type for AppError to implement IntoResponse. Needed because of
/// the orphan rule: IntoResponse and AppError both live in other crates.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::EmptyFile => AppError::InvalidInput("file is empty".to_string()),
            StorageError::InvalidFilename(name) => {
                AppError::InvalidInput(format!("invalid filename: {name}"))
            }
            StorageError::Io(e) => AppError::Internal(format!("storage failure: {e}")),
        };
        HttpAppError(app)
    }
}

impl From<UploadError> for HttpAppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => e.into(),
            UploadError::App(e) => e.into(),
        }
    }
}

impl HttpAppError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::IllegalTransition { .. } => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinotek_core::models::ConversionStatus;

    #[test]
    fn domain_errors_map_to_their_status_codes() {
        let not_found = HttpAppError(AppError::NotFound("video x".into()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = HttpAppError(AppError::InvalidInput("bad".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let transition = HttpAppError(AppError::IllegalTransition {
            from: ConversionStatus::Completed,
            to: ConversionStatus::Pending,
        });
        assert_eq!(transition.status_code(), StatusCode::CONFLICT);

        let internal = HttpAppError(AppError::Internal("boom".into()));
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_errors_become_client_or_server_faults() {
        let empty: HttpAppError = StorageError::EmptyFile.into();
        assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);

        let traversal: HttpAppError = StorageError::InvalidFilename("../x".into()).into();
        assert_eq!(traversal.status_code(), StatusCode::BAD_REQUEST);

        let io: HttpAppError =
            StorageError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(io.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upload_errors_unwrap_to_their_source_mapping() {
        let err: HttpAppError = UploadError::Storage(StorageError::EmptyFile).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: HttpAppError =
            UploadError::App(AppError::NotFound("video y".into())).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
