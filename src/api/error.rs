use crate::application::book::CatalogError;
use crate::application::loan::LoanApplicationError;
use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::ValidationErrors;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Catalog(CatalogError),
    Loan(LoanApplicationError),
    /// リクエストされたリソースが存在しない
    NotFound(String),
    /// リクエスト内容が業務上受け付けられない
    BadRequest(String),
    /// リクエストボディの検証エラー
    Validation(ValidationErrors),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<LoanApplicationError> for ApiError {
    fn from(err: LoanApplicationError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

/// クエリパラメータの解釈失敗も他の400と同じJSON形式で返す
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),

            // 400 Bad Request - 入力の問題（利用者が修正可能）
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            ApiError::Catalog(CatalogError::DuplicateIsbn(isbn)) => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_ISBN",
                format!("Isbn already registered: {}", isbn),
            ),
            ApiError::Catalog(CatalogError::BookHasLoans(id)) => (
                StatusCode::BAD_REQUEST,
                "BOOK_HAS_LOANS",
                format!("Book has loans: {}", id),
            ),
            ApiError::Catalog(CatalogError::InvalidArgument(msg))
            | ApiError::Loan(LoanApplicationError::InvalidArgument(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg)
            }
            ApiError::Loan(LoanApplicationError::BookAlreadyLoaned(_)) => (
                StatusCode::BAD_REQUEST,
                "BOOK_ALREADY_LOANED",
                "Book already loaned".to_string(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Catalog(CatalogError::RepositoryError(e)) => {
                tracing::error!("Book repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
            ApiError::Loan(LoanApplicationError::RepositoryError(e)) => {
                tracing::error!("Loan repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
