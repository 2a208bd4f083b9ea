use thiserror::Error;

/// カタログ管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    /// ISBNが登録済み
    #[error("Isbn already registered: {0}")]
    DuplicateIsbn(String),

    /// 貸出履歴のある書籍は削除できない
    #[error("Book has loans: {0}")]
    BookHasLoans(i64),

    /// IDが未指定または不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogError>;
