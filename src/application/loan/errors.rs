use crate::domain::BookId;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 書籍に未返却の貸出がある
    #[error("Book already loaned")]
    BookAlreadyLoaned(BookId),

    /// 引数が不正（未採番のID、空の顧客名など）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;
