use crate::application::loan::LoanApplicationError;
use thiserror::Error;

/// 延滞通知のエラー
///
/// 再試行は行わず、呼び出し側に返す。
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 延滞貸出の検出に失敗
    #[error("Failed to scan late loans")]
    LateLoanScan(#[from] LoanApplicationError),

    /// 通知の送信に失敗
    #[error("Notifier error")]
    NotifierError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, NotificationError>;
