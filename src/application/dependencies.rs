use crate::domain::OverdueThreshold;
use crate::ports::{BookRepository, Clock, LoanRepository};
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、アプリケーション層の関数に引数として渡す。
/// すべての依存が明示的になり、テストではインメモリ実装と固定時計に差し替えられる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
    pub clock: Arc<dyn Clock>,
    pub overdue_threshold: OverdueThreshold,
}
