use crate::domain::{BookId, Loan, LoanFilter, LoanId, NewLoan, Page, PageRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

use super::{InsertOutcome, Result};

/// 貸出リポジトリポート
///
/// 貸出は常に書籍を解決済みの状態で返す（遅延読み込みはしない）。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 貸出を登録する
    ///
    /// 同じ書籍に未返却（`returned` がtrueでない）の貸出が既にあれば
    /// `InsertOutcome::Conflict` を返す。確認と書き込みは同じ書籍に対する
    /// 他の挿入と原子的でなければならない。
    async fn insert(&self, loan: NewLoan) -> Result<InsertOutcome<Loan>>;

    /// IDで貸出を取得する
    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>>;

    /// 書籍に未返却の貸出が存在するか
    async fn exists_unreturned_for_book(&self, book_id: BookId) -> Result<bool>;

    /// 顧客名・メールアドレス・返却状態を更新する
    ///
    /// 対象が存在しない場合は `None` を返す。
    async fn update(&self, loan: &Loan) -> Result<Option<Loan>>;

    /// 書籍のISBNまたは顧客名で貸出を検索する（OR条件、完全一致）
    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<Loan>>;

    /// 書籍の全貸出をページ単位で取得する
    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>>;

    /// 延滞中の貸出を検索する
    ///
    /// loan_date < cutoff かつ returned がtrueでない貸出を返す。
    async fn find_late(&self, cutoff: NaiveDate) -> Result<Vec<Loan>>;
}
