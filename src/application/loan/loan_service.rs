use crate::application::ServiceDependencies;
use crate::domain::{Book, CUSTOMER_MAX_LENGTH, Loan, LoanFilter, LoanId, NewLoan, Page, PageRequest};
use crate::ports::InsertOutcome;

use super::errors::{LoanApplicationError, Result};

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 顧客名が空でないこと（最大100文字）
/// - 書籍に未返却の貸出がないこと（1冊につき同時に1件まで）
///
/// `loan_date` は呼び出し側で設定済みであること。
///
/// # 一貫性保証
///
/// 事前確認の後、永続化層は同じ書籍に対する挿入を原子的に再確認する
/// （PostgreSQLでは部分一意インデックス）。同時に2件の貸出が作成されることはない。
pub async fn save_loan(deps: &ServiceDependencies, loan: NewLoan) -> Result<Loan> {
    // 1. 顧客名の検証
    if loan.customer.trim().is_empty() {
        return Err(LoanApplicationError::InvalidArgument(
            "customer must be informed".to_string(),
        ));
    }
    if loan.customer.chars().count() > CUSTOMER_MAX_LENGTH {
        return Err(LoanApplicationError::InvalidArgument(format!(
            "customer must have at most {} characters",
            CUSTOMER_MAX_LENGTH
        )));
    }

    // 2. 貸出可能性確認
    let book_id = loan.book.id;
    let already_loaned = deps
        .loan_repository
        .exists_unreturned_for_book(book_id)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    if already_loaned {
        tracing::warn!(book_id = book_id.value(), "book already loaned");
        return Err(LoanApplicationError::BookAlreadyLoaned(book_id));
    }

    // 3. 登録（IDは永続化層が採番）
    match deps
        .loan_repository
        .insert(loan)
        .await
        .map_err(LoanApplicationError::RepositoryError)?
    {
        InsertOutcome::Inserted(loan) => {
            tracing::info!(
                loan_id = loan.id.value(),
                book_id = book_id.value(),
                customer = %loan.customer,
                "loan created"
            );
            Ok(loan)
        }
        InsertOutcome::Conflict => {
            tracing::warn!(book_id = book_id.value(), "book loaned concurrently");
            Err(LoanApplicationError::BookAlreadyLoaned(book_id))
        }
    }
}

/// IDで貸出を取得する
pub async fn get_loan_by_id(deps: &ServiceDependencies, id: LoanId) -> Result<Option<Loan>> {
    deps.loan_repository
        .get_by_id(id)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}

/// 貸出を更新する（主に返却の記録）
///
/// 貸出可能性の再確認は行わない。新しい貸出の受付は `save_loan` だけが判定する。
pub async fn update_loan(deps: &ServiceDependencies, loan: &Loan) -> Result<Option<Loan>> {
    if !loan.id.is_assigned() {
        return Err(LoanApplicationError::InvalidArgument(
            "loan id must be informed".to_string(),
        ));
    }

    let updated = deps
        .loan_repository
        .update(loan)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    if let Some(updated) = &updated {
        tracing::info!(
            loan_id = updated.id.value(),
            returned = ?updated.returned,
            "loan updated"
        );
    }
    Ok(updated)
}

/// 貸出履歴を検索する
///
/// 書籍のISBNが一致する、または顧客名が一致する貸出（OR条件）。
/// 両方の条件が空の場合は何にも一致しない。
pub async fn find_loans(
    deps: &ServiceDependencies,
    filter: &LoanFilter,
    page: PageRequest,
) -> Result<Page<Loan>> {
    tracing::debug!(?filter, page = page.page(), size = page.size(), "finding loans");

    if filter.is_empty() {
        return Ok(Page::new(Vec::new(), 0, page));
    }

    deps.loan_repository
        .find(filter, page)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}

/// 書籍の貸出履歴を取得する
pub async fn get_loans_by_book(
    deps: &ServiceDependencies,
    book: &Book,
    page: PageRequest,
) -> Result<Page<Loan>> {
    deps.loan_repository
        .find_by_book(book.id, page)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}
