use crate::application::ServiceDependencies;
use crate::domain::{Book, BookFilter, BookId, NewBook, Page, PageRequest};
use crate::ports::InsertOutcome;

use super::errors::{CatalogError, Result};

/// 更新・削除の前提条件：採番済みのIDであること
fn ensure_assigned(id: BookId) -> Result<()> {
    if !id.is_assigned() {
        return Err(CatalogError::InvalidArgument(
            "book id must be informed".to_string(),
        ));
    }
    Ok(())
}

/// 書籍を登録する
///
/// ビジネスルール：
/// - ISBNはカタログ全体で一意
///
/// 事前確認に加えて、永続化層が挿入時に一意性違反を報告した場合も
/// `DuplicateIsbn` として扱う（同時登録の競合）。
pub async fn create_book(deps: &ServiceDependencies, book: NewBook) -> Result<Book> {
    // 1. ISBNの重複確認
    let exists = deps
        .book_repository
        .exists_by_isbn(&book.isbn)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if exists {
        tracing::warn!(isbn = %book.isbn, "rejected book with duplicate isbn");
        return Err(CatalogError::DuplicateIsbn(book.isbn));
    }

    // 2. 登録（IDは永続化層が採番）
    let isbn = book.isbn.clone();
    match deps
        .book_repository
        .insert(book)
        .await
        .map_err(CatalogError::RepositoryError)?
    {
        InsertOutcome::Inserted(book) => {
            tracing::info!(book_id = book.id.value(), isbn = %book.isbn, "book created");
            Ok(book)
        }
        InsertOutcome::Conflict => {
            tracing::warn!(isbn = %isbn, "isbn registered concurrently");
            Err(CatalogError::DuplicateIsbn(isbn))
        }
    }
}

/// IDで書籍を取得する
///
/// 存在しないことはエラーではない。
pub async fn get_book_by_id(deps: &ServiceDependencies, id: BookId) -> Result<Option<Book>> {
    deps.book_repository
        .get_by_id(id)
        .await
        .map_err(CatalogError::RepositoryError)
}

/// ISBNで書籍を取得する
pub async fn get_book_by_isbn(deps: &ServiceDependencies, isbn: &str) -> Result<Option<Book>> {
    deps.book_repository
        .get_by_isbn(isbn)
        .await
        .map_err(CatalogError::RepositoryError)
}

/// 書籍のタイトル・著者を更新する
///
/// IDが採番済みでなければ `InvalidArgument`（永続化層には何も書き込まない）。
/// 対象が存在しない場合は `None`。
pub async fn update_book(deps: &ServiceDependencies, book: &Book) -> Result<Option<Book>> {
    ensure_assigned(book.id)?;

    let updated = deps
        .book_repository
        .update(book)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if updated.is_some() {
        tracing::info!(book_id = book.id.value(), "book updated");
    }
    Ok(updated)
}

/// 書籍を削除する
///
/// 前提条件は `update_book` と同じ。貸出（返却済みを含む）が1件でもあれば
/// `BookHasLoans` を返し、何も削除しない。
pub async fn delete_book(deps: &ServiceDependencies, book: &Book) -> Result<()> {
    ensure_assigned(book.id)?;

    let loans = deps
        .loan_repository
        .find_by_book(book.id, PageRequest::new(0, 1))
        .await
        .map_err(CatalogError::RepositoryError)?;

    if loans.total > 0 {
        tracing::warn!(
            book_id = book.id.value(),
            loans = loans.total,
            "rejected delete of loaned book"
        );
        return Err(CatalogError::BookHasLoans(book.id.value()));
    }

    let deleted = deps
        .book_repository
        .delete(book.id)
        .await
        .map_err(CatalogError::RepositoryError)?;

    if deleted {
        tracing::info!(book_id = book.id.value(), "book deleted");
    }
    Ok(())
}

/// 条件に一致する書籍を検索する
pub async fn find_books(
    deps: &ServiceDependencies,
    filter: &BookFilter,
    page: PageRequest,
) -> Result<Page<Book>> {
    tracing::debug!(?filter, page = page.page(), size = page.size(), "finding books");

    deps.book_repository
        .find(filter, page)
        .await
        .map_err(CatalogError::RepositoryError)
}
