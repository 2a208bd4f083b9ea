use crate::application::{
    ServiceDependencies,
    book::{create_book, delete_book, find_books, get_book_by_id, get_book_by_isbn, update_book},
    loan::{find_loans, get_loan_by_id, get_loans_by_book, save_loan, update_loan},
};
use crate::domain::{Book, BookFilter, BookId, LoanFilter, LoanId, NewLoan};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use super::{
    error::ApiError,
    types::{
        BookResponse, CreateBookRequest, CreateLoanRequest, LoanCreatedResponse, LoanResponse,
        PageQuery, PageResponse, ReturnedLoanRequest, UpdateBookRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// IDで書籍を取得し、存在しなければ404にする
async fn find_book_or_404(deps: &ServiceDependencies, id: i64) -> Result<Book, ApiError> {
    get_book_by_id(deps, BookId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", id)))
}

// ============================================================================
// Books
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// ISBNが登録済みの場合は400を返す。
pub async fn create_book_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    req.validate()?;
    tracing::info!(isbn = %req.isbn, "creating book");

    let book = create_book(&state.service_deps, req.into_new_book()).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /api/books/:id - 書籍をIDで取得
pub async fn get_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = find_book_or_404(&state.service_deps, id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// PUT /api/books/:id - 書籍のタイトル・著者を更新
pub async fn update_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    req.validate()?;

    let book = find_book_or_404(&state.service_deps, id).await?;
    let book = Book {
        title: req.title,
        author: req.author,
        ..book
    };

    let updated = update_book(&state.service_deps, &book)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Book {} not found", id)))?;

    Ok(Json(BookResponse::from(updated)))
}

/// DELETE /api/books/:id - 書籍を削除
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let book = find_book_or_404(&state.service_deps, id).await?;
    delete_book(&state.service_deps, &book).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books - 条件付き書籍一覧
///
/// クエリパラメータ:
/// - title, author, isbn: 部分一致（大文字小文字を区別しない）
/// - page, size, direction: ページ指定
pub async fn find_books_handler(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<BookFilter>, QueryRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse<BookResponse>>, ApiError> {
    let (Query(filter), Query(page)) = (filter?, page?);
    let books = find_books(&state.service_deps, &filter, page.to_page_request()).await?;
    Ok(Json(PageResponse::from_page(books)))
}

/// GET /api/books/:id/loans - 書籍の貸出履歴
pub async fn book_loans_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let Query(page) = page?;
    let book = find_book_or_404(&state.service_deps, id).await?;
    let loans = get_loans_by_book(&state.service_deps, &book, page.to_page_request()).await?;

    Ok(Json(PageResponse::from_page(loans)))
}

// ============================================================================
// Loans
// ============================================================================

/// POST /api/loans - 貸出を作成
///
/// 貸出日は今日。強制されるビジネスルール:
/// - ISBNに対応する書籍が存在すること
/// - 書籍に未返却の貸出がないこと
pub async fn create_loan_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLoanRequest>,
) -> Result<(StatusCode, Json<LoanCreatedResponse>), ApiError> {
    req.validate()?;

    let deps = &state.service_deps;
    let book = get_book_by_isbn(deps, &req.isbn)
        .await?
        .ok_or_else(|| ApiError::BadRequest("Book not found for passed isbn".to_string()))?;

    let mut new_loan = NewLoan::new(book, req.customer, deps.clock.today());
    if let Some(email) = req.email {
        new_loan = new_loan.with_email(email);
    }

    let loan = save_loan(deps, new_loan).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanCreatedResponse {
            id: loan.id.value(),
        }),
    ))
}

/// PATCH /api/loans/:id - 返却を記録
pub async fn return_book_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReturnedLoanRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let deps = &state.service_deps;
    let not_found = || ApiError::NotFound(format!("Loan {} not found", id));

    let loan = get_loan_by_id(deps, LoanId::new(id))
        .await?
        .ok_or_else(not_found)?;
    let loan = crate::domain::Loan {
        returned: Some(req.returned),
        ..loan
    };

    let updated = update_loan(deps, &loan).await?.ok_or_else(not_found)?;

    Ok(Json(LoanResponse::from(updated)))
}

/// GET /api/loans - 貸出履歴の検索
///
/// クエリパラメータ:
/// - isbn: 書籍のISBN（完全一致）
/// - customer: 顧客名（完全一致）
///
/// isbnまたはcustomerに一致する貸出を返す（OR条件）。両方とも未指定なら空。
pub async fn find_loans_handler(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<LoanFilter>, QueryRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<PageResponse<LoanResponse>>, ApiError> {
    let (Query(filter), Query(page)) = (filter?, page?);
    let loans = find_loans(&state.service_deps, &filter, page.to_page_request()).await?;
    Ok(Json(PageResponse::from_page(loans)))
}
