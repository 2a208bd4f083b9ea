use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Book, DEFAULT_PAGE_SIZE, Direction, Loan, NewBook, PageRequest};

/// 書籍登録リクエスト（POST /api/books）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
}

impl CreateBookRequest {
    pub fn into_new_book(self) -> NewBook {
        NewBook::new(self.title, self.author, self.isbn)
    }
}

/// 書籍更新リクエスト（PUT /api/books/:id）
///
/// ISBNは変更できない。
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
        }
    }
}

/// 貸出作成リクエスト（POST /api/loans）
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLoanRequest {
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 100, message = "customer must have 1 to 100 characters"))]
    pub customer: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
}

/// 貸出作成レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanCreatedResponse {
    pub id: i64,
}

/// 返却リクエスト（PATCH /api/loans/:id）
#[derive(Debug, Deserialize)]
pub struct ReturnedLoanRequest {
    pub returned: bool,
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub id: i64,
    pub customer: String,
    pub email: Option<String>,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
    pub book: BookResponse,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            id: loan.id.value(),
            customer: loan.customer,
            email: loan.customer_email,
            loan_date: loan.loan_date,
            returned: loan.returned,
            book: BookResponse::from(loan.book),
        }
    }
}

/// ページ指定のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub direction: Option<Direction>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .with_direction(self.direction.unwrap_or_default())
    }
}

/// ページレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

impl<T> PageResponse<T> {
    pub fn from_page<S>(page: crate::domain::Page<S>) -> Self
    where
        T: From<S>,
    {
        let page = page.map(T::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            size: page.size,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
