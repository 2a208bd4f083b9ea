use crate::domain::{Book, BookFilter, BookId, NewBook, Page, PageRequest};
use crate::ports::book_repository::BookRepository as BookRepositoryTrait;
use crate::ports::{InsertOutcome, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{contains_pattern, is_unique_violation};

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        id: BookId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
    })
}

/// 検索条件（$1〜$3 にタイトル・著者・ISBNのパターン、NULLは条件なし）
const FILTER_CLAUSE: &str = r#"
    WHERE ($1::text IS NULL OR title ILIKE $1)
      AND ($2::text IS NULL OR author ILIKE $2)
      AND ($3::text IS NULL OR isbn ILIKE $3)
"#;

/// BookRepositoryのPostgreSQL実装
///
/// ISBNの一意性は `books_isbn_unique` 制約で保証する。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// 書籍を登録（IDはBIGSERIALで採番）
    ///
    /// 一意性制約違反は `Conflict` として返す。
    async fn insert(&self, book: NewBook) -> Result<InsertOutcome<Book>> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (title, author, isbn)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let id: i64 = row.try_get("id")?;
                Ok(InsertOutcome::Inserted(book.with_id(BookId::new(id))))
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author, isbn FROM books WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn get_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query("SELECT id, title, author, isbn FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn exists_by_isbn(&self, isbn: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn update(&self, book: &Book) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3
            WHERE id = $1
            RETURNING id, title, author, isbn
            "#,
        )
        .bind(book.id.value())
        .bind(&book.title)
        .bind(&book.author)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn delete(&self, id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 条件に一致する書籍を検索（大文字小文字を区別しない部分一致）
    ///
    /// ページの行と一致件数は別々のクエリで取得する。
    async fn find(&self, filter: &BookFilter, page: PageRequest) -> Result<Page<Book>> {
        let title = filter.title().map(contains_pattern);
        let author = filter.author().map(contains_pattern);
        let isbn = filter.isbn().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM books {}", FILTER_CLAUSE))
            .bind(&title)
            .bind(&author)
            .bind(&isbn)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT id, title, author, isbn FROM books {} ORDER BY id {} LIMIT $4 OFFSET $5",
            FILTER_CLAUSE,
            page.direction().as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(&title)
            .bind(&author)
            .bind(&isbn)
            .bind(i64::from(page.size()))
            .bind(i64::try_from(page.offset())?)
            .fetch_all(&self.pool)
            .await?;

        let books = rows.iter().map(map_row_to_book).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(books, u64::try_from(total)?, page))
    }
}
