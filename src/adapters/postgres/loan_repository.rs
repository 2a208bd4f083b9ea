use crate::domain::{Book, BookId, Loan, LoanFilter, LoanId, NewLoan, Page, PageRequest};
use crate::ports::loan_repository::LoanRepository as LoanRepositoryTrait;
use crate::ports::{InsertOutcome, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::is_unique_violation;

/// 貸出と書籍を結合して取得するSELECT句
///
/// 貸出は常に書籍を解決済みの状態で返す。
const SELECT_LOANS: &str = r#"
    SELECT
        l.id,
        l.customer,
        l.customer_email,
        l.loan_date,
        l.returned,
        b.id AS book_id,
        b.title AS book_title,
        b.author AS book_author,
        b.isbn AS book_isbn
    FROM loans l
    JOIN books b ON b.id = l.book_id
"#;

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    Ok(Loan {
        id: LoanId::new(row.try_get("id")?),
        customer: row.try_get("customer")?,
        customer_email: row.try_get("customer_email")?,
        book: Book {
            id: BookId::new(row.try_get("book_id")?),
            title: row.try_get("book_title")?,
            author: row.try_get("book_author")?,
            isbn: row.try_get("book_isbn")?,
        },
        loan_date: row.try_get("loan_date")?,
        returned: row.try_get("returned")?,
    })
}

/// LoanRepositoryのPostgreSQL実装
///
/// 1冊につき未返却の貸出は1件までという不変条件を、部分一意インデックス
/// `loans_one_unreturned_per_book` で保証する。ロックは書籍単位の行に閉じる。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// PostgreSQLコネクションプールから新しいLoanRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// ISBNまたは顧客名の条件でページを取得する
    async fn find_by_isbn_or_customer(
        &self,
        isbn: Option<&str>,
        customer: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE b.isbn = $1 OR l.customer = $2
            "#,
        )
        .bind(isbn)
        .bind(customer)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "{} WHERE b.isbn = $1 OR l.customer = $2 ORDER BY l.id {} LIMIT $3 OFFSET $4",
            SELECT_LOANS,
            page.direction().as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(isbn)
            .bind(customer)
            .bind(i64::from(page.size()))
            .bind(i64::try_from(page.offset())?)
            .fetch_all(&self.pool)
            .await?;

        let loans = rows.iter().map(map_row_to_loan).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(loans, u64::try_from(total)?, page))
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 貸出を登録（IDはBIGSERIALで採番）
    ///
    /// 部分一意インデックスの違反は、同じ書籍に未返却の貸出があることを意味する。
    async fn insert(&self, loan: NewLoan) -> Result<InsertOutcome<Loan>> {
        let result = sqlx::query(
            r#"
            INSERT INTO loans (customer, customer_email, book_id, loan_date, returned)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING id
            "#,
        )
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.book.id.value())
        .bind(loan.loan_date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let id: i64 = row.try_get("id")?;
                Ok(InsertOutcome::Inserted(loan.with_id(LoanId::new(id))))
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<Loan>> {
        let sql = format!("{} WHERE l.id = $1", SELECT_LOANS);
        let row = sqlx::query(&sql)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn exists_unreturned_for_book(&self, book_id: BookId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND returned IS NOT TRUE)",
        )
        .bind(book_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, loan: &Loan) -> Result<Option<Loan>> {
        let result = sqlx::query(
            r#"
            UPDATE loans
            SET customer = $2, customer_email = $3, returned = $4
            WHERE id = $1
            "#,
        )
        .bind(loan.id.value())
        .bind(&loan.customer)
        .bind(&loan.customer_email)
        .bind(loan.returned)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(loan.id).await
    }

    /// ISBNまたは顧客名で検索（OR条件）
    ///
    /// NULLとの比較は真にならないため、未指定の条件は何にも一致しない。
    async fn find(&self, filter: &LoanFilter, page: PageRequest) -> Result<Page<Loan>> {
        self.find_by_isbn_or_customer(filter.isbn(), filter.customer(), page)
            .await
    }

    async fn find_by_book(&self, book_id: BookId, page: PageRequest) -> Result<Page<Loan>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id.value())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "{} WHERE l.book_id = $1 ORDER BY l.id {} LIMIT $2 OFFSET $3",
            SELECT_LOANS,
            page.direction().as_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(book_id.value())
            .bind(i64::from(page.size()))
            .bind(i64::try_from(page.offset())?)
            .fetch_all(&self.pool)
            .await?;

        let loans = rows.iter().map(map_row_to_loan).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(loans, u64::try_from(total)?, page))
    }

    /// 延滞候補を検索（バッチ延滞検知用）
    ///
    /// 部分インデックス `loans_unreturned_loan_date` を使用する。
    async fn find_late(&self, cutoff: NaiveDate) -> Result<Vec<Loan>> {
        let sql = format!(
            "{} WHERE l.loan_date < $1 AND l.returned IS NOT TRUE ORDER BY l.loan_date, l.id",
            SELECT_LOANS
        );
        let rows = sqlx::query(&sql)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
