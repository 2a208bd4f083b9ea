use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Book, BookId, LoanId, OverdueThreshold};

/// 顧客名の最大長
pub const CUSTOMER_MAX_LENGTH: usize = 100;

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 書籍は貸出作成時に確定し、以後変わらない。
/// `returned` は未設定・false・true の3状態を持ち、未設定とfalseはどちらも「未返却」。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub customer: String,
    pub customer_email: Option<String>,
    pub book: Book,
    pub loan_date: NaiveDate,
    pub returned: Option<bool>,
}

impl Loan {
    /// 返却済みか
    pub fn is_returned(&self) -> bool {
        self.returned == Some(true)
    }

    /// 貸出中の書籍ID
    pub fn book_id(&self) -> BookId {
        self.book.id
    }

    /// 延滞しているか
    ///
    /// ビジネスルール：
    /// - 未返却であること
    /// - 貸出日が基準日（今日 - 閾値日数）より厳密に前であること
    pub fn is_late(&self, today: NaiveDate, threshold: OverdueThreshold) -> bool {
        is_late_at(self, threshold.cutoff(today))
    }

    /// 返却済みにする
    pub fn mark_returned(mut self) -> Self {
        self.returned = Some(true);
        self
    }
}

/// 基準日に対する延滞判定
///
/// 一回の走査の中で同じ基準日を使い回すための関数。
pub fn is_late_at(loan: &Loan, cutoff: NaiveDate) -> bool {
    !loan.is_returned() && loan.loan_date < cutoff
}

/// 未登録の貸出（IDは永続化層が採番する）
///
/// `loan_date` は呼び出し側が設定する。貸出台帳は時刻を自分で刻まない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer: String,
    pub customer_email: Option<String>,
    pub book: Book,
    pub loan_date: NaiveDate,
}

impl NewLoan {
    pub fn new(book: Book, customer: impl Into<String>, loan_date: NaiveDate) -> Self {
        Self {
            customer: customer.into(),
            customer_email: None,
            book,
            loan_date,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// 採番されたIDを付与して登録済みの貸出にする（未返却）
    pub fn with_id(self, id: LoanId) -> Loan {
        Loan {
            id,
            customer: self.customer,
            customer_email: self.customer_email,
            book: self.book,
            loan_date: self.loan_date,
            returned: None,
        }
    }
}

/// 貸出履歴検索の条件
///
/// 書籍のISBNが一致する、**または**顧客名が一致する貸出を返す（OR条件）。
/// 未指定または空文字の条件は一致に寄与しない。両方とも空なら何にも一致しない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoanFilter {
    pub isbn: Option<String>,
    pub customer: Option<String>,
}

impl LoanFilter {
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref().filter(|v| !v.is_empty())
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.isbn().is_none() && self.customer().is_none()
    }

    pub fn matches(&self, loan: &Loan) -> bool {
        self.isbn() == Some(loan.book.isbn.as_str())
            || self.customer() == Some(loan.customer.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewBook;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn loan_on(loan_date: NaiveDate, returned: Option<bool>) -> Loan {
        let book = NewBook::new("As Aventuras", "Arthur", "123").with_id(BookId::new(1));
        Loan {
            returned,
            ..NewLoan::new(book, "Fulano", loan_date).with_id(LoanId::new(1))
        }
    }

    #[test]
    fn test_new_loan_is_not_returned() {
        let loan = loan_on(today(), None);
        assert!(!loan.is_returned());
        assert_eq!(loan.returned, None);
    }

    #[test]
    fn test_returned_false_is_not_returned() {
        assert!(!loan_on(today(), Some(false)).is_returned());
    }

    #[test]
    fn test_mark_returned() {
        let loan = loan_on(today(), None).mark_returned();
        assert!(loan.is_returned());
    }

    #[test]
    fn test_is_late_when_five_days_old() {
        let loan = loan_on(today() - chrono::Days::new(5), Some(false));
        assert!(loan.is_late(today(), OverdueThreshold::days(4)));
    }

    #[test]
    fn test_is_not_late_on_boundary_date() {
        let loan = loan_on(today() - chrono::Days::new(4), None);
        assert!(!loan.is_late(today(), OverdueThreshold::days(4)));
    }

    #[test]
    fn test_returned_loan_is_never_late() {
        let loan = loan_on(today() - chrono::Days::new(10), Some(true));
        assert!(!loan.is_late(today(), OverdueThreshold::days(4)));
    }

    #[test]
    fn test_loan_filter_matches_isbn_or_customer() {
        let filter = LoanFilter {
            isbn: Some("123".to_string()),
            customer: Some("Ciclano".to_string()),
        };
        assert!(filter.matches(&loan_on(today(), None)));

        let filter = LoanFilter {
            isbn: Some("999".to_string()),
            customer: Some("Fulano".to_string()),
        };
        assert!(filter.matches(&loan_on(today(), None)));
    }

    #[test]
    fn test_loan_filter_customer_is_case_sensitive() {
        let filter = LoanFilter {
            isbn: None,
            customer: Some("fulano".to_string()),
        };
        assert!(!filter.matches(&loan_on(today(), None)));
    }

    #[test]
    fn test_empty_loan_filter_matches_nothing() {
        let filter = LoanFilter {
            isbn: Some(String::new()),
            customer: None,
        };
        assert!(filter.is_empty());
        assert!(!filter.matches(&loan_on(today(), None)));
    }
}
