use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// 書籍ID - カタログ管理コンテキストの集約ID
///
/// 永続化層が挿入時に採番する。採番済みのIDは常に正の値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// 永続化層によって採番済みか（正の値か）
    pub fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

/// 貸出ID - 貸出管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoanId(i64);

impl LoanId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

/// 延滞とみなすまでの日数
///
/// 貸出日が「今日 - 日数」より厳密に前であれば延滞。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueThreshold(u32);

impl OverdueThreshold {
    /// 既定値（4日）
    pub const DEFAULT_DAYS: u32 = 4;

    pub fn days(days: u32) -> Self {
        Self(days)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// 延滞判定の基準日
    ///
    /// この日付より前（同日は含まない）の貸出が延滞候補となる。
    /// 日付が表現範囲を下回る場合は `NaiveDate::MIN` に丸める。
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.0)))
            .unwrap_or(NaiveDate::MIN)
    }
}

impl Default for OverdueThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_book_id_is_assigned_only_when_positive() {
        assert!(BookId::new(1).is_assigned());
        assert!(!BookId::new(0).is_assigned());
        assert!(!BookId::new(-7).is_assigned());
    }

    #[test]
    fn test_loan_id_is_assigned_only_when_positive() {
        assert!(LoanId::new(42).is_assigned());
        assert!(!LoanId::new(0).is_assigned());
    }

    #[test]
    fn test_overdue_threshold_default_is_four_days() {
        assert_eq!(OverdueThreshold::default().value(), 4);
    }

    #[test]
    fn test_overdue_threshold_cutoff() {
        let threshold = OverdueThreshold::days(4);
        assert_eq!(threshold.cutoff(date(2024, 3, 10)), date(2024, 3, 6));
    }

    #[test]
    fn test_overdue_threshold_cutoff_crosses_month_boundary() {
        let threshold = OverdueThreshold::days(4);
        assert_eq!(threshold.cutoff(date(2024, 3, 2)), date(2024, 2, 27));
    }

    #[test]
    fn test_overdue_threshold_zero_days_cutoff_is_today() {
        let today = date(2024, 1, 1);
        assert_eq!(OverdueThreshold::days(0).cutoff(today), today);
    }
}
