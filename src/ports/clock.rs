use chrono::{NaiveDate, NaiveDateTime};

/// 時計ポート
///
/// 「今日」を外部から注入できるようにして、延滞判定とスケジューラを決定的にテストする。
pub trait Clock: Send + Sync {
    /// ローカル時刻の現在日時
    fn now(&self) -> NaiveDateTime;

    /// ローカル時刻の今日の日付
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
