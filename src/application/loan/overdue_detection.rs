use crate::application::ServiceDependencies;
use crate::domain::{Loan, OverdueThreshold};
use chrono::NaiveDate;

use super::errors::{LoanApplicationError, Result};

/// 延滞中の貸出を取得する
///
/// 「今日」は注入された時計から一度だけ読み取り、走査全体で同じ基準日を使う。
pub async fn get_all_late_loans(deps: &ServiceDependencies) -> Result<Vec<Loan>> {
    let today = deps.clock.today();
    get_late_loans_as_of(deps, today, deps.overdue_threshold).await
}

/// 指定日時点で延滞中の貸出を取得する
///
/// ビジネスルール：
/// - 貸出日が（today - 閾値日数）より厳密に前であること（同日は延滞ではない）
/// - 返却済みでないこと
pub async fn get_late_loans_as_of(
    deps: &ServiceDependencies,
    today: NaiveDate,
    threshold: OverdueThreshold,
) -> Result<Vec<Loan>> {
    let cutoff = threshold.cutoff(today);

    let late_loans = deps
        .loan_repository
        .find_late(cutoff)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    tracing::info!(
        %today,
        %cutoff,
        count = late_loans.len(),
        "late loans detected"
    );

    Ok(late_loans)
}
