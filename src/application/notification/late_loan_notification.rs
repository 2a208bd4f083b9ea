use crate::application::{ServiceDependencies, loan};
use crate::domain::Loan;
use crate::ports::Notifier;
use serde::Deserialize;
use std::collections::HashSet;

use super::errors::{NotificationError, Result};

/// 延滞通知の件名と本文
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationTemplate {
    pub subject: String,
    pub body: String,
}

/// 延滞貸出から通知先メールアドレスを集める
///
/// メールアドレスのない貸出は除外し、重複は最初の出現順で1件にまとめる。
pub fn collect_recipients(loans: &[Loan]) -> Vec<String> {
    let mut seen = HashSet::new();
    loans
        .iter()
        .filter_map(|loan| loan.customer_email.as_deref())
        .filter(|email| !email.trim().is_empty())
        .filter(|email| seen.insert(*email))
        .map(str::to_string)
        .collect()
}

/// 延滞中の顧客に通知する
///
/// 処理フロー：
/// 1. 延滞中の貸出を検出
/// 2. 各貸出を顧客のメールアドレスに射影
/// 3. 固定の件名・本文で通知を1回だけ送る（宛先がなければ送らない）
///
/// # 戻り値
/// 通知した宛先の件数
pub async fn notify_late_loans(
    deps: &ServiceDependencies,
    notifier: &dyn Notifier,
    template: &NotificationTemplate,
) -> Result<usize> {
    let late_loans = loan::get_all_late_loans(deps).await?;
    let recipients = collect_recipients(&late_loans);

    if recipients.is_empty() {
        tracing::info!(
            late_loans = late_loans.len(),
            "no recipients for late loan notification"
        );
        return Ok(0);
    }

    notifier
        .notify(&template.subject, &template.body, &recipients)
        .await
        .map_err(NotificationError::NotifierError)?;

    tracing::info!(recipients = recipients.len(), "late loan notification sent");
    Ok(recipients.len())
}
