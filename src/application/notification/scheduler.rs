use crate::application::ServiceDependencies;
use crate::ports::Notifier;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::errors::Result;
use super::late_loan_notification::{NotificationTemplate, notify_late_loans};

/// 1回の起動の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// 通知処理を実行した（通知した宛先の件数）
    Completed { notified: usize },
    /// 前回の起動がまだ実行中のためスキップした
    Skipped,
}

/// `now` より厳密に後で、最初に `at` となる日時
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today_at = now.date().and_time(at);
    if today_at > now {
        return today_at;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(at)
}

/// 延滞通知の日次トリガー
///
/// 毎日決まった時刻に延滞通知を起動する。起動は相互排他で、
/// 前回の処理が終わっていなければ次の起動はキューに積まずにスキップする。
///
/// テストでは `fire()` を直接呼び出し、本番では `run_daily()` のタイマーで駆動する。
pub struct DailyTrigger {
    deps: ServiceDependencies,
    notifier: Arc<dyn Notifier>,
    template: NotificationTemplate,
    at: NaiveTime,
    running: Mutex<()>,
}

impl DailyTrigger {
    pub fn new(
        deps: ServiceDependencies,
        notifier: Arc<dyn Notifier>,
        template: NotificationTemplate,
        at: NaiveTime,
    ) -> Self {
        Self {
            deps,
            notifier,
            template,
            at,
            running: Mutex::new(()),
        }
    }

    /// 起動時刻
    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// 1回起動する
    ///
    /// 通知の失敗は再試行せずにそのまま返す。
    pub async fn fire(&self) -> Result<FireOutcome> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!("late loan notification still running, skipping this firing");
            return Ok(FireOutcome::Skipped);
        };

        let notified =
            notify_late_loans(&self.deps, self.notifier.as_ref(), &self.template).await?;
        Ok(FireOutcome::Completed { notified })
    }

    /// `shutdown` が完了するまで、毎日 `at` に起動し続ける
    ///
    /// 起動はタスクとして切り離すので、処理が長引いてもタイマーは止まらない。
    /// 失敗はログに記録し、翌日の起動を待つ。
    pub async fn run_daily<F>(self: Arc<Self>, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);
        let mut last_run: Option<NaiveDateTime> = None;

        loop {
            let now = self.deps.clock.now();
            // タイマーが予定より早く戻っても同じ日に二度起動しない
            let reference = match last_run {
                Some(last) if last >= now => last,
                _ => now,
            };
            let next = next_run_after(reference, self.at);
            let wait = (next - now).to_std().unwrap_or_default();

            tracing::info!(%next, "next late loan notification scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = &mut shutdown => {
                    tracing::info!("late loan notification scheduler stopped");
                    break;
                }
            }

            last_run = Some(next);
            let trigger = Arc::clone(&self);
            tokio::spawn(async move {
                match trigger.fire().await {
                    Ok(FireOutcome::Completed { notified }) => {
                        tracing::info!(notified, "late loan notification finished");
                    }
                    Ok(FireOutcome::Skipped) => {}
                    Err(e) => {
                        tracing::error!("Late loan notification failed: {}", e);
                    }
                }
            });
        }
    }
}
