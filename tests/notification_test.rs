use async_trait::async_trait;
use rusty_library_loans::adapters::mock::Notifier as MockNotifier;
use rusty_library_loans::application::notification::{
    DailyTrigger, FireOutcome, NotificationError, NotificationTemplate, notify_late_loans,
};
use rusty_library_loans::application::loan::save_loan;
use rusty_library_loans::domain::{Book, NewLoan};
use rusty_library_loans::application::ServiceDependencies;
use rusty_library_loans::ports::{Clock, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

mod common;

use common::{TestContext, days_ago, register_book, setup, today};

fn template() -> NotificationTemplate {
    NotificationTemplate {
        subject: "Late book loan".to_string(),
        body: "Please return the book as soon as possible.".to_string(),
    }
}

fn one_pm() -> chrono::NaiveTime {
    chrono::NaiveTime::from_hms_opt(13, 0, 0).unwrap()
}

async fn lend(ctx: &TestContext, book: Book, email: Option<&str>, days: u64) {
    let mut loan = NewLoan::new(book, "Fulano", days_ago(days));
    if let Some(email) = email {
        loan = loan.with_email(email);
    }
    save_loan(&ctx.deps, loan).await.unwrap();
}

/// 延滞2件（うち1件はメールなし）と期限内1件を用意する
async fn seed_loans(ctx: &TestContext) {
    let late = register_book(ctx, "Atrasado", "Autor", "001").await;
    let late_without_email = register_book(ctx, "Sem email", "Autor", "002").await;
    let on_time = register_book(ctx, "Em dia", "Autor", "003").await;

    lend(ctx, late, Some("fulano@email.com"), 6).await;
    lend(ctx, late_without_email, None, 8).await;
    lend(ctx, on_time, Some("ciclano@email.com"), 1).await;
}

// ============================================================================
// 延滞通知
// ============================================================================

#[tokio::test]
async fn test_notify_late_loans_sends_once_to_late_customers() {
    let ctx = setup();
    seed_loans(&ctx).await;
    let notifier = MockNotifier::new();

    let notified = notify_late_loans(&ctx.deps, &notifier, &template())
        .await
        .unwrap();

    assert_eq!(notified, 1);
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Late book loan");
    assert_eq!(sent[0].body, template().body);
    assert_eq!(sent[0].recipients, vec!["fulano@email.com".to_string()]);
}

#[tokio::test]
async fn test_notify_late_loans_deduplicates_recipients() {
    let ctx = setup();
    for isbn in ["001", "002"] {
        let book = register_book(&ctx, "Atrasado", "Autor", isbn).await;
        lend(&ctx, book, Some("fulano@email.com"), 7).await;
    }
    let notifier = MockNotifier::new();

    let notified = notify_late_loans(&ctx.deps, &notifier, &template())
        .await
        .unwrap();

    assert_eq!(notified, 1);
    assert_eq!(
        notifier.sent()[0].recipients,
        vec!["fulano@email.com".to_string()]
    );
}

#[tokio::test]
async fn test_notify_late_loans_without_recipients_sends_nothing() {
    let ctx = setup();
    let book = register_book(&ctx, "Em dia", "Autor", "003").await;
    lend(&ctx, book, Some("ciclano@email.com"), 0).await;
    let notifier = MockNotifier::new();

    let notified = notify_late_loans(&ctx.deps, &notifier, &template())
        .await
        .unwrap();

    assert_eq!(notified, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_notifier_failure_is_propagated() {
    let ctx = setup();
    seed_loans(&ctx).await;
    let notifier = MockNotifier::new();
    notifier.fail_with_error();

    let result = notify_late_loans(&ctx.deps, &notifier, &template()).await;

    assert!(matches!(result, Err(NotificationError::NotifierError(_))));
}

// ============================================================================
// 日次トリガー
// ============================================================================

#[tokio::test]
async fn test_fire_notifies_with_current_clock() {
    let ctx = setup();
    seed_loans(&ctx).await;
    let notifier = Arc::new(MockNotifier::new());
    let trigger = DailyTrigger::new(ctx.deps.clone(), notifier.clone(), template(), one_pm());

    let outcome = trigger.fire().await.unwrap();

    assert_eq!(outcome, FireOutcome::Completed { notified: 1 });
    assert_eq!(notifier.sent().len(), 1);

    // 翌日以降は期限内だった貸出も延滞になる
    ctx.clock
        .set(today().and_time(one_pm()) + chrono::Duration::days(5));
    let outcome = trigger.fire().await.unwrap();

    assert_eq!(outcome, FireOutcome::Completed { notified: 2 });
    assert_eq!(
        notifier.sent()[1].recipients,
        vec![
            "fulano@email.com".to_string(),
            "ciclano@email.com".to_string()
        ]
    );
}

/// 解放されるまで通知を完了しない通知実装
#[derive(Default)]
struct GatedNotifier {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn notify(
        &self,
        _subject: &str,
        _body: &str,
        _recipients: &[String],
    ) -> rusty_library_loans::ports::Result<()> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

#[tokio::test]
async fn test_overlapping_fire_is_skipped() {
    let ctx = setup();
    seed_loans(&ctx).await;
    let notifier = Arc::new(GatedNotifier::default());
    let trigger = Arc::new(DailyTrigger::new(
        ctx.deps.clone(),
        notifier.clone(),
        template(),
        one_pm(),
    ));

    let running = tokio::spawn({
        let trigger = Arc::clone(&trigger);
        async move { trigger.fire().await }
    });
    notifier.entered.notified().await;

    let overlapping = trigger.fire().await.unwrap();
    assert_eq!(overlapping, FireOutcome::Skipped);

    notifier.release.notify_one();
    let first = running.await.unwrap().unwrap();
    assert_eq!(first, FireOutcome::Completed { notified: 1 });

    // 前回の処理が終われば再び起動できる
    notifier.release.notify_one();
    assert_eq!(
        trigger.fire().await.unwrap(),
        FireOutcome::Completed { notified: 1 }
    );
}

#[tokio::test]
async fn test_run_daily_stops_on_shutdown() {
    let ctx = setup();
    let notifier = Arc::new(MockNotifier::new());
    let trigger = Arc::new(DailyTrigger::new(
        ctx.deps.clone(),
        notifier.clone(),
        template(),
        one_pm(),
    ));

    tokio::time::timeout(Duration::from_secs(5), trigger.run_daily(async {}))
        .await
        .expect("scheduler must stop when shutdown completes");

    assert!(notifier.sent().is_empty());
}

/// tokioの時間（テストでは一時停止・自動前進する）に追従する時計
struct TokioClock {
    base: chrono::NaiveDateTime,
    started: tokio::time::Instant,
}

impl Clock for TokioClock {
    fn now(&self) -> chrono::NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
        self.base + elapsed
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_daily_fires_once_per_day() {
    let ctx = setup();
    seed_loans(&ctx).await;

    // 起動時刻の1秒前から3日間動かす
    let noon = chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let at = chrono::NaiveTime::from_hms_opt(12, 0, 1).unwrap();
    let deps = ServiceDependencies {
        clock: Arc::new(TokioClock {
            base: today().and_time(noon),
            started: tokio::time::Instant::now(),
        }),
        ..ctx.deps.clone()
    };
    let notifier = Arc::new(MockNotifier::new());
    let trigger = Arc::new(DailyTrigger::new(deps, notifier.clone(), template(), at));

    trigger
        .run_daily(tokio::time::sleep(Duration::from_secs(3 * 24 * 60 * 60)))
        .await;
    // 最後に起動したタスクを完了させる
    tokio::task::yield_now().await;

    assert_eq!(notifier.sent().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_run_daily_does_not_fire_twice_when_clock_stands_still() {
    let ctx = setup();
    seed_loans(&ctx).await;

    // 時計が止まっていても、同じ予定時刻に二度起動しない
    let at = chrono::NaiveTime::from_hms_opt(12, 0, 1).unwrap();
    let notifier = Arc::new(MockNotifier::new());
    let trigger = Arc::new(DailyTrigger::new(
        ctx.deps.clone(),
        notifier.clone(),
        template(),
        at,
    ));

    trigger
        .run_daily(tokio::time::sleep(Duration::from_secs(60)))
        .await;
    tokio::task::yield_now().await;

    assert_eq!(notifier.sent().len(), 1);
}
