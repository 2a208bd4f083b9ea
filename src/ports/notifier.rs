use async_trait::async_trait;

use super::Result;

/// 通知ポート
///
/// 顧客への通知配信メカニズムを抽象化する。
/// 1回の呼び出しで同じ件名・本文を全宛先に送る。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()>;
}
