use crate::ports::notifier::Notifier as NotifierTrait;
use crate::ports::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// 送信された通知の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Mock implementation of Notifier
///
/// Does not deliver anything; records every call so tests can inspect it.
/// Can be switched to fail to exercise error propagation.
#[derive(Default)]
pub struct Notifier {
    sent: Mutex<Vec<NotificationRecord>>,
    failing: AtomicBool,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail
    pub fn fail_with_error(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Calls recorded so far
    pub fn sent(&self) -> Vec<NotificationRecord> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotifierTrait for Notifier {
    async fn notify(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err("mock notifier failure".into());
        }

        self.sent
            .lock()
            .map_err(|e| e.to_string())?
            .push(NotificationRecord {
                subject: subject.to_string(),
                body: body.to_string(),
                recipients: recipients.to_vec(),
            });
        Ok(())
    }
}
