mod errors;
mod late_loan_notification;
mod scheduler;

pub use errors::{NotificationError, Result};
pub use late_loan_notification::{NotificationTemplate, collect_recipients, notify_late_loans};
pub use scheduler::{DailyTrigger, FireOutcome, next_run_after};
