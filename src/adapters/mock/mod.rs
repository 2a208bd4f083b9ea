pub mod notifier;

pub use notifier::{NotificationRecord, Notifier};
