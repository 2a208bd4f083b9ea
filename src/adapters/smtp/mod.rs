pub mod notifier;

pub use notifier::Notifier as SmtpNotifier;
