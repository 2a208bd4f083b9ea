use crate::config::EmailConfig;
use crate::ports::notifier::Notifier as NotifierTrait;
use crate::ports::Result;
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::str::FromStr;

/// SMTPによる通知の実装
///
/// 1回の通知を1通のメールとして送る。宛先同士が互いのアドレスを見ないよう
/// 全員をBccに入れ、Toには送信元を設定する。
pub struct Notifier {
    from: Mailbox,
    mailer: SmtpTransport,
}

impl Notifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = Mailbox::from_str(&config.smtp_from)
            .map_err(|e| format!("Invalid from address: {}", e))?;

        let builder = if config.smtp_use_tls {
            SmtpTransport::starttls_relay(&config.smtp_host)
                .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            from,
            mailer: builder.build(),
        })
    }

    fn build_message(&self, subject: &str, body: &str, recipients: &[Mailbox]) -> Result<Message> {
        let mut message = Message::builder()
            .from(self.from.clone())
            .to(self.from.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);

        for mailbox in recipients {
            message = message.bcc(mailbox.clone());
        }

        Ok(message
            .body(body.to_string())
            .map_err(|e| format!("Failed to build email: {}", e))?)
    }
}

/// 宛先をメールアドレスとして解釈する
///
/// 解釈できない宛先は警告を出して除外する。1件の不正な宛先で他の顧客への通知を止めない。
fn parse_recipients(recipients: &[String]) -> Vec<Mailbox> {
    recipients
        .iter()
        .filter_map(|recipient| match Mailbox::from_str(recipient) {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                tracing::warn!(recipient = %recipient, "skipping invalid recipient address: {}", e);
                None
            }
        })
        .collect()
}

#[async_trait]
impl NotifierTrait for Notifier {
    async fn notify(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        let mailboxes = parse_recipients(recipients);
        if mailboxes.is_empty() {
            tracing::warn!(
                recipients = recipients.len(),
                "no valid recipient address, email not sent"
            );
            return Ok(());
        }

        let message = self.build_message(subject, body, &mailboxes)?;
        let mailer = self.mailer.clone();

        // SmtpTransportはブロッキングなので専用スレッドで送信する
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await?
            .map_err(|e| format!("Failed to send email: {}", e))?;

        tracing::info!(recipients = mailboxes.len(), "email sent");
        Ok(())
    }
}
