//! 設定の読み込み
//!
//! 既定値 → `config/default` → `config/{RUN_MODE}` → 環境変数（`LIBRARY__` 接頭辞）の順に重ねる。

use crate::application::notification::NotificationTemplate;
use crate::domain::OverdueThreshold;
use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoansConfig {
    /// 延滞とみなすまでの日数
    pub overdue_threshold_days: u32,
}

impl LoansConfig {
    pub fn overdue_threshold(&self) -> OverdueThreshold {
        OverdueThreshold::days(self.overdue_threshold_days)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    /// 日次トリガーを起動するか
    pub enabled: bool,
    pub subject: String,
    pub body: String,
    /// 起動時刻（ローカル時刻、"HH:MM:SS"）
    pub trigger_time: NaiveTime,
}

impl NotificationConfig {
    pub fn template(&self) -> NotificationTemplate {
        NotificationTemplate {
            subject: self.subject.clone(),
            body: self.body.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    pub smtp_use_tls: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub loans: LoansConfig,
    pub notification: NotificationConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 設定ファイルと環境変数から読み込む
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?
            .try_deserialize()
    }

    /// 既定値だけで構成する（ファイル・環境変数は読まない）
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "postgres://localhost/library")?
            .set_default("database.max_connections", 5)?
            .set_default(
                "loans.overdue_threshold_days",
                i64::from(OverdueThreshold::DEFAULT_DAYS),
            )?
            .set_default("notification.enabled", true)?
            .set_default("notification.subject", "Late book loan")?
            .set_default(
                "notification.body",
                "Attention! You have a book loan that is past its return date. \
                 Please return the book as soon as possible.",
            )?
            .set_default("notification.trigger_time", "13:00:00")?
            .set_default("email.smtp_host", "localhost")?
            .set_default("email.smtp_port", 587)?
            .set_default("email.smtp_from", "library@localhost")?
            .set_default("email.smtp_use_tls", true)?
            .set_default("logging.level", "info")
    }
}
