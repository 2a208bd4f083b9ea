use rusty_library_loans::{
    adapters::clock::SystemClock,
    adapters::postgres::{PostgresBookRepository, PostgresLoanRepository},
    adapters::smtp::SmtpNotifier,
    api::{handlers::AppState, router::create_router},
    application::{ServiceDependencies, notification::DailyTrigger},
    config::AppConfig,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // .env があれば環境変数に読み込む
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rusty_library_loans={},tower_http=debug",
                    config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // Create service dependencies
    let service_deps = ServiceDependencies {
        book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
        loan_repository: Arc::new(PostgresLoanRepository::new(pool.clone())),
        clock: Arc::new(SystemClock),
        overdue_threshold: config.loans.overdue_threshold(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 延滞通知の日次トリガー
    if config.notification.enabled {
        let notifier =
            Arc::new(SmtpNotifier::new(&config.email).expect("Failed to configure SMTP notifier"));
        let trigger = Arc::new(DailyTrigger::new(
            service_deps.clone(),
            notifier,
            config.notification.template(),
            config.notification.trigger_time,
        ));
        tracing::info!(at = %trigger.at(), "late loan notification enabled");

        let mut shutdown_rx = shutdown_rx.clone();
        tokio::spawn(trigger.run_daily(async move {
            let _ = shutdown_rx.changed().await;
        }));
    } else {
        tracing::info!("late loan notification disabled");
    }

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .expect("Failed to start server");

    drop(shutdown_rx);
}

/// Ctrl+C を待つ
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
