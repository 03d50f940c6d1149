/*!
 * Logging Module
 * Subscriber setup: rolling files plus console, JSON in production
 */
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::SiteConfig;

const LOG_DIR: &str = "logs";

/// Writer guards; dropping them flushes and stops the background log threads.
#[must_use = "dropping the guards loses buffered log lines"]
pub struct LogGuards(#[allow(dead_code)] Vec<WorkerGuard>);

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(is_production: bool, log_level: Option<&str>) -> String {
    let level = log_level.unwrap_or(if is_production { "info" } else { "debug" });
    format!("church_site={},tower_http=debug,axum=debug", level)
}

/// Initialize the logging system
pub fn init(config: &SiteConfig) -> LogGuards {
    let is_production = config.is_production();

    if let Err(e) = std::fs::create_dir_all(LOG_DIR) {
        eprintln!("could not create {} directory: {}", LOG_DIR, e);
    }

    // File appender for all logs
    let (file_writer, file_guard) = non_blocking(rolling::daily(LOG_DIR, "app.log"));

    // File appender for errors only
    let (error_writer, error_guard) = non_blocking(rolling::daily(LOG_DIR, "error.log"));

    let (console_writer, console_guard) = non_blocking(io::stdout());

    let log_level = std::env::var("LOG_LEVEL").ok();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(is_production, log_level.as_deref())));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if is_production {
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .json()
            .with_writer(console_writer)
            .with_target(false);

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    } else {
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let error_layer = fmt::layer()
            .with_writer(error_writer)
            .with_ansi(false)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = fmt::layer()
            .with_writer(console_writer)
            .with_target(true)
            .pretty();

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .init();
    }

    tracing::info!(
        environment = %config.environment,
        "logging initialized"
    );

    LogGuards(vec![file_guard, error_guard, console_guard])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(
            default_filter(true, None),
            "church_site=info,tower_http=debug,axum=debug"
        );
        assert!(default_filter(false, None).starts_with("church_site=debug"));
        assert!(default_filter(true, Some("warn")).starts_with("church_site=warn"));
    }
}
