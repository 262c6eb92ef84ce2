//! Logging setup for cohort chat binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// `targets` lists the crate/binary targets that receive `default_log_level`
/// (hyphens are converted to underscores, as tracing targets use module paths).
/// `RUST_LOG` overrides the whole filter when set.
///
/// # Examples
///
/// ```no_run
/// use cohort_chat_shared::logger::setup_logger;
///
/// setup_logger(&["cohort-chat-server", "tower_http"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(targets: &[&str], level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), level))
        .collect::<Vec<_>>()
        .join(",")
}
