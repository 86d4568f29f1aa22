//! Logging setup for the partyhub binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose logs are shown at `default_log_level`.
const CRATES: &[&str] = &[
    "partyhub",
    "partyhub_protocol",
    "partyhub_store",
    "partyhub_room",
    "partyhub_tick",
    "partyhub_game",
    "tower_http",
];

/// Initialize the tracing subscriber with the specified default log level.
///
/// `RUST_LOG` overrides the default filter when set.
///
/// ```no_run
/// partyhub::logger::setup_logger("partyhub", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(binary_name: &str, level: &str) -> String {
    let mut directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
    let binary = binary_name.replace('-', "_");
    if !CRATES.contains(&binary.as_str()) {
        directives.push(format!("{binary}={level}"));
    }
    directives.join(",")
}
