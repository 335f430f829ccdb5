use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown at `LOG_LEVEL`; everything else is quieter.
pub(crate) const APP_TARGETS: &[&str] = &[
    "timetabler",
    "timetabler_scheduling",
    "timetabler_db",
    "timetabler_config",
    "timetabler_cli",
];

/// Default filter directives for `level`, used when `RUST_LOG` is not set.
pub(crate) fn default_directives(level: &str) -> String {
    let mut directives: Vec<String> = APP_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.extend(
        ["tower_http=warn", "hyper=warn", "tonic=warn", "h2=warn", "sqlx=warn"]
            .iter()
            .map(|s| s.to_string()),
    );
    directives.join(",")
}

/// Console-only logging, used when observability is off.
///
/// - **Log Level**: `LOG_LEVEL` (default "info"), overridden entirely by `RUST_LOG`
/// - **Format**: compact, with file and line numbers
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log_level)));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    // try_init: a subscriber may already be installed (tests, CLI re-entry).
    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
