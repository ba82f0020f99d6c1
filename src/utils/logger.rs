use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "RECEIPT_STATEMENT_LINKER_LOG_LEVEL";

/// Maps the application log level variable onto a tracing directive.
/// Unknown values fall back to `error`.
pub fn level_directive(level: Option<&str>) -> &'static str {
    match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("debug") => "receipt_statement_linker=debug",
        Some("info") => "receipt_statement_linker=info",
        Some("warning") | Some("warn") => "receipt_statement_linker=warn",
        _ => "receipt_statement_linker=error",
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("receipt_statement_linker=debug,info");
    }

    match std::env::var(LOG_LEVEL_ENV) {
        Ok(level) => EnvFilter::new(level_directive(Some(&level))),
        Err(_) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_directive(None))),
    }
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON lines on stderr, for runs driven by another program.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .json(),
        )
        .init();
}
