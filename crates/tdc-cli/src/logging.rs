//! Diagnostic logging to stderr. Stdout stays reserved for command output.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when it parses; otherwise `debug` with `-d`, `warn` without.
fn filter_for(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug { "debug" } else { "warn" }))
}

pub fn init(debug: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter_for(debug, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
