//! Logging setup
//!
//! Logs go to stderr so stdout stays reserved for reports and base64 output.

use tracing_subscriber::{EnvFilter, filter::Directive, fmt, prelude::*};

/// usvg reports every text node it cannot shape; one notice from the font
/// loader is enough, so its own warnings are capped unless `RUST_LOG` names it.
const USVG_DIRECTIVE: &str = "usvg=error";

/// Build the filter: `level` is the default directive, `RUST_LOG` refines it.
pub fn env_filter(level: &str, rust_log: &str) -> EnvFilter {
    let level = match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "warn",
    };
    let filter = EnvFilter::builder()
        .with_default_directive(
            level.parse().unwrap_or_else(|_| tracing::level_filters::LevelFilter::WARN.into()),
        )
        .parse_lossy(rust_log);
    if rust_log.contains("usvg") {
        return filter;
    }
    match USVG_DIRECTIVE.parse::<Directive>() {
        Ok(d) => filter.add_directive(d),
        Err(_) => filter,
    }
}

/// Install the global subscriber. Called once from `main`.
pub fn init_logging(level: &str) {
    let filter = env_filter(level, &std::env::var("RUST_LOG").unwrap_or_default());
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}
