//! Tracing initialization.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, util::SubscriberInitExt};

/// Set to `json` for one JSON object per log line.
pub const LOG_FORMAT_ENV_VAR: &str = "GAME_SEARCH_LOG_FORMAT";

const DEFAULT_DIRECTIVES: &str = "warn,game_search=info";
const TEST_DIRECTIVES: &str = "warn,game_search=debug";

static INIT: Once = Once::new();

fn under_test() -> bool {
    std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok()
}

/// Builds the filter from `RUST_LOG`, falling back to the crate defaults.
pub fn env_filter(is_test: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if is_test {
            TEST_DIRECTIVES
        } else {
            DEFAULT_DIRECTIVES
        })
    })
}

/// Initialize tracing. Safe to call multiple times.
///
/// Logs go to stderr; stdout carries the MCP protocol.
pub fn init() {
    INIT.call_once(|| {
        let is_test = under_test();
        let json = std::env::var(LOG_FORMAT_ENV_VAR).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter(is_test))
            .with_ansi(false)
            .with_target(true)
            .with_span_events(FmtSpan::NONE);

        let result = if is_test {
            // Leaked guard keeps the thread-local default alive for the test thread.
            std::mem::forget(builder.compact().with_test_writer().finish().set_default());
            Ok(())
        } else if json {
            builder.json().with_writer(std::io::stderr).try_init()
        } else {
            builder.compact().with_writer(std::io::stderr).try_init()
        };

        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}
