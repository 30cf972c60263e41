//! Tracing initialisation for ticketcheck binaries.
//!
//! Filter directives are taken from `TICKETCHECK_LOG`, then `RUST_LOG`,
//! then the level passed by the caller. When only the level applies, the
//! HTTP stack is held at `warn` so request internals do not drown out
//! scan events. `TICKETCHECK_LOG_FORMAT=json` forces JSON output.

use std::env;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_ENV: &str = "TICKETCHECK_LOG";
pub const LOG_FORMAT_ENV: &str = "TICKETCHECK_LOG_FORMAT";

const QUIET_DEPS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// Resolve the filter directives from the two env values and the fallback level.
pub fn filter_directives(
    ticketcheck_log: Option<String>,
    rust_log: Option<String>,
    level: Level,
) -> String {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    if let Some(directives) = non_empty(ticketcheck_log).or_else(|| non_empty(rust_log)) {
        return directives;
    }
    let mut directives = vec![level.as_str().to_ascii_lowercase()];
    directives.extend(QUIET_DEPS.iter().map(|d| d.to_string()));
    directives.join(",")
}

/// Whether to emit JSON: the caller's flag, or `json` in the format env value.
pub fn wants_json(flag: bool, format: Option<&str>) -> bool {
    flag || format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

/// Initialise the global subscriber. Logs go to stderr so stdout stays
/// machine-readable. Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let directives = filter_directives(env::var(LOG_ENV).ok(), env::var("RUST_LOG").ok(), level);
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| {
        eprintln!("ticketcheck: ignoring invalid log filter {directives:?}");
        EnvFilter::new(level.as_str())
    });

    let format = env::var(LOG_FORMAT_ENV).ok();
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let layer = if wants_json(json, format.as_deref()) {
        layer.json().boxed()
    } else {
        layer.boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .ok();
}
