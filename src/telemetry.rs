//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,round=trace,earshot_backend=debug,tower_http=info").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Notes:
//! - Targets are printed so engine events (`round`) and server plumbing
//!   (`earshot_backend`) can be told apart and filtered separately.
//! - Per-connection spans carry a session id; tower-http's TraceLayer adds
//!   its own per-request spans on top.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    // One fmt subscriber with the EnvFilter attached; the default keeps engine
    // events at debug so round transitions show up without extra setup.
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,round=debug,earshot_backend=debug,tower_http=info,axum=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // `json()` changes the builder type, so each arm finishes its own init.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
