//! Logging and tracing infrastructure.
//!
//! Structured logging using the tracing crate, with plain and JSON output
//! and `RUST_LOG`-style filtering.

use std::sync::Once;
use tracing::info;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Level used when `RUST_LOG` is unset or unparsable.
const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a plain-text subscriber for classifier runs.
///
/// Only the first call of this or [`init_tracing_json`] takes effect. A
/// subscriber already owned by the host application is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(layer)
            .try_init();
        info!(format = "text", "installer-insight tracing initialized");
    });
}

/// Install a JSON subscriber, one object per event with the current span.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true);
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(layer)
            .try_init();
        info!(format = "json", "installer-insight tracing initialized");
    });
}

/// Macro for creating spans around a detection step
#[macro_export]
macro_rules! span_trace {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
