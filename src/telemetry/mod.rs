//! Tracing subscriber setup for binaries and examples embedding the engine.

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (a `.env` file is honored), falling back
/// to `default_directive`. Call once at process start; a second call is a
/// no-op so tests that race on initialization stay quiet.
///
/// # Examples
///
/// ```rust,no_run
/// rubriq::telemetry::init("warn,rubriq=info");
/// ```
pub fn init(default_directive: &str) {
    dotenvy::dotenv().ok();

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();
}
