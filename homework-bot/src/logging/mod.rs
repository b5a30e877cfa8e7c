//! Console logging setup.
//!
//! Human-readable lines with local-timezone timestamps. The filter comes
//! from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].

use chrono::Local;
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "homework_bot=debug,reqwest=warn";

/// Custom timer that uses the local timezone via chrono.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Build the filter from `RUST_LOG`, or the default directive.
fn initial_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initialize the global subscriber.
pub fn init_logging() -> crate::Result<()> {
    tracing_subscriber::registry()
        .with(initial_filter())
        .with(fmt::layer().with_ansi(true).with_timer(LocalTimer))
        .try_init()
        .map_err(|e| crate::Error::config(format!("Failed to set global default subscriber: {}", e)))
}

/// Route panics through tracing before the previous hook runs.
///
/// Call after [`init_logging`] so the record reaches the subscriber.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let thread = std::thread::current();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("Box<dyn Any>");
        error!(
            target: "homework_bot::panic",
            thread = thread.name().unwrap_or("<unnamed>"),
            location = %info.location().map(|l| l.to_string()).unwrap_or_default(),
            "Panic: {payload}"
        );
        previous(info);
    }));
}
