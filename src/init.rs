use crate::debug_sink::DEBUG_STREAM_TARGET;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Configuration of the diagnostic subscriber installed by
/// [`init_tracing_with_config`].
///
/// **Fields**
/// - `ansi`: colorize output when the terminal supports it.
/// - `diagnostics`: also print this crate's own warnings (failed
///   deliveries and the like), not just the log lines.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub ansi: bool,
    pub diagnostics: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            ansi: false,
            diagnostics: true,
        }
    }
}

/// Error returned when a global subscriber cannot be installed.
#[derive(thiserror::Error, Debug)]
#[error("failed to install tracing subscriber: {0}")]
pub struct SubscriberInitError(String);

/// Install a global `tracing` subscriber that prints the lines emitted by
/// [`crate::debug_sink::DebugStreamSink`] bare, one per output line,
/// with no timestamp, level or target of its own.
///
/// Fails if another global subscriber is already installed.
pub fn init_tracing_with_config(config: TracingConfig) -> Result<(), SubscriberInitError> {
    let own_level = if config.diagnostics {
        LevelFilter::WARN
    } else {
        LevelFilter::OFF
    };
    // The more specific crate target wins over the `playground` prefix.
    let filter = Targets::new()
        .with_target(DEBUG_STREAM_TARGET, LevelFilter::DEBUG)
        .with_target(env!("CARGO_CRATE_NAME"), own_level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_ansi(config.ansi);

    Registry::default()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| SubscriberInitError(e.to_string()))
}

/// Install the diagnostic subscriber with [`TracingConfig::default`].
pub fn init_tracing() -> Result<(), SubscriberInitError> {
    init_tracing_with_config(TracingConfig::default())
}
