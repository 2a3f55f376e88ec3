//! The process-wide pipeline.
//!
//! The first caller of [`pipeline`] or [`init_global`] constructs it; it
//! lives until the process exits.

use crate::backend::{make_sink, BackendBuildError};
use crate::config::PipelineConfig;
use crate::debug_sink::DebugStreamSink;
use crate::host::process_events;
use crate::pipeline::LogPipeline;
use crate::sink::LogSink;
use std::sync::{Arc, OnceLock};

static PIPELINE: OnceLock<Arc<LogPipeline>> = OnceLock::new();

/// Error returned by [`init_global`].
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("the global log pipeline is already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Backend(#[from] BackendBuildError),
}

/// Return the process-wide pipeline, constructing it with
/// [`PipelineConfig::default`] on first use.
///
/// Construction runs exactly once even under concurrent first access, and
/// only then attaches the pipeline to [`process_events`].
pub fn pipeline() -> Arc<LogPipeline> {
    Arc::clone(PIPELINE.get_or_init(|| {
        let defaults = PipelineConfig::default();
        construct(Arc::new(DebugStreamSink), defaults.capture_fatal_events)
    }))
}

/// Construct the process-wide pipeline from `config`.
///
/// **Returns**
/// - The installed pipeline, if this call constructed it.
/// - `Err(InitError::AlreadyInitialized)` if a pipeline already exists,
///   whether from an earlier `init_global` or from [`pipeline`].
/// - `Err(InitError::Backend(..))` if the configured sink cannot be built.
pub fn init_global(config: PipelineConfig) -> Result<Arc<LogPipeline>, InitError> {
    if PIPELINE.get().is_some() {
        return Err(InitError::AlreadyInitialized);
    }

    let sink = make_sink(&config.sink)?;
    let mut constructed = false;
    let installed = PIPELINE.get_or_init(|| {
        constructed = true;
        construct(sink, config.capture_fatal_events)
    });

    if constructed {
        Ok(Arc::clone(installed))
    } else {
        Err(InitError::AlreadyInitialized)
    }
}

fn construct(sink: Arc<dyn LogSink>, capture_fatal_events: bool) -> Arc<LogPipeline> {
    let pipeline = Arc::new(LogPipeline::new(sink));
    if capture_fatal_events {
        pipeline.attach(process_events());
    }
    pipeline
}
