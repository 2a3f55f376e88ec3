use crate::sink::{LogSink, SinkError};

/// `tracing` target the debug stream sink emits on.
pub const DEBUG_STREAM_TARGET: &str = "playground";

/// Default sink: emits every line as a DEBUG event on the
/// [`DEBUG_STREAM_TARGET`] target of the current `tracing` subscriber.
///
/// Whether the line becomes visible depends on the installed subscriber;
/// [`crate::init::init_tracing`] installs one that prints it bare. With no
/// subscriber the line is lost, which is accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugStreamSink;

impl LogSink for DebugStreamSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        tracing::debug!(target: DEBUG_STREAM_TARGET, "{}", line);
        Ok(())
    }
}
