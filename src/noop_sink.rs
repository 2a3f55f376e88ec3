use crate::sink::{LogSink, SinkError};

/// A sink that discards every line.
///
/// Selected by the `discard` sink target, and handy for measuring the
/// cost of formatting alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write_line(&self, _line: &str) -> Result<(), SinkError> {
        Ok(())
    }
}
