use std::io;

/// Destination for formatted log lines.
///
/// Implementations transport lines to a concrete output: the tracing
/// debug stream, a file, memory, or an asynchronous network transport.
/// The pipeline calls `write_line` synchronously from `log_raw` and
/// discards any error it returns, so implementations must not block for
/// long and must not panic.
pub trait LogSink: Send + Sync {
    /// Write one already-formatted line.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` if the destination failed. The caller drops the line;
    ///   there is no retry.
    fn write_line(&self, line: &str) -> Result<(), SinkError>;

    /// Flush any buffered output, if the sink buffers at all.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Error type returned by [`LogSink`] implementations.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("sink channel is full")]
    Full,

    #[error("sink channel is closed")]
    Closed,

    #[error("transport failed: {0}")]
    Transport(String),
}
