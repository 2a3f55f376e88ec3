use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::debug_sink::DebugStreamSink;
use crate::file_sink::FileSink;
use crate::noop_sink::NoopSink;
use crate::sink::{LogSink, SinkError};

/// Default channel size for sinks that forward lines to an async transport.
pub const DEFAULT_FORWARD_BUFFER: usize = 1024;

/// Sink selected by configuration or by DSN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkTarget {
    /// `tracing` DEBUG events on the `playground` target.
    #[default]
    DebugStream,
    /// Append lines to a file.
    File { path: PathBuf },
    /// Drop every line.
    Discard,
    /// Forward lines to an HTTP collector.
    Http {
        url: String,
        #[serde(default = "default_forward_buffer")]
        buffer: usize,
    },
}

fn default_forward_buffer() -> usize {
    DEFAULT_FORWARD_BUFFER
}

/// Parse a DSN string and infer the sink target from its scheme.
///
/// Examples:
/// - "debug://"
/// - "file:///var/log/playground/debug.log"
/// - "discard://"
/// - "http://127.0.0.1:8080/logs" (also "https://")
pub fn parse_dsn(dsn: &str) -> Result<SinkTarget, DsnError> {
    let lower = dsn.to_ascii_lowercase();

    if lower.starts_with("debug://") {
        Ok(SinkTarget::DebugStream)
    } else if lower.starts_with("file://") {
        let path = &dsn["file://".len()..];
        if path.is_empty() {
            return Err(DsnError::MissingPath);
        }
        Ok(SinkTarget::File { path: PathBuf::from(path) })
    } else if lower.starts_with("discard://") {
        Ok(SinkTarget::Discard)
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(SinkTarget::Http {
            url: dsn.to_string(),
            buffer: DEFAULT_FORWARD_BUFFER,
        })
    } else {
        Err(DsnError::UnknownScheme)
    }
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DsnError {
    #[error("unknown or unsupported DSN scheme")]
    UnknownScheme,

    #[error("file DSN has no path")]
    MissingPath,
}

/// Error type returned when building a sink from a [`SinkTarget`].
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("failed to open log file: {0}")]
    Open(#[source] SinkError),

    #[error("http feature is not enabled")]
    HttpFeatureDisabled,

    #[error("http sink requires a running tokio runtime")]
    NoRuntime,
}

/// Create a concrete [`LogSink`] for `target`.
///
/// The `http` target spawns its delivery task, so it must be built from
/// within a Tokio runtime.
pub fn make_sink(target: &SinkTarget) -> Result<Arc<dyn LogSink>, BackendBuildError> {
    match target {
        SinkTarget::DebugStream => Ok(Arc::new(DebugStreamSink)),
        SinkTarget::File { path } => {
            let sink = FileSink::open(path).map_err(BackendBuildError::Open)?;
            Ok(Arc::new(sink))
        }
        SinkTarget::Discard => Ok(Arc::new(NoopSink)),
        SinkTarget::Http { url, buffer } => {
            #[cfg(feature = "http")]
            {
                use crate::forward::ForwardingSink;
                use crate::http::HttpTransport;

                if tokio::runtime::Handle::try_current().is_err() {
                    return Err(BackendBuildError::NoRuntime);
                }
                let transport = Arc::new(HttpTransport::new(url.clone()));
                let (sink, _handle) = ForwardingSink::spawn(transport, *buffer);
                Ok(Arc::new(sink))
            }

            #[cfg(not(feature = "http"))]
            {
                let _ = (url, buffer);
                Err(BackendBuildError::HttpFeatureDisabled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_schemes() {
        assert_eq!(parse_dsn("debug://"), Ok(SinkTarget::DebugStream));
        assert_eq!(parse_dsn("DISCARD://"), Ok(SinkTarget::Discard));
        assert_eq!(
            parse_dsn("file:///tmp/debug.log"),
            Ok(SinkTarget::File {
                path: PathBuf::from("/tmp/debug.log")
            })
        );
        assert_eq!(
            parse_dsn("https://collector.local/logs"),
            Ok(SinkTarget::Http {
                url: "https://collector.local/logs".to_string(),
                buffer: DEFAULT_FORWARD_BUFFER,
            })
        );
    }

    #[test]
    fn rejects_bad_dsns() {
        assert_eq!(parse_dsn("kafka://broker/topic"), Err(DsnError::UnknownScheme));
        assert_eq!(parse_dsn("file://"), Err(DsnError::MissingPath));
    }

    #[test]
    fn builds_local_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");

        let sink = make_sink(&SinkTarget::File { path: path.clone() }).unwrap();
        sink.write_line("hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");

        assert!(make_sink(&SinkTarget::DebugStream).is_ok());
        assert!(make_sink(&SinkTarget::Discard).is_ok());
    }

    #[cfg(feature = "http")]
    #[test]
    fn http_sink_needs_runtime() {
        let target = parse_dsn("http://127.0.0.1:9/logs").unwrap();
        assert!(matches!(make_sink(&target), Err(BackendBuildError::NoRuntime)));
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn http_sink_builds_inside_runtime() {
        let target = parse_dsn("http://127.0.0.1:9/logs").unwrap();
        assert!(make_sink(&target).is_ok());
    }
}
