use serde::{Deserialize, Serialize};

use crate::backend::{parse_dsn, DsnError, SinkTarget};

/// Configuration of a [`crate::pipeline::LogPipeline`] built through
/// [`crate::global::init_global`].
///
/// **Fields**
/// - `sink`: where formatted lines go. Defaults to the `tracing` debug
///   stream.
/// - `capture_fatal_events`: if `true`, the pipeline attaches to
///   [`crate::host::process_events`] so panics and failed observed tasks
///   are logged at `Fatal`. Hosts that report failures through their own
///   channel set this to `false`; explicit `log` calls still work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sink: SinkTarget,
    pub capture_fatal_events: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sink: SinkTarget::DebugStream,
            capture_fatal_events: true,
        }
    }
}

impl PipelineConfig {
    /// Default configuration with the sink taken from a DSN, see
    /// [`parse_dsn`].
    pub fn from_dsn(dsn: &str) -> Result<Self, DsnError> {
        Ok(Self {
            sink: parse_dsn(dsn)?,
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_document_gives_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.sink, SinkTarget::DebugStream);
        assert!(config.capture_fatal_events);
    }

    #[test]
    fn deserializes_file_sink() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"sink": {"kind": "file", "path": "/tmp/debug.log"}, "capture_fatal_events": false}"#,
        )
        .unwrap();
        assert_eq!(
            config.sink,
            SinkTarget::File {
                path: PathBuf::from("/tmp/debug.log")
            }
        );
        assert!(!config.capture_fatal_events);
    }

    #[test]
    fn http_buffer_has_a_default() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"sink": {"kind": "http", "url": "http://127.0.0.1/logs"}}"#)
                .unwrap();
        assert_eq!(
            config.sink,
            SinkTarget::Http {
                url: "http://127.0.0.1/logs".to_string(),
                buffer: crate::backend::DEFAULT_FORWARD_BUFFER,
            }
        );
    }

    #[test]
    fn builds_from_dsn() {
        let config = PipelineConfig::from_dsn("discard://").unwrap();
        assert_eq!(config.sink, SinkTarget::Discard);
        assert!(config.capture_fatal_events);
        assert_eq!(
            PipelineConfig::from_dsn("ftp://x"),
            Err(DsnError::UnknownScheme)
        );
    }
}
