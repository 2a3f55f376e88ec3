use crate::event::{FatalEventSource, UncaughtError, UnhandledRejection};
use crate::record::LogEvent;
use crate::severity::Severity;
use crate::sink::LogSink;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Formats log events and writes them to a single [`LogSink`].
///
/// Every call is forwarded regardless of severity. The pipeline holds no
/// mutable state of its own; each call formats into a fresh `String`, so
/// concurrent and reentrant calls are independent.
pub struct LogPipeline {
    sink: Arc<dyn LogSink>,
}

impl LogPipeline {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        LogPipeline { sink }
    }

    /// Format `message` with the current UTC time and write it.
    ///
    /// `severity` accepts either a [`Severity`] or `None`, which means
    /// [`Severity::Info`].
    pub fn log(&self, message: &str, severity: impl Into<Option<Severity>>) {
        self.log_at(message, severity, Utc::now());
    }

    /// Like [`LogPipeline::log`] with an explicit instant.
    pub fn log_at(&self, message: &str, severity: impl Into<Option<Severity>>, at: DateTime<Utc>) {
        let event = LogEvent::at(message, severity.into().unwrap_or_default(), at);
        self.log_raw(&event.to_line());
    }

    /// Write a pre-formatted line to the sink unchanged.
    ///
    /// This is the only place lines are written to the sink. A failing
    /// sink loses the line.
    pub fn log_raw(&self, line: &str) {
        if let Err(e) = self.sink.write_line(line) {
            tracing::trace!(error = %e, "log line dropped");
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(message, Severity::Debug);
    }

    pub fn info(&self, message: &str) {
        self.log(message, Severity::Info);
    }

    pub fn warn(&self, message: &str) {
        self.log(message, Severity::Warn);
    }

    pub fn error(&self, message: &str) {
        self.log(message, Severity::Error);
    }

    pub fn fatal(&self, message: &str) {
        self.log(message, Severity::Fatal);
    }

    /// Log an uncaught error at [`Severity::Fatal`].
    pub fn report_uncaught_error(&self, event: &UncaughtError) {
        self.log(&event.describe(), Severity::Fatal);
    }

    /// Log an unhandled rejection's stack text at [`Severity::Fatal`].
    pub fn report_unhandled_rejection(&self, event: &UnhandledRejection) {
        self.log(&event.stack, Severity::Fatal);
    }

    /// Register this pipeline's two fatal-event callbacks on `source`.
    pub fn attach(self: &Arc<Self>, source: &dyn FatalEventSource) {
        let pipeline = Arc::clone(self);
        source.on_uncaught_error(Box::new(move |event: &UncaughtError| {
            pipeline.report_uncaught_error(event)
        }));

        let pipeline = Arc::clone(self);
        source.on_unhandled_rejection(Box::new(move |event: &UnhandledRejection| {
            pipeline.report_unhandled_rejection(event)
        }));
    }

    /// Ask the sink to flush anything it buffers. Writes nothing.
    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::trace!(error = %e, "log sink flush failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTarget;
    use crate::memory_sink::MemorySink;
    use crate::sink::SinkError;
    use chrono::TimeZone;

    fn pipeline() -> (Arc<LogPipeline>, MemorySink) {
        let sink = MemorySink::new();
        (Arc::new(LogPipeline::new(Arc::new(sink.clone()))), sink)
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn write_line(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    #[test]
    fn every_severity_is_named_and_forwarded() {
        let (pipeline, sink) = pipeline();
        for severity in Severity::ALL {
            pipeline.log("msg", severity);
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), Severity::ALL.len());
        for (line, severity) in lines.iter().zip(Severity::ALL) {
            assert!(line.contains(&format!(" Playground {}: ", severity.name())));
            assert!(line.ends_with(": msg"));
        }
    }

    #[test]
    fn missing_severity_means_info() {
        let (pipeline, sink) = pipeline();
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        pipeline.log_at("hello", None, at);
        pipeline.log_at("hello", Severity::Info, at);

        let lines = sink.lines();
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[0], "[05-Mar-2024 07:08:09 UTC] Playground Info: hello");
    }

    #[test]
    fn raw_lines_are_not_decorated() {
        let (pipeline, sink) = pipeline();
        pipeline.log_raw("already formatted");
        assert_eq!(sink.lines(), vec!["already formatted"]);
    }

    #[test]
    fn shorthands_use_their_severity() {
        let (pipeline, sink) = pipeline();
        pipeline.debug("d");
        pipeline.info("i");
        pipeline.warn("w");
        pipeline.error("e");
        pipeline.fatal("f");

        let suffixes: Vec<String> = sink
            .lines()
            .iter()
            .map(|l| l.split("] ").nth(1).unwrap().to_string())
            .collect();
        assert_eq!(
            suffixes,
            vec![
                "Playground Debug: d",
                "Playground Info: i",
                "Playground Warn: w",
                "Playground Error: e",
                "Playground Fatal: f",
            ]
        );
    }

    #[test]
    fn failing_sink_is_silent() {
        let pipeline = LogPipeline::new(Arc::new(FailingSink));
        pipeline.log("lost", Severity::Error);
        pipeline.log_raw("lost too");
        pipeline.flush();
    }

    #[test]
    fn concurrent_calls_produce_intact_lines() {
        let (pipeline, sink) = pipeline();
        let threads = 8;
        let per_thread = 50;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let pipeline = Arc::clone(&pipeline);
                std::thread::spawn(move || {
                    for i in 0..per_thread {
                        pipeline.log(&format!("thread {} message {}", t, i), Severity::Warn);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = sink.lines();
        assert_eq!(lines.len(), threads * per_thread);

        let mut messages: Vec<String> = lines
            .iter()
            .map(|line| {
                assert!(line.starts_with('['));
                assert_eq!(line.matches(" Playground Warn: ").count(), 1, "{:?}", line);
                line.split(" Playground Warn: ").nth(1).unwrap().to_string()
            })
            .collect();
        messages.sort();

        let mut expected: Vec<String> = (0..threads)
            .flat_map(|t| (0..per_thread).map(move |i| format!("thread {} message {}", t, i)))
            .collect();
        expected.sort();
        assert_eq!(messages, expected);
    }

    #[test]
    fn attached_pipeline_logs_fatal_events() {
        let (pipeline, sink) = pipeline();
        let target = EventTarget::new();
        pipeline.attach(&target);

        target.dispatch_uncaught_error(&UncaughtError::new("x", "a.js", 1, 2));
        target.dispatch_unhandled_rejection(&UnhandledRejection::new("Error: y\n at f"));

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Playground Fatal: x in a.js on line 1:2"));
        assert!(lines[1].ends_with("] Playground Fatal: Error: y\n at f"));
    }
}
