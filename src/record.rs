use crate::severity::Severity;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;

/// Tag identifying the emitting application in every formatted line.
pub const LOG_PREFIX: &str = "Playground";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A single log event as it exists between a `log` call and the sink.
///
/// Events are never stored: the pipeline builds one, renders it with
/// [`LogEvent::to_line`] and hands the text to its sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub prefix: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl LogEvent {
    /// Build an event stamped with the current UTC time.
    pub fn now(message: impl Into<String>, severity: Severity) -> Self {
        Self::at(message, severity, Utc::now())
    }

    pub fn at(message: impl Into<String>, severity: Severity, timestamp: DateTime<Utc>) -> Self {
        LogEvent {
            timestamp,
            prefix: LOG_PREFIX,
            severity,
            message: message.into(),
        }
    }

    /// Render the event in the PHP error-log layout:
    /// `[05-Mar-2024 07:08:09 UTC] Playground Error: boom`.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            format_timestamp(&self.timestamp),
            self.prefix,
            self.severity.name(),
            self.message
        )
    }
}

/// Format an instant as `DD-MMM-YYYY HH:MM:SS UTC`.
///
/// The year is written without padding.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    format!(
        "{:02}-{}-{} {:02}:{:02}:{:02} UTC",
        at.day(),
        MONTH_ABBREVIATIONS[at.month0() as usize],
        at.year(),
        at.hour(),
        at.minute(),
        at.second()
    )
}
