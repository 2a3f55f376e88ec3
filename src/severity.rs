use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Importance of a log event, ordered from least to most important.
///
/// The ordering is informational only: the pipeline forwards every event
/// to its sink regardless of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    /// A debugging event.
    Debug,
    /// An informational event.
    #[default]
    Info,
    /// Not an error, but likely more important than an informational event.
    Warn,
    /// Something went wrong.
    Error,
    /// An application or system crash.
    Fatal,
}

/// Display names, indexed by variant discriminant.
const SEVERITY_NAMES: [(Severity, &str); 5] = [
    (Severity::Debug, "Debug"),
    (Severity::Info, "Info"),
    (Severity::Warn, "Warn"),
    (Severity::Error, "Error"),
    (Severity::Fatal, "Fatal"),
];

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Name written into formatted log lines, e.g. `"Warn"`.
    pub fn name(self) -> &'static str {
        SEVERITY_NAMES[self as usize].1
    }

    /// Parse a severity name, falling back to [`Severity::Info`] for
    /// anything unrecognised.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a [`Severity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SEVERITY_NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
            .map(|(severity, _)| *severity)
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_table_matches_variant_order() {
        for (index, (severity, _)) in SEVERITY_NAMES.iter().enumerate() {
            assert_eq!(*severity as usize, index);
            assert_eq!(Severity::ALL[index], *severity);
        }
    }

    #[test]
    fn severities_are_ordered_by_importance() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn default_is_info() {
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("fatal".parse::<Severity>(), Ok(Severity::Fatal));
        assert_eq!(" WARN ".parse::<Severity>(), Ok(Severity::Warn));
        assert_eq!(
            "verbose".parse::<Severity>(),
            Err(ParseSeverityError("verbose".to_string()))
        );
    }

    #[test]
    fn malformed_names_fall_back_to_info() {
        assert_eq!(Severity::parse_or_default(""), Severity::Info);
        assert_eq!(Severity::parse_or_default("critical"), Severity::Info);
        assert_eq!(Severity::parse_or_default("Error"), Severity::Error);
    }

    #[test]
    fn serializes_by_display_name() {
        assert_eq!(serde_json::to_string(&Severity::Warn).unwrap(), "\"Warn\"");
        let parsed: Severity = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(parsed, Severity::Fatal);
        assert!(serde_json::from_str::<Severity>("\"loud\"").is_err());
    }
}
