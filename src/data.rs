//! Gate result reports and their serialization.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::error::ErrorKind;

/// Output format for gate results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Why a gate failed.
#[derive(Debug, Clone, Serialize)]
pub struct GateFailure {
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
}

/// Machine-readable outcome of a single gate run.
#[derive(Debug, Clone, Serialize)]
pub struct GateReport<T: Serialize> {
    /// Gate name (`title`, `targets`, `plan-duplicates`).
    pub gate: String,
    /// Whether the gate passed.
    pub passed: bool,
    /// Gate-specific result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Failure details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GateFailure>,
}

impl<T: Serialize> GateReport<T> {
    /// Builds a passing report.
    pub fn passed(gate: &str, result: T) -> Self {
        Self {
            gate: gate.to_string(),
            passed: true,
            result: Some(result),
            error: None,
        }
    }

    /// Builds a failing report.
    pub fn failed(gate: &str, kind: ErrorKind, message: String) -> Self {
        Self {
            gate: gate.to_string(),
            passed: false,
            result: None,
            error: Some(GateFailure { kind, message }),
        }
    }

    /// Renders the report in a structured format. Text is the caller's job.
    pub fn render(&self, format: OutputFormat) -> Result<Option<String>> {
        match format {
            OutputFormat::Text => Ok(None),
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map(Some)
                .context("Failed to serialize report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(self)
                .map(Some)
                .context("Failed to serialize report to YAML"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("yaml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "text");
    }

    #[test]
    fn failed_report_as_json() {
        let report: GateReport<String> =
            GateReport::failed("title", ErrorKind::Format, "bad prefix".to_string());
        let json = report.render(OutputFormat::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["error"]["kind"], "format");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn passed_report_as_yaml() {
        let report = GateReport::passed("targets", vec!["user".to_string()]);
        let yaml = report.render(OutputFormat::Yaml).unwrap().unwrap();
        assert!(yaml.contains("passed: true"));
        assert!(yaml.contains("- user"));
        assert_eq!(report.render(OutputFormat::Text).unwrap(), None);
    }
}
