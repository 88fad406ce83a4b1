use super::Distribution;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How serious a finding is. Ordering puts errors first when sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Stable identifiers for validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCode {
    InvalidName,
    UnsupportedRuntime,
    MalformedClassifier,
    UnknownClassifierGroup,
    UnknownContentType,
    MissingSummary,
    MissingRequiresPython,
    MissingMetadataVersion,
}

impl CheckCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCode::InvalidName => "invalid-name",
            CheckCode::UnsupportedRuntime => "unsupported-runtime",
            CheckCode::MalformedClassifier => "malformed-classifier",
            CheckCode::UnknownClassifierGroup => "unknown-classifier-group",
            CheckCode::UnknownContentType => "unknown-content-type",
            CheckCode::MissingSummary => "missing-summary",
            CheckCode::MissingRequiresPython => "missing-requires-python",
            CheckCode::MissingMetadataVersion => "missing-metadata-version",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CheckCode::InvalidName | CheckCode::UnsupportedRuntime => Severity::Error,
            CheckCode::MalformedClassifier
            | CheckCode::UnknownClassifierGroup
            | CheckCode::UnknownContentType
            | CheckCode::MissingSummary => Severity::Warning,
            CheckCode::MissingRequiresPython | CheckCode::MissingMetadataVersion => Severity::Info,
        }
    }
}

/// A single validation result attached to a distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub code: CheckCode,
    pub severity: Severity,
    /// Name of the distribution the finding is about.
    pub package: String,
    pub message: String,
}

impl Finding {
    pub fn new(code: CheckCode, package: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.severity(),
            package: package.into(),
            message: message.into(),
        }
    }
}

/// A distribution whose installed version is older than the index's latest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutdatedInfo {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
}

/// Everything one scan produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub distributions: Vec<Distribution>,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub outdated: Vec<OutdatedInfo>,
}

impl ScanReport {
    pub fn new(distributions: Vec<Distribution>) -> Self {
        Self {
            scan_time: Utc::now(),
            distributions,
            findings: Vec::new(),
            outdated: Vec::new(),
        }
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_comes_from_code() {
        let finding = Finding::new(CheckCode::InvalidName, "pkg", "bad name");
        assert_eq!(finding.severity, Severity::Error);
        let finding = Finding::new(CheckCode::MissingSummary, "pkg", "no summary");
        assert_eq!(finding.severity, Severity::Warning);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }
}
