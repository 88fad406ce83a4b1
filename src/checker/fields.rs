use crate::classifiers;
use crate::model::{CheckCode, Descriptor, Distribution, Finding};
use crate::version::Version;
use anyhow::Result;
use async_trait::async_trait;

/// Validates descriptor fields against the rules the index enforces on
/// upload: name shape, classifier vocabulary, content types, and (when a
/// target runtime is configured) `Requires-Python` support.
pub struct FieldChecker {
    target_runtime: Option<Version>,
}

impl FieldChecker {
    pub fn new() -> Self {
        Self {
            target_runtime: None,
        }
    }

    /// Also reports descriptors whose `Requires-Python` rejects `runtime`.
    pub fn with_target_runtime(runtime: Version) -> Self {
        Self {
            target_runtime: Some(runtime),
        }
    }

    /// Findings for a single descriptor.
    pub fn check_descriptor(&self, d: &Descriptor) -> Vec<Finding> {
        let mut findings = Vec::new();
        let package = &d.name;

        if !is_valid_name(&d.name) {
            findings.push(Finding::new(
                CheckCode::InvalidName,
                package,
                format!("distribution name {:?} is not a valid identifier", d.name),
            ));
        }

        if d.metadata_version.is_none() {
            findings.push(Finding::new(
                CheckCode::MissingMetadataVersion,
                package,
                "record does not declare a Metadata-Version",
            ));
        }

        if d.summary.is_none() {
            findings.push(Finding::new(
                CheckCode::MissingSummary,
                package,
                "record has no Summary field",
            ));
        }

        for classifier in &d.classifiers {
            if !classifiers::is_well_formed(classifier) {
                findings.push(Finding::new(
                    CheckCode::MalformedClassifier,
                    package,
                    format!("classifier {:?} is not ' :: '-separated", classifier),
                ));
            } else if !classifiers::has_known_group(classifier) {
                findings.push(Finding::new(
                    CheckCode::UnknownClassifierGroup,
                    package,
                    format!(
                        "classifier {:?} does not start with a known group",
                        classifier
                    ),
                ));
            }
        }

        if let Some(ct) = &d.description_content_type {
            if !ct.is_known() {
                findings.push(Finding::new(
                    CheckCode::UnknownContentType,
                    package,
                    format!("Description-Content-Type {:?} is not recognized", ct.as_str()),
                ));
            }
        }

        match &d.requires_python {
            None => {
                findings.push(Finding::new(
                    CheckCode::MissingRequiresPython,
                    package,
                    "record does not declare a supported runtime range",
                ));
            }
            Some(spec) => {
                if let Some(runtime) = &self.target_runtime {
                    if !spec.contains(runtime) {
                        findings.push(Finding::new(
                            CheckCode::UnsupportedRuntime,
                            package,
                            format!(
                                "requires Python {}, target runtime is {}",
                                spec, runtime
                            ),
                        ));
                    }
                }
            }
        }

        findings
    }
}

impl Default for FieldChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::DescriptorChecker for FieldChecker {
    fn name(&self) -> &'static str {
        "descriptor fields"
    }

    async fn check(&self, distributions: &[Distribution]) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for dist in distributions {
            findings.extend(self.check_descriptor(&dist.descriptor));
        }
        Ok(findings)
    }
}

/// A valid distribution name starts and ends with an ASCII letter or digit
/// and otherwise contains only letters, digits, `.`, `_` and `-`.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some((&first, rest)) = bytes.split_first() else {
        return false;
    };
    let Some((&last, middle)) = rest.split_last() else {
        return first.is_ascii_alphanumeric();
    };
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && middle
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_metadata;

    fn descriptor(record: &str) -> Descriptor {
        parse_metadata(record).unwrap()
    }

    fn codes(findings: &[Finding]) -> Vec<CheckCode> {
        findings.iter().map(|f| f.code).collect()
    }

    #[test]
    fn test_valid_names() {
        for name in ["requests", "A", "zope.interface", "ruamel.yaml-clib", "x2y"] {
            assert!(is_valid_name(name), "{}", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "-pandas", "pandas-", ".hidden", "bad name", "naïve"] {
            assert!(!is_valid_name(name), "{:?}", name);
        }
    }

    #[test]
    fn test_clean_record_has_no_warnings_or_errors() {
        let d = descriptor(
            "Metadata-Version: 2.1\nName: demo\nVersion: 1.0\nSummary: ok\n\
             Classifier: Topic :: Utilities\nRequires-Python: >=3.8\n",
        );
        let findings = FieldChecker::new().check_descriptor(&d);
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_missing_optional_fields_reported() {
        let d = descriptor("Name: demo\nVersion: 1.0\n");
        let found = codes(&FieldChecker::new().check_descriptor(&d));
        assert!(found.contains(&CheckCode::MissingMetadataVersion));
        assert!(found.contains(&CheckCode::MissingSummary));
        assert!(found.contains(&CheckCode::MissingRequiresPython));
    }

    #[test]
    fn test_classifier_findings() {
        let d = descriptor(
            "Metadata-Version: 2.1\nName: demo\nVersion: 1.0\nSummary: ok\n\
             Requires-Python: >=3.8\n\
             Classifier: Frobnication :: Advanced\nClassifier: JustOneWord\n",
        );
        let found = codes(&FieldChecker::new().check_descriptor(&d));
        assert!(found.contains(&CheckCode::UnknownClassifierGroup));
        assert!(found.contains(&CheckCode::MalformedClassifier));
    }

    #[test]
    fn test_unknown_content_type() {
        let d = descriptor(
            "Metadata-Version: 2.1\nName: demo\nVersion: 1.0\nSummary: ok\n\
             Requires-Python: >=3.8\nDescription-Content-Type: application/pdf\n",
        );
        let found = codes(&FieldChecker::new().check_descriptor(&d));
        assert_eq!(found, vec![CheckCode::UnknownContentType]);
    }

    #[test]
    fn test_unsupported_runtime() {
        let d = descriptor(
            "Metadata-Version: 2.1\nName: demo\nVersion: 1.0\nSummary: ok\n\
             Requires-Python: >=3.8\n",
        );
        let old = Version::parse("3.7").unwrap();
        let found = FieldChecker::with_target_runtime(old).check_descriptor(&d);
        assert_eq!(codes(&found), vec![CheckCode::UnsupportedRuntime]);

        let new = Version::parse("3.11").unwrap();
        let found = FieldChecker::with_target_runtime(new).check_descriptor(&d);
        assert!(found.is_empty());
    }
}
