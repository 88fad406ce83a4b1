use crate::model::{ContentType, Descriptor};
use crate::specifier::SpecifierError;
use crate::version::{Version, VersionError};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a descriptor record was rejected.
///
/// The descriptor itself carries no validation logic; rejection of malformed
/// metadata happens here, at the consuming side.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("line {line}: not a header line: {text:?}")]
    MalformedLine { line: usize, text: String },
    #[error("line {0}: continuation line before any header field")]
    DanglingContinuation(usize),
    #[error("invalid Version field: {0}")]
    Version(#[from] VersionError),
    #[error("invalid Requires-Python field: {0}")]
    Specifier(#[from] SpecifierError),
}

/// Parses a descriptor record.
///
/// Keys are matched case-insensitively. Fields this tool does not model are
/// preserved in [`Descriptor::unknown`] so that [`write_metadata`] can
/// round-trip the record.
///
/// [`write_metadata`]: super::write_metadata
pub fn parse_metadata(input: &str) -> Result<Descriptor, MetadataError> {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_body = false;

    for (idx, line) in input.lines().enumerate() {
        if in_body {
            body_lines.push(line);
            continue;
        }
        if line.trim().is_empty() {
            in_body = true;
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            match fields.last_mut() {
                Some((_, value)) => {
                    value.push('\n');
                    value.push_str(line.trim_start());
                }
                None => return Err(MetadataError::DanglingContinuation(idx + 1)),
            }
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                fields.push((key.trim().to_string(), value.trim().to_string()));
            }
            None => {
                return Err(MetadataError::MalformedLine {
                    line: idx + 1,
                    text: line.to_string(),
                })
            }
        }
    }

    let mut metadata_version = None;
    let mut name: Option<String> = None;
    let mut version_raw: Option<String> = None;
    let mut summary = None;
    let mut homepage = None;
    let mut author = None;
    let mut author_email = None;
    let mut license = None;
    let mut keywords = BTreeSet::new();
    let mut classifiers = BTreeSet::new();
    let mut requires_python_raw: Option<String> = None;
    let mut description_content_type = None;
    let mut extras = BTreeSet::new();
    let mut license_files = Vec::new();
    let mut description: Option<String> = None;
    let mut unknown = Vec::new();

    for (key, value) in fields {
        match key.to_ascii_lowercase().as_str() {
            "metadata-version" => metadata_version = nonempty(value),
            "name" => name = nonempty(value),
            "version" => version_raw = nonempty(value),
            "summary" => summary = nonempty(value),
            "home-page" | "homepage" => homepage = nonempty(value),
            "author" => author = nonempty(value),
            "author-email" => author_email = nonempty(value),
            "license" => license = nonempty(value),
            "keywords" => keywords.extend(split_keywords(&value)),
            "classifier" => {
                if !value.is_empty() {
                    classifiers.insert(value);
                }
            }
            "requires-python" => requires_python_raw = nonempty(value),
            "description-content-type" => {
                description_content_type = nonempty(value).map(|v| ContentType::parse(&v));
            }
            "provides-extra" => {
                if !value.is_empty() {
                    extras.insert(value);
                }
            }
            "license-file" => {
                if !value.is_empty() {
                    license_files.push(value);
                }
            }
            "description" => description = nonempty(value),
            _ => unknown.push((key, value)),
        }
    }

    // A body after the blank line wins over a Description header.
    let body = body_lines.join("\n");
    let body = body.trim_start_matches('\n').trim_end();
    if !body.is_empty() {
        description = Some(body.to_string());
    }

    let name = name.ok_or(MetadataError::MissingField("Name"))?;
    let version: Version = version_raw
        .ok_or(MetadataError::MissingField("Version"))?
        .parse()?;
    let requires_python = match requires_python_raw {
        Some(raw) => Some(raw.parse()?),
        None => None,
    };

    Ok(Descriptor {
        metadata_version,
        name,
        version,
        summary,
        homepage,
        author,
        author_email,
        license,
        keywords,
        classifiers,
        requires_python,
        description_content_type,
        extras,
        license_files,
        description,
        unknown,
    })
}

// Empty header values are treated as absent fields.
fn nonempty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

// Keywords appear comma-separated in recent records and space-separated in
// older ones.
fn split_keywords(value: &str) -> Vec<String> {
    let parts: Vec<&str> = if value.contains(',') {
        value.split(',').collect()
    } else {
        value.split_whitespace().collect()
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::write_metadata;

    const VARIANTCONVERT_RECORD: &str = "\
Metadata-Version: 2.1
Name: variantconvert
Version: 1.0.0
Summary: Convert genetic variant files between formats
Home-page: https://github.com/SamuelNicaise/variantconvert
Author: Samuel Nicaise
Keywords: bioinformatics,vcf,tsv,variant,converter
Classifier: Development Status :: 4 - Beta
Classifier: Intended Audience :: Science/Research
Classifier: License :: OSI Approved :: GNU General Public License v3 (GPLv3)
Classifier: Programming Language :: Python :: 3
Classifier: Topic :: Scientific/Engineering :: Bio-Informatics
Requires-Python: >=3.8
Description-Content-Type: text/markdown
Provides-Extra: tests
License-File: LICENSE

Converts genetic variant files between VCF and the tabular formats
used in clinical genomics.
";

    #[test]
    fn test_parse_reference_record() {
        let d = parse_metadata(VARIANTCONVERT_RECORD).unwrap();
        assert_eq!(d.name, "variantconvert");
        assert_eq!(d.version, Version::parse("1.0.0").unwrap());
        assert_eq!(
            d.summary.as_deref(),
            Some("Convert genetic variant files between formats")
        );
        assert_eq!(d.author.as_deref(), Some("Samuel Nicaise"));
        assert_eq!(d.classifiers.len(), 5);
        assert!(d
            .classifiers
            .contains("Topic :: Scientific/Engineering :: Bio-Informatics"));
        assert!(d.keywords.contains("vcf"));
        assert!(d.extras.contains("tests"));
        assert_eq!(d.license_files, vec!["LICENSE".to_string()]);
        assert!(d.description.as_deref().unwrap().starts_with("Converts"));
    }

    #[test]
    fn test_requires_python_bound() {
        let d = parse_metadata(VARIANTCONVERT_RECORD).unwrap();
        let spec = d.requires_python.unwrap();
        for ok in ["3.8", "3.8.0", "3.9", "3.12"] {
            assert!(spec.contains(&Version::parse(ok).unwrap()), "{}", ok);
        }
        assert!(!spec.contains(&Version::parse("3.7").unwrap()));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_metadata(VARIANTCONVERT_RECORD).unwrap();
        let second = parse_metadata(VARIANTCONVERT_RECORD).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip() {
        let parsed = parse_metadata(VARIANTCONVERT_RECORD).unwrap();
        let written = write_metadata(&parsed);
        let reparsed = parse_metadata(&written).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn test_classifier_multiplicity_is_irrelevant() {
        let record = "Name: a\nVersion: 1.0\nClassifier: Topic :: Utilities\nClassifier: Topic :: Utilities\n";
        let d = parse_metadata(record).unwrap();
        assert_eq!(d.classifiers.len(), 1);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let d = parse_metadata("NAME: pkg\nVERSION: 2.0\nsummary: hi\n").unwrap();
        assert_eq!(d.name, "pkg");
        assert_eq!(d.summary.as_deref(), Some("hi"));
    }

    #[test]
    fn test_continuation_lines_fold() {
        let record = "Name: pkg\nVersion: 1.0\nLicense: MIT License\n        with an extra clause\n";
        let d = parse_metadata(record).unwrap();
        assert_eq!(
            d.license.as_deref(),
            Some("MIT License\nwith an extra clause")
        );
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let record = "Name: pkg\nVersion: 1.0\nRequires-Dist: pandas\nPlatform: any\n";
        let d = parse_metadata(record).unwrap();
        assert_eq!(
            d.unknown,
            vec![
                ("Requires-Dist".to_string(), "pandas".to_string()),
                ("Platform".to_string(), "any".to_string()),
            ]
        );
        let reparsed = parse_metadata(&write_metadata(&d)).unwrap();
        assert_eq!(d, reparsed);
    }

    #[test]
    fn test_space_separated_keywords() {
        let d = parse_metadata("Name: pkg\nVersion: 1.0\nKeywords: genomics vcf tools\n").unwrap();
        assert_eq!(d.keywords.len(), 3);
        assert!(d.keywords.contains("genomics"));
    }

    #[test]
    fn test_missing_required_fields() {
        assert!(matches!(
            parse_metadata("Version: 1.0\n"),
            Err(MetadataError::MissingField("Name"))
        ));
        assert!(matches!(
            parse_metadata("Name: pkg\n"),
            Err(MetadataError::MissingField("Version"))
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            parse_metadata("Name: pkg\nVersion: not-a-version\n"),
            Err(MetadataError::Version(_))
        ));
        assert!(matches!(
            parse_metadata("Name: pkg\nVersion: 1.0\nRequires-Python: banana\n"),
            Err(MetadataError::Specifier(_))
        ));
        assert!(matches!(
            parse_metadata("Name pkg\n"),
            Err(MetadataError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            parse_metadata("   floating\n"),
            Err(MetadataError::DanglingContinuation(1))
        ));
    }

    #[test]
    fn test_description_header_loses_to_body() {
        let record = "Name: pkg\nVersion: 1.0\nDescription: short\n\nThe real body.\n";
        let d = parse_metadata(record).unwrap();
        assert_eq!(d.description.as_deref(), Some("The real body."));
    }
}
