use crate::specifier::SpecifierSet;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    DistInfo,
    EggInfo,
    File,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::DistInfo => "dist-info",
            Source::EggInfo => "egg-info",
            Source::File => "file",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Source::DistInfo => "dist-info",
            Source::EggInfo => "egg-info",
            Source::File => "metadata file",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    MacOS,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        return Platform::Linux;
        #[cfg(target_os = "macos")]
        return Platform::MacOS;
        #[cfg(target_os = "windows")]
        return Platform::Windows;
    }
}

/// Mime type of the long description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Markdown,
    Rst,
    Plain,
    /// Anything the index does not know about; preserved verbatim.
    Other(String),
}

impl ContentType {
    /// Parses a content-type value, ignoring `; charset=...` parameters.
    pub fn parse(value: &str) -> Self {
        let mime = value.split(';').next().unwrap_or("").trim();
        match mime.to_ascii_lowercase().as_str() {
            "text/markdown" => ContentType::Markdown,
            "text/x-rst" => ContentType::Rst,
            "text/plain" => ContentType::Plain,
            _ => ContentType::Other(value.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ContentType::Markdown => "text/markdown",
            ContentType::Rst => "text/x-rst",
            ContentType::Plain => "text/plain",
            ContentType::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ContentType::Other(_))
    }
}

impl Serialize for ContentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ContentType::parse(&s))
    }
}

/// A parsed package descriptor.
///
/// One record per release; authored once, read by tooling, never mutated.
/// `name` and `version` together identify the release. Classifiers, keywords
/// and extras carry set semantics: multiplicity and order are irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_version: Option<String>,
    pub name: String,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub keywords: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub classifiers: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<SpecifierSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_content_type: Option<ContentType>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub extras: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub license_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Header fields this tool does not model, preserved for round-tripping.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unknown: Vec<(String, String)>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            metadata_version: None,
            name: name.into(),
            version,
            summary: None,
            homepage: None,
            author: None,
            author_email: None,
            license: None,
            keywords: BTreeSet::new(),
            classifiers: BTreeSet::new(),
            requires_python: None,
            description_content_type: None,
            extras: BTreeSet::new(),
            license_files: Vec::new(),
            description: None,
            unknown: Vec::new(),
        }
    }

    /// `name version`, the conventional short identifier of a release.
    pub fn release_id(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

/// A descriptor together with where it was discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Distribution {
    pub fn new(descriptor: Descriptor, source: Source) -> Self {
        Self {
            descriptor,
            source,
            path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}
