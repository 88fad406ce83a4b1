use crate::metadata::parse_metadata;
use crate::model::{Distribution, Platform, Source};
use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Scanner for the legacy `*.egg-info` layout.
///
/// The record is a `PKG-INFO` file, either inside an `.egg-info` directory
/// or as a bare `.egg-info` file next to the package.
pub struct EggInfoScanner {
    roots: Vec<PathBuf>,
}

impl EggInfoScanner {
    pub fn new() -> Self {
        Self::with_extra_roots(Vec::new())
    }

    pub fn with_extra_roots(extra: Vec<PathBuf>) -> Self {
        Self {
            roots: super::search_roots(extra),
        }
    }

    pub fn scan_root(root: &Path) -> Vec<Distribution> {
        let mut dists = Vec::new();

        for entry in WalkDir::new(root).max_depth(4).into_iter().flatten() {
            if !entry.file_name().to_string_lossy().ends_with(".egg-info") {
                continue;
            }

            let record = if entry.file_type().is_dir() {
                entry.path().join("PKG-INFO")
            } else {
                entry.path().to_path_buf()
            };

            let content = match fs::read_to_string(&record) {
                Ok(c) => c,
                Err(err) => {
                    debug!(path = %record.display(), %err, "unreadable record");
                    continue;
                }
            };

            match parse_metadata(&content) {
                Ok(descriptor) => {
                    dists.push(
                        Distribution::new(descriptor, Source::EggInfo)
                            .with_path(entry.path().to_path_buf()),
                    );
                }
                Err(err) => {
                    debug!(path = %record.display(), %err, "skipping malformed record");
                }
            }
        }

        dists
    }
}

impl Default for EggInfoScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Scanner for EggInfoScanner {
    fn name(&self) -> &'static str {
        "egg-info records"
    }

    fn source(&self) -> Source {
        Source::EggInfo
    }

    fn supported_platforms(&self) -> &[Platform] {
        &[Platform::Linux, Platform::MacOS, Platform::Windows]
    }

    async fn scan(&self) -> Result<Vec<Distribution>> {
        let mut all = Vec::new();
        for root in &self.roots {
            all.extend(Self::scan_root(root));
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("legacy.egg-info");
        fs::create_dir(&info).unwrap();
        fs::write(info.join("PKG-INFO"), "Name: legacy\nVersion: 0.9\n").unwrap();

        let dists = EggInfoScanner::scan_root(dir.path());
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].descriptor.name, "legacy");
        assert_eq!(dists[0].source, Source::EggInfo);
    }

    #[test]
    fn test_bare_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("oldtool.egg-info"),
            "Name: oldtool\nVersion: 2.4.1\n",
        )
        .unwrap();

        let dists = EggInfoScanner::scan_root(dir.path());
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].descriptor.version.as_str(), "2.4.1");
    }
}
