use crate::metadata::parse_metadata;
use crate::model::{Distribution, Platform, Source};
use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Depth bound for record walks; site-packages keeps records at the top
/// level, but configured search paths may point at a venv or prefix root.
const MAX_WALK_DEPTH: usize = 4;

pub struct DistInfoScanner {
    roots: Vec<PathBuf>,
}

impl DistInfoScanner {
    pub fn new() -> Self {
        Self::with_extra_roots(Vec::new())
    }

    pub fn with_extra_roots(extra: Vec<PathBuf>) -> Self {
        Self {
            roots: super::search_roots(extra),
        }
    }

    /// Collects every parseable `*.dist-info/METADATA` record under `root`.
    pub fn scan_root(root: &Path) -> Vec<Distribution> {
        let mut dists = Vec::new();

        for entry in WalkDir::new(root)
            .max_depth(MAX_WALK_DEPTH)
            .into_iter()
            .flatten()
        {
            if !entry.file_type().is_dir() {
                continue;
            }
            if !entry.file_name().to_string_lossy().ends_with(".dist-info") {
                continue;
            }

            let record = entry.path().join("METADATA");
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
                        Distribution::new(descriptor, Source::DistInfo)
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

impl Default for DistInfoScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::Scanner for DistInfoScanner {
    fn name(&self) -> &'static str {
        "dist-info records"
    }

    fn source(&self) -> Source {
        Source::DistInfo
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
    fn test_scan_root_finds_records() {
        let dir = tempfile::tempdir().unwrap();
        let info = dir.path().join("demo-1.2.0.dist-info");
        fs::create_dir(&info).unwrap();
        fs::write(
            info.join("METADATA"),
            "Name: demo\nVersion: 1.2.0\nRequires-Python: >=3.8\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("demo")).unwrap();

        let dists = DistInfoScanner::scan_root(dir.path());
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].descriptor.name, "demo");
        assert_eq!(dists[0].source, Source::DistInfo);
        assert!(dists[0].path.as_ref().unwrap().ends_with("demo-1.2.0.dist-info"));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good-0.1.0.dist-info");
        fs::create_dir(&good).unwrap();
        fs::write(good.join("METADATA"), "Name: good\nVersion: 0.1.0\n").unwrap();
        let bad = dir.path().join("broken-0.1.dist-info");
        fs::create_dir(&bad).unwrap();
        fs::write(bad.join("METADATA"), "no header here\n").unwrap();
        let missing = dir.path().join("empty-0.2.dist-info");
        fs::create_dir(&missing).unwrap();

        let dists = DistInfoScanner::scan_root(dir.path());
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].descriptor.name, "good");
    }

    #[test]
    fn test_nested_roots_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join("lib")
            .join("python3.11")
            .join("site-packages")
            .join("pkg-2.0.dist-info");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("METADATA"), "Name: pkg\nVersion: 2.0\n").unwrap();

        let dists = DistInfoScanner::scan_root(dir.path());
        assert_eq!(dists.len(), 1);
    }
}
