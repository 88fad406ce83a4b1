use crate::cache::Cache;
use crate::model::{Distribution, OutdatedInfo};
use crate::version::Version;
use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

const INDEX_URL: &str = "https://pypi.org/pypi";

/// Compares installed descriptors against the package index's latest release.
pub struct LatestChecker {
    client: reqwest::Client,
    cache: Cache,
}

impl LatestChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            cache: Cache::new(),
        }
    }

    pub fn with_cache(cache: Cache) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache,
        }
    }

    pub async fn check_outdated(&self, distributions: &[Distribution]) -> Result<Vec<OutdatedInfo>> {
        let mut outdated = Vec::new();

        for dist in distributions {
            if let Some(info) = self.check_distribution(dist).await {
                outdated.push(info);
            }
        }

        Ok(outdated)
    }

    async fn check_distribution(&self, dist: &Distribution) -> Option<OutdatedInfo> {
        let descriptor = &dist.descriptor;
        let latest = self.get_latest(&descriptor.name).await?;

        if is_newer(&latest, &descriptor.version) {
            Some(OutdatedInfo {
                name: descriptor.name.clone(),
                current_version: descriptor.version.to_string(),
                latest_version: latest,
            })
        } else {
            None
        }
    }

    async fn get_latest(&self, name: &str) -> Option<String> {
        let normalized = normalize_name(name);
        let cache_key = format!("pypi_latest_{}", normalized);

        if let Some(version) = self.cache.get::<String>(&cache_key) {
            debug!(package = %normalized, %version, "cache hit");
            return Some(version);
        }

        #[derive(Deserialize)]
        struct IndexResponse {
            info: IndexInfo,
        }

        #[derive(Deserialize)]
        struct IndexInfo {
            version: Option<String>,
        }

        let url = format!("{}/{}/json", INDEX_URL, normalized);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let info: IndexResponse = response.json().await.ok()?;
        let version = info.info.version?;

        let _ = self.cache.set(&cache_key, &version);

        Some(version)
    }
}

impl Default for LatestChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Index-side name normalization: case-insensitive, with runs of `-`, `_`
/// and `.` collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.chars() {
        if c == '-' || c == '_' || c == '.' {
            if !last_was_sep {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        }
    }
    out
}

/// True when `latest` parses and orders after the installed version.
/// Unparsable index versions are never reported as newer.
pub fn is_newer(latest: &str, current: &Version) -> bool {
    match Version::parse(latest) {
        Ok(latest) => &latest > current,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_is_newer() {
        assert!(is_newer("2.0.0", &v("1.9.9")));
        assert!(is_newer("1.0.1", &v("1.0.0")));
        assert!(!is_newer("1.0.0", &v("1.0.0")));
        assert!(!is_newer("1.0", &v("1.0.0")));
        assert!(!is_newer("0.9", &v("1.0")));
        assert!(!is_newer("not-a-version", &v("1.0")));
    }

    #[test]
    fn test_prerelease_not_newer_than_final() {
        assert!(!is_newer("2.0rc1", &v("2.0")));
        assert!(is_newer("2.0", &v("2.0rc1")));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Variant_Convert"), "variant-convert");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a--b__c"), "a-b-c");
        assert_eq!(normalize_name("requests"), "requests");
    }
}
