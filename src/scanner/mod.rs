//! Descriptor discovery.
//!
//! This module provides the [`Scanner`] trait and implementations for
//! discovering installed distributions by their descriptor records.
//!
//! # Available Scanners
//!
//! | Scanner | Record | Layout |
//! |---------|--------|--------|
//! | [`DistInfoScanner`] | `METADATA` | `<name>-<version>.dist-info/` directories |
//! | [`EggInfoScanner`] | `PKG-INFO` | `<name>.egg-info/` directories or bare files |
//!
//! Both walk the platform's site-packages roots plus any configured extra
//! search paths. A record that fails to parse is logged and skipped; a scan
//! never fails because one distribution shipped bad metadata.
//!
//! # Example
//!
//! ```no_run
//! use distscan::scanner::{all_scanners, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     for scanner in all_scanners(Vec::new()) {
//!         if scanner.is_supported() {
//!             let dists = scanner.scan().await?;
//!             println!("{}: {} distributions", scanner.name(), dists.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod dist_info;
mod egg_info;

pub use dist_info::DistInfoScanner;
pub use egg_info::EggInfoScanner;

use crate::model::{Distribution, Platform, Source};
use crate::platform::site_packages_dirs;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Trait for discovering installed distributions from one record layout.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Returns the human-readable name of this scanner.
    fn name(&self) -> &'static str;

    /// Returns the source kind this scanner handles.
    fn source(&self) -> Source;

    /// Returns the platforms this scanner supports.
    fn supported_platforms(&self) -> &[Platform];

    /// Returns true if this scanner is supported on the current platform.
    fn is_supported(&self) -> bool {
        let current = Platform::current();
        self.supported_platforms().contains(&current)
    }

    /// Scans for installed distributions and returns them.
    ///
    /// # Errors
    ///
    /// Returns an error only on scanner-level failures; individual unreadable
    /// or malformed records are skipped.
    async fn scan(&self) -> Result<Vec<Distribution>>;
}

/// Search roots for a scanner: platform site-packages plus extras, deduped.
pub(crate) fn search_roots(extra: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut roots = site_packages_dirs();
    roots.extend(extra);
    roots.sort();
    roots.dedup();
    roots
}

/// Returns a list of all available scanners.
///
/// `extra_roots` are searched in addition to the platform's site-packages
/// directories (the `search_paths` config key and `--path` flag end up here).
pub fn all_scanners(extra_roots: Vec<PathBuf>) -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(DistInfoScanner::with_extra_roots(extra_roots.clone())),
        Box::new(EggInfoScanner::with_extra_roots(extra_roots)),
    ]
}

/// Returns the scanner for a specific source.
pub fn get_scanner(source: Source, extra_roots: Vec<PathBuf>) -> Box<dyn Scanner> {
    match source {
        Source::DistInfo | Source::File => {
            Box::new(DistInfoScanner::with_extra_roots(extra_roots))
        }
        Source::EggInfo => Box::new(EggInfoScanner::with_extra_roots(extra_roots)),
    }
}
