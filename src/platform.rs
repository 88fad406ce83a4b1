//! Cross-platform path resolution.
//!
//! This module locates the directories where installed distributions keep
//! their descriptor records (site-packages and dist-packages roots).
//!
//! All resolvers only return directories that exist on this machine.

use crate::model::Platform;
use std::path::{Path, PathBuf};

/// Returns every site-packages root worth scanning on this machine.
///
/// Includes, in order: the active virtualenv (from `VIRTUAL_ENV`), the user
/// site directory, and the system-wide installation roots for the current
/// platform. Duplicates are removed, non-existent directories are dropped.
pub fn site_packages_dirs() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Some(venv) = virtualenv_site_packages() {
        roots.extend(venv);
    }
    roots.extend(user_site_packages());
    roots.extend(system_site_packages());

    roots.sort();
    roots.dedup();
    roots
}

/// site-packages of the active virtualenv, if any.
///
/// Layout: `$VIRTUAL_ENV/lib/pythonX.Y/site-packages` on Unix,
/// `$VIRTUAL_ENV\Lib\site-packages` on Windows.
pub fn virtualenv_site_packages() -> Option<Vec<PathBuf>> {
    let venv = std::env::var_os("VIRTUAL_ENV")?;
    let venv = PathBuf::from(venv);
    let mut found = versioned_children(&venv.join("lib"), "python")
        .into_iter()
        .map(|p| p.join("site-packages"))
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();
    let windows_layout = venv.join("Lib").join("site-packages");
    if windows_layout.is_dir() {
        found.push(windows_layout);
    }
    if found.is_empty() {
        None
    } else {
        Some(found)
    }
}

/// Per-user site-packages directories.
///
/// Platform-specific locations:
/// - Linux: `~/.local/lib/pythonX.Y/site-packages`
/// - macOS: `~/Library/Python/X.Y/lib/python/site-packages`
/// - Windows: `%APPDATA%\Python\PythonXY\site-packages`
pub fn user_site_packages() -> Vec<PathBuf> {
    let mut found = Vec::new();
    match Platform::current() {
        Platform::Linux => {
            if let Some(home) = dirs::home_dir() {
                for lib in versioned_children(&home.join(".local").join("lib"), "python") {
                    found.push(lib.join("site-packages"));
                }
            }
        }
        Platform::MacOS => {
            if let Some(home) = dirs::home_dir() {
                for version in versioned_children(&home.join("Library").join("Python"), "") {
                    found.push(version.join("lib").join("python").join("site-packages"));
                }
            }
        }
        Platform::Windows => {
            if let Some(data) = dirs::data_dir() {
                for version in versioned_children(&data.join("Python"), "Python") {
                    found.push(version.join("site-packages"));
                }
            }
        }
    }
    found.retain(|p| p.is_dir());
    found
}

/// System-wide installation roots for the current platform.
pub fn system_site_packages() -> Vec<PathBuf> {
    let mut found = Vec::new();
    match Platform::current() {
        Platform::Linux => {
            for base in ["/usr/lib", "/usr/local/lib"] {
                let base = Path::new(base);
                // Debian layout keeps dist-packages directly under python3.
                let dist = base.join("python3").join("dist-packages");
                if dist.is_dir() {
                    found.push(dist);
                }
                for lib in versioned_children(base, "python") {
                    for leaf in ["site-packages", "dist-packages"] {
                        let candidate = lib.join(leaf);
                        if candidate.is_dir() {
                            found.push(candidate);
                        }
                    }
                }
            }
        }
        Platform::MacOS => {
            let framework = Path::new("/Library/Frameworks/Python.framework/Versions");
            for version in versioned_children(framework, "") {
                for lib in versioned_children(&version.join("lib"), "python") {
                    let candidate = lib.join("site-packages");
                    if candidate.is_dir() {
                        found.push(candidate);
                    }
                }
            }
            for base in ["/usr/local/lib", "/opt/homebrew/lib"] {
                for lib in versioned_children(Path::new(base), "python") {
                    let candidate = lib.join("site-packages");
                    if candidate.is_dir() {
                        found.push(candidate);
                    }
                }
            }
        }
        Platform::Windows => {
            if let Some(local) = dirs::data_local_dir() {
                let installs = local.join("Programs").join("Python");
                for version in versioned_children(&installs, "Python") {
                    let candidate = version.join("Lib").join("site-packages");
                    if candidate.is_dir() {
                        found.push(candidate);
                    }
                }
            }
        }
    }
    found
}

/// Child directories of `dir` whose name starts with `prefix`
/// (e.g. `python3.11` under `/usr/lib`).
fn versioned_children(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut children: Vec<PathBuf> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
        .map(|e| e.path())
        .collect();
    children.sort();
    children
}

/// Returns the cache directory for distscan.
///
/// Platform-specific locations:
/// - Linux: `~/.cache/distscan/`
/// - macOS: `~/Library/Caches/distscan/`
/// - Windows: `%LOCALAPPDATA%\distscan\`
///
/// Falls back to `/tmp/distscan/` if no cache directory can be determined.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("distscan")
}
