//! Release version parsing and ordering.
//!
//! Distribution and runtime versions (`1.0.0`, `3.8`, `2.1rc1`, `1!1.0.post2`)
//! are not semver: release segments vary in length, `3.8` and `3.8.0` denote
//! the same release, and pre/post/dev suffixes have their own ordering. This
//! module provides a [`Version`] type with the total order descriptors rely
//! on: epoch first, then zero-padded release segments, then
//! dev < alpha < beta < rc < final < post.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version string: {0:?}")]
pub struct VersionError(pub String);

/// Pre-release stage, ordered alpha < beta < rc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

/// A parsed release version.
///
/// Comparison ignores the textual form: `3.8`, `3.8.0` and `v3.8` are equal.
/// [`fmt::Display`] preserves the input form.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

impl Version {
    /// Parses a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        input.parse()
    }

    /// The version exactly as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Numeric release segments, e.g. `[3, 8]` for `3.8`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// True for alpha/beta/rc and dev releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Local version label (`+deadbeef`), ignored for ordering.
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Release segment at `index`, treating missing segments as zero.
    pub fn release_at(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    // Sort key following the dev < pre < final < post convention. The first
    // tuple slot separates dev-only releases from pre-releases and finals.
    fn stage_key(&self) -> ((u8, u8, u64), (u8, u64), (u8, u64)) {
        let pre_key = match (&self.pre, &self.post, &self.dev) {
            (None, None, Some(_)) => (0, 0, 0),
            (Some((kind, n)), _, _) => (1, *kind as u8, *n),
            _ => (2, 0, 0),
        };
        let post_key = match self.post {
            Some(n) => (1, n),
            None => (0, 0),
        };
        let dev_key = match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        };
        (pre_key, post_key, dev_key)
    }
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.stage_key().cmp(&other.stage_key()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Consumes an optional `[._-]` separator, one of `tags`, and a trailing
/// number. Returns `None` and leaves `rest` untouched if no tag matches.
fn take_tagged<K: Copy>(rest: &mut &str, tags: &[(&str, K)]) -> Option<(K, u64)> {
    let trimmed = rest.strip_prefix(['.', '-', '_']).unwrap_or(rest);
    for (tag, kind) in tags {
        if let Some(after) = trimmed.strip_prefix(tag) {
            let after = after.strip_prefix(['.', '-', '_']).unwrap_or(after);
            let end = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            let (num, tail) = after.split_at(end);
            *rest = tail;
            // A bare tag counts as number zero: 1.0a == 1.0a0.
            return Some((*kind, num.parse().unwrap_or(0)));
        }
    }
    None
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(VersionError(input.to_string()));
        }
        let fail = || VersionError(raw.to_string());

        let lower = raw.to_ascii_lowercase();
        let mut s = lower.as_str();
        s = s.strip_prefix('v').unwrap_or(s);

        let mut local = None;
        if let Some((head, label)) = s.split_once('+') {
            if label.is_empty() {
                return Err(fail());
            }
            local = Some(label.to_string());
            s = head;
        }

        let mut epoch = 0;
        if let Some((e, rest)) = s.split_once('!') {
            epoch = e.parse().map_err(|_| fail())?;
            s = rest;
        }

        let end = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let (rel, mut rest) = s.split_at(end);
        let rel = rel.strip_suffix('.').unwrap_or(rel);
        if rel.is_empty() {
            return Err(fail());
        }
        let release = rel
            .split('.')
            .map(|seg| seg.parse::<u64>().map_err(|_| fail()))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = take_tagged(
            &mut rest,
            &[
                ("alpha", PreKind::Alpha),
                ("beta", PreKind::Beta),
                ("preview", PreKind::Rc),
                ("pre", PreKind::Rc),
                ("rc", PreKind::Rc),
                ("a", PreKind::Alpha),
                ("b", PreKind::Beta),
                ("c", PreKind::Rc),
            ],
        );
        let post = take_tagged(&mut rest, &[("post", ()), ("rev", ()), ("r", ())]).map(|(_, n)| n);
        let dev = take_tagged(&mut rest, &[("dev", ())]).map(|(_, n)| n);

        if !rest.is_empty() {
            return Err(fail());
        }

        Ok(Version {
            raw: raw.to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_basic() {
        let version = v("1.0.0");
        assert_eq!(version.release(), &[1, 0, 0]);
        assert_eq!(version.epoch(), 0);
        assert!(!version.is_prerelease());
        assert_eq!(version.to_string(), "1.0.0");
    }

    #[test]
    fn test_release_ordering() {
        assert!(v("1.0.0") < v("1.0.1"));
        assert!(v("1.0.1") < v("1.1"));
        assert!(v("1.1") < v("2.0"));
        assert!(v("3.7") < v("3.8"));
        assert!(v("3.9") < v("3.10"));
    }

    #[test]
    fn test_short_and_long_forms_are_equal() {
        assert_eq!(v("3.8"), v("3.8.0"));
        assert_eq!(v("1.0"), v("1.0.0.0"));
        assert_eq!(v("v1.2"), v("1.2"));
    }

    #[test]
    fn test_prerelease_ordering() {
        assert!(v("1.0a1") < v("1.0a2"));
        assert!(v("1.0a2") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(v("1.0.dev1") < v("1.0a1"));
        assert!(v("1.0.post1.dev1") < v("1.0.post1"));
    }

    #[test]
    fn test_spelled_out_tags() {
        assert_eq!(v("1.0alpha1"), v("1.0a1"));
        assert_eq!(v("1.0beta2"), v("1.0b2"));
        assert_eq!(v("1.0pre1"), v("1.0rc1"));
        assert_eq!(v("1.0a"), v("1.0a0"));
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1!0.1") > v("999.0"));
        assert_eq!(v("1!1.0").epoch(), 1);
    }

    #[test]
    fn test_local_label_ignored_for_ordering() {
        assert_eq!(v("1.0+local.1"), v("1.0"));
        assert_eq!(v("1.0+abc").local(), Some("abc"));
    }

    #[test]
    fn test_prerelease_detection() {
        assert!(v("1.0a1").is_prerelease());
        assert!(v("1.0.dev3").is_prerelease());
        assert!(!v("1.0.post1").is_prerelease());
    }

    #[test]
    fn test_invalid_versions() {
        for bad in ["", "abc", "1.x.0", "1.0junk", "!1.0", "1.0+"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {:?}", bad);
        }
    }
}
