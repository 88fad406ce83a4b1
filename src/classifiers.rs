//! Classifier vocabulary checks.
//!
//! Classifiers are ` :: `-separated tags drawn from an externally-governed
//! vocabulary ("trove" classifiers). The full list is large and changes over
//! time, so validation here is structural: an entry must be well formed and
//! its leading segment must name a known group. Exact-membership checking is
//! left to the index that owns the vocabulary.

/// Top-level classifier groups, as published by the package index.
pub const KNOWN_GROUPS: &[&str] = &[
    "Development Status",
    "Environment",
    "Framework",
    "Intended Audience",
    "License",
    "Natural Language",
    "Operating System",
    "Programming Language",
    "Topic",
    "Typing",
];

/// Splits a classifier into its ` :: ` segments.
pub fn segments(classifier: &str) -> Vec<&str> {
    classifier.split(" :: ").map(str::trim).collect()
}

/// A classifier is well formed when it has at least two non-empty segments
/// (`Typing :: Typed` is the one single-purpose group with two).
pub fn is_well_formed(classifier: &str) -> bool {
    let parts = segments(classifier);
    parts.len() >= 2 && parts.iter().all(|p| !p.is_empty())
}

/// The leading group segment, if present.
pub fn group(classifier: &str) -> Option<&str> {
    let head = classifier.split(" :: ").next()?.trim();
    if head.is_empty() {
        None
    } else {
        Some(head)
    }
}

/// Whether the leading segment names a known group.
pub fn has_known_group(classifier: &str) -> bool {
    group(classifier).is_some_and(|g| KNOWN_GROUPS.contains(&g))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("Development Status :: 4 - Beta"));
        assert!(is_well_formed(
            "Topic :: Scientific/Engineering :: Bio-Informatics"
        ));
        assert!(!is_well_formed("Development Status"));
        assert!(!is_well_formed("Topic :: "));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn test_group_extraction() {
        assert_eq!(
            group("Intended Audience :: Science/Research"),
            Some("Intended Audience")
        );
        assert_eq!(group(""), None);
    }

    #[test]
    fn test_known_groups() {
        assert!(has_known_group("Programming Language :: Python :: 3"));
        assert!(has_known_group(
            "License :: OSI Approved :: GNU General Public License v3 (GPLv3)"
        ));
        assert!(!has_known_group("Frobnication :: Advanced"));
    }
}
