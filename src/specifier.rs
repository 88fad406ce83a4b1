//! Version specifier parsing and evaluation.
//!
//! A [`SpecifierSet`] is the comma-separated conjunction found in
//! `Requires-Python` fields, e.g. `>=3.8` or `>=3.8, <4.0, !=3.9.*`.

use crate::version::{Version, VersionError};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecifierError {
    #[error("empty version specifier")]
    Empty,
    #[error("unknown specifier operator in {0:?}")]
    UnknownOperator(String),
    #[error("wildcard versions are only valid with == and !=: {0:?}")]
    BadWildcard(String),
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Comparison operator of a single specifier clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    GreaterEq,
    LessEq,
    Greater,
    Less,
    /// `~= X.Y`: at least X.Y, within the X release series.
    Compatible,
}

impl Op {
    fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::NotEq => "!=",
            Op::GreaterEq => ">=",
            Op::LessEq => "<=",
            Op::Greater => ">",
            Op::Less => "<",
            Op::Compatible => "~=",
        }
    }
}

/// A single clause such as `>=3.8` or `!=3.9.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    op: Op,
    version: Version,
    /// Number of release segments given before a trailing `.*`.
    wildcard: Option<usize>,
}

impl Specifier {
    pub fn op(&self) -> Op {
        self.op
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether `candidate` satisfies this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        if let Some(segments) = self.wildcard {
            let matches = candidate.epoch() == self.version.epoch()
                && (0..segments).all(|i| candidate.release_at(i) == self.version.release_at(i));
            return match self.op {
                Op::Eq => matches,
                Op::NotEq => !matches,
                // Parser rejects wildcards on other operators.
                _ => false,
            };
        }

        match self.op {
            Op::Eq => candidate == &self.version,
            Op::NotEq => candidate != &self.version,
            Op::GreaterEq => candidate >= &self.version,
            Op::LessEq => candidate <= &self.version,
            Op::Greater => candidate > &self.version,
            Op::Less => candidate < &self.version,
            Op::Compatible => {
                // ~=X.Y(.Z) is >=X.Y(.Z) plus an upper bound on the
                // next-to-last segment.
                if candidate < &self.version || candidate.epoch() != self.version.epoch() {
                    return false;
                }
                let prefix = self.version.release().len().saturating_sub(1);
                (0..prefix).all(|i| candidate.release_at(i) == self.version.release_at(i))
            }
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wildcard {
            Some(_) => write!(f, "{}{}.*", self.op.as_str(), self.version),
            None => write!(f, "{}{}", self.op.as_str(), self.version),
        }
    }
}

impl FromStr for Specifier {
    type Err = SpecifierError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        if s.is_empty() {
            return Err(SpecifierError::Empty);
        }

        let (op, rest) = if let Some(r) = s.strip_prefix("==") {
            (Op::Eq, r)
        } else if let Some(r) = s.strip_prefix("!=") {
            (Op::NotEq, r)
        } else if let Some(r) = s.strip_prefix(">=") {
            (Op::GreaterEq, r)
        } else if let Some(r) = s.strip_prefix("<=") {
            (Op::LessEq, r)
        } else if let Some(r) = s.strip_prefix("~=") {
            (Op::Compatible, r)
        } else if let Some(r) = s.strip_prefix('>') {
            (Op::Greater, r)
        } else if let Some(r) = s.strip_prefix('<') {
            (Op::Less, r)
        } else {
            return Err(SpecifierError::UnknownOperator(s.to_string()));
        };

        let rest = rest.trim();
        if let Some(head) = rest.strip_suffix(".*") {
            if !matches!(op, Op::Eq | Op::NotEq) {
                return Err(SpecifierError::BadWildcard(s.to_string()));
            }
            let version: Version = head.parse()?;
            let segments = version.release().len();
            return Ok(Specifier {
                op,
                version,
                wildcard: Some(segments),
            });
        }

        Ok(Specifier {
            op,
            version: rest.parse()?,
            wildcard: None,
        })
    }
}

/// Conjunction of specifier clauses.
///
/// The empty set accepts every version, matching how installers treat a
/// missing `Requires-Python` field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecifierSet {
    clauses: Vec<Specifier>,
}

impl SpecifierSet {
    pub fn clauses(&self) -> &[Specifier] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether `candidate` satisfies every clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        self.clauses.iter().all(|c| c.contains(candidate))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", clause)?;
        }
        Ok(())
    }
}

impl FromStr for SpecifierSet {
    type Err = SpecifierError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let clauses = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Specifier::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SpecifierSet { clauses })
    }
}

impl Serialize for SpecifierSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SpecifierSet {
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

    fn set(s: &str) -> SpecifierSet {
        s.parse().unwrap()
    }

    #[test]
    fn test_minimum_runtime_bound() {
        let spec = set(">=3.8");
        assert!(spec.contains(&v("3.8")));
        assert!(spec.contains(&v("3.8.0")));
        assert!(spec.contains(&v("3.9")));
        assert!(spec.contains(&v("3.12.1")));
        assert!(!spec.contains(&v("3.7")));
        assert!(!spec.contains(&v("3.7.17")));
        assert!(!spec.contains(&v("2.7")));
    }

    #[test]
    fn test_conjunction() {
        let spec = set(">=3.8, <4.0");
        assert!(spec.contains(&v("3.8")));
        assert!(spec.contains(&v("3.11")));
        assert!(!spec.contains(&v("4.0")));
        assert!(!spec.contains(&v("3.7")));
    }

    #[test]
    fn test_exact_and_not_equal() {
        assert!(set("==3.8").contains(&v("3.8.0")));
        assert!(!set("==3.8").contains(&v("3.8.1")));
        assert!(!set("!=3.8").contains(&v("3.8")));
        assert!(set("!=3.8").contains(&v("3.9")));
    }

    #[test]
    fn test_wildcard() {
        let spec = set("==3.*");
        assert!(spec.contains(&v("3.0")));
        assert!(spec.contains(&v("3.12")));
        assert!(!spec.contains(&v("4.0")));

        let spec = set(">=3.8, !=3.9.*");
        assert!(spec.contains(&v("3.8.5")));
        assert!(!spec.contains(&v("3.9.2")));
        assert!(spec.contains(&v("3.10")));
    }

    #[test]
    fn test_wildcard_rejected_on_ordered_ops() {
        assert!(matches!(
            ">=3.*".parse::<Specifier>(),
            Err(SpecifierError::BadWildcard(_))
        ));
    }

    #[test]
    fn test_compatible_release() {
        let spec = set("~=3.8");
        assert!(spec.contains(&v("3.8")));
        assert!(spec.contains(&v("3.9")));
        assert!(!spec.contains(&v("4.0")));
        assert!(!spec.contains(&v("3.7")));

        let spec = set("~=1.4.2");
        assert!(spec.contains(&v("1.4.2")));
        assert!(spec.contains(&v("1.4.9")));
        assert!(!spec.contains(&v("1.5.0")));
    }

    #[test]
    fn test_empty_set_accepts_everything() {
        let spec = SpecifierSet::default();
        assert!(spec.contains(&v("0.1")));
        assert!(spec.contains(&v("99.0")));
    }

    #[test]
    fn test_display_round_trip() {
        for text in [">=3.8", ">=3.8, <4.0", "==3.9.*", "~=1.4.2"] {
            let spec = set(text);
            assert_eq!(set(&spec.to_string()), spec);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "".parse::<SpecifierSet>().map(|s| s.is_empty()),
            Ok(true)
        ));
        assert!(matches!(
            "^1.0".parse::<Specifier>(),
            Err(SpecifierError::UnknownOperator(_))
        ));
        assert!(">=3.x".parse::<Specifier>().is_err());
    }
}
