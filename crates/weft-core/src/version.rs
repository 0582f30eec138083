//! Version values and version ranges.
//!
//! Weft versions are four-field tuples `major.minor.micro.qualifier` with a
//! total order: the numeric fields compare numerically in sequence, then the
//! qualifier compares lexically. This is a different ordering from semver
//! (there is no pre-release precedence; an empty qualifier sorts *before*
//! any non-empty one).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::WeftError;

/// An immutable version value with a total order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub qualifier: String,
}

impl Version {
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: &str) -> Self {
        Self {
            major,
            minor,
            micro,
            qualifier: qualifier.to_string(),
        }
    }

    /// Parse `"M"`, `"M.m"`, `"M.m.u"`, or `"M.m.u.q"`.
    ///
    /// Missing numeric fields default to zero. The qualifier may contain
    /// alphanumerics, `-`, and `_`.
    pub fn parse(input: &str) -> Result<Self, WeftError> {
        let malformed = |message: &str| WeftError::MalformedVersion {
            input: input.to_string(),
            message: message.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(malformed("empty version string"));
        }

        let mut parts = trimmed.splitn(4, '.');
        let mut numeric = |name: &str| -> Result<u32, WeftError> {
            match parts.next() {
                None => Ok(0),
                Some(p) => p
                    .parse::<u32>()
                    .map_err(|_| malformed(&format!("{name} segment `{p}` is not a number"))),
            }
        };

        let major = numeric("major")?;
        let minor = numeric("minor")?;
        let micro = numeric("micro")?;

        let qualifier = match parts.next() {
            None => String::new(),
            Some(q) => {
                if q.is_empty()
                    || !q.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(malformed(&format!("qualifier `{q}` contains invalid characters")));
                }
                q.to_string()
            }
        };

        Ok(Self {
            major,
            minor,
            micro,
            qualifier,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.micro.cmp(&other.micro))
            .then_with(|| self.qualifier.cmp(&other.qualifier))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}

/// An interval over [`Version`] with per-bound inclusivity.
///
/// `ceiling == None` means unbounded above.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
    floor: Version,
    ceiling: Option<Version>,
    floor_inclusive: bool,
    ceiling_inclusive: bool,
}

impl VersionRange {
    /// Build a range, rejecting a floor above the ceiling.
    pub fn new(
        floor: Version,
        ceiling: Option<Version>,
        floor_inclusive: bool,
        ceiling_inclusive: bool,
    ) -> Result<Self, WeftError> {
        if let Some(ref c) = ceiling {
            if floor > *c {
                return Err(WeftError::InvalidRange {
                    input: format!("{floor}..{c}"),
                    message: "floor is greater than ceiling".to_string(),
                });
            }
        }
        Ok(Self {
            floor,
            ceiling,
            floor_inclusive,
            ceiling_inclusive,
        })
    }

    /// The defaulted import range: any version from 0.0.0 up.
    pub fn at_least_zero() -> Self {
        Self {
            floor: Version::new(0, 0, 0),
            ceiling: None,
            floor_inclusive: true,
            ceiling_inclusive: false,
        }
    }

    /// Parse an interval expression.
    ///
    /// Accepts `[1.0,2.0)`, `(1.0,2.0]`, `[1.0,2.0]`, `(1.0,2.0)`, and a
    /// bare version `1.0` meaning "at least 1.0".
    pub fn parse(spec: &str) -> Result<Self, WeftError> {
        let s = spec.trim();
        let open = s.starts_with('[') || s.starts_with('(');
        if !open {
            // Bare version: unbounded above.
            let floor = Version::parse(s)?;
            return Self::new(floor, None, true, false);
        }

        let close = s.ends_with(']') || s.ends_with(')');
        if !close || s.len() < 2 {
            return Err(WeftError::InvalidRange {
                input: spec.to_string(),
                message: "interval is not terminated".to_string(),
            });
        }

        let floor_inclusive = s.starts_with('[');
        let ceiling_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        let Some((lo, hi)) = inner.split_once(',') else {
            return Err(WeftError::InvalidRange {
                input: spec.to_string(),
                message: "interval needs two comma-separated bounds".to_string(),
            });
        };

        let floor = Version::parse(lo)?;
        let hi = hi.trim();
        let ceiling = if hi.is_empty() {
            None
        } else {
            Some(Version::parse(hi)?)
        };

        Self::new(floor, ceiling, floor_inclusive, ceiling_inclusive)
    }

    /// Interval membership, per the inclusivity flags.
    pub fn includes(&self, version: &Version) -> bool {
        match version.cmp(&self.floor) {
            Ordering::Less => return false,
            Ordering::Equal if !self.floor_inclusive => return false,
            _ => {}
        }
        if let Some(ref ceiling) = self.ceiling {
            match version.cmp(ceiling) {
                Ordering::Greater => return false,
                Ordering::Equal if !self.ceiling_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    pub fn floor(&self) -> &Version {
        &self.floor
    }

    pub fn ceiling(&self) -> Option<&Version> {
        self.ceiling.as_ref()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ceiling {
            Some(ref c) => write!(
                f,
                "{}{},{}{}",
                if self.floor_inclusive { '[' } else { '(' },
                self.floor,
                c,
                if self.ceiling_inclusive { ']' } else { ')' },
            ),
            None => write!(f, "{}", self.floor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ordering() {
        let v1 = Version::parse("1.0.0").unwrap();
        let v2 = Version::parse("1.0.1").unwrap();
        let v3 = Version::parse("1.1.0").unwrap();
        let v4 = Version::parse("2.0.0").unwrap();
        assert!(v1 < v2);
        assert!(v2 < v3);
        assert!(v3 < v4);
    }

    #[test]
    fn qualifier_ordering_is_lexical() {
        let plain = Version::parse("1.0.0").unwrap();
        let alpha = Version::parse("1.0.0.alpha").unwrap();
        let beta = Version::parse("1.0.0.beta").unwrap();
        // Empty qualifier sorts first; the rest lexically.
        assert!(plain < alpha);
        assert!(alpha < beta);
    }

    #[test]
    fn missing_segments_default_to_zero() {
        assert_eq!(Version::parse("1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn malformed_versions_rejected() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("a.b.c").is_err());
        assert!(Version::parse("1.2.x").is_err());
        assert!(Version::parse("1.2.3.q!").is_err());
    }

    #[test]
    fn display_round_trip() {
        let v = Version::with_qualifier(1, 2, 3, "rc1");
        assert_eq!(v.to_string(), "1.2.3.rc1");
        assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
    }

    #[test]
    fn range_boundaries() {
        let range = VersionRange::parse("[1.0,2.0)").unwrap();
        assert!(range.includes(&Version::new(1, 0, 0)));
        assert!(range.includes(&Version::new(1, 9, 9)));
        assert!(!range.includes(&Version::new(2, 0, 0)));
        assert!(!range.includes(&Version::new(0, 9, 0)));
    }

    #[test]
    fn exclusive_floor() {
        let range = VersionRange::parse("(1.0,2.0]").unwrap();
        assert!(!range.includes(&Version::new(1, 0, 0)));
        assert!(range.includes(&Version::new(2, 0, 0)));
    }

    #[test]
    fn bare_version_is_at_least() {
        let range = VersionRange::parse("1.5").unwrap();
        assert!(!range.includes(&Version::new(1, 4, 9)));
        assert!(range.includes(&Version::new(1, 5, 0)));
        assert!(range.includes(&Version::new(99, 0, 0)));
    }

    #[test]
    fn unbounded_ceiling() {
        let range = VersionRange::parse("[2.0,)").unwrap();
        assert!(range.includes(&Version::new(1000, 0, 0)));
        assert!(!range.includes(&Version::new(1, 9, 9)));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = VersionRange::new(Version::new(2, 0, 0), Some(Version::new(1, 0, 0)), true, true);
        assert!(matches!(err, Err(WeftError::InvalidRange { .. })));
    }

    #[test]
    fn malformed_range_rejected() {
        assert!(VersionRange::parse("[1.0").is_err());
        assert!(VersionRange::parse("[1.0]").is_err());
        assert!(VersionRange::parse("[a,b]").is_err());
    }

    #[test]
    fn at_least_zero_accepts_everything() {
        let range = VersionRange::at_least_zero();
        assert!(range.includes(&Version::new(0, 0, 0)));
        assert!(range.includes(&Version::with_qualifier(7, 3, 1, "beta")));
    }
}
