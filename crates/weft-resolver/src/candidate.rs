//! Candidate bindings considered during the wiring search.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use weft_core::bundle::BundleId;
use weft_core::export::ExportDescription;
use weft_core::wire::Wire;

/// A tentative binding of one imported package name to one provider export.
///
/// Equality and hashing are defined on the package name alone, on purpose:
/// within one resolution attempt at most one binding per package name may
/// exist in any consistency-checked set, so name-keyed set operations detect
/// the same package arriving from two different providers.
#[derive(Debug, Clone)]
pub struct Candidate {
    package: String,
    export: Arc<ExportDescription>,
    provider: BundleId,
}

impl Candidate {
    pub fn new(package: String, export: Arc<ExportDescription>, provider: BundleId) -> Self {
        debug_assert!(!package.is_empty());
        debug_assert!(export.exports_package(&package));
        Self {
            package,
            export,
            provider,
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn export(&self) -> &Arc<ExportDescription> {
        &self.export
    }

    pub fn provider(&self) -> BundleId {
        self.provider
    }

    /// Promote an accepted candidate to its output form.
    pub fn promote(self) -> Wire {
        Wire::new(self.package, self.export, self.provider)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.package == other.package
    }
}

impl Eq for Candidate {}

impl Hash for Candidate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package.hash(state);
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} from bundle {}",
            self.package,
            self.export.version(),
            self.provider
        )
    }
}

/// An eligible export paired with its provider, carrying the deterministic
/// search order: export version ascending, ties broken by provider id
/// ascending (earlier-installed bundles first).
///
/// Lower versions are tried first; higher versions are reached only when
/// backtracking returns to the unit. The first complete wiring found wins.
#[derive(Debug, Clone)]
pub struct RankedExport {
    pub export: Arc<ExportDescription>,
    pub provider: BundleId,
}

impl PartialEq for RankedExport {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedExport {}

impl Ord for RankedExport {
    fn cmp(&self, other: &Self) -> Ordering {
        self.export
            .version()
            .cmp(other.export.version())
            .then_with(|| self.provider.cmp(&other.provider))
    }
}

impl PartialOrd for RankedExport {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use weft_core::version::Version;

    fn export(package: &str, version: Version) -> Arc<ExportDescription> {
        Arc::new(
            ExportDescription::builder()
                .package(package)
                .version(version)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn equality_is_by_package_name() {
        let a = Candidate::new(
            "org.weft.http".to_string(),
            export("org.weft.http", Version::new(1, 0, 0)),
            BundleId(1),
        );
        let b = Candidate::new(
            "org.weft.http".to_string(),
            export("org.weft.http", Version::new(2, 0, 0)),
            BundleId(2),
        );
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        // Same package from a different provider collides.
        assert!(!set.insert(b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn ranked_exports_sort_version_then_bundle_id() {
        let mut ranked = vec![
            RankedExport {
                export: export("p", Version::new(2, 0, 0)),
                provider: BundleId(1),
            },
            RankedExport {
                export: export("p", Version::new(1, 0, 0)),
                provider: BundleId(9),
            },
            RankedExport {
                export: export("p", Version::new(1, 0, 0)),
                provider: BundleId(3),
            },
        ];
        ranked.sort();
        assert_eq!(*ranked[0].export.version(), Version::new(1, 0, 0));
        assert_eq!(ranked[0].provider, BundleId(3));
        assert_eq!(ranked[1].provider, BundleId(9));
        assert_eq!(*ranked[2].export.version(), Version::new(2, 0, 0));
    }
}
