//! Wires: accepted bindings from an imported package to a provider's export.

use std::fmt;
use std::sync::Arc;

use crate::bundle::BundleId;
use crate::export::ExportDescription;

/// A finalized binding of one imported package name to exactly one providing
/// bundle's export.
///
/// A wire references its provider by [`BundleId`], never by owning pointer:
/// bundles routinely reference each other's packages both ways, and the
/// established-wire walk during resolution is a lookup through the universe
/// snapshot, not a pointer chase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    package: String,
    export: Arc<ExportDescription>,
    provider: BundleId,
}

impl Wire {
    pub fn new(package: String, export: Arc<ExportDescription>, provider: BundleId) -> Self {
        debug_assert!(!package.is_empty());
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
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} <- bundle {}",
            self.package,
            self.export.version(),
            self.provider
        )
    }
}
