//! Bundle handles and universe snapshots.
//!
//! A [`Bundle`] is the resolver's view of one installed component: identity,
//! version, declared imports and exports, and (once resolved) its published
//! wire set. The descriptions themselves are parsed elsewhere and are
//! immutable; the only mutable state on a bundle is the one-shot wire
//! publication.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::errors::WeftError;
use crate::export::ExportDescription;
use crate::import::ImportDescription;
use crate::version::Version;
use crate::wire::Wire;

/// Identity of an installed bundle. Ids are assigned in install order and
/// never reused; the resolver's tie-break depends on that ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BundleId(pub u64);

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One installed bundle: identity plus its declared package surface.
#[derive(Debug)]
pub struct Bundle {
    id: BundleId,
    symbolic_name: String,
    version: Version,
    exports: Vec<Arc<ExportDescription>>,
    imports: Vec<ImportDescription>,
    wires: RwLock<Option<Arc<[Wire]>>>,
}

impl Bundle {
    pub fn new(
        id: BundleId,
        symbolic_name: String,
        version: Version,
        exports: Vec<ExportDescription>,
        imports: Vec<ImportDescription>,
    ) -> Self {
        Self {
            id,
            symbolic_name,
            version,
            exports: exports.into_iter().map(Arc::new).collect(),
            imports,
            wires: RwLock::new(None),
        }
    }

    pub fn id(&self) -> BundleId {
        self.id
    }

    pub fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn export_list(&self) -> &[Arc<ExportDescription>] {
        &self.exports
    }

    pub fn import_list(&self) -> &[ImportDescription] {
        &self.imports
    }

    /// The published wire set, if this bundle has been resolved.
    pub fn established_wires(&self) -> Option<Arc<[Wire]>> {
        self.wires.read().expect("bundle wire lock poisoned").clone()
    }

    /// Look one established wire up by package name.
    pub fn wire_for(&self, package: &str) -> Option<Wire> {
        self.established_wires()?
            .iter()
            .find(|w| w.package() == package)
            .cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.wires.read().expect("bundle wire lock poisoned").is_some()
    }

    /// Publish an accepted wire set. A resolved bundle's wires are immutable
    /// for its generation's lifetime; publishing twice without a refresh is
    /// an invariant violation.
    pub fn publish_wires(&self, wires: Vec<Wire>) -> Result<(), WeftError> {
        let mut slot = self.wires.write().expect("bundle wire lock poisoned");
        if slot.is_some() {
            return Err(WeftError::Resolution {
                message: format!(
                    "bundle {} ({}) already holds a published wire set",
                    self.id, self.symbolic_name
                ),
            });
        }
        *slot = Some(wires.into());
        Ok(())
    }

    /// Drop the published wire set, modeling a refresh. The next resolution
    /// attempt recomputes from scratch.
    pub fn clear_wires(&self) {
        *self.wires.write().expect("bundle wire lock poisoned") = None;
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} (bundle {})", self.symbolic_name, self.version, self.id)
    }
}

/// An immutable snapshot of the installed bundles handed to one resolution
/// attempt. Iteration order is install (id) order.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    bundles: Vec<Arc<Bundle>>,
}

impl Universe {
    /// Build a snapshot. Bundles are sorted by id so iteration order is
    /// independent of the order the caller collected them in.
    pub fn new(mut bundles: Vec<Arc<Bundle>>) -> Self {
        bundles.sort_by_key(|b| b.id());
        Self { bundles }
    }

    pub fn bundles(&self) -> &[Arc<Bundle>] {
        &self.bundles
    }

    pub fn bundle(&self, id: BundleId) -> Option<&Arc<Bundle>> {
        self.bundles
            .binary_search_by_key(&id, |b| b.id())
            .ok()
            .map(|at| &self.bundles[at])
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
