//! The installed-bundle registry.

use std::sync::{Arc, RwLock};

use weft_core::bundle::{Bundle, BundleId, Universe};
use weft_core::errors::WeftError;
use weft_core::export::ExportDescription;
use weft_core::import::ImportDescription;
use weft_core::version::Version;

/// Everything needed to install a bundle: its already-parsed description
/// surface. Manifest parsing happens upstream.
#[derive(Debug, Clone)]
pub struct BundleSpec {
    pub symbolic_name: String,
    pub version: Version,
    pub exports: Vec<ExportDescription>,
    pub imports: Vec<ImportDescription>,
}

impl BundleSpec {
    pub fn new(symbolic_name: &str, version: Version) -> Self {
        Self {
            symbolic_name: symbolic_name.to_string(),
            version,
            exports: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn export(mut self, export: ExportDescription) -> Self {
        self.exports.push(export);
        self
    }

    pub fn import(mut self, import: ImportDescription) -> Self {
        self.imports.push(import);
        self
    }
}

struct RegistryState {
    bundles: Vec<Arc<Bundle>>,
    next_id: u64,
}

/// The shared registry of installed bundles.
///
/// Ids are assigned in install order and never reused; the resolver's
/// candidate tie-break leans on that ordering, so earlier-installed bundles
/// win version ties.
pub struct BundleRegistry {
    state: RwLock<RegistryState>,
}

impl BundleRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                bundles: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Install a bundle, assigning the next id.
    pub fn install(&self, spec: BundleSpec) -> Arc<Bundle> {
        let mut state = self.state.write().expect("registry lock poisoned");
        let id = BundleId(state.next_id);
        state.next_id += 1;
        let bundle = Arc::new(Bundle::new(
            id,
            spec.symbolic_name,
            spec.version,
            spec.exports,
            spec.imports,
        ));
        tracing::debug!(bundle = %bundle, "installed");
        state.bundles.push(bundle.clone());
        bundle
    }

    /// Remove a bundle. Recomputing wirings that referenced it is a refresh
    /// concern and is not performed here.
    pub fn uninstall(&self, id: BundleId) -> Result<(), WeftError> {
        let mut state = self.state.write().expect("registry lock poisoned");
        let before = state.bundles.len();
        state.bundles.retain(|b| b.id() != id);
        if state.bundles.len() == before {
            return Err(WeftError::Resolution {
                message: format!("bundle {id} is not installed"),
            });
        }
        tracing::debug!(bundle = %id, "uninstalled");
        Ok(())
    }

    /// An immutable snapshot of the installed bundles, taken under the read
    /// lock. Resolution attempts run against snapshots, never live state.
    pub fn snapshot(&self) -> Universe {
        let state = self.state.read().expect("registry lock poisoned");
        Universe::new(state.bundles.clone())
    }

    pub fn bundle(&self, id: BundleId) -> Option<Arc<Bundle>> {
        let state = self.state.read().expect("registry lock poisoned");
        state.bundles.iter().find(|b| b.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().expect("registry lock poisoned").bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for BundleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
