//! Serializable snapshot of the registry's wiring state.

use serde::Serialize;

use crate::registry::BundleRegistry;

/// One bundle's row in a [`ResolutionReport`].
#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub id: u64,
    pub symbolic_name: String,
    pub version: String,
    pub resolved: bool,
    /// `package -> provider` rows for an established wire set.
    pub wires: Vec<WireReport>,
}

#[derive(Debug, Serialize)]
pub struct WireReport {
    pub package: String,
    pub provider: String,
    pub provider_id: u64,
    pub export_version: String,
}

/// A point-in-time description of every installed bundle and its wiring,
/// for diagnostics and tooling.
#[derive(Debug, Serialize)]
pub struct ResolutionReport {
    pub bundles: Vec<BundleReport>,
}

impl ResolutionReport {
    pub fn capture(registry: &BundleRegistry) -> Self {
        let universe = registry.snapshot();
        let mut bundles = Vec::new();

        for bundle in universe.bundles() {
            let mut wires = Vec::new();
            if let Some(established) = bundle.established_wires() {
                for wire in established.iter() {
                    let provider = universe
                        .bundle(wire.provider())
                        .map(|b| b.symbolic_name().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    wires.push(WireReport {
                        package: wire.package().to_string(),
                        provider,
                        provider_id: wire.provider().0,
                        export_version: wire.export().version().to_string(),
                    });
                }
            }
            bundles.push(BundleReport {
                id: bundle.id().0,
                symbolic_name: bundle.symbolic_name().to_string(),
                version: bundle.version().to_string(),
                resolved: bundle.is_resolved(),
                wires,
            });
        }

        Self { bundles }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
