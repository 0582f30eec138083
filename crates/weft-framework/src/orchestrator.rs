//! The resolution sweep: resolve every installed-but-unresolved bundle.

use std::sync::Arc;

use weft_core::bundle::{Bundle, BundleId};
use weft_core::errors::WeftError;
use weft_resolver::graph::WireGraph;

use crate::registry::BundleRegistry;

/// Outcome of one bundle's attempt within a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A consistent wiring was found and published.
    Resolved { wires: usize },
    /// No consistent wiring exists against the current universe. The bundle
    /// stays installed and the attempt may be retried after new installs.
    Unresolvable,
    /// The bundle carried a malformed constraint; only its own attempt was
    /// aborted.
    Failed { message: String },
}

/// What one [`resolve_all`] sweep did, bundle by bundle in id order.
#[derive(Debug, Default)]
pub struct ResolutionSummary {
    pub outcomes: Vec<(BundleId, Outcome)>,
}

impl ResolutionSummary {
    pub fn resolved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Resolved { .. }))
            .count()
    }

    pub fn outcome(&self, id: BundleId) -> Option<&Outcome> {
        self.outcomes.iter().find(|(b, _)| *b == id).map(|(_, o)| o)
    }
}

/// Attempt to resolve every installed-but-unresolved bundle, in install
/// order.
///
/// Each attempt runs against its own immutable snapshot taken before the
/// attempt, so a bundle resolved earlier in the sweep is visible (with its
/// established wires) to bundles attempted after it. A malformed constraint
/// aborts only the bundle that carried it and is recorded in the summary.
pub fn resolve_all(registry: &BundleRegistry) -> ResolutionSummary {
    let mut summary = ResolutionSummary::default();

    let ids: Vec<BundleId> = registry
        .snapshot()
        .bundles()
        .iter()
        .filter(|b| !b.is_resolved())
        .map(|b| b.id())
        .collect();

    for id in ids {
        let Some(bundle) = registry.bundle(id) else {
            // Uninstalled between snapshot and attempt; nothing to do.
            continue;
        };
        let outcome = resolve_one(registry, &bundle);
        summary.outcomes.push((id, outcome));
    }

    tracing::info!(
        attempted = summary.outcomes.len(),
        resolved = summary.resolved(),
        "resolution sweep finished"
    );
    summary
}

/// Resolve a single bundle against a fresh snapshot and publish on success.
pub fn resolve_one(registry: &BundleRegistry, bundle: &Arc<Bundle>) -> Outcome {
    let universe = registry.snapshot();

    // A resolved bundle may carry zero wires: no imports at all, or only
    // optional imports nothing satisfies. Both still publish a wire set.
    match weft_resolver::resolve(bundle.import_list(), &universe) {
        Ok(None) => {
            tracing::debug!(bundle = %bundle, "unresolvable against current universe");
            Outcome::Unresolvable
        }
        Ok(Some(wires)) => {
            let count = wires.len();
            if tracing::enabled!(tracing::Level::DEBUG) {
                let graph = WireGraph::build(bundle.id(), &wires, &universe);
                tracing::debug!(bundle = %bundle, wiring = %graph.render_tree(), "accepted wiring");
            }
            match bundle.publish_wires(wires) {
                Ok(()) => Outcome::Resolved { wires: count },
                Err(err) => Outcome::Failed {
                    message: err.to_string(),
                },
            }
        }
        Err(WeftError::MalformedConstraint { message }) => {
            tracing::warn!(bundle = %bundle, error = %message, "malformed constraint");
            Outcome::Failed { message }
        }
        Err(err) => {
            tracing::warn!(bundle = %bundle, error = %err, "resolution attempt failed");
            Outcome::Failed {
                message: err.to_string(),
            }
        }
    }
}
