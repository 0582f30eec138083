//! The wiring search: depth-first backtracking over per-package import
//! units, with deterministic candidate ordering, `uses`-driven implied
//! constraint propagation, and a uniqueness check over the accumulated
//! bindings.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use weft_core::bundle::{BundleId, Universe};
use weft_core::errors::WeftError;
use weft_core::export::ExportDescription;
use weft_core::filter::Filter;
use weft_core::import::{ImportDescription, Resolution};
use weft_core::wire::Wire;
use weft_core::SYSTEM_BUNDLE_SYMBOLIC_NAME;

use crate::candidate::{Candidate, RankedExport};

/// One resolution unit: a single package name from a possibly multi-package
/// import description, sharing that description's constraints.
struct Unit<'a> {
    package: &'a str,
    import: &'a ImportDescription,
}

/// A search frame: the unit being tried, the next candidate index, and the
/// snapshot of choices and bindings accumulated by the frames below it.
struct Frame {
    unit: usize,
    next: usize,
    chosen: Vec<Candidate>,
    bindings: BTreeMap<String, Arc<ExportDescription>>,
}

/// Compute a consistent wiring for `imports` against `universe`.
///
/// Returns `Some` with the wire set of the first complete assignment found,
/// sorted by package name, or `None` when no consistent wiring exists. The
/// wire set may legitimately be empty: a bundle with no imports, or one
/// whose every import is optional and unsatisfied, resolves without wires.
/// Two calls with identical inputs produce identical results.
///
/// The only error surfaced is malformed constraint input (an unparseable
/// `selection-filter`); ordinary unsatisfiability is not an error.
pub fn resolve(
    imports: &[ImportDescription],
    universe: &Universe,
) -> Result<Option<Vec<Wire>>, WeftError> {
    let units = collect_units(imports);
    if units.is_empty() {
        return Ok(Some(Vec::new()));
    }

    tracing::debug!(
        units = units.len(),
        bundles = universe.len(),
        "starting wiring search"
    );

    // Candidate eligibility does not depend on choices made for other units,
    // so each unit's ordered candidate list is computed once up front. A
    // mandatory unit with no matching candidate fails the whole attempt; an
    // unsatisfied optional unit is dropped from the search.
    let mut unit_choices: Vec<Vec<Candidate>> = Vec::new();
    for unit in &units {
        let choices = collect_candidates(unit, universe)?;
        if choices.is_empty() {
            match unit.import.resolution() {
                Resolution::Optional => {
                    tracing::debug!(package = unit.package, "dropping unsatisfied optional import");
                    continue;
                }
                Resolution::Mandatory => {
                    tracing::debug!(package = unit.package, "no eligible export matches");
                    return Ok(None);
                }
            }
        }
        unit_choices.push(choices);
    }
    if unit_choices.is_empty() {
        // Every unit was optional and unsatisfied; the bundle resolves wireless.
        return Ok(Some(Vec::new()));
    }

    // Explicit frame stack instead of call recursion: depth equals the unit
    // count, which is caller-controlled.
    let mut stack = vec![Frame {
        unit: 0,
        next: 0,
        chosen: Vec::new(),
        bindings: BTreeMap::new(),
    }];

    while !stack.is_empty() {
        let depth = stack.len() - 1;
        let unit = stack[depth].unit;
        let choice = stack[depth].next;
        let choices = &unit_choices[unit];

        if choice >= choices.len() {
            // This unit's candidates are exhausted; backtrack.
            stack.pop();
            continue;
        }
        stack[depth].next += 1;

        let candidate = choices[choice].clone();
        let implied = collect_implied_constraints(
            candidate.export().uses(),
            candidate.provider(),
            universe,
        );

        let mut bindings = stack[depth].bindings.clone();
        if !bind(&mut bindings, &candidate) || implied.iter().any(|c| !bind(&mut bindings, c)) {
            tracing::trace!(candidate = %candidate, "rejected: conflicting package view");
            continue;
        }

        let mut chosen = stack[depth].chosen.clone();
        chosen.push(candidate);

        if unit + 1 == unit_choices.len() {
            // First complete consistent assignment wins.
            let wires = collect_wires(chosen);
            tracing::debug!(wires = wires.len(), "wiring search succeeded");
            return Ok(Some(wires));
        }

        stack.push(Frame {
            unit: unit + 1,
            next: 0,
            chosen,
            bindings,
        });
    }

    tracing::debug!("wiring search exhausted without a solution");
    Ok(None)
}

/// Flatten import descriptions into per-package units, preserving the order
/// packages were declared in. Stable order keeps resolution reproducible.
fn collect_units(imports: &[ImportDescription]) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    for import in imports {
        for package in import.packages() {
            units.push(Unit { package, import });
        }
    }
    units
}

/// Collect one unit's matching candidates in deterministic search order.
fn collect_candidates(unit: &Unit<'_>, universe: &Universe) -> Result<Vec<Candidate>, WeftError> {
    let filter = unit
        .import
        .selection_filter()
        .map(Filter::parse)
        .transpose()?;

    let mut candidates = Vec::new();
    for ranked in collect_eligible_exports(unit, universe) {
        if matches(unit.package, unit.import, &ranked.export, filter.as_ref()) {
            candidates.push(Candidate::new(
                unit.package.to_string(),
                ranked.export,
                ranked.provider,
            ));
        }
    }
    Ok(candidates)
}

/// Scan the universe for exports of the unit's package, honoring the
/// import's provider-scoping directives, sorted by version ascending with
/// ties broken by lower bundle id.
fn collect_eligible_exports(unit: &Unit<'_>, universe: &Universe) -> Vec<RankedExport> {
    let name_constraint = unit.import.bundle_symbolic_name();
    let version_constraint = unit.import.bundle_version();
    // The system bundle's symbolic name matches like an absent constraint.
    let base_name_match =
        name_constraint.is_none() || name_constraint == Some(SYSTEM_BUNDLE_SYMBOLIC_NAME);

    let mut eligible = Vec::new();
    for bundle in universe.bundles() {
        let name_match = base_name_match || name_constraint == Some(bundle.symbolic_name());
        let version_match =
            version_constraint.map_or(true, |range| range.includes(bundle.version()));
        if !(name_match && version_match) {
            continue;
        }
        for export in bundle.export_list() {
            if export.exports_package(unit.package) {
                eligible.push(RankedExport {
                    export: export.clone(),
                    provider: bundle.id(),
                });
            }
        }
    }
    eligible.sort();
    eligible
}

/// The match predicate: version range inclusion, export-mandatory attributes
/// present and equal on the import, remaining import attributes equal on the
/// export, and the selection filter (when present) accepted.
fn matches(
    package: &str,
    import: &ImportDescription,
    export: &Arc<ExportDescription>,
    filter: Option<&Filter>,
) -> bool {
    debug_assert!(export.exports_package(package));

    if !import.version().includes(export.version()) {
        return false;
    }

    for key in export.mandatory() {
        if import.attributes().get(key) != export.attributes().get(key) {
            return false;
        }
    }

    for (key, value) in import.attributes() {
        if export.attributes().get(key) != Some(value) {
            return false;
        }
    }

    if let Some(filter) = filter {
        let mut attributes = export.attributes().clone();
        attributes.insert("version".to_string(), export.version().to_string());
        if !filter.matches(&attributes) {
            return false;
        }
    }

    true
}

/// Walk an export's `uses` set through the provider's established wires,
/// collecting the provider's transitive view of those packages. Picking that
/// export means inheriting this view, and it must agree with everything
/// already chosen.
///
/// Wires can reference each other cyclically, so the walk carries a visited
/// set. An unresolved provider has no established wires and contributes
/// nothing.
fn collect_implied_constraints(
    uses: &BTreeSet<String>,
    provider: BundleId,
    universe: &Universe,
) -> Vec<Candidate> {
    let mut implied = Vec::new();
    let mut visited = HashSet::new();
    walk_uses(uses, provider, universe, &mut implied, &mut visited);
    implied
}

fn walk_uses(
    uses: &BTreeSet<String>,
    provider: BundleId,
    universe: &Universe,
    implied: &mut Vec<Candidate>,
    visited: &mut HashSet<(BundleId, String)>,
) {
    let Some(bundle) = universe.bundle(provider) else {
        return;
    };
    for package in uses {
        if !visited.insert((provider, package.clone())) {
            continue;
        }
        if let Some(wire) = bundle.wire_for(package) {
            walk_uses(wire.export().uses(), wire.provider(), universe, implied, visited);
            implied.push(Candidate::new(
                package.clone(),
                wire.export().clone(),
                wire.provider(),
            ));
        }
    }
}

/// Fold one candidate into the binding map. Returns false when the package
/// is already bound to a different export value, which is exactly the
/// uniqueness invariant: at most one export description per package name
/// across everything chosen and implied in one attempt.
fn bind(
    bindings: &mut BTreeMap<String, Arc<ExportDescription>>,
    candidate: &Candidate,
) -> bool {
    match bindings.get(candidate.package()) {
        Some(bound) => bound == candidate.export(),
        None => {
            bindings.insert(candidate.package().to_string(), candidate.export().clone());
            true
        }
    }
}

/// Promote accepted candidates to wires, sorted by package name. Duplicate
/// import declarations for one package collapse to a single wire; by then
/// the binding map has already forced them onto the same export.
fn collect_wires(chosen: Vec<Candidate>) -> Vec<Wire> {
    let mut wires: Vec<Wire> = chosen.into_iter().map(Candidate::promote).collect();
    wires.sort_by(|a, b| a.package().cmp(b.package()));
    wires.dedup_by(|a, b| a.package() == b.package());
    wires
}
