//! Orchestration layer for the Weft module framework.
//!
//! Thin glue over `weft-resolver`: a registry of installed bundles guarded
//! by a read/write lock, a resolution sweep that snapshots the registry and
//! resolves installed-but-unresolved bundles one by one, and a serializable
//! report of the resulting wiring for diagnostics.
//!
//! The resolver itself is pure; all locking lives here. A resolution never
//! observes a registry mutated mid-search because each attempt runs against
//! an immutable snapshot taken under the read lock, and accepted wire sets
//! are published back under the write lock.

pub mod orchestrator;
pub mod registry;
pub mod report;
