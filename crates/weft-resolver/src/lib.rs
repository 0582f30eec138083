//! Package wiring resolver for the Weft module framework.
//!
//! Given one bundle's import descriptions and a snapshot of every installed
//! bundle, the resolver searches for an assignment of each imported package
//! to exactly one provider export such that all providers' transitive `uses`
//! constraints stay mutually consistent, and returns the wire set of the
//! first complete assignment found (or an empty set when none exists).

pub mod candidate;
pub mod graph;
pub mod resolver;

pub use resolver::resolve;
