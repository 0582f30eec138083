//! Core data types for the Weft module framework.
//!
//! This crate defines the fundamental types the rest of Weft is built on:
//! versions and version ranges, import/export package descriptions and their
//! builders, wires, bundle handles, universe snapshots, and LDAP-style
//! selection filters.
//!
//! This crate is intentionally free of the search algorithm itself; the
//! resolver lives in `weft-resolver` and consumes these types unchanged.

pub mod bundle;
pub mod errors;
pub mod export;
pub mod filter;
pub mod import;
pub mod version;
pub mod wire;

/// Symbolic name of the system bundle. An import whose `bundle-symbolic-name`
/// directive names the system bundle matches any provider.
pub const SYSTEM_BUNDLE_SYMBOLIC_NAME: &str = "weft.system.bundle";
