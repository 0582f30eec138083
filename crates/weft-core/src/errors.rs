use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Weft operations.
///
/// An unsatisfiable wiring is deliberately *not* an error: the resolver
/// reports it as an empty wire set and the bundle simply stays unresolved.
/// Errors are reserved for malformed input and broken invariants.
#[derive(Debug, Error, Diagnostic)]
pub enum WeftError {
    /// A version string did not parse.
    #[error("Malformed version `{input}`: {message}")]
    #[diagnostic(help("Versions are `major.minor.micro.qualifier`, numeric with an optional alphanumeric qualifier"))]
    MalformedVersion { input: String, message: String },

    /// A version range whose floor lies above its ceiling, or range syntax
    /// that did not parse.
    #[error("Invalid version range `{input}`: {message}")]
    InvalidRange { input: String, message: String },

    /// A constraint reached the resolver in a shape it cannot evaluate,
    /// e.g. a `selection-filter` expression that fails to parse. Aborts the
    /// resolution attempt for the one bundle that carried it.
    #[error("Malformed constraint: {message}")]
    #[diagnostic(help("Check the selection-filter syntax: (&(a=b)(|(c=d)(!(e=f))))"))]
    MalformedConstraint { message: String },

    /// A description was constructed in an invalid shape (empty package
    /// list, mandatory key naming no declared attribute).
    #[error("Invalid description: {message}")]
    Description { message: String },

    /// A framework-level invariant was violated, such as publishing a wire
    /// set onto a bundle that already holds one.
    #[error("Resolution invariant violated: {message}")]
    Resolution { message: String },
}

/// Convenience alias used throughout the workspace.
pub type WeftResult<T> = Result<T, WeftError>;
