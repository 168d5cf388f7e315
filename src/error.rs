//! Error types shared across the transition-system and Petri-net layers.

use thiserror::Error;

/// Errors produced by the public API of this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition was violated by the caller, e.g. an out-of-range threshold
    /// or a removal targeting a state/transition that does not exist.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup that the caller required to succeed came back empty.
    #[error("not found: {0}")]
    NotFound(String),

    /// An operation was attempted against a collaborator that has not been opened.
    #[error("not open: {0}")]
    NotOpen(String),

    /// A DOT/text serialization failed at the I/O boundary.
    #[error("io failure: {0}")]
    IoFailure(#[from] std::io::Error),

    /// Region synthesis could not find a consistent assignment of positions to
    /// labels, even after label splitting.
    #[error("synthesis infeasible: {0}")]
    SynthesisInfeasible(String),

    /// The synthesized net does not satisfy the workflow-net shape that was
    /// requested (unique source, unique sink, every node on a source-sink path).
    #[error("not a workflow net: {0}")]
    NotAWorkflowNet(String),

    /// The progress callback requested cancellation.
    #[error("canceled")]
    Canceled,
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::IoFailure(std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

/// Convenience alias used throughout this crate's public API.
pub type Result<T> = std::result::Result<T, Error>;
