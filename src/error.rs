use thiserror::Error;

/// Errors that can occur while building or checking a trapezoidal map.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The input areas, bounding box or options violate the contract of the builder.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of the violation.
        message: String,
    },
    /// The map reached a state that breaks its own invariants.
    ///
    /// Construction is aborted when this happens, since the search structure cannot be repaired
    /// locally once a leaf or a neighbor link is wrong.
    #[error("Internal inconsistency: {message}")]
    InternalInconsistency {
        /// Description of the broken invariant.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn inconsistency(message: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            message: message.into(),
        }
    }
}

/// Alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
