//! Error types for starsim.

use thiserror::Error;

/// Error type for graph construction, similarity estimation and output.
#[derive(Error, Debug)]
pub enum Error {
    /// Two configured types (attributes or the star type) share a first letter.
    #[error("type letters collide: {letters:?} ('{star}' is reserved for the star type)")]
    TypeLetterCollision { letters: Vec<char>, star: char },

    /// An attribute name in the configured list is empty.
    #[error("attribute name at position {position} is empty")]
    EmptyAttributeName { position: usize },

    /// No attribute names were configured.
    #[error("at least one attribute must be configured")]
    NoAttributes,

    /// The weighting selector string is empty.
    #[error("weighting scheme selector is empty")]
    EmptyWeightingSelector,

    /// A numeric setting that must be positive was zero.
    #[error("{setting} must be a positive integer")]
    NonPositive { setting: &'static str },

    /// A record line is not valid JSON.
    #[error("invalid JSON on line {line}: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record line is valid JSON but not a usable record.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A walk landed on a node with no star label.
    #[error("node {0} has no star label")]
    UnlabeledNode(usize),

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors raised while validating configuration, before any input is read.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::TypeLetterCollision { .. }
                | Error::EmptyAttributeName { .. }
                | Error::NoAttributes
                | Error::EmptyWeightingSelector
                | Error::NonPositive { .. }
        )
    }
}

/// Result type for starsim operations.
pub type Result<T> = std::result::Result<T, Error>;
