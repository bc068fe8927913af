use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while training or running the scam classifier.
#[derive(Debug, Error)]
pub enum ScamScopeError {
    /// A required column is absent from the source table.
    #[error("missing required column: {column:?}")]
    MissingColumn {
        /// The column header that was expected.
        column: String,
    },

    /// No usable rows remained after cleaning.
    #[error("dataset is empty after removing rows without a summary")]
    EmptyDataset,

    /// The classifier needs both classes present to be trained.
    #[error("training requires two target classes, found {found}")]
    SingleClass {
        /// Number of distinct classes actually present.
        found: usize,
    },

    /// A target cell could not be interpreted as scam / non-scam.
    #[error("invalid target label {value:?} on row {row}")]
    InvalidLabel {
        /// 1-based data row number.
        row: usize,
        /// The raw cell content.
        value: String,
    },

    /// The loss amount of a prediction request is not a finite number.
    #[error("invalid amount: {0:?} is not a number")]
    InvalidAmount(String),

    /// An artifact file could not be read or written.
    #[error("artifact I/O error at {path}: {source}")]
    ArtifactIo {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact file exists but does not decode.
    #[error("corrupt artifact at {path}: {source}")]
    ArtifactFormat {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The artifact was written by an incompatible version of the trainer.
    #[error("artifact {path} has format version {found}, expected {expected}")]
    IncompatibleArtifact {
        /// Path of the artifact.
        path: PathBuf,
        /// Version stored in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// Artifacts in one set were written by different training runs.
    #[error("artifact {path} belongs to training run {found}, expected {expected}")]
    MismatchedArtifacts {
        /// Path of the artifact that disagrees with the pipeline.
        path: PathBuf,
        /// Run id stamped into that artifact.
        found: String,
        /// Run id stamped into the pipeline.
        expected: String,
    },

    /// The fitted pipeline rejected its input (e.g. dimension mismatch).
    #[error("model error: {0}")]
    Model(String),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),
}

/// Result type alias for ScamScope operations.
pub type Result<T> = std::result::Result<T, ScamScopeError>;
