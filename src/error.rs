//! Error type shared by every module of the crate.

use std::path::PathBuf;

/// Result alias defaulting to the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A (dialect, order) pair ended training with no n-grams at all.
    #[error("dialect '{dialect}' has no {order}-grams; every configured dialect needs training data")]
    EmptyTable { dialect: String, order: usize },

    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),

    #[error("n-gram order {0} is not part of the model")]
    UnknownOrder(usize),

    /// Two test rows share the same sentence id.
    #[error("sentence id {0} appears more than once")]
    DuplicateSentence(usize),

    #[error("corpus line {line}: {message}")]
    Corpus { line: usize, message: String },

    #[error("model file '{}' is not usable: {message}", .path.display())]
    Model { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] confy::ConfyError),
}
