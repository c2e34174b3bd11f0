use thiserror::Error;

/// Errors that can occur when loading an instance pool configuration.
///
/// The pool operations themselves never fail with an error - an activation or deactivation that
/// has no legal target is refused by returning `None` instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The configuration text was not valid TOML.
    #[error("configuration is not valid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// The configuration text was valid TOML but one of its fields could not be used.
    #[error("invalid configuration field '{field}': {problem}")]
    InvalidField {
        /// The name of the offending field.
        field: String,

        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for instance pool configuration, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
