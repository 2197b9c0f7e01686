use thiserror::Error;

/// Crate specific Errors implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Error {
    /// Expression-level failure: wrong field count, unknown `@` alias and the like.
    #[error("invalid cron expression: {0}")]
    InvalidExpression(String),
    /// Malformed fragment inside a single field.
    #[error("syntax error in {field} field: '{fragment}'")]
    Syntax {
        /// Canonical name of the offending field.
        field: &'static str,
        /// The comma-separated fragment that failed to parse.
        fragment: String,
    },
    /// Range with inverted bounds.
    #[error("beginning of range ({first}) beyond end of range ({last}): {first}-{last}")]
    InvertedRange {
        /// Start of the range.
        first: u16,
        /// End of the range.
        last: u16,
    },
    /// Dialect name is not recognised.
    #[error("unknown format")]
    UnknownFormat,
    /// `H` token found while no hash identifier was configured.
    #[error("hash requested without using WithHash: {0}")]
    HashWithoutId(String),
}
