//! Cron expression compiler with dialects, deterministic hash substitution
//! and a DST-aware next-occurrence search.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//!
//! let expression = cronex::parse("0 0 * * 6#5")?; // fifth Saturday of the month
//! let from = "2013-09-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
//! let next = expression.next(&from).unwrap();
//! assert_eq!(next.to_rfc3339(), "2013-11-30T00:00:00+00:00");
//! # Ok::<(), cronex::Error>(())
//! ```
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dialect;
/// Crate specific Errors implementation.
pub mod error;
mod expression;
mod field;
mod hash;
mod options;
mod search;
mod utils;

pub use dialect::Dialect;
pub use error::Error;
pub use expression::{must_parse, parse, parse_for_dialect, Expression, ExpressionIterator};
pub use hash::hash_string;
pub use options::ParseOption;

/// Convenient alias for `Result`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
