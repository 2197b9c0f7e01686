/// Selectable interpretation of the day-of-week field.
use crate::{field::FieldSpec, Error};
use std::{fmt::Display, str::FromStr};

/// Supported cron dialects. The dialect only affects day-of-week parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    /// Day of week uses 0-6 with Sunday = 0; 7 is accepted as a synonym for Sunday.
    #[default]
    Standard,
    /// Day of week uses 1-7 with Sunday = 1 and Saturday = 7.
    Alternative,
}

const DOW_STANDARD: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    aliases: &[
        ("sun", 0),
        ("mon", 1),
        ("tue", 2),
        ("wed", 3),
        ("thu", 4),
        ("fri", 5),
        ("sat", 6),
        ("sunday", 0),
        ("monday", 1),
        ("tuesday", 2),
        ("wednesday", 3),
        ("thursday", 4),
        ("friday", 5),
        ("saturday", 6),
    ],
};

const DOW_ALTERNATIVE: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 1,
    max: 7,
    aliases: &[
        ("sun", 1),
        ("mon", 2),
        ("tue", 3),
        ("wed", 4),
        ("thu", 5),
        ("fri", 6),
        ("sat", 7),
        ("sunday", 1),
        ("monday", 2),
        ("tuesday", 3),
        ("wednesday", 4),
        ("thursday", 5),
        ("friday", 6),
        ("saturday", 7),
    ],
};

impl Dialect {
    pub(crate) fn dow_spec(&self) -> &'static FieldSpec {
        match self {
            Self::Standard => &DOW_STANDARD,
            Self::Alternative => &DOW_ALTERNATIVE,
        }
    }

    /// Bounds used when substituting an `H` token in the day-of-week field.
    pub(crate) fn dow_hash_bounds(&self) -> (u16, u16) {
        match self {
            Self::Standard => (0, 6),
            Self::Alternative => (1, 7),
        }
    }

    /// Maps an accepted day-of-week value onto the canonical 0-6, Sunday = 0.
    pub(crate) fn remap_dow(&self, value: u16) -> u16 {
        match self {
            Self::Standard => value % 7,
            Self::Alternative => (value + 6) % 7,
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Alternative => write!(f, "alternative"),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "alternative" => Ok(Self::Alternative),
            _ => Err(Error::UnknownFormat),
        }
    }
}
