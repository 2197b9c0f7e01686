/// Parse-time options and their priority-ordered application.
use crate::hash::HashSubstitution;

/// Options accepted by [`parse_for_dialect`](crate::parse_for_dialect).
///
/// Options are applied in ascending priority order, so enabling hashing
/// always happens before the options refining it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseOption {
    /// Enables `H` substitution keyed on the given identifier.
    Hash(String),
    /// Treats a missing or literal `0` seconds field as `H`.
    /// Silently does nothing unless [`ParseOption::Hash`] is present.
    HashEmptySeconds,
    /// Qualifies the hash with the field name, de-correlating `H` tokens
    /// across fields that share the same range.
    HashFields,
}

impl ParseOption {
    fn priority(&self) -> u8 {
        match self {
            Self::Hash(_) => 0,
            Self::HashEmptySeconds | Self::HashFields => 10,
        }
    }
}

/// Aggregated parse configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParseConfig {
    pub(crate) hash: Option<HashSubstitution>,
}

impl ParseConfig {
    pub(crate) fn from_options(options: &[ParseOption]) -> Self {
        let mut sorted: Vec<&ParseOption> = options.iter().collect();
        sorted.sort_by_key(|option| option.priority());

        let mut config = Self::default();
        for option in sorted {
            match option {
                ParseOption::Hash(id) => {
                    config.hash = Some(HashSubstitution {
                        id: id.clone(),
                        empty_seconds: false,
                        fields: false,
                    });
                }
                ParseOption::HashEmptySeconds => {
                    if let Some(hash) = &mut config.hash {
                        hash.empty_seconds = true;
                    }
                }
                ParseOption::HashFields => {
                    if let Some(hash) = &mut config.hash {
                        hash.fields = true;
                    }
                }
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_applies_first_regardless_of_position() {
        let config = ParseConfig::from_options(&[
            ParseOption::HashFields,
            ParseOption::HashEmptySeconds,
            ParseOption::Hash("myid1".to_string()),
        ]);
        let hash = config.hash.unwrap();
        assert_eq!(hash.id, "myid1");
        assert!(hash.empty_seconds);
        assert!(hash.fields);
    }

    #[test]
    fn refinements_without_hash_are_noop() {
        let config = ParseConfig::from_options(&[ParseOption::HashEmptySeconds, ParseOption::HashFields]);
        assert!(config.hash.is_none());
    }

    #[test]
    fn no_options() {
        assert_eq!(ParseConfig::from_options(&[]), ParseConfig::default());
    }
}
