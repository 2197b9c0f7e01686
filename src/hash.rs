/// Deterministic `H` token substitution.
use crate::{Error, Result};
use twox_hash::XxHash64;

/// Deterministic 64-bit hash of a string: xxHash64 (seed 0) of its UTF-8 bytes.
///
/// Exposed so callers can predict the values substituted for `H` tokens.
pub fn hash_string(input: &str) -> u64 {
    XxHash64::oneshot(0, input.as_bytes())
}

/// Hash configuration collected from parse options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HashSubstitution {
    pub(crate) id: String,
    pub(crate) empty_seconds: bool,
    pub(crate) fields: bool,
}

impl HashSubstitution {
    fn keyed_hash(&self, field: &'static str) -> u64 {
        if self.fields {
            hash_string(&format!("{}:{field}", self.id))
        } else {
            hash_string(&self.id)
        }
    }

    /// Replaces every `H` token of the field with concrete numbers; other
    /// fragments pass through untouched.
    pub(crate) fn rewrite_field(&self, text: &str, field: &'static str, min: u16, max: u16) -> Result<String> {
        let fragments = text
            .split(',')
            .map(|fragment| self.rewrite_fragment(fragment, field, min, max))
            .collect::<Result<Vec<_>>>()?;
        Ok(fragments.join(","))
    }

    fn rewrite_fragment(&self, fragment: &str, field: &'static str, min: u16, max: u16) -> Result<String> {
        let Some(token) = HashToken::parse(fragment) else {
            return Ok(fragment.to_string());
        };
        let hash = self.keyed_hash(field);
        let (lo, hi) = token.range.unwrap_or((min, max));
        if lo > hi {
            return Err(Error::InvertedRange { first: lo, last: hi });
        }
        match token.step {
            None => Ok(in_bounds(hash, lo, hi).to_string()),
            Some(0) => Err(Error::Syntax {
                field,
                fragment: fragment.to_string(),
            }),
            // every `step` units starting at a hashed offset, up to the field end
            Some(step) => Ok(format!("{}-{hi}/{step}", lo + in_bounds(hash, 0, step - 1))),
        }
    }
}

/// Fails when the field carries an `H` token; used when no hash id is configured.
pub(crate) fn reject_hash_tokens(text: &str) -> Result<()> {
    for fragment in text.split(',') {
        if HashToken::parse(fragment).is_some() {
            return Err(Error::HashWithoutId(fragment.to_string()));
        }
    }
    Ok(())
}

/// Maps the hash into `[min, max]`, both inclusive.
///
/// The hash is reinterpreted as a signed 64-bit value before taking the
/// remainder, so the result may need re-normalisation to stay in range.
pub(crate) fn in_bounds(hash: u64, min: u16, max: u16) -> u16 {
    let span = i64::from(max - min + 1);
    let mut value = (hash as i64) % span;
    if value < 0 {
        value += span;
    }
    min + value as u16
}

/// One of `H`, `H/S`, `H(lo-hi)` or `H(lo-hi)/S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HashToken {
    range: Option<(u16, u16)>,
    step: Option<u16>,
}

impl HashToken {
    fn parse(fragment: &str) -> Option<Self> {
        let rest = fragment.strip_prefix('H')?;
        if rest.is_empty() {
            return Some(Self { range: None, step: None });
        }
        let (range, rest) = match rest.strip_prefix('(') {
            Some(inner) => {
                let (inside, rest) = inner.split_once(')')?;
                let (lo, hi) = inside.split_once('-')?;
                (Some((lo.parse().ok()?, hi.parse().ok()?)), rest)
            }
            None => (None, rest),
        };
        let step = match rest {
            "" => None,
            _ => Some(rest.strip_prefix('/')?.parse().ok()?),
        };
        Some(Self { range, step })
    }
}
