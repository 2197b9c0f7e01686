/// Field descriptors and the directive parser working on one field at a time.
use crate::{Error, Result};

/// Lowest schedulable year.
pub(crate) const MIN_YEAR: u16 = 1970;
/// Search horizon; nothing is scheduled past this year.
pub(crate) const MAX_YEAR: u16 = 2099;

/// Static metadata of one positional field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) min: u16,
    pub(crate) max: u16,
    pub(crate) aliases: &'static [(&'static str, u16)],
}

pub(crate) const SECOND: FieldSpec = FieldSpec {
    name: "second",
    min: 0,
    max: 59,
    aliases: &[],
};

pub(crate) const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    aliases: &[],
};

pub(crate) const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    aliases: &[],
};

pub(crate) const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    aliases: &[],
};

pub(crate) const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    aliases: &[
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("may", 5),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
    ],
};

pub(crate) const YEAR: FieldSpec = FieldSpec {
    name: "year",
    min: MIN_YEAR,
    max: MAX_YEAR,
    aliases: &[],
};

/// Parsed atom of one comma-separated fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Directive {
    pub(crate) kind: DirectiveKind,
    pub(crate) first: u16,
    pub(crate) last: u16,
    pub(crate) step: u16,
    pub(crate) sbeg: usize,
    pub(crate) send: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirectiveKind {
    /// `?` - matches anything, marks the field unrestricted.
    None,
    /// Single value.
    One,
    /// Inclusive range with a stride.
    Span,
    /// Whole field range with a stride.
    All,
}

impl Directive {
    pub(crate) fn values(&self) -> impl Iterator<Item = u16> {
        (self.first..=self.last).step_by(usize::from(self.step))
    }
}

/// Decodes a single value token: a number within bounds or a named alias.
pub(crate) fn decode(spec: &FieldSpec, token: &str) -> Option<u16> {
    if token.is_empty() {
        return None;
    }
    if token.bytes().all(|b| b.is_ascii_digit()) {
        let value = token.parse::<u16>().ok()?;
        return (spec.min..=spec.max).contains(&value).then_some(value);
    }
    spec.aliases
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, value)| *value)
}

/// Parses the whole field into a directive list, stopping at the first offence.
pub(crate) fn parse_field(input: &str, spec: &FieldSpec) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();
    let mut offset = 0;
    for fragment in input.split(',') {
        let (sbeg, send) = (offset, offset + fragment.len());
        offset = send + 1;
        directives.push(parse_fragment(input, sbeg, send, spec)?);
    }
    Ok(directives)
}

/// Parses the fragment at `input[sbeg..send]` against the field descriptor.
pub(crate) fn parse_fragment(input: &str, sbeg: usize, send: usize, spec: &FieldSpec) -> Result<Directive> {
    let fragment = &input[sbeg..send];
    let syntax = || Error::Syntax {
        field: spec.name,
        fragment: fragment.to_string(),
    };

    if fragment == "?" {
        return Ok(Directive {
            kind: DirectiveKind::None,
            first: spec.min,
            last: spec.max,
            step: 1,
            sbeg,
            send,
        });
    }

    let (base, step) = match fragment.split_once('/') {
        Some((base, step)) => {
            let step = step.parse::<u16>().ok().filter(|s| *s >= 1).ok_or_else(syntax)?;
            (base, Some(step))
        }
        None => (fragment, None),
    };

    let directive = if base == "*" {
        Directive {
            kind: DirectiveKind::All,
            first: spec.min,
            last: spec.max,
            step: step.unwrap_or(1),
            sbeg,
            send,
        }
    } else if let Some((first, last)) = base.split_once('-') {
        let first = decode(spec, first).ok_or_else(syntax)?;
        let last = decode(spec, last).ok_or_else(syntax)?;
        if first > last {
            return Err(Error::InvertedRange { first, last });
        }
        Directive {
            kind: DirectiveKind::Span,
            first,
            last,
            step: step.unwrap_or(1),
            sbeg,
            send,
        }
    } else {
        let first = decode(spec, base).ok_or_else(syntax)?;
        match step {
            // N/S is shorthand for N-max/S
            Some(step) => Directive {
                kind: DirectiveKind::Span,
                first,
                last: spec.max,
                step,
                sbeg,
                send,
            },
            None => Directive {
                kind: DirectiveKind::One,
                first,
                last: first,
                step: 1,
                sbeg,
                send,
            },
        }
    };

    if directive.step > 1 && directive.step >= directive.last - directive.first + 1 {
        return Err(syntax());
    }

    Ok(directive)
}
