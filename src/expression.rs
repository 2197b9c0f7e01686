use crate::{
    dialect::Dialect,
    field::{self, DirectiveKind, FieldSpec},
    hash,
    options::{ParseConfig, ParseOption},
    search, utils, Error, Result,
};
use chrono::{DateTime, TimeZone};
use std::{collections::BTreeSet, fmt::Display, str::FromStr};

/// Compiles a cron expression with the standard dialect and no hash substitution.
///
/// Accepts five, six or seven whitespace-separated fields as well as the
/// `@yearly`, `@annually`, `@monthly`, `@weekly`, `@daily`, `@midnight` and
/// `@hourly` shortcuts. A five-field expression gets `0` seconds and a `*`
/// year; a six-field expression is disambiguated by its trailing field: a
/// purely numeric field within 1970-2099 is taken as the year, anything else
/// makes the expression seconds-led.
///
/// # Examples
/// ```rust
/// use chrono::{DateTime, Utc};
///
/// let expression = cronex::parse("0 30 9 * * MON-FRI")?;
/// let from = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
/// let next = expression.next(&from).unwrap();
/// assert_eq!(next.to_rfc3339(), "2024-01-01T09:30:00+00:00");
/// # Ok::<(), cronex::Error>(())
/// ```
pub fn parse(expression: &str) -> Result<Expression> {
    parse_for_dialect(Dialect::Standard, expression, &[])
}

/// Compiles a cron expression for the given dialect, applying parse options
/// in ascending priority order.
///
/// # Examples
/// ```rust
/// use chrono::{DateTime, Utc};
/// use cronex::{Dialect, ParseOption};
///
/// let expression = cronex::parse_for_dialect(
///     Dialect::Standard,
///     "0 H H ? * * *",
///     &[ParseOption::Hash("myid1".to_string())],
/// )?;
/// let from = "2021-09-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
/// let next = expression.next(&from).unwrap();
/// assert_eq!(next.to_rfc3339(), "2021-09-01T11:59:00+00:00");
/// # Ok::<(), cronex::Error>(())
/// ```
pub fn parse_for_dialect(dialect: Dialect, expression: &str, options: &[ParseOption]) -> Result<Expression> {
    Expression::compile(dialect, expression, &ParseConfig::from_options(options))
}

/// Like [`parse`] but panics on malformed input.
pub fn must_parse(expression: &str) -> Expression {
    match parse(expression) {
        Ok(expression) => expression,
        Err(error) => panic!("{error}"),
    }
}

/// A compiled cron expression.
///
/// Immutable once built; querying it from any number of threads is safe.
///
/// | Field        | Required | Allowed values  | Allowed special characters |
/// | ------------ | -------- | --------------- | -------------------------- |
/// | Seconds      | No       | 0-59            | * , - / H                  |
/// | Minutes      | Yes      | 0-59            | * , - / H                  |
/// | Hours        | Yes      | 0-23            | * , - / H                  |
/// | Day of month | Yes      | 1-31            | * , - / ? L W H            |
/// | Month        | Yes      | 1-12 or JAN-DEC | * , - / H                  |
/// | Day of week  | Yes      | 0-7 or SUN-SAT  | * , - / ? L # H            |
/// | Year         | No       | 1970-2099       | * , - / H                  |
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expression {
    expression: String,
    pub(crate) seconds: Vec<u16>,
    pub(crate) minutes: Vec<u16>,
    pub(crate) hours: Vec<u16>,
    pub(crate) days_of_month: Vec<u16>,
    pub(crate) months: Vec<u16>,
    pub(crate) days_of_week: Vec<u16>,
    pub(crate) years: Vec<u16>,
    pub(crate) last_day_of_month: bool,
    pub(crate) workdays_of_month: Vec<u16>,
    pub(crate) last_workday_of_month: bool,
    pub(crate) last_week_days_of_week: Vec<u16>,
    pub(crate) specific_week_days_of_week: Vec<(u16, u16)>,
    pub(crate) days_of_month_restricted: bool,
    pub(crate) days_of_week_restricted: bool,
}

impl Expression {
    fn compile(dialect: Dialect, expression: &str, config: &ParseConfig) -> Result<Self> {
        let mut fields = normalize(expression)?;
        let dow_spec = dialect.dow_spec();

        if let Some(hash) = &config.hash {
            if hash.empty_seconds && fields[0] == "0" {
                fields[0] = "H".to_string();
            }
            let (dow_lo, dow_hi) = dialect.dow_hash_bounds();
            let bounds = [
                (field::SECOND.name, field::SECOND.min, field::SECOND.max),
                (field::MINUTE.name, field::MINUTE.min, field::MINUTE.max),
                (field::HOUR.name, field::HOUR.min, field::HOUR.max),
                (field::DAY_OF_MONTH.name, field::DAY_OF_MONTH.min, field::DAY_OF_MONTH.max),
                (field::MONTH.name, field::MONTH.min, field::MONTH.max),
                (dow_spec.name, dow_lo, dow_hi),
                (field::YEAR.name, field::YEAR.min, field::YEAR.max),
            ];
            for (text, (name, min, max)) in fields.iter_mut().zip(bounds) {
                *text = hash.rewrite_field(text, name, min, max)?;
            }
        } else {
            for text in &fields {
                hash::reject_hash_tokens(text)?;
            }
        }

        // `? ?` across the day pair is equivalent to `* ?`
        if fields[3] == "?" && fields[5] == "?" {
            fields[3] = "*".to_string();
        }

        let seconds = compile_part(&fields[0], &field::SECOND)?;
        let minutes = compile_part(&fields[1], &field::MINUTE)?;
        let hours = compile_part(&fields[2], &field::HOUR)?;
        let dom = compile_dom(&fields[3])?;
        let months = compile_part(&fields[4], &field::MONTH)?;
        let dow = compile_dow(&fields[5], dialect)?;
        let years = compile_part(&fields[6], &field::YEAR)?;

        Ok(Self {
            expression: expression.to_string(),
            seconds,
            minutes,
            hours,
            days_of_month: dom.days,
            months,
            days_of_week: dow.days,
            years,
            last_day_of_month: dom.last_day,
            workdays_of_month: dom.workdays,
            last_workday_of_month: dom.last_workday,
            last_week_days_of_week: dow.last,
            specific_week_days_of_week: dow.nth,
            days_of_month_restricted: dom.restricted,
            days_of_week_restricted: dow.restricted,
        })
    }

    /// Returns the next scheduled instant strictly after `from`, in `from`'s
    /// time zone, or `None` when nothing is scheduled before the end of 2099.
    pub fn next<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        search::next_after(self, from)
    }

    /// Returns up to `n` successive instants after `from`, each one computed
    /// from its predecessor; shorter than `n` when the horizon is reached.
    pub fn next_n<Tz: TimeZone>(&self, from: &DateTime<Tz>, n: usize) -> Vec<DateTime<Tz>> {
        self.iter(from).take(n).collect()
    }

    /// Iterator over successive scheduled instants after `from`.
    pub fn iter<Tz: TimeZone>(&self, from: &DateTime<Tz>) -> ExpressionIterator<Tz> {
        self.clone().into_iter(from)
    }

    /// The same as [`Expression::iter`] but consumes the expression.
    pub fn into_iter<Tz: TimeZone>(self, from: &DateTime<Tz>) -> ExpressionIterator<Tz> {
        let next = self.next(from);
        ExpressionIterator { expression: self, next }
    }

    /// Candidate days for the given month, combining day-of-month and
    /// day-of-week rules. An unrestricted field imposes nothing; when both
    /// are restricted a day passes if either side selects it.
    pub(crate) fn days_in(&self, year: u16, month: u16) -> Vec<u16> {
        let length = utils::days_in_month(year, month);
        if !self.days_of_month_restricted && !self.days_of_week_restricted {
            return (1..=length).collect();
        }

        let mut days = BTreeSet::new();
        if self.days_of_month_restricted {
            days.extend(self.days_of_month.iter().copied().filter(|day| *day <= length));
            if self.last_day_of_month {
                days.insert(length);
            }
            if self.last_workday_of_month {
                days.insert(utils::nearest_weekday(year, month, length));
            }
            for &day in &self.workdays_of_month {
                if day <= length {
                    days.insert(utils::nearest_weekday(year, month, day));
                }
            }
        }
        if self.days_of_week_restricted {
            for day in 1..=length {
                if self.days_of_week.binary_search(&utils::day_of_week(year, month, day)).is_ok() {
                    days.insert(day);
                }
            }
            for &dow in &self.last_week_days_of_week {
                days.insert(utils::last_dow(year, month, dow));
            }
            for &(dow, nth) in &self.specific_week_days_of_week {
                if let Some(day) = utils::nth_dow(year, month, dow, nth) {
                    days.insert(day);
                }
            }
        }
        days.into_iter().collect()
    }
}

/// Iterator of successive scheduled instants, created by
/// [`Expression::iter`] or [`Expression::into_iter`].
#[derive(Debug, Clone)]
pub struct ExpressionIterator<Tz: TimeZone> {
    expression: Expression,
    next: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> Iterator for ExpressionIterator<Tz> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.expression.next(&current);
        Some(current)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl FromStr for Expression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl TryFrom<&str> for Expression {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        parse(value)
    }
}

impl TryFrom<String> for Expression {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        parse(&value)
    }
}

const EXPRESSION_ALIASES: &[(&str, &str)] = &[
    ("@yearly", "0 0 0 1 1 * *"),
    ("@annually", "0 0 0 1 1 * *"),
    ("@monthly", "0 0 0 1 * * *"),
    ("@weekly", "0 0 0 * * 0 *"),
    ("@daily", "0 0 0 * * * *"),
    ("@midnight", "0 0 0 * * * *"),
    ("@hourly", "0 0 * * * * *"),
];

/// Expands aliases and brings the expression to the canonical seven fields.
fn normalize(expression: &str) -> Result<Vec<String>> {
    let mut parts: Vec<String> = expression.split_whitespace().map(str::to_string).collect();

    if parts.first().is_some_and(|first| first.starts_with('@')) {
        if parts.len() > 1 {
            return Err(Error::InvalidExpression(expression.to_string()));
        }
        let (_, expanded) = EXPRESSION_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(&parts[0]))
            .ok_or_else(|| Error::InvalidExpression(expression.to_string()))?;
        parts = expanded.split_whitespace().map(str::to_string).collect();
    }

    match parts.len() {
        5 => {
            parts.insert(0, "0".to_string());
            parts.push("*".to_string());
        }
        6 => {
            // the six-field form is ambiguous; a trailing year decides
            if looks_like_year(&parts[5]) {
                parts.insert(0, "0".to_string());
            } else {
                parts.push("*".to_string());
            }
        }
        7 => {}
        _ => return Err(Error::InvalidExpression(expression.to_string())),
    }

    Ok(parts)
}

fn looks_like_year(text: &str) -> bool {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit() || matches!(b, b',' | b'-' | b'/')) {
        return false;
    }
    text.split(',').all(|chunk| {
        let (range, step) = chunk.split_once('/').unwrap_or((chunk, "1"));
        step.parse::<u16>().is_ok_and(|step| step >= 1)
            && range
                .split('-')
                .all(|value| value.parse::<u16>().is_ok_and(|year| (field::MIN_YEAR..=field::MAX_YEAR).contains(&year)))
    })
}

/// Compiles a plain set field (second, minute, hour, month, year).
pub(crate) fn compile_part(text: &str, spec: &FieldSpec) -> Result<Vec<u16>> {
    let mut values = BTreeSet::new();
    for directive in field::parse_field(text, spec)? {
        match directive.kind {
            DirectiveKind::None => {
                return Err(Error::Syntax {
                    field: spec.name,
                    fragment: "?".to_string(),
                })
            }
            _ => values.extend(directive.values()),
        }
    }
    Ok(values.into_iter().collect())
}

struct DayOfMonthRules {
    days: Vec<u16>,
    last_day: bool,
    workdays: Vec<u16>,
    last_workday: bool,
    restricted: bool,
}

fn compile_dom(text: &str) -> Result<DayOfMonthRules> {
    let spec = &field::DAY_OF_MONTH;
    if text == "*" || text == "?" {
        return Ok(DayOfMonthRules {
            days: (spec.min..=spec.max).collect(),
            last_day: false,
            workdays: Vec::new(),
            last_workday: false,
            restricted: false,
        });
    }

    let syntax = |fragment: &str| Error::Syntax {
        field: spec.name,
        fragment: fragment.to_string(),
    };
    let mut days = BTreeSet::new();
    let mut workdays = BTreeSet::new();
    let mut last_day = false;
    let mut last_workday = false;
    let mut restricted = true;
    let mut offset = 0;

    for fragment in text.split(',') {
        let (sbeg, send) = (offset, offset + fragment.len());
        offset = send + 1;
        match fragment {
            "L" => last_day = true,
            "LW" => last_workday = true,
            _ if fragment.ends_with('W') => {
                let day = field::decode(spec, &fragment[..fragment.len() - 1]).ok_or_else(|| syntax(fragment))?;
                workdays.insert(day);
            }
            _ => {
                let directive = field::parse_fragment(text, sbeg, send, spec)?;
                match directive.kind {
                    // `?` must stand alone
                    DirectiveKind::None => return Err(syntax(fragment)),
                    DirectiveKind::All if directive.step == 1 => {
                        restricted = false;
                        days.extend(directive.values());
                    }
                    _ => days.extend(directive.values()),
                }
            }
        }
    }

    Ok(DayOfMonthRules {
        days: days.into_iter().collect(),
        last_day,
        workdays: workdays.into_iter().collect(),
        last_workday,
        restricted,
    })
}

struct DayOfWeekRules {
    days: Vec<u16>,
    last: Vec<u16>,
    nth: Vec<(u16, u16)>,
    restricted: bool,
}

fn compile_dow(text: &str, dialect: Dialect) -> Result<DayOfWeekRules> {
    let spec = dialect.dow_spec();
    if text == "*" || text == "?" {
        return Ok(DayOfWeekRules {
            days: (0..=6).collect(),
            last: Vec::new(),
            nth: Vec::new(),
            restricted: false,
        });
    }

    let syntax = |fragment: &str| Error::Syntax {
        field: spec.name,
        fragment: fragment.to_string(),
    };
    let mut days = BTreeSet::new();
    let mut last = BTreeSet::new();
    let mut nth = BTreeSet::new();
    let mut restricted = true;
    let mut offset = 0;

    for fragment in text.split(',') {
        let (sbeg, send) = (offset, offset + fragment.len());
        offset = send + 1;
        if let Some(prefix) = fragment.strip_suffix('L') {
            let value = if prefix.is_empty() {
                // bare `L` is the last day of the week
                field::decode(spec, "sat").ok_or_else(|| syntax(fragment))?
            } else {
                field::decode(spec, prefix).ok_or_else(|| syntax(fragment))?
            };
            last.insert(dialect.remap_dow(value));
        } else if let Some((day, count)) = fragment.split_once('#') {
            let value = field::decode(spec, day).ok_or_else(|| syntax(fragment))?;
            let count = count
                .parse::<u16>()
                .ok()
                .filter(|count| (1..=5).contains(count))
                .ok_or_else(|| syntax(fragment))?;
            nth.insert((dialect.remap_dow(value), count));
        } else {
            let directive = field::parse_fragment(text, sbeg, send, spec)?;
            match directive.kind {
                // `?` must stand alone
                DirectiveKind::None => return Err(syntax(fragment)),
                DirectiveKind::All if directive.step == 1 => {
                    restricted = false;
                    days.extend(directive.values().map(|value| dialect.remap_dow(value)));
                }
                _ => days.extend(directive.values().map(|value| dialect.remap_dow(value))),
            }
        }
    }

    Ok(DayOfWeekRules {
        days: days.into_iter().collect(),
        last: last.into_iter().collect(),
        nth: nth.into_iter().collect(),
        restricted,
    })
}
