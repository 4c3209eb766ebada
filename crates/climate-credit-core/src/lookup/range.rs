//! Interval predicates written as strings in the PD conversion tables.
//!
//! Keys such as `">=0.5"`, `"<0.2 or =0.3"` and `"None"` are parsed once
//! at load time into [`RangeExpr`]. A [`RangeTable`] keeps its entries in
//! descending [`SortKey`] order and returns the first entry whose range
//! contains the probe, so narrower or higher thresholds must sort first.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use crate::types::parse_decimal;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Comparison operator of a range atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
}

impl Comparison {
    fn holds(self, value: Decimal, threshold: Decimal) -> bool {
        match self {
            Comparison::Ge => value >= threshold,
            Comparison::Gt => value > threshold,
            Comparison::Le => value <= threshold,
            Comparison::Lt => value < threshold,
            Comparison::Eq => value == threshold,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Comparison::Ge => ">=",
            Comparison::Gt => ">",
            Comparison::Le => "<=",
            Comparison::Lt => "<",
            Comparison::Eq => "=",
        }
    }
}

/// A parsed range key.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeExpr {
    /// `>=x`, `>x`, `<=x`, `<x`, `=x`, or a bare number (equality).
    Compare { op: Comparison, threshold: Decimal },
    /// Parts joined with `" or "`.
    Any(Vec<RangeExpr>),
    /// The literal `"None"`: matches only an absent probe.
    Unbounded,
    /// An unparsable key kept by a leniently loaded table. Never matches.
    Label(String),
}

/// Ordering key for range scans. Tables scan in descending key order.
///
/// Variant order matters: labels sort below every numeric key and the
/// unbounded sentinel above all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Label,
    Finite(Decimal),
    Unbounded,
}

/// How a table treats range keys that fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeParsing {
    /// A malformed key is an error.
    #[default]
    Strict,
    /// A malformed key becomes a [`RangeExpr::Label`] scanned after all
    /// numeric ranges.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse range '{range}': {reason}")]
pub struct RangeParseError {
    pub range: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// RangeExpr
// ---------------------------------------------------------------------------

impl RangeExpr {
    /// Parse a key, falling back to a label when `parsing` is lenient.
    pub fn parse_with(text: &str, parsing: RangeParsing) -> Result<RangeExpr, RangeParseError> {
        match (text.parse::<RangeExpr>(), parsing) {
            (Ok(expr), _) => Ok(expr),
            (Err(e), RangeParsing::Strict) => Err(e),
            (Err(e), RangeParsing::Lenient) => {
                warn!(range = text, reason = %e.reason, "keeping unparsable range as a label");
                Ok(RangeExpr::Label(text.to_string()))
            }
        }
    }

    /// Whether `probe` falls inside this range. `None` is an absent value.
    pub fn contains(&self, probe: Option<Decimal>) -> bool {
        match self {
            RangeExpr::Compare { op, threshold } => {
                probe.is_some_and(|value| op.holds(value, *threshold))
            }
            RangeExpr::Any(parts) => parts.iter().any(|part| part.contains(probe)),
            RangeExpr::Unbounded => probe.is_none(),
            RangeExpr::Label(_) => false,
        }
    }

    /// `>=`, `>` and `=` sort by their threshold, `<=` and `<` by the
    /// negated threshold, a disjunction by the largest key of its parts.
    pub fn sort_key(&self) -> SortKey {
        match self {
            RangeExpr::Compare { op, threshold } => match op {
                Comparison::Ge | Comparison::Gt | Comparison::Eq => SortKey::Finite(*threshold),
                Comparison::Le | Comparison::Lt => SortKey::Finite(-*threshold),
            },
            RangeExpr::Any(parts) => parts
                .iter()
                .map(RangeExpr::sort_key)
                .max()
                .unwrap_or(SortKey::Label),
            RangeExpr::Unbounded => SortKey::Unbounded,
            RangeExpr::Label(_) => SortKey::Label,
        }
    }
}

impl FromStr for RangeExpr {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let error = |reason: &str| RangeParseError {
            range: s.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(error("empty range"));
        }

        if text.contains(" or ") {
            let parts = text
                .split(" or ")
                .map(RangeExpr::from_str)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| error(&e.reason))?;
            return Ok(RangeExpr::Any(parts));
        }

        if text == "None" {
            return Ok(RangeExpr::Unbounded);
        }

        let (op, rest) = if let Some(rest) = text.strip_prefix(">=") {
            (Comparison::Ge, rest)
        } else if let Some(rest) = text.strip_prefix('>') {
            (Comparison::Gt, rest)
        } else if let Some(rest) = text.strip_prefix("<=") {
            (Comparison::Le, rest)
        } else if let Some(rest) = text.strip_prefix('<') {
            (Comparison::Lt, rest)
        } else if let Some(rest) = text.strip_prefix('=') {
            (Comparison::Eq, rest)
        } else {
            (Comparison::Eq, text)
        };

        let threshold = parse_decimal(rest).ok_or_else(|| error("threshold is not a number"))?;
        Ok(RangeExpr::Compare { op, threshold })
    }
}

impl fmt::Display for RangeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeExpr::Compare { op, threshold } => write!(f, "{}{}", op.symbol(), threshold),
            RangeExpr::Any(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            RangeExpr::Unbounded => f.write_str("None"),
            RangeExpr::Label(label) => f.write_str(label),
        }
    }
}

// ---------------------------------------------------------------------------
// RangeTable
// ---------------------------------------------------------------------------

/// One level of a lookup table: ranges in scan order, each with a value.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTable<T> {
    entries: Vec<(RangeExpr, T)>,
}

impl<T> RangeTable<T> {
    /// Build a table, sorting entries by descending key. The sort is
    /// stable: entries with equal keys keep their input order.
    pub fn new(mut entries: Vec<(RangeExpr, T)>) -> Self {
        entries.sort_by(|(a, _), (b, _)| b.sort_key().cmp(&a.sort_key()));
        RangeTable { entries }
    }

    /// First entry, in scan order, whose range contains `probe`.
    pub fn find(&self, probe: Option<Decimal>) -> Option<&T> {
        self.entries
            .iter()
            .find(|(range, _)| range.contains(probe))
            .map(|(_, value)| value)
    }

    /// Every entry containing `probe`, in scan order. Nested lookups fall
    /// through to the next containing range when an inner level misses.
    pub fn matches(&self, probe: Option<Decimal>) -> impl Iterator<Item = &T> {
        self.entries
            .iter()
            .filter(move |(range, _)| range.contains(probe))
            .map(|(_, value)| value)
    }

    /// Like [`RangeTable::find`] but also returns the matching range.
    pub fn find_entry(&self, probe: Option<Decimal>) -> Option<(&RangeExpr, &T)> {
        self.entries
            .iter()
            .find(|(range, _)| range.contains(probe))
            .map(|(range, value)| (range, value))
    }

    /// Ranges in scan order.
    pub fn ranges(&self) -> impl Iterator<Item = &RangeExpr> {
        self.entries.iter().map(|(range, _)| range)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
