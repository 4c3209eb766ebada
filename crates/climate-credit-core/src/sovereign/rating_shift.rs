use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::debug;

use crate::error::ClimateCreditError;
use crate::types::{decimal_from_value, Percent};
use crate::ClimateCreditResult;

/// S&P rating scale, best to worst. A downgrade of `n` notches moves `n`
/// places to the right.
pub const RATING_SCALE: [&str; 18] = [
    "AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-", "BB+", "BB", "BB-", "B+",
    "B", "B-", "C", "CCC",
];

/// Rating assumed for a borrower with no rating.
pub const DEFAULT_RATING: &str = "BB";

/// Position of a rating on [`RATING_SCALE`].
pub fn rating_index(rating: &str) -> Option<usize> {
    RATING_SCALE.iter().position(|r| *r == rating.trim())
}

/// Baseline PD (%) per rating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingPdTable {
    pds: BTreeMap<String, Percent>,
}

impl RatingPdTable {
    pub fn from_json(value: &Value) -> ClimateCreditResult<Self> {
        let table = "overseas_credit";
        let object = value
            .as_object()
            .ok_or_else(|| ClimateCreditError::reference(table, "expected an object keyed by rating"))?;

        let mut pds = BTreeMap::new();
        for (rating, pd) in object {
            let pd = decimal_from_value(pd).ok_or_else(|| {
                ClimateCreditError::reference(table, format!("PD for {} is not a number", rating))
            })?;
            pds.insert(rating.trim().to_string(), pd);
        }
        Ok(RatingPdTable { pds })
    }

    pub fn pd(&self, rating: &str) -> Option<Percent> {
        self.pds.get(rating.trim()).copied()
    }

    fn pd_at(&self, index: usize) -> Option<Percent> {
        RATING_SCALE.get(index).and_then(|r| self.pd(r))
    }

    /// PD after downgrading `rating` by `shift` notches.
    ///
    /// A whole shift reads the PD `shift` places down the scale. A
    /// fractional shift averages the PDs `floor(shift)` and
    /// `floor(shift) + 1` places down. Shifting past the end of the scale,
    /// a negative shift, or a rating absent from the table gives `None`.
    pub fn shifted_pd(&self, rating: &str, shift: Decimal) -> Option<Percent> {
        if self.pd(rating).is_none() {
            debug!(rating, "rating has no PD");
            return None;
        }
        let start = rating_index(rating)?;
        if shift.is_sign_negative() && !shift.is_zero() {
            return None;
        }

        let whole = shift.floor().to_usize()?;
        let lower = start.checked_add(whole)?;
        if shift.fract().is_zero() {
            return self.pd_at(lower);
        }

        let upper = lower.checked_add(1)?;
        let (low_pd, high_pd) = (self.pd_at(lower)?, self.pd_at(upper)?);
        Some((low_pd + high_pd) / dec!(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RatingPdTable {
        let mut pds = serde_json::Map::new();
        for (i, rating) in RATING_SCALE.iter().enumerate() {
            pds.insert(rating.to_string(), json!((i + 1) as f64 * 0.5));
        }
        RatingPdTable::from_json(&Value::Object(pds)).unwrap()
    }

    #[test]
    fn test_zero_shift_returns_stored_value() {
        let t = table();
        assert_eq!(t.shifted_pd("BBB", dec!(0)), t.pd("BBB"));
        assert_eq!(t.shifted_pd("BBB", dec!(0)), Some(dec!(4.5)));
    }

    #[test]
    fn test_whole_notch_shift() {
        let t = table();
        assert_eq!(t.shifted_pd("BBB", dec!(2)), t.pd("BB+"));
        assert_eq!(t.shifted_pd("AAA", dec!(17)), t.pd("CCC"));
    }

    #[test]
    fn test_fractional_shift_is_arithmetic_mean() {
        let t = table();
        let expected = (t.pd("BBB-").unwrap() + t.pd("BB+").unwrap()) / dec!(2);
        assert_eq!(t.shifted_pd("BBB", dec!(1.5)), Some(expected));
        assert_eq!(t.shifted_pd("BBB", dec!(0.5)), Some(dec!(4.75)));
    }

    #[test]
    fn test_shift_past_last_grade_is_none() {
        let t = table();
        assert_eq!(t.shifted_pd("CCC", dec!(1)), None);
        assert_eq!(t.shifted_pd("C", dec!(1)), t.pd("CCC"));
        // the upper neighbour of a fractional shift must also exist
        assert_eq!(t.shifted_pd("C", dec!(0.5)), Some(dec!(8.75)));
        assert_eq!(t.shifted_pd("CCC", dec!(0.5)), None);
        assert_eq!(t.shifted_pd("B-", dec!(25)), None);
    }

    #[test]
    fn test_unknown_or_unpriced_rating_is_none() {
        let t = RatingPdTable::from_json(&json!({ "BBB": 1.2, "Ba2": 3.0 })).unwrap();
        assert_eq!(t.shifted_pd("BBB", dec!(1)), None);
        assert_eq!(t.shifted_pd("Ba2", dec!(0)), None);
        assert_eq!(t.shifted_pd("AA", dec!(0)), None);
        assert_eq!(t.shifted_pd("BBB", dec!(-1)), None);
    }

    #[test]
    fn test_rejects_non_numeric_pd() {
        assert!(RatingPdTable::from_json(&json!({ "AAA": "low" })).is_err());
    }
}
