//! Scenario-keyed PD conversion tables.
//!
//! A table is built once from its JSON form and queried with one probe per
//! range level. Leaves are either a stored PD percentage or the
//! coefficients of the exponential regression `para_a * exp(para_b * x)`.

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClimateCreditError;
use crate::lookup::range::{RangeExpr, RangeParsing, RangeTable};
use crate::scenario::{Scenario, ScenarioMap};
use crate::types::{decimal_from_value, Percent};
use crate::ClimateCreditResult;

/// Table keyed by one ratio (personal other loans: DBR).
pub type SingleRangeTable = RangeTable<PdParameter>;

/// Table keyed by an outer ratio, then an inner ratio.
pub type NestedRangeTable = RangeTable<RangeTable<PdParameter>>;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Leaf value of a PD conversion table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PdParameter {
    /// PD percentage read directly from the table.
    Probability(Percent),
    /// `para_a * exp(para_b * driver)`.
    Regression { para_a: Decimal, para_b: Decimal },
}

impl PdParameter {
    /// A PD percentage for the given regression driver.
    ///
    /// Direct probabilities ignore the driver. A regression needs one, and
    /// returns `None` when the driver is absent or the exponential
    /// overflows. A negative exponent too large for `Decimal` resolves to
    /// zero.
    pub fn resolve(&self, driver: Option<Decimal>) -> Option<Percent> {
        match *self {
            PdParameter::Probability(pd) => Some(pd),
            PdParameter::Regression { para_a, para_b } => {
                let exponent = para_b.checked_mul(driver?)?;
                match exponent.checked_exp() {
                    Some(growth) => para_a.checked_mul(growth),
                    None if exponent.is_sign_negative() => Some(Decimal::ZERO),
                    None => None,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// One level of a PD conversion table: either a leaf parameter or a range
/// table over a deeper level.
pub trait ParameterLevel: Sized {
    fn from_json(table: &str, value: &Value, parsing: RangeParsing) -> ClimateCreditResult<Self>;

    /// Consume one probe per range level. Returns the leaf once all
    /// probes are used.
    fn query(&self, probes: &[Option<Decimal>]) -> Option<&PdParameter>;
}

impl ParameterLevel for PdParameter {
    fn from_json(table: &str, value: &Value, _parsing: RangeParsing) -> ClimateCreditResult<Self> {
        if let Some(pd) = decimal_from_value(value) {
            return Ok(PdParameter::Probability(pd));
        }
        let coefficient = |name: &str| value.get(name).and_then(decimal_from_value);
        match (coefficient("para_a"), coefficient("para_b")) {
            (Some(para_a), Some(para_b)) => Ok(PdParameter::Regression { para_a, para_b }),
            _ => Err(ClimateCreditError::reference(
                table,
                format!("expected a PD value or para_a/para_b, got {}", value),
            )),
        }
    }

    fn query(&self, probes: &[Option<Decimal>]) -> Option<&PdParameter> {
        probes.is_empty().then_some(self)
    }
}

impl<T: ParameterLevel> ParameterLevel for RangeTable<T> {
    fn from_json(table: &str, value: &Value, parsing: RangeParsing) -> ClimateCreditResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ClimateCreditError::reference(table, "expected an object keyed by ranges")
        })?;

        let mut entries = Vec::with_capacity(object.len());
        for (key, inner) in object {
            let range = RangeExpr::parse_with(key, parsing).map_err(|e| {
                ClimateCreditError::MalformedRange {
                    table: table.to_string(),
                    range: e.range,
                    reason: e.reason,
                }
            })?;
            entries.push((range, T::from_json(table, inner, parsing)?));
        }
        Ok(RangeTable::new(entries))
    }

    fn query(&self, probes: &[Option<Decimal>]) -> Option<&PdParameter> {
        let (probe, rest) = probes.split_first()?;
        self.matches(*probe).find_map(|level| level.query(rest))
    }
}

// ---------------------------------------------------------------------------
// Scenario and segment tables
// ---------------------------------------------------------------------------

/// Scenario label -> range levels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable<L> {
    scenarios: ScenarioMap<L>,
}

impl<L: ParameterLevel> ScenarioTable<L> {
    /// Build from `{scenario label: range table}`. Labels that are not one
    /// of the eight scenarios are skipped with a warning.
    pub fn from_json(table: &str, value: &Value, parsing: RangeParsing) -> ClimateCreditResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ClimateCreditError::reference(table, "expected an object keyed by scenario")
        })?;

        let mut scenarios = ScenarioMap::new();
        for (label, levels) in object {
            match Scenario::from_label(label) {
                Some(scenario) => {
                    scenarios.insert(scenario, L::from_json(table, levels, parsing)?);
                }
                None => warn!(table, label = label.as_str(), "skipping unknown scenario"),
            }
        }
        Ok(ScenarioTable { scenarios })
    }

    pub fn get(&self, scenario: Scenario) -> Option<&L> {
        self.scenarios.get(&scenario)
    }

    pub fn query(&self, scenario: Scenario, probes: &[Option<Decimal>]) -> Option<&PdParameter> {
        self.get(scenario)?.query(probes)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        self.scenarios.keys().copied()
    }
}

impl<L> Default for ScenarioTable<L> {
    fn default() -> Self {
        ScenarioTable {
            scenarios: BTreeMap::new(),
        }
    }
}

/// Segment (sector code, loan section) -> scenario -> range levels.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParameterTable<L> {
    segments: BTreeMap<String, ScenarioTable<L>>,
}

impl<L: ParameterLevel> RiskParameterTable<L> {
    pub fn from_json(table: &str, value: &Value, parsing: RangeParsing) -> ClimateCreditResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ClimateCreditError::reference(table, "expected an object keyed by segment")
        })?;

        let mut segments = BTreeMap::new();
        for (segment, scenarios) in object {
            segments.insert(
                segment.clone(),
                ScenarioTable::from_json(table, scenarios, parsing)?,
            );
        }
        Ok(RiskParameterTable { segments })
    }

    /// Look up segment and scenario, then scan the range levels.
    /// Absent when the segment, the scenario or any range level misses.
    pub fn query(
        &self,
        segment: &str,
        scenario: Scenario,
        probes: &[Option<Decimal>],
    ) -> Option<&PdParameter> {
        let Some(table) = self.segments.get(segment) else {
            debug!(segment, "no PD table for segment");
            return None;
        };
        table.query(scenario, probes)
    }

    pub fn segment(&self, segment: &str) -> Option<&ScenarioTable<L>> {
        self.segments.get(segment)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(String::as_str)
    }
}

impl<L> Default for RiskParameterTable<L> {
    fn default() -> Self {
        RiskParameterTable {
            segments: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
