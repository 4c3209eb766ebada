//! Region -> scenario risk level -> loss percentage.
//!
//! Two tables form the chain: region records give a risk level per
//! scenario for a city and district, and risk-level records give the loss
//! percentage per scenario for that level. The chain is used for
//! collateral devaluation and for the physical share of revenue loss.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ClimateCreditError;
use crate::scenario::{Scenario, ScenarioMap};
use crate::types::{decimal_from_value, Money, Percent};
use crate::ClimateCreditResult;

const CITY_KEY: &str = "縣市";
const DISTRICT_KEY: &str = "鄉鎮市區";
const RISK_LEVEL_KEY: &str = "風險等級";

/// Replace the legacy glyph 台 with 臺 so both spellings of a place name
/// resolve to the same record.
pub fn standardize_city_name(name: &str) -> String {
    name.trim().replace('台', "臺")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Risk level per scenario for one city and district.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub city: String,
    pub district: String,
    pub risk_levels: ScenarioMap<Decimal>,
}

/// Loss percentage per scenario for one risk level.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLevelRecord {
    pub level: Decimal,
    pub loss_percentages: ScenarioMap<Percent>,
}

fn records<'a>(table: &str, value: &'a Value) -> ClimateCreditResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| ClimateCreditError::reference(table, "expected a list of records"))
}

fn text_field(table: &str, record: &Map<String, Value>, key: &str) -> ClimateCreditResult<String> {
    match record.get(key) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ClimateCreditError::reference(
            table,
            format!("record is missing '{}'", key),
        )),
    }
}

/// Scenario-labelled numeric fields of a record. Other keys are ignored.
fn scenario_values(record: &Map<String, Value>) -> ScenarioMap<Decimal> {
    record
        .iter()
        .filter_map(|(key, value)| {
            let scenario = Scenario::from_label(key)?;
            decimal_from_value(value).map(|v| (scenario, v))
        })
        .collect()
}

impl RegionRecord {
    fn from_json(table: &str, value: &Value) -> ClimateCreditResult<Self> {
        let record = value
            .as_object()
            .ok_or_else(|| ClimateCreditError::reference(table, "region record is not an object"))?;
        Ok(RegionRecord {
            city: standardize_city_name(&text_field(table, record, CITY_KEY)?),
            district: text_field(table, record, DISTRICT_KEY)?,
            risk_levels: scenario_values(record),
        })
    }
}

impl RiskLevelRecord {
    fn from_json(table: &str, value: &Value) -> ClimateCreditResult<Self> {
        let record = value.as_object().ok_or_else(|| {
            ClimateCreditError::reference(table, "risk level record is not an object")
        })?;
        let level = record
            .get(RISK_LEVEL_KEY)
            .and_then(decimal_from_value)
            .ok_or_else(|| {
                ClimateCreditError::reference(table, format!("record is missing '{}'", RISK_LEVEL_KEY))
            })?;
        Ok(RiskLevelRecord {
            level,
            loss_percentages: scenario_values(record),
        })
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Risk level -> loss percentage per scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskLevelTable {
    records: Vec<RiskLevelRecord>,
}

impl RiskLevelTable {
    pub fn from_json(table: &str, value: &Value) -> ClimateCreditResult<Self> {
        let records = records(table, value)?
            .iter()
            .map(|r| RiskLevelRecord::from_json(table, r))
            .collect::<ClimateCreditResult<Vec<_>>>()?;
        Ok(RiskLevelTable { records })
    }

    /// First record with exactly this risk level.
    pub fn level(&self, level: Decimal) -> Option<&RiskLevelRecord> {
        self.records.iter().find(|r| r.level == level)
    }

    /// Loss percentage of `scenario` at `level`.
    pub fn loss_percentage(&self, level: Decimal, scenario: Scenario) -> Option<Percent> {
        self.level(level)?.loss_percentages.get(&scenario).copied()
    }
}

/// Region table chained to its risk-level table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionalLossTable {
    regions: Vec<RegionRecord>,
    levels: RiskLevelTable,
    standardize_district: bool,
}

impl RegionalLossTable {
    /// `standardize_district` also applies the glyph normalisation to the
    /// district name before matching.
    pub fn from_json(
        table: &str,
        regions: &Value,
        levels: &Value,
        standardize_district: bool,
    ) -> ClimateCreditResult<Self> {
        let mut parsed = Vec::new();
        for record in records(table, regions)? {
            let mut region = RegionRecord::from_json(table, record)?;
            if standardize_district {
                region.district = standardize_city_name(&region.district);
            }
            parsed.push(region);
        }
        Ok(RegionalLossTable {
            regions: parsed,
            levels: RiskLevelTable::from_json(table, levels)?,
            standardize_district,
        })
    }

    /// Exact city and district match after name standardisation.
    pub fn region(&self, city: &str, district: &str) -> Option<&RegionRecord> {
        let city = standardize_city_name(city);
        let district = if self.standardize_district {
            standardize_city_name(district)
        } else {
            district.trim().to_string()
        };
        self.regions
            .iter()
            .find(|r| r.city == city && r.district == district)
    }

    /// Loss percentage per stressed scenario for a region. `None` when the
    /// region is unknown; scenarios missing from either table are omitted.
    pub fn loss_percentages(&self, city: &str, district: &str) -> Option<ScenarioMap<Percent>> {
        let Some(region) = self.region(city, district) else {
            debug!(city, district, "no regional risk record");
            return None;
        };

        Some(
            Scenario::STRESSED
                .into_iter()
                .filter_map(|scenario| {
                    let level = *region.risk_levels.get(&scenario)?;
                    self.levels
                        .loss_percentage(level, scenario)
                        .map(|pct| (scenario, pct))
                })
                .collect(),
        )
    }

    /// `base * (1 - loss/100)` per stressed scenario. Empty when the region
    /// is unknown; partial when some scenarios have no data.
    pub fn stressed_values(&self, city: &str, district: &str, base: Money) -> ScenarioMap<Money> {
        self.loss_percentages(city, district)
            .unwrap_or_default()
            .into_iter()
            .map(|(scenario, pct)| (scenario, base * (Decimal::ONE - pct / dec!(100))))
            .collect()
    }
}
