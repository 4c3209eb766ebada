//! Country tier x industry group -> letter grade -> per-scenario notch shift.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClimateCreditError;
use crate::lookup::IndustryClassification;
use crate::scenario::{Scenario, ScenarioMap};
use crate::types::decimal_from_value;
use crate::ClimateCreditResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Transition-risk tier of a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CountryRiskTier {
    #[serde(rename = "低")]
    Low,
    #[serde(rename = "中低")]
    MediumLow,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "中高")]
    MediumHigh,
    #[serde(rename = "高")]
    High,
}

impl CountryRiskTier {
    pub const ALL: [CountryRiskTier; 5] = [
        CountryRiskTier::Low,
        CountryRiskTier::MediumLow,
        CountryRiskTier::Medium,
        CountryRiskTier::MediumHigh,
        CountryRiskTier::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CountryRiskTier::Low => "低",
            CountryRiskTier::MediumLow => "中低",
            CountryRiskTier::Medium => "中",
            CountryRiskTier::MediumHigh => "中高",
            CountryRiskTier::High => "高",
        }
    }

    pub fn from_label(label: &str) -> Option<CountryRiskTier> {
        let label = label.trim();
        CountryRiskTier::ALL.into_iter().find(|t| t.label() == label)
    }

    fn row(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    E,
}

impl LetterGrade {
    pub fn from_label(label: &str) -> Option<LetterGrade> {
        match label.trim() {
            "A" => Some(LetterGrade::A),
            "B" => Some(LetterGrade::B),
            "C" => Some(LetterGrade::C),
            "D" => Some(LetterGrade::D),
            "E" => Some(LetterGrade::E),
            _ => None,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

use LetterGrade::{A, B, C, D, E};

/// Rows: country tier, low to high. Columns: industry group 1 to 5.
const GRADE_MATRIX: [[LetterGrade; 5]; 5] = [
    [A, A, B, B, C],
    [A, B, B, C, D],
    [B, B, C, D, D],
    [B, C, D, D, E],
    [C, D, D, E, E],
];

/// Letter grade for a country tier and a 1-based industry group. Groups
/// outside 1..=5 have no grade.
pub fn letter_grade(tier: CountryRiskTier, industry_group: u8) -> Option<LetterGrade> {
    let column = usize::from(industry_group).checked_sub(1)?;
    GRADE_MATRIX[tier.row()].get(column).copied()
}

// ---------------------------------------------------------------------------
// Country classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name_chinese: String,
    pub name_english: String,
    pub risk_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryClassification {
    pub countries: Vec<CountryEntry>,
}

impl CountryClassification {
    pub fn from_json(value: &Value) -> ClimateCreditResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ClimateCreditError::reference("classification_table_by_country", e.to_string()))
    }

    /// Tier of the first country whose Chinese or English name matches.
    pub fn risk_tier(&self, country: &str) -> Option<CountryRiskTier> {
        let entry = self
            .countries
            .iter()
            .find(|c| c.name_chinese == country || c.name_english == country)?;
        let tier = CountryRiskTier::from_label(&entry.risk_level);
        if tier.is_none() {
            warn!(country, risk_level = entry.risk_level.as_str(), "unrecognised country risk tier");
        }
        tier
    }
}

// ---------------------------------------------------------------------------
// Scenario adjustments
// ---------------------------------------------------------------------------

/// Letter grade -> notch shift per scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioAdjustmentTable {
    grades: BTreeMap<LetterGrade, ScenarioMap<Decimal>>,
}

impl ScenarioAdjustmentTable {
    /// Each grade maps either to a positional list of shifts or to an
    /// object keyed by scenario label. Lists of 4 cover the overseas
    /// stressed scenarios, 7 every stressed scenario and 8 all scenarios.
    pub fn from_json(value: &Value) -> ClimateCreditResult<Self> {
        let table = "scenario_adjustment_table";
        let object = value
            .as_object()
            .ok_or_else(|| ClimateCreditError::reference(table, "expected an object keyed by grade"))?;

        let mut grades = BTreeMap::new();
        for (label, shifts) in object {
            let Some(grade) = LetterGrade::from_label(label) else {
                warn!(table, grade = label.as_str(), "skipping unknown letter grade");
                continue;
            };
            grades.insert(grade, Self::parse_shifts(table, label, shifts)?);
        }
        Ok(ScenarioAdjustmentTable { grades })
    }

    fn parse_shifts(table: &str, grade: &str, value: &Value) -> ClimateCreditResult<ScenarioMap<Decimal>> {
        let number = |v: &Value| {
            decimal_from_value(v).ok_or_else(|| {
                ClimateCreditError::reference(table, format!("grade {}: shift {} is not a number", grade, v))
            })
        };

        match value {
            Value::Array(items) => {
                let scenarios: &[Scenario] = match items.len() {
                    4 => &Scenario::OVERSEAS_STRESSED,
                    7 => &Scenario::STRESSED,
                    8 => &Scenario::ALL,
                    n => {
                        return Err(ClimateCreditError::reference(
                            table,
                            format!("grade {}: expected 4, 7 or 8 shifts, got {}", grade, n),
                        ))
                    }
                };
                scenarios
                    .iter()
                    .zip(items)
                    .map(|(s, v)| -> ClimateCreditResult<(Scenario, Decimal)> {
                        Ok((*s, number(v)?))
                    })
                    .collect()
            }
            Value::Object(map) => {
                let mut shifts = ScenarioMap::new();
                for (label, v) in map {
                    match Scenario::from_label(label) {
                        Some(s) => {
                            shifts.insert(s, number(v)?);
                        }
                        None => warn!(table, label = label.as_str(), "skipping unknown scenario"),
                    }
                }
                Ok(shifts)
            }
            other => Err(ClimateCreditError::reference(
                table,
                format!("grade {}: expected a list or object, got {}", grade, other),
            )),
        }
    }

    pub fn shifts(&self, grade: LetterGrade) -> Option<&ScenarioMap<Decimal>> {
        self.grades.get(&grade)
    }
}

// ---------------------------------------------------------------------------
// Grader
// ---------------------------------------------------------------------------

/// Outcome of grading one overseas borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SovereignAssessment {
    pub country_tier: CountryRiskTier,
    pub industry_group: u8,
    pub grade: LetterGrade,
    pub notch_shifts: ScenarioMap<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct SovereignIndustryGrader {
    pub countries: CountryClassification,
    pub industries: IndustryClassification,
    pub adjustments: ScenarioAdjustmentTable,
}

impl SovereignIndustryGrader {
    pub fn new(
        countries: CountryClassification,
        industries: IndustryClassification,
        adjustments: ScenarioAdjustmentTable,
    ) -> Self {
        SovereignIndustryGrader {
            countries,
            industries,
            adjustments,
        }
    }

    /// Grade a country and industry and read the grade's notch shifts.
    /// `None` when either name is unknown or the grade has no shifts.
    pub fn assess(&self, country: &str, industry: &str) -> Option<SovereignAssessment> {
        let Some(country_tier) = self.countries.risk_tier(country) else {
            debug!(country, "country not classified");
            return None;
        };
        let Some(industry_group) = self.industries.group_of(industry) else {
            debug!(industry, "industry not classified");
            return None;
        };
        let grade = letter_grade(country_tier, industry_group)?;
        let notch_shifts = self.adjustments.shifts(grade)?.clone();
        Some(SovereignAssessment {
            country_tier,
            industry_group,
            grade,
            notch_shifts,
        })
    }
}
