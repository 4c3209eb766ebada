//! Reference tables, loaded once per run.
//!
//! Paths default to the conventional layout of the data directory and can
//! be overridden one by one. Every range key is parsed and sorted here, so
//! lookups never re-parse.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ClimateCreditError;
use crate::lookup::{
    IndustryClassification, NestedRangeTable, RangeParsing, RiskParameterTable, ScenarioTable,
    SectorMapper, SingleRangeTable,
};
use crate::sovereign::{
    CountryClassification, RatingPdTable, ScenarioAdjustmentTable, SovereignIndustryGrader,
};
use crate::stress::{IncomeImpactModel, RegionalLossTable, RiskLevelTable};
use crate::ClimateCreditResult;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Location of each table, relative to the data directory unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencePaths {
    pub corporate_pd: PathBuf,
    pub mortgage_pd: PathBuf,
    pub personal_other_pd: PathBuf,
    pub overseas_pd: PathBuf,
    pub industry_to_sector: PathBuf,
    pub collateral_loss_by_region: PathBuf,
    pub collateral_loss_by_risk_level: PathBuf,
    pub revenue_loss_by_region: PathBuf,
    pub revenue_loss_by_risk_level: PathBuf,
    pub industry_classification: PathBuf,
    pub industry_impact_by_risk_level: PathBuf,
    pub country_classification: PathBuf,
    pub scenario_adjustments: PathBuf,
}

impl Default for ReferencePaths {
    fn default() -> Self {
        ReferencePaths {
            corporate_pd: "PD_Conversion/Domestic_Corporate_Credit.json".into(),
            mortgage_pd: "PD_Conversion/Domestic_Personal_Mortgage.json".into(),
            personal_other_pd: "PD_Conversion/Domestic_Personal_Other.json".into(),
            overseas_pd: "PD_Conversion/Overseas_Credit.json".into(),
            industry_to_sector: "Industry_to_Sector/Industry_to_Sector.json".into(),
            collateral_loss_by_region:
                "Physical_Risk/collateral_value_loss_by_region_and_scenario_risk_level.json".into(),
            collateral_loss_by_risk_level:
                "Physical_Risk/collateral_value_loss_percentage_by_risk_level.json".into(),
            revenue_loss_by_region: "Physical_Risk/revenue_loss_by_region_and_scenario_risk_level.json"
                .into(),
            revenue_loss_by_risk_level: "Physical_Risk/revenue_loss_percentage_by_risk_level.json"
                .into(),
            industry_classification: "Transition_Risk/classification_table_by_industry.json".into(),
            industry_impact_by_risk_level:
                "Transition_Risk/impact_on_industries_percentage_by_risk_level.json".into(),
            country_classification: "Transition_Risk/classification_table_by_country.json".into(),
            scenario_adjustments: "Transition_Risk/scenario_adjustment_table.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw values
// ---------------------------------------------------------------------------

/// Every table as parsed JSON, before range parsing. Missing tables default
/// to empty, so a run without e.g. overseas data still assesses domestic
/// portfolios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceValues {
    pub corporate_pd: Value,
    pub mortgage_pd: Value,
    pub personal_other_pd: Value,
    pub overseas_pd: Value,
    pub industry_to_sector: Value,
    pub collateral_loss_by_region: Value,
    pub collateral_loss_by_risk_level: Value,
    pub revenue_loss_by_region: Value,
    pub revenue_loss_by_risk_level: Value,
    pub industry_classification: Value,
    pub industry_impact_by_risk_level: Value,
    pub country_classification: Value,
    pub scenario_adjustments: Value,
}

impl Default for ReferenceValues {
    fn default() -> Self {
        ReferenceValues {
            corporate_pd: json!({}),
            mortgage_pd: json!({}),
            personal_other_pd: json!({}),
            overseas_pd: json!({}),
            industry_to_sector: json!({}),
            collateral_loss_by_region: json!([]),
            collateral_loss_by_risk_level: json!([]),
            revenue_loss_by_region: json!([]),
            revenue_loss_by_risk_level: json!([]),
            industry_classification: json!({}),
            industry_impact_by_risk_level: json!([]),
            country_classification: json!({ "countries": [] }),
            scenario_adjustments: json!({}),
        }
    }
}

fn read_table(dir: &Path, relative: &Path) -> ClimateCreditResult<Value> {
    let path = if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        dir.join(relative)
    };
    let table = path.display().to_string();
    let text = fs::read_to_string(&path)
        .map_err(|e| ClimateCreditError::reference(&table, e.to_string()))?;
    serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .map_err(|e| ClimateCreditError::reference(&table, e.to_string()))
}

impl ReferenceValues {
    /// Read every table named by `paths` from `dir`.
    pub fn read(dir: &Path, paths: &ReferencePaths) -> ClimateCreditResult<Self> {
        Ok(ReferenceValues {
            corporate_pd: read_table(dir, &paths.corporate_pd)?,
            mortgage_pd: read_table(dir, &paths.mortgage_pd)?,
            personal_other_pd: read_table(dir, &paths.personal_other_pd)?,
            overseas_pd: read_table(dir, &paths.overseas_pd)?,
            industry_to_sector: read_table(dir, &paths.industry_to_sector)?,
            collateral_loss_by_region: read_table(dir, &paths.collateral_loss_by_region)?,
            collateral_loss_by_risk_level: read_table(dir, &paths.collateral_loss_by_risk_level)?,
            revenue_loss_by_region: read_table(dir, &paths.revenue_loss_by_region)?,
            revenue_loss_by_risk_level: read_table(dir, &paths.revenue_loss_by_risk_level)?,
            industry_classification: read_table(dir, &paths.industry_classification)?,
            industry_impact_by_risk_level: read_table(dir, &paths.industry_impact_by_risk_level)?,
            country_classification: read_table(dir, &paths.country_classification)?,
            scenario_adjustments: read_table(dir, &paths.scenario_adjustments)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Parsed tables
// ---------------------------------------------------------------------------

/// All reference tables, parsed and immutable for the run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// sector -> scenario -> operating-income ratio -> collateral ratio
    pub corporate_pd: RiskParameterTable<NestedRangeTable>,
    /// scenario -> DBR -> CLTV
    pub mortgage_pd: ScenarioTable<NestedRangeTable>,
    /// secured/unsecured section -> scenario -> DBR
    pub personal_other_pd: RiskParameterTable<SingleRangeTable>,
    pub overseas_pd: RatingPdTable,
    pub sectors: SectorMapper,
    pub collateral_loss: RegionalLossTable,
    pub income: IncomeImpactModel,
    pub grader: SovereignIndustryGrader,
}

impl ReferenceData {
    /// Read and parse every table. Any unreadable file, invalid JSON or
    /// malformed range aborts the load.
    pub fn load(dir: &Path, paths: &ReferencePaths) -> ClimateCreditResult<Self> {
        let data = ReferenceData::from_values(&ReferenceValues::read(dir, paths)?)?;
        info!(
            dir = %dir.display(),
            sectors = data.corporate_pd.segments().count(),
            "reference data loaded"
        );
        Ok(data)
    }

    pub fn from_values(values: &ReferenceValues) -> ClimateCreditResult<Self> {
        let industries = IndustryClassification::from_json(&values.industry_classification)?;

        let income = IncomeImpactModel::new(
            industries.clone(),
            RiskLevelTable::from_json(
                "impact_on_industries_percentage_by_risk_level",
                &values.industry_impact_by_risk_level,
            )?,
            RegionalLossTable::from_json(
                "revenue_loss_by_region",
                &values.revenue_loss_by_region,
                &values.revenue_loss_by_risk_level,
                true,
            )?,
        );

        let grader = SovereignIndustryGrader::new(
            CountryClassification::from_json(&values.country_classification)?,
            industries,
            ScenarioAdjustmentTable::from_json(&values.scenario_adjustments)?,
        );

        Ok(ReferenceData {
            corporate_pd: RiskParameterTable::from_json(
                "Domestic_Corporate_Credit",
                &values.corporate_pd,
                RangeParsing::Lenient,
            )?,
            mortgage_pd: ScenarioTable::from_json(
                "Domestic_Personal_Mortgage",
                &values.mortgage_pd,
                RangeParsing::Strict,
            )?,
            personal_other_pd: RiskParameterTable::from_json(
                "Domestic_Personal_Other",
                &values.personal_other_pd,
                RangeParsing::Strict,
            )?,
            overseas_pd: RatingPdTable::from_json(&values.overseas_pd)?,
            sectors: SectorMapper::from_json(&values.industry_to_sector)?,
            collateral_loss: RegionalLossTable::from_json(
                "collateral_value_loss_by_region",
                &values.collateral_loss_by_region,
                &values.collateral_loss_by_risk_level,
                false,
            )?,
            income,
            grader,
        })
    }
}
