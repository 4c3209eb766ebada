use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use climate_credit_core::stress::standardize_city_name;
use climate_credit_core::{Scenario, ScenarioMap};

use super::decimal_value;
use crate::config::Config;
use crate::GlobalOpts;

/// Arguments for a regional stress lookup
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct StressArgs {
    /// City (縣市); 台 and 臺 are equivalent
    #[arg(long)]
    pub city: String,

    /// District (鄉鎮市區)
    #[arg(long)]
    pub district: String,

    /// Collateral value to stress
    #[arg(long)]
    pub value: Decimal,

    /// Also report the operating-income impact for this industry
    #[arg(long)]
    pub industry: Option<String>,
}

/// Arguments for sovereign/industry grading
#[derive(Args)]
pub struct GradeArgs {
    /// Country, Chinese or English name
    #[arg(long)]
    pub country: String,

    /// Industry as listed in the industry classification
    #[arg(long)]
    pub industry: String,

    /// S&P rating; adds the shifted PD per scenario
    #[arg(long)]
    pub rating: Option<String>,
}

fn by_label(values: &ScenarioMap<Decimal>) -> Map<String, Value> {
    values
        .iter()
        .map(|(scenario, value)| (scenario.label().to_string(), decimal_value(Some(*value))))
        .collect()
}

pub fn run_stress(global: &GlobalOpts, args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let refs = config.reference_data(global)?;
    let mut warnings: Vec<String> = Vec::new();

    let stressed = refs
        .collateral_loss
        .stressed_values(&args.city, &args.district, args.value);
    if stressed.is_empty() {
        warnings.push(format!(
            "No collateral risk data for {} {}",
            args.city, args.district
        ));
    }

    let mut result = Map::new();
    result.insert("city".into(), Value::String(standardize_city_name(&args.city)));
    result.insert("district".into(), Value::String(args.district.trim().to_string()));
    result.insert("collateral_value".into(), Value::Object(by_label(&stressed)));

    if let Some(industry) = &args.industry {
        let impacts = refs.income.total_impacts(industry, &args.city, &args.district);
        result.insert("revenue_impact_pct".into(), Value::Object(by_label(&impacts)));
    }

    Ok(json!({ "result": result, "warnings": warnings }))
}

pub fn run_grade(global: &GlobalOpts, args: GradeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let refs = config.reference_data(global)?;

    let assessment = refs.grader.assess(&args.country, &args.industry).ok_or_else(|| {
        format!(
            "Cannot grade '{}' / '{}': country or industry is not classified, or the grade has no adjustments",
            args.country, args.industry
        )
    })?;

    let mut result = Map::new();
    result.insert("country".into(), Value::String(args.country.clone()));
    result.insert("industry".into(), Value::String(args.industry.clone()));
    result.insert(
        "country_risk_tier".into(),
        Value::String(assessment.country_tier.label().to_string()),
    );
    result.insert("industry_group".into(), json!(assessment.industry_group));
    result.insert("grade".into(), Value::String(assessment.grade.to_string()));
    result.insert(
        "notch_shifts".into(),
        Value::Object(by_label(&assessment.notch_shifts)),
    );

    if let Some(rating) = &args.rating {
        let mut pds = Map::new();
        pds.insert(
            Scenario::Baseline.label().to_string(),
            decimal_value(refs.overseas_pd.shifted_pd(rating, Decimal::ZERO)),
        );
        for (scenario, shift) in &assessment.notch_shifts {
            pds.insert(
                scenario.label().to_string(),
                decimal_value(refs.overseas_pd.shifted_pd(rating, *shift)),
            );
        }
        result.insert("pd".into(), Value::Object(pds));
    }

    Ok(json!({ "result": result }))
}
