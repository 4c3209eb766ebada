use clap::Args;
use serde_json::{json, Map, Value};

use climate_credit_core::pipeline::{assess_portfolio, AssessmentOptions, PortfolioAssessment};
use climate_credit_core::portfolio::PortfolioKind;
use climate_credit_core::risk::SummaryTable;
use climate_credit_core::{ComputationOutput, Horizon};

use super::decimal_value;
use crate::config::Config;
use crate::input;
use crate::GlobalOpts;

/// Arguments for a full portfolio assessment
#[derive(Args)]
pub struct AssessArgs {
    /// Path to portfolio file (.json or .csv); JSON may also be piped
    #[arg(long)]
    pub input: Option<String>,

    /// Portfolio kind, e.g. domestic-corporate (required for CSV)
    #[arg(long)]
    pub kind: Option<PortfolioKind>,

    /// Report a single horizon (2030 or 2050)
    #[arg(long)]
    pub horizon: Option<u16>,

    /// Also compute expected loss for the domestic orderly-transition group
    #[arg(long)]
    pub orderly_el: bool,
}

/// Arguments for a single PD, LGD or EAD stage
#[derive(Args)]
pub struct StageArgs {
    /// Path to portfolio file (.json or .csv); JSON may also be piped
    #[arg(long)]
    pub input: Option<String>,

    /// Portfolio kind, e.g. overseas-credit (required for CSV)
    #[arg(long)]
    pub kind: Option<PortfolioKind>,

    /// Emit the full per-scenario structure instead of one row per client
    #[arg(long)]
    pub detail: bool,
}

fn assess(
    global: &GlobalOpts,
    config: &Config,
    path: Option<&str>,
    kind: Option<PortfolioKind>,
    options: &AssessmentOptions,
) -> Result<ComputationOutput<PortfolioAssessment>, Box<dyn std::error::Error>> {
    let portfolio = input::read_portfolio(path, kind)?;
    let refs = config.reference_data(global)?;
    Ok(assess_portfolio(&refs, &portfolio, options)?)
}

/// Re-wrap a stage of the assessment in the output envelope.
fn envelope(out: &ComputationOutput<PortfolioAssessment>, result: Value) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(json!({
        "result": result,
        "methodology": out.methodology,
        "assumptions": out.assumptions,
        "warnings": out.warnings,
        "metadata": serde_json::to_value(&out.metadata)?,
    }))
}

fn summary_value(table: &SummaryTable) -> Value {
    let totals = table.totals();
    let expected_loss: Map<String, Value> = totals
        .expected_loss
        .iter()
        .map(|(group, total)| (group.label().to_string(), decimal_value(*total)))
        .collect();
    json!({
        "sheet_name": table.sheet_name,
        "horizon": table.horizon,
        "totals": {
            "exposure": decimal_value(Some(totals.exposure)),
            "expected_loss": expected_loss,
        },
        "records": table.records(),
    })
}

pub fn run_assess(global: &GlobalOpts, args: AssessArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let horizons = match args.horizon {
        Some(year) => vec![Horizon::from_year(year)
            .ok_or_else(|| format!("--horizon must be 2030 or 2050, got {}", year))?],
        None => Horizon::ALL.to_vec(),
    };
    let options = AssessmentOptions {
        horizons,
        orderly_expected_loss: args.orderly_el || config.orderly_expected_loss,
    };

    let out = assess(global, &config, args.input.as_deref(), args.kind, &options)?;
    let result = json!({
        "kind": out.result.kind,
        "clients": out.result.clients,
        "skipped_rows": out.result.skipped_rows,
        "summaries": out.result.summaries.iter().map(summary_value).collect::<Vec<_>>(),
    });
    envelope(&out, result)
}

pub fn run_pd(global: &GlobalOpts, args: StageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let out = assess(global, &config, args.input.as_deref(), args.kind, &AssessmentOptions::default())?;
    if args.detail {
        return envelope(&out, serde_json::to_value(&out.result.pd)?);
    }
    let records: Vec<Value> = out
        .result
        .pd
        .iter()
        .map(|client| {
            let mut row = Map::new();
            row.insert("client".into(), Value::String(client.client.clone()));
            for (scenario, estimate) in &client.scenarios {
                row.insert(scenario.label().into(), decimal_value(estimate.pd));
            }
            Value::Object(row)
        })
        .collect();
    envelope(&out, Value::Array(records))
}

pub fn run_lgd(global: &GlobalOpts, args: StageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let out = assess(global, &config, args.input.as_deref(), args.kind, &AssessmentOptions::default())?;
    if args.detail {
        return envelope(&out, serde_json::to_value(&out.result.lgd)?);
    }
    let records: Vec<Value> = out
        .result
        .lgd
        .iter()
        .map(|client| {
            let mut row = Map::new();
            row.insert("client".into(), Value::String(client.client.clone()));
            for (scenario, lgd) in &client.scenarios {
                row.insert(scenario.label().into(), decimal_value(*lgd));
            }
            Value::Object(row)
        })
        .collect();
    envelope(&out, Value::Array(records))
}

pub fn run_ead(global: &GlobalOpts, args: StageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::load(global)?;
    let out = assess(global, &config, args.input.as_deref(), args.kind, &AssessmentOptions::default())?;
    if args.detail {
        return envelope(&out, serde_json::to_value(&out.result.ead)?);
    }
    let records: Vec<Value> = out
        .result
        .ead
        .iter()
        .map(|client| json!({ "client": client.client, "ead": decimal_value(client.ead) }))
        .collect();
    envelope(&out, Value::Array(records))
}
