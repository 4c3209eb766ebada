use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ClimateCreditError;
use crate::portfolio::{Portfolio, PortfolioKind};
use crate::reference::ReferenceData;
use crate::risk::{
    assemble_summary, resolve_ead, resolve_lgd, resolve_pd, ClientEad, ClientLgd, ClientPd,
    SummaryOptions, SummaryTable,
};
use crate::scenario::Horizon;
use crate::types::{with_metadata, ComputationOutput};
use crate::ClimateCreditResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentOptions {
    /// Horizons to summarise, in order.
    pub horizons: Vec<Horizon>,
    /// Compute domestic orderly-transition EL like the other groups.
    pub orderly_expected_loss: bool,
}

impl Default for AssessmentOptions {
    fn default() -> Self {
        AssessmentOptions {
            horizons: Horizon::ALL.to_vec(),
            orderly_expected_loss: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAssessment {
    pub kind: PortfolioKind,
    /// Named clients assessed.
    pub clients: usize,
    /// Rows without a client name.
    pub skipped_rows: usize,
    pub pd: Vec<ClientPd>,
    pub lgd: Vec<ClientLgd>,
    pub ead: Vec<ClientEad>,
    /// One table per requested horizon.
    pub summaries: Vec<SummaryTable>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run PD, LGD and EAD for a portfolio and assemble its summary tables.
pub fn assess_portfolio(
    refs: &ReferenceData,
    portfolio: &Portfolio,
    options: &AssessmentOptions,
) -> ClimateCreditResult<ComputationOutput<PortfolioAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if options.horizons.is_empty() {
        return Err(ClimateCreditError::InvalidInput {
            field: "horizons".into(),
            reason: "At least one reporting horizon is required".into(),
        });
    }

    let kind = portfolio.kind();
    let pd = resolve_pd(refs, portfolio);
    let lgd = resolve_lgd(refs, portfolio);
    let ead = resolve_ead(portfolio);

    let skipped_rows = portfolio.len() - ead.len();
    if skipped_rows > 0 {
        warnings.push(format!(
            "{} row(s) without a client name were skipped",
            skipped_rows
        ));
    }
    for client in pd.iter().filter(|p| !p.any_computed()) {
        warnings.push(format!("{}: no scenario PD could be computed", client.client));
    }
    for client in ead.iter().filter(|e| e.ead.is_none()) {
        warnings.push(format!("{}: exposure at default is not computable", client.client));
    }

    let summary_options = SummaryOptions {
        orderly_expected_loss: options.orderly_expected_loss,
    };
    let summaries: Vec<SummaryTable> = options
        .horizons
        .iter()
        .map(|&horizon| assemble_summary(kind, horizon, &pd, &lgd, &ead, &summary_options))
        .collect();

    info!(
        kind = %kind,
        clients = ead.len(),
        skipped_rows,
        warnings = warnings.len(),
        "portfolio assessed"
    );

    let output = PortfolioAssessment {
        kind,
        clients: ead.len(),
        skipped_rows,
        pd,
        lgd,
        ead,
        summaries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "expected_loss": "EL = PD/100 * LGD(%)/100 * EAD",
        "scenarios": kind.scenarios().iter().map(|s| s.label()).collect::<Vec<_>>(),
        "horizons": options.horizons,
        "lgd_floor": "10%",
        "orderly_expected_loss": options.orderly_expected_loss,
    });

    Ok(with_metadata(
        "Climate-scenario stressed credit loss (PD x LGD x EAD)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
