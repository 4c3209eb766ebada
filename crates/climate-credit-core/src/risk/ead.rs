//! Exposure at default per client.

use serde::{Deserialize, Serialize};

use crate::portfolio::{ClientRow, Portfolio};
use crate::risk::named_rows;
use crate::types::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEad {
    pub client: String,
    pub ead: Option<Money>,
}

/// Sum of two exposure components. A missing component is left out; only
/// when both are missing is the exposure missing.
pub fn combined_exposure(drawn: Option<Money>, undrawn: Option<Money>) -> Option<Money> {
    match (drawn, undrawn) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

/// EAD for every named client of a portfolio, in row order.
///
/// | kind | EAD |
/// |---|---|
/// | corporate, investment, overseas | outstanding balance + off-balance-sheet equivalent |
/// | mortgage | outstanding balance |
/// | personal other | outstanding balance + unused card limit |
pub fn resolve_ead(portfolio: &Portfolio) -> Vec<ClientEad> {
    fn collect<R: ClientRow>(rows: &[R], ead: impl Fn(&R) -> Option<Money>) -> Vec<ClientEad> {
        named_rows(rows)
            .map(|(name, row)| ClientEad {
                client: name.to_string(),
                ead: ead(row),
            })
            .collect()
    }

    match portfolio {
        Portfolio::DomesticCorporate(rows) | Portfolio::DomesticInvestment(rows) => {
            collect(rows, |c| {
                combined_exposure(c.outstanding_balance, c.off_balance_sheet_equivalent)
            })
        }
        Portfolio::DomesticMortgage(rows) => collect(rows, |c| c.outstanding_balance),
        Portfolio::DomesticPersonalOther(rows) => {
            collect(rows, |c| combined_exposure(c.outstanding_balance, c.unused_card_limit))
        }
        Portfolio::OverseasCredit(rows) | Portfolio::OverseasInvestment(rows) => {
            collect(rows, |c| {
                combined_exposure(c.outstanding_balance, c.off_balance_sheet_equivalent)
            })
        }
    }
}
