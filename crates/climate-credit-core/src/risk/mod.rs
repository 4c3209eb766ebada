pub mod ead;
pub mod lgd;
pub mod pd;
pub mod summary;

pub use ead::{resolve_ead, ClientEad};
pub use lgd::{resolve_lgd, ClientLgd};
pub use pd::{resolve_pd, ClientPd, ScenarioPd};
pub use summary::{
    assemble_summary, expected_loss, GroupSummary, SummaryOptions, SummaryRow, SummaryTable, SummaryTotals,
};

use tracing::debug;

use crate::portfolio::ClientRow;
use crate::reference::ReferenceData;
use crate::scenario::ScenarioMap;
use crate::types::Money;

/// Rows with a client name, paired with that name. Unnamed rows are
/// skipped.
pub(crate) fn named_rows<R: ClientRow>(rows: &[R]) -> impl Iterator<Item = (&str, &R)> {
    rows.iter().enumerate().filter_map(|(index, row)| match row.client_name() {
        Some(name) => Some((name, row)),
        None => {
            debug!(row = index + 1, "skipping row without client name");
            None
        }
    })
}

/// Collateral value under each stressed scenario. Empty when the location
/// or value is missing, or the region is unknown.
pub(crate) fn stressed_collateral_values(
    refs: &ReferenceData,
    city: Option<&str>,
    district: Option<&str>,
    value: Option<Money>,
) -> ScenarioMap<Money> {
    match (city, district, value) {
        (Some(city), Some(district), Some(value)) => {
            refs.collateral_loss.stressed_values(city, district, value)
        }
        _ => ScenarioMap::new(),
    }
}
