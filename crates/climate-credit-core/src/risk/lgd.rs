//! Loss given default per client and scenario, as a fraction of exposure.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::portfolio::{CorporateClient, MortgageClient, OverseasClient, PersonalOtherClient, Portfolio};
use crate::reference::ReferenceData;
use crate::risk::{named_rows, stressed_collateral_values};
use crate::scenario::{Scenario, ScenarioMap};
use crate::types::{Money, Percent, Rate};

/// No formula may report an LGD below 10%.
pub const LGD_FLOOR: Rate = dec!(0.10);

/// Recovery rate (%) when a row leaves it blank.
pub const DEFAULT_RECOVERY_RATE: Percent = dec!(75);

/// Recovery rate (%) on stressed real-estate collateral.
pub const REAL_ESTATE_RECOVERY_RATE: Percent = dec!(75);

/// Capital-loss divisor applied to the recovery term under stress.
pub fn capital_loss_divisor(scenario: Scenario) -> Decimal {
    match scenario {
        Scenario::Baseline | Scenario::Orderly2030 | Scenario::NoPolicy2030 => dec!(1.0),
        Scenario::Orderly2050
        | Scenario::Disorderly2030
        | Scenario::Disorderly2050
        | Scenario::NoPolicy2050
        | Scenario::NoPolicy2090 => dec!(1.2),
    }
}

pub fn floor_lgd(lgd: Rate) -> Rate {
    lgd.max(LGD_FLOOR)
}

/// `max(1 - recovery/100, 0.10)`
pub fn simple_lgd(recovery_rate: Percent) -> Rate {
    floor_lgd(Decimal::ONE - recovery_rate / dec!(100))
}

/// `max(1 - recovery_base * recovery/100 / divisor / credit, 0.10)`
pub fn collateral_lgd(
    recovery_base: Option<Money>,
    recovery_rate: Percent,
    divisor: Decimal,
    credit: Option<Money>,
) -> Option<Rate> {
    let recovered = (recovery_base? * recovery_rate / dec!(100)).checked_div(divisor)?;
    let share = recovered.checked_div(credit?)?;
    Some(floor_lgd(Decimal::ONE - share))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLgd {
    pub client: String,
    /// LGD as a fraction; `None` when not computable.
    pub scenarios: ScenarioMap<Option<Rate>>,
}

impl ClientLgd {
    pub fn lgd(&self, scenario: Scenario) -> Option<Rate> {
        self.scenarios.get(&scenario).copied().flatten()
    }
}

fn uniform(scenarios: &[Scenario], lgd: Option<Rate>) -> ScenarioMap<Option<Rate>> {
    scenarios.iter().map(|s| (*s, lgd)).collect()
}

/// Per-scenario LGD on real estate revalued under stress. An empty
/// revaluation leaves every scenario, baseline included, not computable.
fn real_estate_lgd(
    stressed: &ScenarioMap<Money>,
    baseline: Option<Rate>,
    credit: Option<Money>,
) -> ScenarioMap<Option<Rate>> {
    if stressed.is_empty() {
        debug!("no stressed collateral value, LGD not computable");
        return uniform(&Scenario::ALL, None);
    }
    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let lgd = if scenario.is_baseline() {
                baseline
            } else {
                stressed.get(&scenario).and_then(|value| {
                    collateral_lgd(Some(*value), REAL_ESTATE_RECOVERY_RATE, Decimal::ONE, credit)
                })
            };
            (scenario, lgd)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// Domestic corporate credit (`investment == false`) or domestic
/// investment holding.
pub fn corporate_lgd(
    refs: &ReferenceData,
    client: &CorporateClient,
    investment: bool,
) -> ScenarioMap<Option<Rate>> {
    if client.equity {
        return uniform(&Scenario::ALL, Some(Decimal::ONE));
    }

    let recovery_rate = client.recovery_rate.unwrap_or(DEFAULT_RECOVERY_RATE);
    let baseline = Some(simple_lgd(recovery_rate));

    if client.real_estate_collateral {
        let stressed = stressed_collateral_values(
            refs,
            client.collateral_city.as_deref(),
            client.collateral_district.as_deref(),
            client.collateral_value,
        );
        return real_estate_lgd(&stressed, baseline, client.credit);
    }

    // An uncollateralized investment recovers on the credit amount itself.
    let recovery_base = if investment && !client.other_collateral {
        client.credit
    } else {
        client.collateral_value
    };

    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let lgd = if scenario.is_baseline() {
                baseline
            } else {
                collateral_lgd(
                    recovery_base,
                    recovery_rate,
                    capital_loss_divisor(scenario),
                    client.credit,
                )
            };
            (scenario, lgd)
        })
        .collect()
}

/// Personal mortgage: collateral-ratio LGD at 75% recovery, revalued per
/// scenario.
pub fn mortgage_lgd(refs: &ReferenceData, client: &MortgageClient) -> ScenarioMap<Option<Rate>> {
    let baseline = collateral_lgd(
        client.collateral_value,
        REAL_ESTATE_RECOVERY_RATE,
        Decimal::ONE,
        client.credit,
    );
    let stressed = stressed_collateral_values(
        refs,
        client.collateral_city.as_deref(),
        client.collateral_district.as_deref(),
        client.collateral_value,
    );
    real_estate_lgd(&stressed, baseline, client.credit)
}

pub fn personal_other_lgd(client: &PersonalOtherClient) -> ScenarioMap<Option<Rate>> {
    let recovery_rate = client.recovery_rate.unwrap_or(DEFAULT_RECOVERY_RATE);
    let stressed_base = if client.collateralized {
        client.collateral_value
    } else {
        client.credit
    };

    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let (base, divisor) = if scenario.is_baseline() {
                (client.collateral_value, Decimal::ONE)
            } else {
                (stressed_base, capital_loss_divisor(scenario))
            };
            (
                scenario,
                collateral_lgd(base, recovery_rate, divisor, client.credit),
            )
        })
        .collect()
}

/// Overseas credit or investment, over the five overseas scenarios.
pub fn overseas_lgd(client: &OverseasClient) -> ScenarioMap<Option<Rate>> {
    let recovery_rate = client.recovery_rate.unwrap_or(DEFAULT_RECOVERY_RATE);
    let base = if client.collateralized {
        client.collateral_value
    } else {
        client.credit
    };

    Scenario::OVERSEAS
        .into_iter()
        .map(|scenario| {
            (
                scenario,
                collateral_lgd(base, recovery_rate, capital_loss_divisor(scenario), client.credit),
            )
        })
        .collect()
}

/// LGD for every named client of a portfolio, in row order.
pub fn resolve_lgd(refs: &ReferenceData, portfolio: &Portfolio) -> Vec<ClientLgd> {
    fn collect<R: crate::portfolio::ClientRow>(
        rows: &[R],
        resolve: impl Fn(&R) -> ScenarioMap<Option<Rate>>,
    ) -> Vec<ClientLgd> {
        named_rows(rows)
            .map(|(name, row)| ClientLgd {
                client: name.to_string(),
                scenarios: resolve(row),
            })
            .collect()
    }

    match portfolio {
        Portfolio::DomesticCorporate(rows) => collect(rows, |c| corporate_lgd(refs, c, false)),
        Portfolio::DomesticInvestment(rows) => collect(rows, |c| corporate_lgd(refs, c, true)),
        Portfolio::DomesticMortgage(rows) => collect(rows, |c| mortgage_lgd(refs, c)),
        Portfolio::DomesticPersonalOther(rows) => collect(rows, personal_other_lgd),
        Portfolio::OverseasCredit(rows) | Portfolio::OverseasInvestment(rows) => {
            collect(rows, overseas_lgd)
        }
    }
}
