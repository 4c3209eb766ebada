//! Probability of default per client and scenario.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lookup::PdParameter;
use crate::portfolio::{CorporateClient, MortgageClient, OverseasClient, PersonalOtherClient, Portfolio};
use crate::ratios;
use crate::reference::ReferenceData;
use crate::risk::{named_rows, stressed_collateral_values};
use crate::scenario::{Scenario, ScenarioMap};
use crate::sovereign::DEFAULT_RATING;
use crate::types::Percent;

/// Loan section of the personal-other PD table.
pub const SECURED_SECTION: &str = "個人其他有擔";
pub const UNSECURED_SECTION: &str = "個人其他無擔";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PD of one scenario with the drivers that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPd {
    /// PD in percent; `None` when not computable.
    pub pd: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collateral_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_income_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cltv: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbr: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notch_shift: Option<Decimal>,
}

impl ScenarioPd {
    fn not_computable() -> Self {
        ScenarioPd::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPd {
    pub client: String,
    pub scenarios: ScenarioMap<ScenarioPd>,
}

impl ClientPd {
    pub fn pd(&self, scenario: Scenario) -> Option<Percent> {
        self.scenarios.get(&scenario).and_then(|s| s.pd)
    }

    /// Whether any scenario produced a PD.
    pub fn any_computed(&self) -> bool {
        self.scenarios.values().any(|s| s.pd.is_some())
    }
}

fn all_not_computable(scenarios: &[Scenario]) -> ScenarioMap<ScenarioPd> {
    scenarios
        .iter()
        .map(|s| (*s, ScenarioPd::not_computable()))
        .collect()
}

fn resolve(parameter: Option<&PdParameter>, driver: Option<Decimal>) -> Option<Percent> {
    parameter.and_then(|p| p.resolve(driver))
}

// ---------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------

/// Corporate credit and domestic investment.
///
/// Both drivers are needed at baseline and under stress. If either the
/// baseline ratios or either stressed series cannot be built, every
/// scenario is not computable.
pub fn corporate_pd(refs: &ReferenceData, client: &CorporateClient) -> ScenarioMap<ScenarioPd> {
    let industry = client.industry.as_deref().unwrap_or_default();

    let collateral_ratio = ratios::collateral_ratio(client.collateral_value, client.total_credit);
    let income_ratio = ratios::operating_income_ratio(client.net_revenue, client.total_market_credit);

    let stressed_collateral = stressed_collateral_values(
        refs,
        client.collateral_city.as_deref(),
        client.collateral_district.as_deref(),
        client.collateral_value,
    );
    let stressed_collateral_ratios =
        ratios::stressed_collateral_ratios(&stressed_collateral, client.total_credit);

    let impacts = refs.income.total_impacts(
        industry,
        client.city.as_deref().unwrap_or_default(),
        client.district.as_deref().unwrap_or_default(),
    );
    let stressed_income_ratios = ratios::stressed_operating_income_ratios(
        client.net_revenue,
        client.total_market_credit,
        &impacts,
    );

    if collateral_ratio.is_none()
        || income_ratio.is_none()
        || stressed_collateral_ratios.is_empty()
        || stressed_income_ratios.is_empty()
    {
        debug!(industry, "corporate PD drivers not computable");
        return all_not_computable(&Scenario::ALL);
    }

    let sector = refs.sectors.sector(industry);
    if sector.is_none() {
        debug!(industry, "industry has no sector");
    }

    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let (collateral, income) = if scenario.is_baseline() {
                (collateral_ratio, income_ratio)
            } else {
                (
                    stressed_collateral_ratios.get(&scenario).copied(),
                    stressed_income_ratios.get(&scenario).copied(),
                )
            };
            let parameter =
                sector.and_then(|s| refs.corporate_pd.query(s, scenario, &[income, collateral]));
            let estimate = ScenarioPd {
                pd: resolve(parameter, income),
                collateral_ratio: collateral,
                operating_income_ratio: income,
                ..Default::default()
            };
            (scenario, estimate)
        })
        .collect()
}

/// Personal mortgage. Baseline reports CLTV and DBR without a PD; stressed
/// scenarios look up DBR then CLTV, with CLTV as the regression driver.
pub fn mortgage_pd(refs: &ReferenceData, client: &MortgageClient) -> ScenarioMap<ScenarioPd> {
    let cltv = ratios::cltv(client.loan_amount, client.collateral_value);
    let dbr = ratios::dbr(client.unsecured_credit, client.annual_income);

    let stressed_collateral = stressed_collateral_values(
        refs,
        client.collateral_city.as_deref(),
        client.collateral_district.as_deref(),
        client.collateral_value,
    );
    let stressed_cltv = ratios::stressed_cltv(client.loan_amount, &stressed_collateral);

    let mut result = all_not_computable(&Scenario::ALL);
    result.insert(
        Scenario::Baseline,
        ScenarioPd {
            cltv,
            dbr,
            ..Default::default()
        },
    );

    if cltv.is_none() || stressed_cltv.is_empty() {
        debug!("mortgage stressed CLTV not computable");
        return result;
    }

    for scenario in Scenario::STRESSED {
        let cltv = stressed_cltv.get(&scenario).copied();
        // Outer ranges bucket DBR, inner ranges CLTV. The legacy query passed
        // CLTV as the outer probe; check the table layout before swapping.
        let parameter = refs.mortgage_pd.query(scenario, &[dbr, cltv]);
        result.insert(
            scenario,
            ScenarioPd {
                pd: resolve(parameter, cltv),
                cltv,
                dbr,
                ..Default::default()
            },
        );
    }
    result
}

/// Personal other loans. Baseline reports DBR without a PD; stressed
/// scenarios look up DBR in the secured or unsecured section.
pub fn personal_other_pd(refs: &ReferenceData, client: &PersonalOtherClient) -> ScenarioMap<ScenarioPd> {
    let dbr = ratios::dbr(client.unsecured_credit, client.annual_income);
    let section = if client.collateralized {
        SECURED_SECTION
    } else {
        UNSECURED_SECTION
    };

    Scenario::ALL
        .into_iter()
        .map(|scenario| {
            let pd = if scenario.is_baseline() {
                None
            } else {
                resolve(refs.personal_other_pd.query(section, scenario, &[dbr]), dbr)
            };
            (
                scenario,
                ScenarioPd {
                    pd,
                    dbr,
                    ..Default::default()
                },
            )
        })
        .collect()
}

/// Overseas credit and investment. Baseline is the unshifted rating PD;
/// the four transition scenarios shift the rating by the notches graded
/// from country and industry. No-policy scenarios are never assessed.
pub fn overseas_pd(refs: &ReferenceData, client: &OverseasClient) -> ScenarioMap<ScenarioPd> {
    let rating = client.rating.as_deref().unwrap_or(DEFAULT_RATING);

    let mut result = all_not_computable(&Scenario::OVERSEAS);
    result.insert(
        Scenario::Baseline,
        ScenarioPd {
            pd: refs.overseas_pd.shifted_pd(rating, Decimal::ZERO),
            notch_shift: Some(Decimal::ZERO),
            ..Default::default()
        },
    );

    let assessment = refs.grader.assess(
        client.country.as_deref().unwrap_or_default(),
        client.industry.as_deref().unwrap_or_default(),
    );
    let Some(assessment) = assessment else {
        return result;
    };

    for scenario in Scenario::OVERSEAS_STRESSED {
        let shift = assessment.notch_shifts.get(&scenario).copied();
        result.insert(
            scenario,
            ScenarioPd {
                pd: shift.and_then(|s| refs.overseas_pd.shifted_pd(rating, s)),
                notch_shift: shift,
                ..Default::default()
            },
        );
    }
    result
}

/// PD for every named client of a portfolio, in row order.
pub fn resolve_pd(refs: &ReferenceData, portfolio: &Portfolio) -> Vec<ClientPd> {
    fn collect<R: crate::portfolio::ClientRow>(
        rows: &[R],
        resolve: impl Fn(&R) -> ScenarioMap<ScenarioPd>,
    ) -> Vec<ClientPd> {
        named_rows(rows)
            .map(|(name, row)| ClientPd {
                client: name.to_string(),
                scenarios: resolve(row),
            })
            .collect()
    }

    match portfolio {
        Portfolio::DomesticCorporate(rows) | Portfolio::DomesticInvestment(rows) => {
            collect(rows, |c| corporate_pd(refs, c))
        }
        Portfolio::DomesticMortgage(rows) => collect(rows, |c| mortgage_pd(refs, c)),
        Portfolio::DomesticPersonalOther(rows) => collect(rows, |c| personal_other_pd(refs, c)),
        Portfolio::OverseasCredit(rows) | Portfolio::OverseasInvestment(rows) => {
            collect(rows, |c| overseas_pd(refs, c))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceValues;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn refs() -> ReferenceData {
        let values = ReferenceValues {
            corporate_pd: json!({ "C": {
                "基準情境": { ">=0.5": { ">=1": 1.0, "<1": 2.0 }, "<0.5": { "None": 9.0, ">=0": 3.0 } },
                "無序轉型 2030": { ">=0": { ">=0": { "para_a": 2, "para_b": 0 } } }
            } }),
            industry_to_sector: json!({ "C": ["Cement"] }),
            collateral_loss_by_region: json!([
                { "縣市": "臺北市", "鄉鎮市區": "中山區", "無序轉型 2030": 1, "2050淨零轉型 2030": 1 }
            ]),
            collateral_loss_by_risk_level: json!([
                { "風險等級": 1, "無序轉型 2030": 20, "2050淨零轉型 2030": 10 }
            ]),
            mortgage_pd: json!({
                "無序轉型 2030": { ">=2": { ">=0.8": 5.0, "<0.8": 1.5 }, "<2": { ">=0": { "para_a": 1, "para_b": 0 } } }
            }),
            personal_other_pd: json!({
                "個人其他有擔": { "2050淨零轉型 2030": { ">=1": 0.7, "<1": 0.3 } },
                "個人其他無擔": { "2050淨零轉型 2030": { ">=1": 1.7, "<1": 1.3 } }
            }),
            ..Default::default()
        };
        ReferenceData::from_values(&values).unwrap()
    }

    fn corporate() -> CorporateClient {
        CorporateClient {
            client: Some("Acme".into()),
            industry: Some("Cement".into()),
            collateral_city: Some("台北市".into()),
            collateral_district: Some("中山區".into()),
            collateral_value: Some(dec!(1500)),
            total_credit: Some(dec!(1000)),
            net_revenue: Some(dec!(800)),
            total_market_credit: Some(dec!(1000)),
            ..Default::default()
        }
    }

    #[test]
    fn test_corporate_baseline_direct_lookup() {
        let pds = corporate_pd(&refs(), &corporate());
        let baseline = &pds[&Scenario::Baseline];
        // collateral ratio 1500 * 0.8 / 1000 = 1.2, income ratio 0.8
        assert_eq!(baseline.collateral_ratio, Some(dec!(1.2)));
        assert_eq!(baseline.operating_income_ratio, Some(dec!(0.8)));
        assert_eq!(baseline.pd, Some(dec!(1.0)));
    }

    #[test]
    fn test_corporate_stressed_regression() {
        let pds = corporate_pd(&refs(), &corporate());
        let disorderly = &pds[&Scenario::Disorderly2030];
        // 1500 * 0.8 stressed by 20%
        assert_eq!(disorderly.collateral_ratio, Some(dec!(0.96)));
        // no income impact data: ratio unchanged
        assert_eq!(disorderly.operating_income_ratio, Some(dec!(0.8)));
        assert_eq!(disorderly.pd, Some(dec!(2)));
        // no table for no-policy scenarios
        assert_eq!(pds[&Scenario::NoPolicy2050].pd, None);
        assert_eq!(pds.len(), 8);
    }

    #[test]
    fn test_corporate_all_or_nothing_without_stressed_collateral() {
        let client = CorporateClient {
            collateral_district: Some("大同區".into()),
            ..corporate()
        };
        let pds = corporate_pd(&refs(), &client);
        assert_eq!(pds.len(), 8);
        assert!(pds.values().all(|s| s.pd.is_none()));
    }

    #[test]
    fn test_corporate_unknown_sector() {
        let client = CorporateClient {
            industry: Some("Software".into()),
            ..corporate()
        };
        let pds = corporate_pd(&refs(), &client);
        assert!(pds.values().all(|s| s.pd.is_none()));
        assert_eq!(pds[&Scenario::Baseline].collateral_ratio, Some(dec!(1.2)));
    }

    #[test]
    fn test_mortgage_baseline_has_no_pd() {
        let client = MortgageClient {
            client: Some("Lee".into()),
            collateral_city: Some("臺北市".into()),
            collateral_district: Some("中山區".into()),
            collateral_value: Some(dec!(1000)),
            loan_amount: Some(dec!(700)),
            unsecured_credit: Some(dec!(300000)),
            annual_income: Some(dec!(1200000)),
            ..Default::default()
        };
        let pds = mortgage_pd(&refs(), &client);
        let baseline = &pds[&Scenario::Baseline];
        assert_eq!(baseline.pd, None);
        assert_eq!(baseline.cltv, Some(dec!(0.7)));
        assert_eq!(baseline.dbr, Some(dec!(3)));

        // DBR 3 -> ">=2"; stressed CLTV 700 / 800 = 0.875 -> ">=0.8"
        let disorderly = &pds[&Scenario::Disorderly2030];
        assert_eq!(disorderly.cltv, Some(dec!(0.875)));
        assert_eq!(disorderly.pd, Some(dec!(5.0)));
    }

    #[test]
    fn test_mortgage_unknown_region_keeps_baseline_ratios() {
        let client = MortgageClient {
            client: Some("Lee".into()),
            collateral_city: Some("高雄市".into()),
            collateral_district: Some("鼓山區".into()),
            collateral_value: Some(dec!(1000)),
            loan_amount: Some(dec!(700)),
            ..Default::default()
        };
        let pds = mortgage_pd(&refs(), &client);
        assert_eq!(pds[&Scenario::Baseline].cltv, Some(dec!(0.7)));
        assert!(pds.values().all(|s| s.pd.is_none()));
    }

    #[test]
    fn test_personal_other_section_by_collateral() {
        let mut client = PersonalOtherClient {
            client: Some("Chen".into()),
            unsecured_credit: Some(dec!(50000)),
            annual_income: Some(dec!(1200000)),
            ..Default::default()
        };
        let unsecured = personal_other_pd(&refs(), &client);
        assert_eq!(unsecured[&Scenario::Baseline].pd, None);
        assert_eq!(unsecured[&Scenario::Orderly2030].dbr, Some(dec!(0.5)));
        assert_eq!(unsecured[&Scenario::Orderly2030].pd, Some(dec!(1.3)));

        client.collateralized = true;
        let secured = personal_other_pd(&refs(), &client);
        assert_eq!(secured[&Scenario::Orderly2030].pd, Some(dec!(0.3)));
    }

    #[test]
    fn test_resolve_pd_skips_unnamed_rows() {
        let portfolio = Portfolio::DomesticCorporate(vec![
            corporate(),
            CorporateClient::default(),
            CorporateClient {
                client: Some("Beta".into()),
                ..corporate()
            },
        ]);
        let pds = resolve_pd(&refs(), &portfolio);
        let names: Vec<&str> = pds.iter().map(|p| p.client.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Beta"]);
        assert!(pds[0].any_computed());
    }
}
