//! Risk-driver ratios, baseline and stressed.
//!
//! Every function returns `None` when an input is absent or a denominator
//! is zero; callers treat that as "not computable".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::scenario::ScenarioMap;
use crate::types::{Money, Percent};

/// Haircut applied to collateral before it counts toward the collateral ratio.
pub const COLLATERAL_HAIRCUT: Decimal = dec!(0.8);

pub(crate) fn checked_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    numerator.checked_div(denominator)
}

/// `collateral * 0.8 / total_credit`
pub fn collateral_ratio(collateral_value: Option<Money>, total_credit: Option<Money>) -> Option<Decimal> {
    checked_div(collateral_value? * COLLATERAL_HAIRCUT, total_credit?)
}

/// Collateral ratio per scenario over stressed collateral values. Scenarios
/// whose ratio cannot be computed are left out.
pub fn stressed_collateral_ratios(
    stressed_collateral: &ScenarioMap<Money>,
    total_credit: Option<Money>,
) -> ScenarioMap<Decimal> {
    stressed_collateral
        .iter()
        .filter_map(|(scenario, value)| {
            collateral_ratio(Some(*value), total_credit).map(|r| (*scenario, r))
        })
        .collect()
}

/// Net operating income ratio: `net_revenue / total_market_credit`.
pub fn operating_income_ratio(
    net_revenue: Option<Money>,
    total_market_credit: Option<Money>,
) -> Option<Decimal> {
    checked_div(net_revenue?, total_market_credit?)
}

/// `net_revenue * (1 - impact/100) / total_market_credit` per scenario.
pub fn stressed_operating_income_ratios(
    net_revenue: Option<Money>,
    total_market_credit: Option<Money>,
    impacts: &ScenarioMap<Percent>,
) -> ScenarioMap<Decimal> {
    let (Some(revenue), Some(credit)) = (net_revenue, total_market_credit) else {
        return ScenarioMap::new();
    };
    impacts
        .iter()
        .filter_map(|(scenario, impact)| {
            let stressed = revenue * (Decimal::ONE - *impact / dec!(100));
            checked_div(stressed, credit).map(|r| (*scenario, r))
        })
        .collect()
}

/// Combined loan-to-value: `loan / collateral_value`.
pub fn cltv(loan: Option<Money>, collateral_value: Option<Money>) -> Option<Decimal> {
    checked_div(loan?, collateral_value?)
}

/// CLTV per scenario over stressed collateral values.
pub fn stressed_cltv(loan: Option<Money>, stressed_collateral: &ScenarioMap<Money>) -> ScenarioMap<Decimal> {
    stressed_collateral
        .iter()
        .filter_map(|(scenario, value)| cltv(loan, Some(*value)).map(|r| (*scenario, r)))
        .collect()
}

/// Debt burden ratio: unsecured consumer credit over monthly income.
pub fn dbr(unsecured_credit: Option<Money>, annual_income: Option<Money>) -> Option<Decimal> {
    let monthly_income = checked_div(annual_income?, dec!(12))?;
    checked_div(unsecured_credit?, monthly_income)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collateral_ratio() {
        assert_eq!(collateral_ratio(Some(dec!(1000)), Some(dec!(800))), Some(dec!(1)));
        assert_eq!(collateral_ratio(Some(dec!(0)), Some(dec!(800))), Some(dec!(0)));
        assert_eq!(collateral_ratio(Some(dec!(1000)), Some(dec!(0))), None);
        assert_eq!(collateral_ratio(None, Some(dec!(800))), None);
    }

    #[test]
    fn test_stressed_collateral_ratios_keep_scenarios() {
        let stressed: ScenarioMap<Money> = [
            (Scenario::Orderly2030, dec!(1000)),
            (Scenario::NoPolicy2090, dec!(500)),
        ]
        .into_iter()
        .collect();
        let ratios = stressed_collateral_ratios(&stressed, Some(dec!(400)));
        assert_eq!(ratios[&Scenario::Orderly2030], dec!(2));
        assert_eq!(ratios[&Scenario::NoPolicy2090], dec!(1));
        assert!(stressed_collateral_ratios(&stressed, Some(dec!(0))).is_empty());
    }

    #[test]
    fn test_operating_income_ratio_and_stress() {
        assert_eq!(
            operating_income_ratio(Some(dec!(500)), Some(dec!(1000))),
            Some(dec!(0.5))
        );
        let impacts: ScenarioMap<Percent> = [(Scenario::Disorderly2050, dec!(20))].into_iter().collect();
        let stressed = stressed_operating_income_ratios(Some(dec!(500)), Some(dec!(1000)), &impacts);
        assert_eq!(stressed[&Scenario::Disorderly2050], dec!(0.4));
        assert!(stressed_operating_income_ratios(None, Some(dec!(1000)), &impacts).is_empty());
    }

    #[test]
    fn test_cltv_has_no_haircut() {
        assert_eq!(cltv(Some(dec!(600)), Some(dec!(1000))), Some(dec!(0.6)));
        let stressed: ScenarioMap<Money> = [(Scenario::Orderly2050, dec!(800))].into_iter().collect();
        assert_eq!(stressed_cltv(Some(dec!(600)), &stressed)[&Scenario::Orderly2050], dec!(0.75));
    }

    #[test]
    fn test_dbr_uses_monthly_income() {
        assert_eq!(dbr(Some(dec!(240000)), Some(dec!(1200000))), Some(dec!(2.4)));
        assert_eq!(dbr(Some(dec!(1)), Some(dec!(0))), None);
        assert_eq!(dbr(None, Some(dec!(1))), None);
    }
}
