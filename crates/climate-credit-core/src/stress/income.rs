use rust_decimal::Decimal;
use tracing::debug;

use crate::lookup::IndustryClassification;
use crate::scenario::{Scenario, ScenarioMap};
use crate::stress::regional::{RegionalLossTable, RiskLevelTable};
use crate::types::Percent;

/// Revenue impact of climate stress on a company: transition risk from its
/// industry group plus physical risk at its registered address.
#[derive(Debug, Clone, Default)]
pub struct IncomeImpactModel {
    pub industries: IndustryClassification,
    /// Impact percentages keyed by risk level, where industry group `n`
    /// reads risk level `n`.
    pub transition: RiskLevelTable,
    pub physical: RegionalLossTable,
}

impl IncomeImpactModel {
    pub fn new(
        industries: IndustryClassification,
        transition: RiskLevelTable,
        physical: RegionalLossTable,
    ) -> Self {
        IncomeImpactModel {
            industries,
            transition,
            physical,
        }
    }

    /// Transition-risk impact per scenario, `None` for an unclassified
    /// industry or a group with no impact row.
    pub fn transition_impacts(&self, industry: &str) -> Option<ScenarioMap<Percent>> {
        let group = self.industries.group_of(industry)?;
        let record = self.transition.level(Decimal::from(group))?;
        Some(record.loss_percentages.clone())
    }

    /// Physical-risk revenue loss per scenario, `None` for an unknown region.
    pub fn physical_impacts(&self, city: &str, district: &str) -> Option<ScenarioMap<Percent>> {
        self.physical.loss_percentages(city, district)
    }

    /// Transition plus physical impact for every stressed scenario. A side
    /// with no data counts as zero, so the result always covers all seven.
    pub fn total_impacts(&self, industry: &str, city: &str, district: &str) -> ScenarioMap<Percent> {
        let transition = self.transition_impacts(industry);
        let physical = self.physical_impacts(city, district);
        if transition.is_none() && physical.is_none() {
            debug!(industry, city, district, "no revenue impact data, assuming zero");
        }

        let side = |impacts: &Option<ScenarioMap<Percent>>, scenario: Scenario| {
            impacts
                .as_ref()
                .and_then(|m| m.get(&scenario).copied())
                .unwrap_or(Decimal::ZERO)
        };

        Scenario::STRESSED
            .into_iter()
            .map(|s| (s, side(&transition, s) + side(&physical, s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn model() -> IncomeImpactModel {
        let industries = IndustryClassification::from_json(&json!({
            "Group 1": [{ "Industry": "Software" }],
            "Group 2": [{ "Industry": "Cement" }],
            "Group 3": [{ "Industry": "Shipping" }]
        }))
        .unwrap();
        let transition = RiskLevelTable::from_json(
            "impact_on_industries",
            &json!([
                { "風險等級": 1, "百分位數": "low", "2050淨零轉型 2030": 1, "無序轉型 2050": 2 },
                { "風險等級": 2, "2050淨零轉型 2030": 5, "無序轉型 2050": 8, "無政策情境 2090": 1 }
            ]),
        )
        .unwrap();
        let physical = RegionalLossTable::from_json(
            "revenue_loss",
            &json!([{ "縣市": "臺中市", "鄉鎮市區": "西屯區", "2050淨零轉型 2030": 1, "無政策情境 2090": 2 }]),
            &json!([
                { "風險等級": 1, "2050淨零轉型 2030": 0.5 },
                { "風險等級": 2, "無政策情境 2090": 3 }
            ]),
            true,
        )
        .unwrap();
        IncomeImpactModel::new(industries, transition, physical)
    }

    #[test]
    fn test_total_sums_both_sides() {
        let totals = model().total_impacts("Cement", "台中市", "西屯區");
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[&Scenario::Orderly2030], dec!(5.5));
        assert_eq!(totals[&Scenario::Disorderly2050], dec!(8));
        assert_eq!(totals[&Scenario::NoPolicy2090], dec!(4));
        assert_eq!(totals[&Scenario::NoPolicy2030], dec!(0));
    }

    #[test]
    fn test_missing_sides_count_as_zero() {
        let m = model();
        let totals = m.total_impacts("Banking", "高雄市", "前金區");
        assert_eq!(totals.len(), 7);
        assert!(totals.values().all(|v| v.is_zero()));

        // group 3 has no impact row
        assert_eq!(m.transition_impacts("Shipping"), None);
        let totals = m.total_impacts("Shipping", "臺中市", "西屯區");
        assert_eq!(totals[&Scenario::Orderly2030], dec!(0.5));
    }
}
