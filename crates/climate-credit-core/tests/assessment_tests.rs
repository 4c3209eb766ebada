use climate_credit_core::pipeline::{assess_portfolio, AssessmentOptions};
use climate_credit_core::portfolio::{CorporateClient, MortgageClient, OverseasClient, Portfolio};
use climate_credit_core::reference::{ReferenceData, ReferenceValues};
use climate_credit_core::{Horizon, Scenario, ScenarioGroup};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

// ===========================================================================
// Reference data fixture
// ===========================================================================

/// Every stressed scenario maps Zhongshan district to risk level 1 (10%
/// collateral loss) and to revenue risk level 2 (5% revenue loss).
fn reference_data() -> ReferenceData {
    let stressed_labels = [
        "2050淨零轉型 2030",
        "2050淨零轉型 2050",
        "無序轉型 2030",
        "無序轉型 2050",
        "無政策情境 2030",
        "無政策情境 2050",
        "無政策情境 2090",
    ];
    let mut region = json!({ "縣市": "臺北市", "鄉鎮市區": "中山區" });
    let mut revenue_region = region.clone();
    let mut collateral_level = json!({ "風險等級": 1, "百分位數": "P50" });
    let mut revenue_level = json!({ "風險等級": 2 });
    let mut industry_level = json!({ "風險等級": 1 });
    for label in stressed_labels {
        region[label] = json!(1);
        revenue_region[label] = json!(2);
        collateral_level[label] = json!(10);
        revenue_level[label] = json!(5);
        industry_level[label] = json!(5);
    }

    let values = ReferenceValues {
        corporate_pd: json!({ "C": {
            "基準情境": { ">=0.5": { ">=1": 1.0, "<1": 2.0 }, "<0.5": { ">=0": 4.0 } },
            "2050淨零轉型 2030": { ">=0.5": { ">=0": 1.5 } },
            "無序轉型 2030": { ">=0.5": { ">=0": { "para_a": 2, "para_b": 0 } } },
            "無政策情境 2030": { "<0.5 or >=0.5": { ">=0": 3.0 } }
        } }),
        industry_to_sector: json!({ "C": ["Cement"] }),
        mortgage_pd: json!({
            "無序轉型 2030": { ">=2": { ">=0.7": 5.0, "<0.7": 1.5 }, "<2": { ">=0": 0.8 } }
        }),
        overseas_pd: json!({ "BBB": 0.2, "BBB-": 0.3, "BB+": 0.5, "BB": 0.8, "BB-": 1.2 }),
        collateral_loss_by_region: json!([region]),
        collateral_loss_by_risk_level: json!([collateral_level]),
        revenue_loss_by_region: json!([revenue_region]),
        revenue_loss_by_risk_level: json!([revenue_level]),
        industry_classification: json!({
            "Group 1": [{ "Industry": "Cement" }],
            "Group 2": [{ "Industry": "Shipping" }]
        }),
        industry_impact_by_risk_level: json!([industry_level]),
        country_classification: json!({ "countries": [
            { "name_chinese": "日本", "name_english": "Japan", "risk_level": "中低" }
        ] }),
        scenario_adjustments: json!({
            "A": [0, 0, 0, 0],
            "B": [1, 1.5, 2, 2.5]
        }),
        ..Default::default()
    };
    ReferenceData::from_values(&values).unwrap()
}

// ===========================================================================
// Domestic corporate
// ===========================================================================

fn corporate_portfolio() -> Portfolio {
    Portfolio::DomesticCorporate(vec![
        CorporateClient {
            client: Some("台泥".into()),
            city: Some("台北市".into()),
            district: Some("中山區".into()),
            industry: Some("Cement".into()),
            collateral_city: Some("台北市".into()),
            collateral_district: Some("中山區".into()),
            net_revenue: Some(dec!(800_000)),
            total_market_credit: Some(dec!(1_000_000)),
            total_credit: Some(dec!(1_000_000)),
            credit: Some(dec!(1_000_000)),
            collateral_value: Some(dec!(1_000_000)),
            real_estate_collateral: true,
            outstanding_balance: Some(dec!(900_000)),
            off_balance_sheet_equivalent: Some(dec!(100_000)),
            ..Default::default()
        },
        CorporateClient {
            client: None,
            outstanding_balance: Some(dec!(1)),
            ..Default::default()
        },
    ])
}

#[test]
fn test_corporate_drivers_under_stress() {
    let out = assess_portfolio(
        &reference_data(),
        &corporate_portfolio(),
        &AssessmentOptions::default(),
    )
    .unwrap();
    let pd = &out.result.pd[0].scenarios;

    // 1,000,000 * 0.8 / 1,000,000
    assert_eq!(pd[&Scenario::Baseline].collateral_ratio, Some(dec!(0.8)));
    assert_eq!(pd[&Scenario::Baseline].pd, Some(dec!(2.0)));

    // Collateral loses 10%; revenue loses 5% transition + 5% physical
    let disorderly = &pd[&Scenario::Disorderly2030];
    assert_eq!(disorderly.collateral_ratio, Some(dec!(0.72)));
    assert_eq!(disorderly.operating_income_ratio, Some(dec!(0.72)));
    assert_eq!(disorderly.pd, Some(dec!(2)));

    // Disjunctive outer range
    assert_eq!(pd[&Scenario::NoPolicy2030].pd, Some(dec!(3.0)));
    // No table entry
    assert_eq!(pd[&Scenario::Disorderly2050].pd, None);
}

#[test]
fn test_corporate_summary_2030() {
    let out = assess_portfolio(
        &reference_data(),
        &corporate_portfolio(),
        &AssessmentOptions::default(),
    )
    .unwrap();
    assert_eq!(out.result.skipped_rows, 1);
    assert_eq!(out.result.ead[0].ead, Some(dec!(1_000_000)));

    let table = &out.result.summaries[0];
    assert_eq!(table.horizon, Horizon::Y2030);
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.client, "台泥");

    // Baseline: PD 2%, LGD 1 - 75% = 25%
    let baseline = row.group(ScenarioGroup::Baseline).unwrap();
    assert_eq!(baseline.lgd, Some(dec!(25)));
    assert_eq!(baseline.expected_loss, Some(dec!(5000)));

    // Disorderly: LGD 1 - 900,000 * 0.75 / 1,000,000 = 32.5%
    let disorderly = row.group(ScenarioGroup::Disorderly).unwrap();
    assert_eq!(disorderly.lgd, Some(dec!(32.5)));
    assert_eq!(disorderly.expected_loss, Some(dec!(6500)));

    // Orderly EL is only reported when requested
    let orderly = row.group(ScenarioGroup::Orderly).unwrap();
    assert_eq!(orderly.pd, Some(dec!(1.5)));
    assert_eq!(orderly.expected_loss, None);
}

#[test]
fn test_corporate_orderly_expected_loss_enabled() {
    let options = AssessmentOptions {
        horizons: vec![Horizon::Y2030],
        orderly_expected_loss: true,
    };
    let out = assess_portfolio(&reference_data(), &corporate_portfolio(), &options).unwrap();
    assert_eq!(out.result.summaries.len(), 1);
    let orderly = out.result.summaries[0].rows[0]
        .group(ScenarioGroup::Orderly)
        .unwrap();
    // 1.5% * 32.5% * 1,000,000
    assert_eq!(orderly.expected_loss, Some(dec!(4875)));
}

// ===========================================================================
// Domestic mortgage
// ===========================================================================

#[test]
fn test_mortgage_assessment() {
    let portfolio = Portfolio::DomesticMortgage(vec![MortgageClient {
        client: Some("王小明".into()),
        collateral_city: Some("臺北市".into()),
        collateral_district: Some("中山區".into()),
        collateral_value: Some(dec!(10_000_000)),
        loan_amount: Some(dec!(7_200_000)),
        credit: Some(dec!(8_000_000)),
        unsecured_credit: Some(dec!(300_000)),
        annual_income: Some(dec!(1_200_000)),
        outstanding_balance: Some(dec!(6_000_000)),
    }]);
    let out = assess_portfolio(&reference_data(), &portfolio, &AssessmentOptions::default())
        .unwrap();
    let pd = &out.result.pd[0];

    // DBR 300,000 / 100,000 = 3; stressed CLTV 7.2M / 9M = 0.8
    assert_eq!(pd.pd(Scenario::Baseline), None);
    assert_eq!(pd.scenarios[&Scenario::Disorderly2030].cltv, Some(dec!(0.8)));
    assert_eq!(pd.pd(Scenario::Disorderly2030), Some(dec!(5.0)));

    let lgd = &out.result.lgd[0];
    // 1 - 10M * 0.75 / 8M floors at 10%
    assert_eq!(lgd.lgd(Scenario::Baseline), Some(dec!(0.10)));
    // 1 - 9M * 0.75 / 8M
    assert_eq!(lgd.lgd(Scenario::Disorderly2030), Some(dec!(0.15625)));

    let row = &out.result.summaries[0].rows[0];
    assert_eq!(row.exposure, Some(dec!(6_000_000)));
    // 5% * 15.625% * 6,000,000
    assert_eq!(
        row.group(ScenarioGroup::Disorderly).unwrap().expected_loss,
        Some(dec!(46875))
    );
    assert_eq!(row.group(ScenarioGroup::Baseline).unwrap().expected_loss, None);
}

// ===========================================================================
// Overseas
// ===========================================================================

#[test]
fn test_overseas_notch_shift_and_missing_no_policy() {
    let portfolio = Portfolio::OverseasCredit(vec![
        OverseasClient {
            client: Some("Nippon Yusen".into()),
            rating: Some("BBB".into()),
            country: Some("日本".into()),
            industry: Some("Shipping".into()),
            credit: Some(dec!(1000)),
            recovery_rate: Some(dec!(40)),
            outstanding_balance: Some(dec!(1000)),
            off_balance_sheet_equivalent: Some(dec!(0)),
            ..Default::default()
        },
        OverseasClient {
            client: Some("Unrated".into()),
            outstanding_balance: Some(dec!(50)),
            off_balance_sheet_equivalent: Some(dec!(0)),
            ..Default::default()
        },
    ]);
    let out = assess_portfolio(&reference_data(), &portfolio, &AssessmentOptions::default())
        .unwrap();

    // Medium-low country, industry group 2: grade B
    let pd = &out.result.pd[0];
    assert_eq!(pd.pd(Scenario::Baseline), Some(dec!(0.2)));
    assert_eq!(pd.pd(Scenario::Orderly2030), Some(dec!(0.3)));
    // 1.5 notches: mean of BBB- and BB+
    assert_eq!(pd.pd(Scenario::Orderly2050), Some(dec!(0.4)));
    assert_eq!(pd.pd(Scenario::Disorderly2030), Some(dec!(0.5)));
    assert!(!pd.scenarios.contains_key(&Scenario::NoPolicy2030));

    // Unrated defaults to BB
    assert_eq!(out.result.pd[1].pd(Scenario::Baseline), Some(dec!(0.8)));
    assert_eq!(out.result.pd[1].pd(Scenario::Orderly2030), None);

    let table = &out.result.summaries[0];
    assert_eq!(table.sheet_name, "國外授信彙總表(2030年)");
    assert_eq!(table.groups.len(), 3);
    let orderly = table.rows[0].group(ScenarioGroup::Orderly).unwrap();
    // LGD 1 - 1000 * 40% / 1000 = 60%; EL 0.3% * 60% * 1000
    assert_eq!(orderly.lgd, Some(dec!(60)));
    assert_eq!(orderly.expected_loss, Some(dec!(1.8)));
}

#[test]
fn test_portfolio_from_json_document() {
    let portfolio: Portfolio = serde_json::from_value(json!({
        "kind": "domestic_investment",
        "clients": [{
            "客戶名": "台泥",
            "股權投資": "是",
            "現貸餘額": 500,
            "表外交易信用暴險相當額": 0
        }]
    }))
    .unwrap();
    let out = assess_portfolio(&reference_data(), &portfolio, &AssessmentOptions::default())
        .unwrap();
    let lgd = &out.result.lgd[0];
    assert!(lgd.scenarios.values().all(|v| *v == Some(dec!(1))));
    assert_eq!(
        out.result.summaries[1].sheet_name,
        "國內投資彙總表(2050年)"
    );
}
