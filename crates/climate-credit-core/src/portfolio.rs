//! Portfolio input records.
//!
//! Field names accept both the snake_case API names and the Chinese column
//! headers of the source spreadsheets, so a sheet exported to CSV or JSON
//! deserializes without renaming. Every numeric field is optional: an
//! absent value makes the dependent metrics not computable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ClimateCreditError;
use crate::scenario::{Horizon, Scenario, ScenarioGroup};
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Text cell that may have been typed as a number in the sheet.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Text(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(Scalar::Int(i)) => Some(i.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        Some(Scalar::Bool(b)) => Some(b.to_string()),
    })
}

/// `是`/`否` flags, also accepting booleans, 1/0 and yes/no.
fn yes_no<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(i)) => i != 0,
        Some(Scalar::Float(f)) => f != 0.0,
        Some(Scalar::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "是" | "y" | "yes" | "true" | "1"
        ),
    })
}

/// A portfolio row with a client identity.
pub trait ClientRow {
    fn client(&self) -> Option<&str>;

    /// Trimmed, non-empty client name. Rows without one are skipped.
    fn client_name(&self) -> Option<&str> {
        self.client().map(str::trim).filter(|name| !name.is_empty())
    }
}

macro_rules! client_row {
    ($($record:ty),+) => {
        $(impl ClientRow for $record {
            fn client(&self) -> Option<&str> {
                self.client.as_deref()
            }
        })+
    };
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Domestic corporate borrower, also used for domestic investment holdings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateClient {
    #[serde(default, alias = "客戶名", deserialize_with = "text")]
    pub client: Option<String>,
    /// Registered city, drives the physical revenue-loss lookup.
    #[serde(default, alias = "登記縣市", deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(default, alias = "登記鄉鎮市區", deserialize_with = "text")]
    pub district: Option<String>,
    #[serde(default, alias = "行業別", deserialize_with = "text")]
    pub industry: Option<String>,
    #[serde(default, alias = "擔保品縣市", deserialize_with = "text")]
    pub collateral_city: Option<String>,
    #[serde(default, alias = "擔保品鄉鎮市區", deserialize_with = "text")]
    pub collateral_district: Option<String>,
    #[serde(default, alias = "營業淨額")]
    pub net_revenue: Option<Money>,
    #[serde(default, alias = "全市場授信金額")]
    pub total_market_credit: Option<Money>,
    /// Credit line, the collateral-ratio denominator.
    #[serde(default, alias = "貸放額度")]
    pub total_credit: Option<Money>,
    /// Credit amount, the LGD denominator.
    #[serde(default, alias = "授信金額")]
    pub credit: Option<Money>,
    #[serde(default, alias = "擔保品價值")]
    pub collateral_value: Option<Money>,
    #[serde(default, alias = "是否有不動產擔保品", deserialize_with = "yes_no")]
    pub real_estate_collateral: bool,
    #[serde(default, alias = "是否有其他擔保品", deserialize_with = "yes_no")]
    pub other_collateral: bool,
    #[serde(default, alias = "擔保品/無擔回收率(%)")]
    pub recovery_rate: Option<Percent>,
    #[serde(default, alias = "現貸餘額")]
    pub outstanding_balance: Option<Money>,
    #[serde(default, alias = "表外交易信用暴險相當額")]
    pub off_balance_sheet_equivalent: Option<Money>,
    /// Equity holding: loses the full exposure on default.
    #[serde(default, alias = "股權投資", deserialize_with = "yes_no")]
    pub equity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MortgageClient {
    #[serde(default, alias = "客戶名", deserialize_with = "text")]
    pub client: Option<String>,
    #[serde(default, alias = "擔保品縣市", deserialize_with = "text")]
    pub collateral_city: Option<String>,
    #[serde(default, alias = "擔保品鄉鎮市區", deserialize_with = "text")]
    pub collateral_district: Option<String>,
    #[serde(default, alias = "擔保品價值")]
    pub collateral_value: Option<Money>,
    /// Mortgage amount, the CLTV numerator.
    #[serde(default, alias = "貸放額度")]
    pub loan_amount: Option<Money>,
    #[serde(default, alias = "授信金額")]
    pub credit: Option<Money>,
    #[serde(default, alias = "消金無擔保授信金額")]
    pub unsecured_credit: Option<Money>,
    #[serde(default, alias = "年收入")]
    pub annual_income: Option<Money>,
    #[serde(default, alias = "現貸餘額")]
    pub outstanding_balance: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalOtherClient {
    #[serde(default, alias = "客戶名", deserialize_with = "text")]
    pub client: Option<String>,
    #[serde(default, alias = "消金無擔保授信金額")]
    pub unsecured_credit: Option<Money>,
    #[serde(default, alias = "年收入")]
    pub annual_income: Option<Money>,
    #[serde(default, alias = "是否有擔保品", deserialize_with = "yes_no")]
    pub collateralized: bool,
    #[serde(default, alias = "擔保品價值")]
    pub collateral_value: Option<Money>,
    #[serde(default, alias = "授信金額")]
    pub credit: Option<Money>,
    #[serde(default, alias = "擔保品/無擔回收率(%)")]
    pub recovery_rate: Option<Percent>,
    #[serde(default, alias = "現貸餘額")]
    pub outstanding_balance: Option<Money>,
    #[serde(default, alias = "本行雙卡未動用之有效額度")]
    pub unused_card_limit: Option<Money>,
}

/// Overseas borrower or overseas investment holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverseasClient {
    #[serde(default, alias = "客戶名", deserialize_with = "text")]
    pub client: Option<String>,
    #[serde(default, alias = "S&P信用評級", deserialize_with = "text")]
    pub rating: Option<String>,
    #[serde(default, alias = "國家別", deserialize_with = "text")]
    pub country: Option<String>,
    #[serde(default, alias = "行業別", deserialize_with = "text")]
    pub industry: Option<String>,
    #[serde(default, alias = "是否有擔保品", deserialize_with = "yes_no")]
    pub collateralized: bool,
    #[serde(default, alias = "擔保品價值")]
    pub collateral_value: Option<Money>,
    #[serde(default, alias = "授信金額")]
    pub credit: Option<Money>,
    #[serde(default, alias = "擔保品/無擔回收率(%)")]
    pub recovery_rate: Option<Percent>,
    #[serde(default, alias = "現貸餘額")]
    pub outstanding_balance: Option<Money>,
    #[serde(default, alias = "表外交易信用暴險相當額")]
    pub off_balance_sheet_equivalent: Option<Money>,
}

client_row!(CorporateClient, MortgageClient, PersonalOtherClient, OverseasClient);

// ---------------------------------------------------------------------------
// Portfolio kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioKind {
    DomesticCorporate,
    DomesticMortgage,
    DomesticPersonalOther,
    OverseasCredit,
    DomesticInvestment,
    OverseasInvestment,
}

impl PortfolioKind {
    pub const ALL: [PortfolioKind; 6] = [
        PortfolioKind::DomesticCorporate,
        PortfolioKind::DomesticMortgage,
        PortfolioKind::DomesticPersonalOther,
        PortfolioKind::OverseasCredit,
        PortfolioKind::DomesticInvestment,
        PortfolioKind::OverseasInvestment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PortfolioKind::DomesticCorporate => "domestic_corporate",
            PortfolioKind::DomesticMortgage => "domestic_mortgage",
            PortfolioKind::DomesticPersonalOther => "domestic_personal_other",
            PortfolioKind::OverseasCredit => "overseas_credit",
            PortfolioKind::DomesticInvestment => "domestic_investment",
            PortfolioKind::OverseasInvestment => "overseas_investment",
        }
    }

    pub fn is_overseas(self) -> bool {
        matches!(
            self,
            PortfolioKind::OverseasCredit | PortfolioKind::OverseasInvestment
        )
    }

    /// Scenarios assessed for this kind of portfolio.
    pub fn scenarios(self) -> &'static [Scenario] {
        if self.is_overseas() {
            &Scenario::OVERSEAS
        } else {
            &Scenario::ALL
        }
    }

    /// Column groups of the summary table.
    pub fn groups(self) -> &'static [ScenarioGroup] {
        if self.is_overseas() {
            &ScenarioGroup::OVERSEAS
        } else {
            &ScenarioGroup::DOMESTIC
        }
    }

    /// Worksheet title of the summary at a horizon.
    pub fn sheet_name(self, horizon: Horizon) -> String {
        let year = horizon.year();
        match self {
            PortfolioKind::DomesticCorporate => format!("國內授信彙總表({}年)(企業授信)", year),
            PortfolioKind::DomesticMortgage => {
                format!("國內授信彙總表({}年)(個人授信-房貸擔保品)", year)
            }
            PortfolioKind::DomesticPersonalOther => {
                format!("國內授信彙總表({}年)(個人授信-其他擔保品)", year)
            }
            PortfolioKind::OverseasCredit => format!("國外授信彙總表({}年)", year),
            PortfolioKind::DomesticInvestment => format!("國內投資彙總表({}年)", year),
            PortfolioKind::OverseasInvestment => format!("國外投資彙總表({}年)", year),
        }
    }
}

impl fmt::Display for PortfolioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortfolioKind {
    type Err = ClimateCreditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        PortfolioKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ClimateCreditError::InvalidInput {
                field: "kind".into(),
                reason: format!(
                    "unknown portfolio kind '{}' (expected one of {})",
                    s,
                    PortfolioKind::ALL.map(PortfolioKind::as_str).join(", ")
                ),
            })
    }
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

/// A portfolio of one kind: `{"kind": "...", "clients": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "clients", rename_all = "snake_case")]
pub enum Portfolio {
    DomesticCorporate(Vec<CorporateClient>),
    DomesticMortgage(Vec<MortgageClient>),
    DomesticPersonalOther(Vec<PersonalOtherClient>),
    OverseasCredit(Vec<OverseasClient>),
    DomesticInvestment(Vec<CorporateClient>),
    OverseasInvestment(Vec<OverseasClient>),
}

impl Portfolio {
    pub fn kind(&self) -> PortfolioKind {
        match self {
            Portfolio::DomesticCorporate(_) => PortfolioKind::DomesticCorporate,
            Portfolio::DomesticMortgage(_) => PortfolioKind::DomesticMortgage,
            Portfolio::DomesticPersonalOther(_) => PortfolioKind::DomesticPersonalOther,
            Portfolio::OverseasCredit(_) => PortfolioKind::OverseasCredit,
            Portfolio::DomesticInvestment(_) => PortfolioKind::DomesticInvestment,
            Portfolio::OverseasInvestment(_) => PortfolioKind::OverseasInvestment,
        }
    }

    /// Number of rows, including rows that will be skipped.
    pub fn len(&self) -> usize {
        match self {
            Portfolio::DomesticCorporate(c) | Portfolio::DomesticInvestment(c) => c.len(),
            Portfolio::DomesticMortgage(c) => c.len(),
            Portfolio::DomesticPersonalOther(c) => c.len(),
            Portfolio::OverseasCredit(c) | Portfolio::OverseasInvestment(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_corporate_from_chinese_headers() {
        let client: CorporateClient = serde_json::from_value(json!({
            "客戶名": "台積電",
            "登記縣市": "新竹市",
            "行業別": "半導體",
            "營業淨額": 1000,
            "全市場授信金額": "250.5",
            "是否有不動產擔保品": "是",
            "是否有其他擔保品": "否",
            "擔保品/無擔回收率(%)": null
        }))
        .unwrap();
        assert_eq!(client.client_name(), Some("台積電"));
        assert_eq!(client.net_revenue, Some(dec!(1000)));
        assert_eq!(client.total_market_credit, Some(dec!(250.5)));
        assert!(client.real_estate_collateral);
        assert!(!client.other_collateral);
        assert_eq!(client.recovery_rate, None);
        assert_eq!(client.collateral_value, None);
    }

    #[test]
    fn test_blank_or_missing_client_name() {
        let blank: MortgageClient = serde_json::from_value(json!({ "client": "  " })).unwrap();
        assert_eq!(blank.client_name(), None);
        let missing: MortgageClient = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.client_name(), None);
        let numeric: OverseasClient = serde_json::from_value(json!({ "客戶名": 1234 })).unwrap();
        assert_eq!(numeric.client_name(), Some("1234"));
    }

    #[test]
    fn test_yes_no_variants() {
        for (raw, expected) in [
            (json!("是"), true),
            (json!("否"), false),
            (json!(true), true),
            (json!(0), false),
            (json!("Yes"), true),
            (json!(null), false),
        ] {
            let c: PersonalOtherClient =
                serde_json::from_value(json!({ "是否有擔保品": raw })).unwrap();
            assert_eq!(c.collateralized, expected);
        }
    }

    #[test]
    fn test_tagged_portfolio() {
        let portfolio: Portfolio = serde_json::from_value(json!({
            "kind": "overseas_investment",
            "clients": [{ "client": "Acme", "rating": "BBB", "country": "Japan" }]
        }))
        .unwrap();
        assert_eq!(portfolio.kind(), PortfolioKind::OverseasInvestment);
        assert_eq!(portfolio.len(), 1);
        assert!(portfolio.kind().is_overseas());
        assert_eq!(portfolio.kind().scenarios().len(), 5);
        assert_eq!(portfolio.kind().groups().len(), 3);
    }

    #[test]
    fn test_kind_from_str_and_sheet_name() {
        assert_eq!(
            "domestic-mortgage".parse::<PortfolioKind>().unwrap(),
            PortfolioKind::DomesticMortgage
        );
        assert!("retail".parse::<PortfolioKind>().is_err());
        assert_eq!(
            PortfolioKind::DomesticCorporate.sheet_name(Horizon::Y2030),
            "國內授信彙總表(2030年)(企業授信)"
        );
        assert_eq!(
            PortfolioKind::OverseasCredit.sheet_name(Horizon::Y2050),
            "國外授信彙總表(2050年)"
        );
    }
}
