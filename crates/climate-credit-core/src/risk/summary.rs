//! Expected loss and the per-horizon summary table.
//!
//! One row per EAD client, left-joined against the PD and LGD results by
//! client name. A client with no PD or LGD row keeps its exposure and gets
//! `None` for every rate of that group.

use std::collections::HashMap;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::portfolio::PortfolioKind;
use crate::risk::{ClientEad, ClientLgd, ClientPd};
use crate::scenario::{Horizon, ScenarioGroup};
use crate::types::{Money, Percent, Rate};

/// Summary column headers.
pub const CLIENT_COLUMN: &str = "客戶名";
pub const EXPOSURE_COLUMN: &str = "曝險金額";
const PD_SUFFIX: &str = "平均違約率(%)";
const LGD_SUFFIX: &str = "平均違約損失率(%)";
const EL_SUFFIX: &str = "估計可能損失數";

/// `pd/100 × lgd/100 × ead`, both rates in percent.
pub fn expected_loss(ead: Option<Money>, pd: Option<Percent>, lgd: Option<Percent>) -> Option<Money> {
    Some(pd? / dec!(100) * lgd? / dec!(100) * ead?)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Compute domestic orderly-transition EL like the other groups. Off by
    /// default: domestic orderly columns report PD and LGD only.
    pub orderly_expected_loss: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group: ScenarioGroup,
    /// Average PD in percent.
    pub pd: Option<Percent>,
    /// Average LGD in percent.
    pub lgd: Option<Percent>,
    pub expected_loss: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub client: String,
    pub exposure: Option<Money>,
    /// One entry per group of the table, in table order.
    pub groups: Vec<GroupSummary>,
}

impl SummaryRow {
    pub fn group(&self, group: ScenarioGroup) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.group == group)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub kind: PortfolioKind,
    pub horizon: Horizon,
    pub sheet_name: String,
    pub groups: Vec<ScenarioGroup>,
    pub rows: Vec<SummaryRow>,
}

/// Portfolio totals of a summary table over the values that were computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub exposure: Money,
    /// Summed expected loss per group; `None` when no client had one.
    pub expected_loss: Vec<(ScenarioGroup, Option<Money>)>,
}

impl SummaryTable {
    /// Flat column names, e.g. `基準情境_平均違約率(%)`.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec![CLIENT_COLUMN.to_string(), EXPOSURE_COLUMN.to_string()];
        for group in &self.groups {
            for suffix in [PD_SUFFIX, LGD_SUFFIX, EL_SUFFIX] {
                columns.push(format!("{}_{}", group.label(), suffix));
            }
        }
        columns
    }

    /// Rows as flat JSON objects keyed by [`SummaryTable::columns`], with
    /// `null` for values that are not computable.
    pub fn records(&self) -> Vec<Value> {
        fn number(value: Option<rust_decimal::Decimal>) -> Value {
            value.map_or(Value::Null, |v| Value::String(v.normalize().to_string()))
        }

        self.rows
            .iter()
            .map(|row| {
                let mut record = Map::new();
                record.insert(CLIENT_COLUMN.into(), Value::String(row.client.clone()));
                record.insert(EXPOSURE_COLUMN.into(), number(row.exposure));
                for summary in &row.groups {
                    let label = summary.group.label();
                    record.insert(format!("{}_{}", label, PD_SUFFIX), number(summary.pd));
                    record.insert(format!("{}_{}", label, LGD_SUFFIX), number(summary.lgd));
                    record.insert(
                        format!("{}_{}", label, EL_SUFFIX),
                        number(summary.expected_loss),
                    );
                }
                Value::Object(record)
            })
            .collect()
    }

    pub fn totals(&self) -> SummaryTotals {
        let exposure = self.rows.iter().filter_map(|r| r.exposure).sum();
        let expected_loss = self
            .groups
            .iter()
            .map(|&group| {
                let losses: Vec<Money> = self
                    .rows
                    .iter()
                    .filter_map(|r| r.group(group).and_then(|g| g.expected_loss))
                    .collect();
                let total = (!losses.is_empty()).then(|| losses.into_iter().sum());
                (group, total)
            })
            .collect();
        SummaryTotals {
            exposure,
            expected_loss,
        }
    }
}

fn first_by_client<T>(items: &[T], client: impl Fn(&T) -> &str) -> HashMap<&str, &T> {
    let mut index = HashMap::new();
    for item in items {
        index.entry(client(item)).or_insert(item);
    }
    index
}

/// Build the summary of one portfolio at one horizon.
pub fn assemble_summary(
    kind: PortfolioKind,
    horizon: Horizon,
    pds: &[ClientPd],
    lgds: &[ClientLgd],
    eads: &[ClientEad],
    options: &SummaryOptions,
) -> SummaryTable {
    let pd_index = first_by_client(pds, |p| p.client.as_str());
    let lgd_index = first_by_client(lgds, |l| l.client.as_str());
    let groups = kind.groups().to_vec();

    let rows = eads
        .iter()
        .map(|ead| {
            let pd = pd_index.get(ead.client.as_str());
            let lgd = lgd_index.get(ead.client.as_str());
            let groups = groups
                .iter()
                .map(|&group| {
                    let scenario = group.at(horizon);
                    let pd = pd.and_then(|p| p.pd(scenario));
                    let lgd = lgd
                        .and_then(|l| l.lgd(scenario))
                        .map(|rate: Rate| rate * dec!(100));
                    let expected_loss = if group == ScenarioGroup::Orderly
                        && !kind.is_overseas()
                        && !options.orderly_expected_loss
                    {
                        None
                    } else {
                        expected_loss(ead.ead, pd, lgd)
                    };
                    GroupSummary {
                        group,
                        pd,
                        lgd,
                        expected_loss,
                    }
                })
                .collect();
            SummaryRow {
                client: ead.client.clone(),
                exposure: ead.ead,
                groups,
            }
        })
        .collect();

    SummaryTable {
        kind,
        horizon,
        sheet_name: kind.sheet_name(horizon),
        groups,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::ScenarioPd;
    use crate::scenario::Scenario;
    use pretty_assertions::assert_eq;

    fn pd(client: &str, values: &[(Scenario, Percent)]) -> ClientPd {
        ClientPd {
            client: client.into(),
            scenarios: values
                .iter()
                .map(|(s, v)| {
                    (
                        *s,
                        ScenarioPd {
                            pd: Some(*v),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        }
    }

    fn lgd(client: &str, values: &[(Scenario, Rate)]) -> ClientLgd {
        ClientLgd {
            client: client.into(),
            scenarios: values.iter().map(|(s, v)| (*s, Some(*v))).collect(),
        }
    }

    fn ead(client: &str, value: Money) -> ClientEad {
        ClientEad {
            client: client.into(),
            ead: Some(value),
        }
    }

    #[test]
    fn test_expected_loss_scale() {
        assert_eq!(
            expected_loss(Some(dec!(1000000)), Some(dec!(2.5)), Some(dec!(45))),
            Some(dec!(11250))
        );
        assert_eq!(expected_loss(Some(dec!(1000000)), None, Some(dec!(45))), None);
        assert_eq!(expected_loss(None, Some(dec!(2.5)), Some(dec!(45))), None);
    }

    #[test]
    fn test_domestic_summary_join() {
        let pds = vec![pd(
            "Acme",
            &[
                (Scenario::Baseline, dec!(2.5)),
                (Scenario::Orderly2030, dec!(3)),
                (Scenario::Disorderly2030, dec!(4)),
            ],
        )];
        let lgds = vec![lgd(
            "Acme",
            &[
                (Scenario::Baseline, dec!(0.45)),
                (Scenario::Orderly2030, dec!(0.5)),
                (Scenario::Disorderly2030, dec!(0.5)),
            ],
        )];
        let eads = vec![ead("Acme", dec!(1000000)), ead("Ghost", dec!(10))];

        let table = assemble_summary(
            PortfolioKind::DomesticCorporate,
            Horizon::Y2030,
            &pds,
            &lgds,
            &eads,
            &SummaryOptions::default(),
        );
        assert_eq!(table.sheet_name, "國內授信彙總表(2030年)(企業授信)");
        assert_eq!(table.rows.len(), 2);

        let acme = &table.rows[0];
        let baseline = acme.group(ScenarioGroup::Baseline).unwrap();
        assert_eq!(baseline.lgd, Some(dec!(45)));
        assert_eq!(baseline.expected_loss, Some(dec!(11250)));

        let orderly = acme.group(ScenarioGroup::Orderly).unwrap();
        assert_eq!(orderly.pd, Some(dec!(3)));
        assert_eq!(orderly.expected_loss, None);

        let disorderly = acme.group(ScenarioGroup::Disorderly).unwrap();
        assert_eq!(disorderly.expected_loss, Some(dec!(20000)));

        let no_policy = acme.group(ScenarioGroup::NoPolicy).unwrap();
        assert_eq!(no_policy.pd, None);

        let ghost = &table.rows[1];
        assert_eq!(ghost.exposure, Some(dec!(10)));
        assert!(ghost
            .groups
            .iter()
            .all(|g| g.pd.is_none() && g.lgd.is_none() && g.expected_loss.is_none()));
    }

    #[test]
    fn test_orderly_expected_loss_option() {
        let pds = vec![pd("Acme", &[(Scenario::Orderly2050, dec!(2))])];
        let lgds = vec![lgd("Acme", &[(Scenario::Orderly2050, dec!(0.5))])];
        let eads = vec![ead("Acme", dec!(1000))];
        let options = SummaryOptions {
            orderly_expected_loss: true,
        };
        let table = assemble_summary(
            PortfolioKind::DomesticMortgage,
            Horizon::Y2050,
            &pds,
            &lgds,
            &eads,
            &options,
        );
        let orderly = table.rows[0].group(ScenarioGroup::Orderly).unwrap();
        assert_eq!(orderly.expected_loss, Some(dec!(10)));
    }

    #[test]
    fn test_overseas_summary_has_three_groups_and_orderly_el() {
        let pds = vec![pd("Globex", &[(Scenario::Orderly2030, dec!(1))])];
        let lgds = vec![lgd("Globex", &[(Scenario::Orderly2030, dec!(0.6))])];
        let eads = vec![ead("Globex", dec!(5000))];
        let table = assemble_summary(
            PortfolioKind::OverseasCredit,
            Horizon::Y2030,
            &pds,
            &lgds,
            &eads,
            &SummaryOptions::default(),
        );
        assert_eq!(table.groups.len(), 3);
        assert_eq!(table.columns().len(), 2 + 3 * 3);
        let orderly = table.rows[0].group(ScenarioGroup::Orderly).unwrap();
        assert_eq!(orderly.expected_loss, Some(dec!(30)));
    }

    #[test]
    fn test_records_use_chinese_columns_and_null() {
        let table = assemble_summary(
            PortfolioKind::DomesticPersonalOther,
            Horizon::Y2030,
            &[],
            &[],
            &[ead("Chen", dec!(100))],
            &SummaryOptions::default(),
        );
        let records = table.records();
        assert_eq!(records[0]["客戶名"], "Chen");
        assert_eq!(records[0]["曝險金額"], "100");
        assert!(records[0]["無政策情境_平均違約率(%)"].is_null());
        let keys: Vec<&String> = records[0].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), table.columns().len());
        assert_eq!(keys[2], "基準情境_平均違約率(%)");
    }

    #[test]
    fn test_totals_skip_uncomputed() {
        let pds = vec![pd("Acme", &[(Scenario::Baseline, dec!(2))])];
        let lgds = vec![lgd("Acme", &[(Scenario::Baseline, dec!(0.5))])];
        let eads = vec![ead("Acme", dec!(1000)), ead("Ghost", dec!(500))];
        let table = assemble_summary(
            PortfolioKind::DomesticCorporate,
            Horizon::Y2050,
            &pds,
            &lgds,
            &eads,
            &SummaryOptions::default(),
        );
        let totals = table.totals();
        assert_eq!(totals.exposure, dec!(1500));
        assert_eq!(
            totals.expected_loss[0],
            (ScenarioGroup::Baseline, Some(dec!(10)))
        );
        assert_eq!(totals.expected_loss[3], (ScenarioGroup::NoPolicy, None));
    }

    #[test]
    fn test_duplicate_client_joins_first_match() {
        let pds = vec![
            pd("Acme", &[(Scenario::Baseline, dec!(1))]),
            pd("Acme", &[(Scenario::Baseline, dec!(9))]),
        ];
        let table = assemble_summary(
            PortfolioKind::DomesticCorporate,
            Horizon::Y2030,
            &pds,
            &[],
            &[ead("Acme", dec!(1))],
            &SummaryOptions::default(),
        );
        assert_eq!(
            table.rows[0].group(ScenarioGroup::Baseline).unwrap().pd,
            Some(dec!(1))
        );
    }
}
