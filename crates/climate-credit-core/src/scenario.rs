//! Climate scenarios, reporting horizons and scenario groups.
//!
//! The eight scenarios are fixed. Reference tables key them by their
//! Chinese labels (`基準情境`, `2050淨零轉型 2030`, ...), which is how
//! [`Scenario::from_label`] resolves them at load time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-scenario results. A scenario missing from the map was not produced.
pub type ScenarioMap<T> = BTreeMap<Scenario, T>;

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

/// One of the eight climate scenarios.
///
/// Declaration order is the column order used in reports; it carries no
/// meaning for the computations themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Baseline,
    /// Net Zero 2050 (orderly transition), 2030 horizon
    Orderly2030,
    /// Net Zero 2050 (orderly transition), 2050 horizon
    Orderly2050,
    Disorderly2030,
    Disorderly2050,
    /// Current policies (no new policy), 2030 horizon
    NoPolicy2030,
    NoPolicy2050,
    NoPolicy2090,
}

impl Scenario {
    pub const ALL: [Scenario; 8] = [
        Scenario::Baseline,
        Scenario::Orderly2030,
        Scenario::Orderly2050,
        Scenario::Disorderly2030,
        Scenario::Disorderly2050,
        Scenario::NoPolicy2030,
        Scenario::NoPolicy2050,
        Scenario::NoPolicy2090,
    ];

    /// The seven non-baseline scenarios produced by the stress transforms.
    pub const STRESSED: [Scenario; 7] = [
        Scenario::Orderly2030,
        Scenario::Orderly2050,
        Scenario::Disorderly2030,
        Scenario::Disorderly2050,
        Scenario::NoPolicy2030,
        Scenario::NoPolicy2050,
        Scenario::NoPolicy2090,
    ];

    /// Stressed scenarios assessed for overseas exposures, in the order the
    /// positional notch-shift lists are written.
    pub const OVERSEAS_STRESSED: [Scenario; 4] = [
        Scenario::Orderly2030,
        Scenario::Orderly2050,
        Scenario::Disorderly2030,
        Scenario::Disorderly2050,
    ];

    /// Baseline plus [`Scenario::OVERSEAS_STRESSED`].
    pub const OVERSEAS: [Scenario; 5] = [
        Scenario::Baseline,
        Scenario::Orderly2030,
        Scenario::Orderly2050,
        Scenario::Disorderly2030,
        Scenario::Disorderly2050,
    ];

    /// Label used as the key in reference tables.
    pub fn label(self) -> &'static str {
        match self {
            Scenario::Baseline => "基準情境",
            Scenario::Orderly2030 => "2050淨零轉型 2030",
            Scenario::Orderly2050 => "2050淨零轉型 2050",
            Scenario::Disorderly2030 => "無序轉型 2030",
            Scenario::Disorderly2050 => "無序轉型 2050",
            Scenario::NoPolicy2030 => "無政策情境 2030",
            Scenario::NoPolicy2050 => "無政策情境 2050",
            Scenario::NoPolicy2090 => "無政策情境 2090",
        }
    }

    /// Resolve a reference-table label. Surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Option<Scenario> {
        let label = label.trim();
        Scenario::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn is_baseline(self) -> bool {
        self == Scenario::Baseline
    }

    pub fn group(self) -> ScenarioGroup {
        match self {
            Scenario::Baseline => ScenarioGroup::Baseline,
            Scenario::Orderly2030 | Scenario::Orderly2050 => ScenarioGroup::Orderly,
            Scenario::Disorderly2030 | Scenario::Disorderly2050 => ScenarioGroup::Disorderly,
            Scenario::NoPolicy2030 | Scenario::NoPolicy2050 | Scenario::NoPolicy2090 => {
                ScenarioGroup::NoPolicy
            }
        }
    }

    /// Projection year, `None` for the baseline.
    pub fn year(self) -> Option<u16> {
        match self {
            Scenario::Baseline => None,
            Scenario::Orderly2030 | Scenario::Disorderly2030 | Scenario::NoPolicy2030 => Some(2030),
            Scenario::Orderly2050 | Scenario::Disorderly2050 | Scenario::NoPolicy2050 => Some(2050),
            Scenario::NoPolicy2090 => Some(2090),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Horizon
// ---------------------------------------------------------------------------

/// Reporting horizon of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "2030")]
    Y2030,
    #[serde(rename = "2050")]
    Y2050,
}

impl Horizon {
    pub const ALL: [Horizon; 2] = [Horizon::Y2030, Horizon::Y2050];

    pub fn year(self) -> u16 {
        match self {
            Horizon::Y2030 => 2030,
            Horizon::Y2050 => 2050,
        }
    }

    pub fn from_year(year: u16) -> Option<Horizon> {
        Horizon::ALL.into_iter().find(|h| h.year() == year)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}

// ---------------------------------------------------------------------------
// Scenario groups
// ---------------------------------------------------------------------------

/// Column group of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioGroup {
    Baseline,
    Orderly,
    Disorderly,
    NoPolicy,
}

impl ScenarioGroup {
    /// Groups reported for domestic portfolios.
    pub const DOMESTIC: [ScenarioGroup; 4] = [
        ScenarioGroup::Baseline,
        ScenarioGroup::Orderly,
        ScenarioGroup::Disorderly,
        ScenarioGroup::NoPolicy,
    ];

    /// Groups reported for overseas portfolios (no-policy is never assessed).
    pub const OVERSEAS: [ScenarioGroup; 3] = [
        ScenarioGroup::Baseline,
        ScenarioGroup::Orderly,
        ScenarioGroup::Disorderly,
    ];

    /// Column header used in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            ScenarioGroup::Baseline => "基準情境",
            ScenarioGroup::Orderly => "有序轉型",
            ScenarioGroup::Disorderly => "無序轉型",
            ScenarioGroup::NoPolicy => "無政策情境",
        }
    }

    /// Scenario reported in this group's columns at the given horizon.
    pub fn at(self, horizon: Horizon) -> Scenario {
        match (self, horizon) {
            (ScenarioGroup::Baseline, _) => Scenario::Baseline,
            (ScenarioGroup::Orderly, Horizon::Y2030) => Scenario::Orderly2030,
            (ScenarioGroup::Orderly, Horizon::Y2050) => Scenario::Orderly2050,
            (ScenarioGroup::Disorderly, Horizon::Y2030) => Scenario::Disorderly2030,
            (ScenarioGroup::Disorderly, Horizon::Y2050) => Scenario::Disorderly2050,
            (ScenarioGroup::NoPolicy, Horizon::Y2030) => Scenario::NoPolicy2030,
            (ScenarioGroup::NoPolicy, Horizon::Y2050) => Scenario::NoPolicy2050,
        }
    }
}
