pub mod income;
pub mod regional;

pub use income::IncomeImpactModel;
pub use regional::{standardize_city_name, RegionalLossTable, RiskLevelTable};
