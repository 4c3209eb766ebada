pub mod error;
pub mod types;

pub mod scenario;

pub mod lookup;
pub mod sovereign;
pub mod stress;

pub mod portfolio;
pub mod ratios;
pub mod reference;
pub mod risk;

pub mod pipeline;

pub use error::ClimateCreditError;
pub use scenario::{Horizon, Scenario, ScenarioGroup, ScenarioMap};
pub use types::*;

/// Standard result type for all climate-credit operations
pub type ClimateCreditResult<T> = Result<T, ClimateCreditError>;
