pub mod classification;
pub mod parameter_table;
pub mod range;

pub use classification::{IndustryClassification, SectorMapper};
pub use parameter_table::{
    NestedRangeTable, ParameterLevel, PdParameter, RiskParameterTable, ScenarioTable,
    SingleRangeTable,
};
pub use range::{RangeExpr, RangeParsing, RangeTable, SortKey};
