pub mod grading;
pub mod rating_shift;

pub use grading::{
    letter_grade, CountryClassification, CountryRiskTier, LetterGrade, ScenarioAdjustmentTable,
    SovereignAssessment, SovereignIndustryGrader,
};
pub use rating_shift::{RatingPdTable, DEFAULT_RATING, RATING_SCALE};
