pub mod catch_all;
pub mod extract;

pub use extract::{SurveyJson, SurveyQuery};
