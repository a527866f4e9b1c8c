pub mod evaluator;
pub mod schedule;
pub mod thresholds;

pub use evaluator::evaluate;
pub use schedule::{build_schedule, validate_schema};
pub use thresholds::ThresholdConfig;
