//! Test doubles and data factories

mod evaluators;

pub use evaluators::{FixedEvaluator, Observation, SpyStep};
pub use fixtures::TestDataFactory;
