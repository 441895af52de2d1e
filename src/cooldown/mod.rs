pub mod constants;
pub mod evaluator;
