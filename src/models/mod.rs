pub mod ai;
pub mod market;
