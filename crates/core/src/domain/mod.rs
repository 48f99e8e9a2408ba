pub mod market;
pub mod prediction;
pub mod ticker;
