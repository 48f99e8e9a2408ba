pub mod correlation;
pub mod indicators;
pub mod stock;
