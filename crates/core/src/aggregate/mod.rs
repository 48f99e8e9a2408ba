pub mod engine;
pub mod matching;
pub mod predict;
mod sources;

pub use engine::{Caches, Engine, PriceDerived, Providers};
