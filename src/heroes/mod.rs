pub mod catalog;
pub mod matchup;

pub use catalog::{normalize, HeroCatalog};
pub use matchup::{delta, Matchup};
