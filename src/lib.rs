pub mod api;
pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod heroes;
pub mod models;
pub mod progress;
pub mod workers;
