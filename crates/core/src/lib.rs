pub mod aggregate;
pub mod analytics;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod registry;
pub mod sentiment;
pub mod time;
