pub mod config;
pub mod errors;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod services;
pub mod tracker;
