pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod server;
pub mod types;

// Pipeline stages and the use case that composes them
pub mod app;
pub mod pipeline;

// Adapters for the spreadsheet source and moderation backends
pub mod infra;

pub mod observability;
