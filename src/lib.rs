pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;

// Artifact store and run tracking
pub mod gateway;

// Dataframe processing: cleaning, data checks, model scoring
pub mod pipeline;

// Stage use cases and the ports they depend on
pub mod app;
pub mod infra;
