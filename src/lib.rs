//! Library root for the `skadix_api` crate
//! Stateless suitability scoring served over HTTP

// Error handling
pub mod api_errors;
pub mod errors;

// Scoring model
pub mod scoring;

// Configuration & CLI
pub mod cli;
pub mod config_loader;
pub mod logging;

// Web server interface
pub mod web;

pub use scoring::{score, FeatureVector, ScoringModel, ScoringWeights};
