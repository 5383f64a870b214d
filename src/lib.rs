//! FORTUNE: live dashboard for an autonomous Polymarket trading agent
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod agent;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod render;
pub mod state;
pub mod types;
