//! BEATSCAN: pre-earnings beat screener
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod data;
pub mod signals;
pub mod strategy;
pub mod notify;
pub mod engine;
