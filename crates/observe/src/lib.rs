//! This crate contains the code required to observe the indexer: logging
//! initialization and the panic hook that routes panics through the log
//! stream.
pub mod config;
pub mod tracing;

pub use config::Config;
