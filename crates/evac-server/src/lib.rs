//! Evacuation aggregation server: configuration, engine, and HTTP API.

pub mod api;
pub mod config;
pub mod engine;
pub mod logging;
pub mod state;

pub use config::Config;
pub use engine::{AggregationRequest, Engine, EngineError};
