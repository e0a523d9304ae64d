pub mod config;
pub mod error;
pub mod matching;
pub mod snapshot;
pub mod telemetry;
