use crate::config::ConfigError;
use crate::matching::{FulfillmentError, IntakeError, InvalidGroup, IncompatibleProduct};
use crate::snapshot::SnapshotImportError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Snapshot(SnapshotImportError),
    Input(IntakeError),
    Fulfillment(FulfillmentError),
}

impl AppError {
    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Json(_) | AppError::Snapshot(_) | AppError::Input(_) => 2,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Fulfillment(_) => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON input: {}", err),
            AppError::Snapshot(err) => write!(f, "snapshot error: {}", err),
            AppError::Input(err) => write!(f, "invalid input: {}", err),
            AppError::Fulfillment(err) => write!(f, "fulfillment error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Snapshot(err) => Some(err),
            AppError::Input(err) => Some(err),
            AppError::Fulfillment(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<SnapshotImportError> for AppError {
    fn from(value: SnapshotImportError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Input(value)
    }
}

impl From<InvalidGroup> for AppError {
    fn from(value: InvalidGroup) -> Self {
        Self::Input(value.into())
    }
}

impl From<IncompatibleProduct> for AppError {
    fn from(value: IncompatibleProduct) -> Self {
        Self::Input(value.into())
    }
}

impl From<FulfillmentError> for AppError {
    fn from(value: FulfillmentError) -> Self {
        Self::Fulfillment(value)
    }
}
