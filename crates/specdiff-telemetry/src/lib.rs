//! Logging infrastructure for specdiff.
//!
//! This crate provides:
//! - Structured logging (JSON or compact text) on stderr
//! - Standard event names and helper macros used by the comparator
//!
//! # Usage
//!
//! ```ignore
//! use specdiff_telemetry::{LogFormat, Telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("info")
//!     .with_log_format(LogFormat::Json);
//!
//! let telemetry = Telemetry::init(config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::events;

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Handle returned once logging is installed.
pub struct Telemetry {
    _private: (),
}

impl Telemetry {
    /// Initialize telemetry with the given configuration.
    pub fn init(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        logging::init_logging(&config)?;
        log_startup!(service = %config.service_name, "telemetry initialized");
        Ok(Self { _private: () })
    }
}
