//! Failures reported by the `storm` binary.

use std::io;
use std::sync::Arc;

use storm_cli_plugin::PrepareError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("the working directory is not usable: {0}")]
    WorkingDirectory(Arc<io::Error>),
    #[error("the working directory {0} is not valid UTF-8")]
    NonUtf8WorkingDirectory(String),
    #[error(transparent)]
    Prepare(#[from] Box<PrepareError>),
    #[error("failed to write output: {0}")]
    Output(Arc<io::Error>),
}

impl From<PrepareError> for AppError {
    fn from(error: PrepareError) -> Self {
        Self::Prepare(Box::new(error))
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::Output(Arc::new(error))
    }
}
