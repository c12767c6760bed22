use std::future::Future;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::models::{cpu_stats::CpuStats, gpu_stats::GpuStats};

/// Where the sampler gets its readings from. Keeping this behind a trait
/// separates the host specific collection from the sampling loop, which
/// makes the loop testable with a scripted source.
pub trait TelemetrySource: Send + Sync {
    /// Read the current cpu utilization.
    fn query_cpu(&self) -> impl Future<Output = Result<CpuStats, TelemetryError>> + Send;

    /// Read the current gpu utilization.
    fn query_gpu(&self) -> impl Future<Output = Result<GpuStats, TelemetryError>> + Send;
}

/// Failure of a single telemetry query.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The platform call behind the query failed.
    #[error("Failed to read telemetry. Error: {0}")]
    FailedToRead(#[from] io::Error),

    /// The platform answered with something that could not be understood.
    #[error("Failed to parse telemetry. Error: {0}")]
    FailedToParse(String),

    /// There is no implementation for this platform.
    #[error("Telemetry not supported: {0}")]
    Unsupported(&'static str),

    /// The blocking worker running the query died.
    #[error("Telemetry task failed. Error: {0}")]
    TaskFailed(String),

    /// The source is temporarily unable to answer.
    #[error("Telemetry unavailable: {0}")]
    Unavailable(String),
}

/// Why a tick produced no sample, tagged with the query that failed.
#[derive(Error, Debug)]
pub enum QuerySourceError {
    #[error("CPU query failed. Error: {0}")]
    Cpu(#[source] TelemetryError),

    #[error("GPU query failed. Error: {0}")]
    Gpu(#[source] TelemetryError),

    #[error("CPU and GPU queries failed. CPU error: {cpu}. GPU error: {gpu}")]
    Both {
        cpu: TelemetryError,
        gpu: TelemetryError,
    },
}

impl<T: TelemetrySource> TelemetrySource for Arc<T> {
    fn query_cpu(&self) -> impl Future<Output = Result<CpuStats, TelemetryError>> + Send {
        (**self).query_cpu()
    }

    fn query_gpu(&self) -> impl Future<Output = Result<GpuStats, TelemetryError>> + Send {
        (**self).query_gpu()
    }
}
