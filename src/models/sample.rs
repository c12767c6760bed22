use std::fmt::Display;
use std::time::Duration;

use tokio::time::Instant;

use super::{cpu_stats::CpuStats, gpu_stats::GpuStats};

/// The joined result of one fully successful tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub cpu: CpuStats,
    pub gpu: GpuStats,
    /// When both queries had completed.
    pub timestamp: Instant,
    /// How long the joined queries took.
    pub latency: Duration,
}

impl Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} in {:?}", self.cpu, self.gpu, self.latency)
    }
}
