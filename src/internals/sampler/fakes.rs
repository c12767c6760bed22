use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::models::{cpu_stats::CpuStats, gpu_stats::GpuStats};

use super::ports::{TelemetryError, TelemetrySource};

/// Telemetry source with scripted latency and outcomes that records how it
/// was called.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    cpu_delay: Duration,
    gpu_delay: Duration,
    cpu_failure: Option<&'static str>,
    gpu_failure: Option<&'static str>,
    cpu_calls: AtomicUsize,
    gpu_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    cpu_in_flight: AtomicUsize,
    max_cpu_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn cpu_stats() -> CpuStats {
        CpuStats::from_thread_usage(&[12.0, 34.0, 56.0, 78.0], 2)
    }

    pub fn gpu_stats() -> GpuStats {
        GpuStats {
            usage: 42,
            temperature: 61,
            fan_speed: 1800,
        }
    }

    pub fn with_cpu_delay(mut self, delay: Duration) -> Self {
        self.cpu_delay = delay;
        self
    }

    pub fn with_gpu_delay(mut self, delay: Duration) -> Self {
        self.gpu_delay = delay;
        self
    }

    pub fn failing_cpu(mut self, reason: &'static str) -> Self {
        self.cpu_failure = Some(reason);
        self
    }

    pub fn failing_gpu(mut self, reason: &'static str) -> Self {
        self.gpu_failure = Some(reason);
        self
    }

    pub fn cpu_calls(&self) -> usize {
        self.cpu_calls.load(Ordering::SeqCst)
    }

    pub fn gpu_calls(&self) -> usize {
        self.gpu_calls.load(Ordering::SeqCst)
    }

    /// Most queries of either kind that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Most cpu queries that were running at the same time. Anything above
    /// one means two ticks overlapped.
    pub fn max_cpu_in_flight(&self) -> usize {
        self.max_cpu_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl TelemetrySource for ScriptedSource {
    async fn query_cpu(&self) -> Result<CpuStats, TelemetryError> {
        self.cpu_calls.fetch_add(1, Ordering::SeqCst);
        let _any = InFlight::enter(&self.in_flight, &self.max_in_flight);
        let _cpu = InFlight::enter(&self.cpu_in_flight, &self.max_cpu_in_flight);
        pause(self.cpu_delay).await;
        match self.cpu_failure {
            Some(reason) => Err(TelemetryError::Unavailable(reason.to_string())),
            None => Ok(Self::cpu_stats()),
        }
    }

    async fn query_gpu(&self) -> Result<GpuStats, TelemetryError> {
        self.gpu_calls.fetch_add(1, Ordering::SeqCst);
        let _any = InFlight::enter(&self.in_flight, &self.max_in_flight);
        pause(self.gpu_delay).await;
        match self.gpu_failure {
            Some(reason) => Err(TelemetryError::Unavailable(reason.to_string())),
            None => Ok(Self::gpu_stats()),
        }
    }
}
