use std::sync::Arc;

use tracing::trace;

use crate::{
    internals::sampler::ports::{TelemetryError, TelemetrySource},
    models::{cpu_stats::CpuStats, gpu_stats::GpuStats},
};

use super::services::{HostCpuUsageService, HostGpuStatsService};

/// Telemetry source backed by the host. The blocking cpu measurement is
/// moved onto the blocking pool so it can run alongside the gpu query.
pub struct HostTelemetryAdapter<C, G> {
    cpu_service: Arc<C>,
    gpu_service: G,
}

impl<C, G> HostTelemetryAdapter<C, G> {
    pub fn new(cpu_service: C, gpu_service: G) -> Self {
        Self {
            cpu_service: Arc::new(cpu_service),
            gpu_service,
        }
    }
}

impl<C, G> TelemetrySource for HostTelemetryAdapter<C, G>
where
    C: HostCpuUsageService + Send + Sync + 'static,
    G: HostGpuStatsService + Send + Sync,
{
    #[tracing::instrument(skip_all)]
    async fn query_cpu(&self) -> Result<CpuStats, TelemetryError> {
        trace!("Querying cpu usage.");
        let service = Arc::clone(&self.cpu_service);
        tokio::task::spawn_blocking(move || service.get_cpu_usage())
            .await
            .map_err(|e| TelemetryError::TaskFailed(e.to_string()))?
    }

    #[tracing::instrument(skip_all)]
    async fn query_gpu(&self) -> Result<GpuStats, TelemetryError> {
        trace!("Querying gpu stats.");
        self.gpu_service.get_gpu_stats().await
    }
}

#[cfg(test)]
mod testing {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    struct SlowCpu;

    impl HostCpuUsageService for SlowCpu {
        fn get_cpu_usage(&self) -> Result<CpuStats, TelemetryError> {
            thread::sleep(Duration::from_millis(200));
            Ok(CpuStats::from_thread_usage(&[50.0, 70.0], 1))
        }
    }

    struct PanickingCpu;

    impl HostCpuUsageService for PanickingCpu {
        fn get_cpu_usage(&self) -> Result<CpuStats, TelemetryError> {
            panic!("sensor exploded")
        }
    }

    struct SlowGpu;

    impl HostGpuStatsService for SlowGpu {
        async fn get_gpu_stats(&self) -> Result<GpuStats, TelemetryError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(GpuStats {
                usage: 5,
                temperature: 40,
                fan_speed: 0,
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_cpu_query_runs_alongside_gpu_query() {
        let adapter = HostTelemetryAdapter::new(SlowCpu, SlowGpu);

        let started = Instant::now();
        let (cpu, gpu) = futures::future::join(adapter.query_cpu(), adapter.query_gpu()).await;
        let elapsed = started.elapsed();

        assert_eq!(cpu.expect("Failed to query cpu").total_usage, 60);
        assert_eq!(gpu.expect("Failed to query gpu").temperature, 40);
        assert!(elapsed < Duration::from_millis(390), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_panicking_cpu_service_is_a_task_failure() {
        let adapter = HostTelemetryAdapter::new(PanickingCpu, SlowGpu);

        let result = adapter.query_cpu().await;

        assert!(matches!(result, Err(TelemetryError::TaskFailed(_))));
    }
}
