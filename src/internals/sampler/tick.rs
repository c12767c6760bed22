use futures::future::join;
use tokio::time::Instant;
use tracing::trace;

use crate::models::{
    cpu_stats::CpuStats, gpu_stats::GpuStats, sample::Sample, sampler_event::SamplerEvent,
};

use super::ports::{QuerySourceError, TelemetryError, TelemetrySource};

/// Perform one tick. Dispatch both queries at once, wait for both, and turn
/// the pair of outcomes into a single event.
#[tracing::instrument(skip_all)]
pub async fn run_tick(source: &impl TelemetrySource) -> SamplerEvent {
    trace!("Executing tick.");
    let started = Instant::now();
    let (cpu, gpu) = join(source.query_cpu(), source.query_gpu()).await;
    let latency = started.elapsed();
    trace!("Both queries returned after {:?}.", latency);

    match join_outcomes(cpu, gpu) {
        Ok((cpu, gpu)) => SamplerEvent::Emit(Sample {
            cpu,
            gpu,
            timestamp: Instant::now(),
            latency,
        }),
        Err(e) => SamplerEvent::Fail(e),
    }
}

/// All or nothing: a missing reading invalidates the whole tick.
pub fn join_outcomes(
    cpu: Result<CpuStats, TelemetryError>,
    gpu: Result<GpuStats, TelemetryError>,
) -> Result<(CpuStats, GpuStats), QuerySourceError> {
    match (cpu, gpu) {
        (Ok(cpu), Ok(gpu)) => Ok((cpu, gpu)),
        (Err(e), Ok(_)) => Err(QuerySourceError::Cpu(e)),
        (Ok(_), Err(e)) => Err(QuerySourceError::Gpu(e)),
        (Err(cpu), Err(gpu)) => Err(QuerySourceError::Both { cpu, gpu }),
    }
}

#[cfg(test)]
mod testing {
    use std::time::Duration;

    use super::*;
    use crate::internals::sampler::fakes::ScriptedSource;

    fn failure<T>() -> Result<T, TelemetryError> {
        Err(TelemetryError::Unavailable("boom".into()))
    }

    #[test]
    fn test_join_outcomes_tags_failing_query() {
        let cpu = || Ok(CpuStats::default());
        let gpu = || Ok(GpuStats::default());

        assert!(join_outcomes(cpu(), gpu()).is_ok());
        assert!(matches!(
            join_outcomes(failure(), gpu()),
            Err(QuerySourceError::Cpu(TelemetryError::Unavailable(_)))
        ));
        assert!(matches!(
            join_outcomes(cpu(), failure()),
            Err(QuerySourceError::Gpu(TelemetryError::Unavailable(_)))
        ));
        assert!(matches!(
            join_outcomes(failure(), failure()),
            Err(QuerySourceError::Both { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_carries_source_values() {
        let source = ScriptedSource::healthy();

        let event = run_tick(&source).await;

        let sample = event.sample().expect("Expected a sample");
        assert_eq!(sample.cpu, ScriptedSource::cpu_stats());
        assert_eq!(sample.gpu, ScriptedSource::gpu_stats());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_latency_is_bounded_by_slower_query() {
        let source = ScriptedSource::healthy()
            .with_cpu_delay(Duration::from_millis(500))
            .with_gpu_delay(Duration::from_millis(50));

        let event = run_tick(&source).await;

        let sample = event.sample().expect("Expected a sample");
        assert!(sample.latency >= Duration::from_millis(500));
        assert!(sample.latency < Duration::from_millis(550));
        assert_eq!(source.max_in_flight(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_fails_when_both_queries_fail() {
        let source = ScriptedSource::healthy()
            .failing_cpu("no cpu")
            .failing_gpu("no gpu");

        let event = run_tick(&source).await;

        let error = event.error().expect("Expected a failure");
        assert_eq!(
            error.to_string(),
            "CPU and GPU queries failed. CPU error: Telemetry unavailable: no cpu. GPU error: Telemetry unavailable: no gpu"
        );
    }
}
