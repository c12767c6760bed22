use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

use crate::{
    internals::sampler::ports::{TelemetryError, TelemetrySource},
    models::{cpu_stats::CpuStats, gpu_stats::GpuStats},
};

/// How long a successful reading is reused.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(500);

struct Cached<T> {
    value: T,
    taken_at: Instant,
}

/// Wraps a source so that readings younger than `ttl` are answered from
/// memory. Failures are never cached.
pub struct CachedTelemetrySource<S> {
    inner: S,
    ttl: Duration,
    cpu: Mutex<Option<Cached<CpuStats>>>,
    gpu: Mutex<Option<Cached<GpuStats>>>,
}

impl<S> CachedTelemetrySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cpu: Mutex::new(None),
            gpu: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

async fn cached_or_fetch<T, F>(
    slot: &Mutex<Option<Cached<T>>>,
    ttl: Duration,
    fetch: F,
) -> Result<T, TelemetryError>
where
    T: Clone,
    F: Future<Output = Result<T, TelemetryError>>,
{
    if let Some(cached) = slot.lock().await.as_ref() {
        if cached.taken_at.elapsed() < ttl {
            trace!("Answering from cache.");
            return Ok(cached.value.clone());
        }
    }

    let value = fetch.await?;
    *slot.lock().await = Some(Cached {
        value: value.clone(),
        taken_at: Instant::now(),
    });
    Ok(value)
}

impl<S: TelemetrySource> TelemetrySource for CachedTelemetrySource<S> {
    async fn query_cpu(&self) -> Result<CpuStats, TelemetryError> {
        cached_or_fetch(&self.cpu, self.ttl, self.inner.query_cpu()).await
    }

    async fn query_gpu(&self) -> Result<GpuStats, TelemetryError> {
        cached_or_fetch(&self.gpu, self.ttl, self.inner.query_gpu()).await
    }
}
