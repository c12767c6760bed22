use std::time::Duration;

use self::{
    adapters::HostTelemetryAdapter,
    cache::CachedTelemetrySource,
    services::{HostCpuUsageServiceActual, HostGpuStatsServiceActual},
};

pub mod adapters;
pub mod cache;
pub mod services;

pub type HostTelemetrySource = CachedTelemetrySource<
    HostTelemetryAdapter<HostCpuUsageServiceActual, HostGpuStatsServiceActual>,
>;

pub struct HostTelemetryModule {
    pub host_telemetry_adapter: HostTelemetrySource,
}

impl HostTelemetryModule {
    pub fn initialize(cache_ttl: Duration) -> Self {
        let adapter = HostTelemetryAdapter::new(
            HostCpuUsageServiceActual::default(),
            HostGpuStatsServiceActual,
        );
        Self {
            host_telemetry_adapter: CachedTelemetrySource::new(adapter, cache_ttl),
        }
    }
}
