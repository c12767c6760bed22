use anyhow::Result;
use telemetry_sampler::{
    config::AppConfig,
    externals::host_telemetry::HostTelemetryModule,
    internals::sampler::Sampler,
    models::sampler_event::SamplerEvent,
};
use tokio::signal;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_max_level(config.log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let HostTelemetryModule {
        host_telemetry_adapter,
    } = HostTelemetryModule::initialize(config.cache_ttl);

    let (mut sampler, rx_events) = Sampler::new(host_telemetry_adapter, &config.sampler)?;
    let mut events = ReceiverStream::new(rx_events);

    sampler.start();

    loop {
        tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("Failed to listen for ctrl_c. Error: {}", e);
                }
                break;
            },
            event = events.next() => match event {
                Some(SamplerEvent::Emit(sample)) => info!("Sample: {}", sample),
                Some(SamplerEvent::Fail(e)) => warn!("Sampling failed. Error: {}", e),
                None => {
                    warn!("Event stream closed.");
                    break;
                }
            },
        }
    }

    sampler.shutdown().await;

    Ok(())
}
