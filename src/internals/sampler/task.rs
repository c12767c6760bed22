use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::models::sampler_event::SamplerEvent;

use super::{gate::EmissionGate, ports::TelemetrySource, tick::run_tick};

/// Task: Runs one tick per period, starting one full period after launch,
/// and emits the outcome of every tick. Ticks never overlap; a tick that
/// overruns the period is followed by a single catch-up tick.
/// Can be cancelled, which also drops any tick still in flight.
#[tracing::instrument(skip(token, source, gate, tx_events))]
pub async fn task_sample_telemetry<S: TelemetrySource>(
    run: u64,
    period: Duration,
    token: CancellationToken,
    source: Arc<S>,
    gate: EmissionGate,
    tx_events: Sender<SamplerEvent>,
) {
    info!("Started.");

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            _ = ticker.tick() => {}
        };

        let event = tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!("Cancelled with a tick in flight. Dropping it.");
                break;
            },
            event = run_tick(source.as_ref()) => event,
        };

        if !business_logic(&token, &gate, &tx_events, event).await {
            break;
        }
    }

    info!("Exited.");
}

/// Perform task business logic.
/// Report the tick outcome and try to emit it. Returns whether the run
/// should keep going.
#[tracing::instrument(skip_all)]
async fn business_logic(
    token: &CancellationToken,
    gate: &EmissionGate,
    tx_events: &Sender<SamplerEvent>,
    event: SamplerEvent,
) -> bool {
    match &event {
        SamplerEvent::Emit(sample) => debug!("Got sample: {}", sample),
        SamplerEvent::Fail(e) => error!("Tick failed. Error: {}", e),
    }

    let permit = tokio::select! {
        biased;
        _ = token.cancelled() => {
            warn!("Cancelled while waiting on the consumer. Dropping event.");
            return false;
        },
        permit = tx_events.reserve() => match permit {
            Ok(permit) => permit,
            Err(e) => {
                error!("Failed to emit event, consumer is gone. Error: {}", e);
                return false;
            }
        },
    };

    if gate.send(token, permit, event) {
        trace!("Sent an event.");
        true
    } else {
        warn!("Cancelled before emission. Dropping event.");
        false
    }
}
