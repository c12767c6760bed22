use std::sync::Arc;
use std::time::Duration;

use derive_more::Display;
use thiserror::Error;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info};

use crate::models::sampler_event::SamplerEvent;

use super::{gate::EmissionGate, ports::TelemetrySource, task::task_sample_telemetry};

/// Period between the start of successive ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

/// Default capacity of the output channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SamplerState {
    #[display(fmt = "stopped")]
    Stopped,
    #[display(fmt = "running")]
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub channel_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Error, Debug)]
pub enum SamplerError {
    /// This occurs if the sampler is built outside of a tokio runtime.
    #[error("Sampler must be created inside a tokio runtime. Error: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// Controllable background poller of cpu and gpu telemetry.
///
/// `start` and `stop` never block: the sampling itself runs on a task
/// spawned onto the runtime the sampler was created in, and its results
/// arrive on the receiver returned by [`Sampler::new`].
pub struct Sampler<S> {
    source: Arc<S>,
    state: SamplerState,
    run: Option<CancellationToken>,
    runs_started: u64,
    gate: EmissionGate,
    tx_events: Sender<SamplerEvent>,
    tracker: TaskTracker,
    runtime: Handle,
}

impl<S: TelemetrySource + 'static> Sampler<S> {
    pub fn new(
        source: S,
        config: &SamplerConfig,
    ) -> Result<(Self, Receiver<SamplerEvent>), SamplerError> {
        let runtime = Handle::try_current()?;
        let (tx_events, rx_events) = mpsc::channel(config.channel_capacity);

        let sampler = Self {
            source: Arc::new(source),
            state: SamplerState::Stopped,
            run: None,
            runs_started: 0,
            gate: EmissionGate::default(),
            tx_events,
            tracker: TaskTracker::new(),
            runtime,
        };
        Ok((sampler, rx_events))
    }

    /// Begin sampling. The first tick fires one full interval from now.
    /// Does nothing if already running.
    pub fn start(&mut self) {
        if self.state == SamplerState::Running {
            debug!("Start requested while running. Ignoring.");
            return;
        }

        self.runs_started += 1;
        let token = CancellationToken::new();
        self.tracker.spawn_on(
            task_sample_telemetry(
                self.runs_started,
                DEFAULT_INTERVAL,
                token.clone(),
                Arc::clone(&self.source),
                self.gate.clone(),
                self.tx_events.clone(),
            ),
            &self.runtime,
        );

        self.run = Some(token);
        self.state = SamplerState::Running;
        info!("Sampler running. Run: {}", self.runs_started);
    }

    /// Stop sampling. No event of the stopped run is delivered once this
    /// returns. Does nothing if already stopped.
    pub fn stop(&mut self) {
        let Some(token) = self.run.take() else {
            debug!("Stop requested while stopped. Ignoring.");
            return;
        };

        self.gate.cancel(&token);
        self.state = SamplerState::Stopped;
        info!("Sampler stopped. Run: {}", self.runs_started);
    }

    /// Stop and wait for every spawned run to wind down.
    pub async fn shutdown(mut self) {
        self.stop();
        self.tracker.close();
        self.tracker.wait().await;
        debug!("Sampler shut down.");
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SamplerState::Running
    }

    /// Number of run tasks that have not yet exited.
    pub fn live_runs(&self) -> usize {
        self.tracker.len()
    }
}

impl<S> Drop for Sampler<S> {
    fn drop(&mut self) {
        if let Some(token) = self.run.take() {
            self.gate.cancel(&token);
        }
    }
}
