pub mod control;
pub mod gate;
pub mod ports;
pub mod task;
pub mod tick;

#[cfg(test)]
pub(crate) mod fakes;

pub use control::{Sampler, SamplerConfig, SamplerError, SamplerState, DEFAULT_INTERVAL};
