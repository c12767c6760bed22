use derive_more::Display;

use crate::internals::sampler::ports::QuerySourceError;

use super::sample::Sample;

/// Everything the sampler delivers on its output channel.
#[derive(Debug, Display)]
pub enum SamplerEvent {
    #[display(fmt = "<Emit: {}>", _0)]
    Emit(Sample),
    #[display(fmt = "<Fail: {}>", _0)]
    Fail(QuerySourceError),
}

impl SamplerEvent {
    pub fn sample(&self) -> Option<&Sample> {
        match self {
            SamplerEvent::Emit(sample) => Some(sample),
            SamplerEvent::Fail(_) => None,
        }
    }

    pub fn error(&self) -> Option<&QuerySourceError> {
        match self {
            SamplerEvent::Emit(_) => None,
            SamplerEvent::Fail(e) => Some(e),
        }
    }
}
