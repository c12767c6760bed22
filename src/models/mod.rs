pub mod cpu_stats;
pub mod gpu_stats;
pub mod sample;
pub mod sampler_event;
