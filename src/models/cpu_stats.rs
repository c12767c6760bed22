use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Utilization of the host cpu, in whole percent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CpuStats {
    /// One entry per logical cpu (hardware thread).
    pub thread_usage: Vec<u8>,
    /// One entry per physical core, derived from `thread_usage`.
    pub core_usage: Vec<u8>,
    /// Mean of `core_usage`.
    pub total_usage: u8,
}

impl CpuStats {
    /// Build the stats from raw per-thread usage.
    ///
    /// Raw values are clamped to 0..=100. Hyper-threaded pairs are averaged
    /// into a single core value as long as the pair index is still a
    /// physical core; a lone thread maps directly onto its core.
    pub fn from_thread_usage(raw_thread_usage: &[f32], physical_cores: usize) -> Self {
        let thread_usage: Vec<u8> = raw_thread_usage
            .iter()
            .map(|usage| clamp_percent(*usage))
            .collect();

        let threads = thread_usage.len();
        let mut core_usage = Vec::with_capacity(physical_cores);
        let mut idx = 0;
        while idx < threads {
            if idx + 1 < threads && idx / 2 < physical_cores {
                let pair = (thread_usage[idx] as u16 + thread_usage[idx + 1] as u16) / 2;
                core_usage.push(pair as u8);
                idx += 2;
            } else if idx < physical_cores {
                core_usage.push(thread_usage[idx]);
                idx += 1;
            } else {
                break;
            }
        }

        let total_usage = if core_usage.is_empty() {
            0
        } else {
            let sum: u32 = core_usage.iter().map(|usage| *usage as u32).sum();
            (sum / core_usage.len() as u32) as u8
        };

        Self {
            thread_usage,
            core_usage,
            total_usage,
        }
    }
}

fn clamp_percent(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0f32, 100f32) as u8
}

impl Display for CpuStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(cpu {}% over {} cores / {} threads)",
            self.total_usage,
            self.core_usage.len(),
            self.thread_usage.len()
        )
    }
}
