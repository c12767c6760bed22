use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Utilization, temperature and fan speed of the host gpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GpuStats {
    /// Percent, 0..=100.
    pub usage: u8,
    /// Degrees celsius.
    pub temperature: i32,
    /// Rpm.
    pub fan_speed: u32,
}

impl Display for GpuStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(gpu {}%, {} degC, {} rpm)",
            self.usage, self.temperature, self.fan_speed
        )
    }
}
