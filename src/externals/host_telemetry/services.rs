use std::future::Future;
use std::time::Duration;

use systemstat::{Platform, System};

use crate::{
    internals::sampler::ports::TelemetryError,
    models::{cpu_stats::CpuStats, gpu_stats::GpuStats},
};

/// Window over which cpu load is measured.
pub const CPU_MEASUREMENT_WINDOW: Duration = Duration::from_millis(1000);

/// This service allows separation of the platform logic of reading cpu
/// usage from the sampling logic. Implementations may block.
pub trait HostCpuUsageService {
    /// Measure per thread usage and fold it into a `CpuStats`.
    fn get_cpu_usage(&self) -> Result<CpuStats, TelemetryError>;
}

/// Same as `HostCpuUsageService` for the gpu. Implementations must not block.
pub trait HostGpuStatsService {
    fn get_gpu_stats(&self) -> impl Future<Output = Result<GpuStats, TelemetryError>> + Send;
}

pub struct HostCpuUsageServiceActual {
    pub window: Duration,
}

impl Default for HostCpuUsageServiceActual {
    fn default() -> Self {
        Self {
            window: CPU_MEASUREMENT_WINDOW,
        }
    }
}

impl HostCpuUsageService for HostCpuUsageServiceActual {
    /// Use systemstat to take two load readings `window` apart. Will return
    /// a FailedToRead error with the io::Error if systemstat fails, and a
    /// FailedToParse error if no cpu was reported at all.
    fn get_cpu_usage(&self) -> Result<CpuStats, TelemetryError> {
        let measurement = System::new().cpu_load()?;
        std::thread::sleep(self.window);
        let loads = measurement.done()?;

        if loads.is_empty() {
            return Err(TelemetryError::FailedToParse("no cpus reported".into()));
        }

        let thread_usage: Vec<f32> = loads.iter().map(|load| (1f32 - load.idle) * 100f32).collect();
        Ok(CpuStats::from_thread_usage(
            &thread_usage,
            num_cpus::get_physical(),
        ))
    }
}

pub struct HostGpuStatsServiceActual;

impl HostGpuStatsService for HostGpuStatsServiceActual {
    /// Ask IOKit for the accelerator performance statistics through `ioreg`.
    #[cfg(target_os = "macos")]
    async fn get_gpu_stats(&self) -> Result<GpuStats, TelemetryError> {
        let output = tokio::process::Command::new("ioreg")
            .args(["-r", "-d", "1", "-c", "IOAccelerator"])
            .output()
            .await?;

        if !output.status.success() {
            return Err(TelemetryError::FailedToRead(std::io::Error::other(
                format!("ioreg exited with {}", output.status),
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| TelemetryError::FailedToParse(e.to_string()))?;
        parse_performance_statistics(&text)
    }

    #[cfg(not(target_os = "macos"))]
    async fn get_gpu_stats(&self) -> Result<GpuStats, TelemetryError> {
        Err(TelemetryError::Unsupported(
            "gpu statistics are only available on macOS",
        ))
    }
}

/// Pull usage, temperature and fan speed out of the `PerformanceStatistics`
/// dictionary printed by `ioreg`. Keys that are missing or unreadable are
/// left at zero.
pub fn parse_performance_statistics(text: &str) -> Result<GpuStats, TelemetryError> {
    let mut found = false;
    let mut stats = GpuStats::default();

    for line in text.lines().filter(|line| line.contains("\"PerformanceStatistics\"")) {
        let Some((_, body)) = line.split_once('{') else {
            continue;
        };
        found = true;

        for entry in body.trim_end().trim_end_matches('}').split(',') {
            let Some((key, value)) = entry.split_once('=') else {
                continue;
            };
            let Ok(value) = value.trim().parse::<f64>() else {
                continue;
            };
            let value = value.round();

            if key.contains("GPU Activity") || key.contains("Device Utilization") {
                stats.usage = value.clamp(0f64, 100f64) as u8;
            } else if key.contains("Temp") {
                stats.temperature = value as i32;
            } else if key.contains("Fan") {
                stats.fan_speed = value.max(0f64) as u32;
            }
        }
    }

    if !found {
        return Err(TelemetryError::FailedToParse(
            "no PerformanceStatistics in ioreg output".into(),
        ));
    }
    Ok(stats)
}
