//! Host metrics sampling from the /proc filesystem.
//!
//! This module provides the `MetricsSampler` capability used by the health
//! and stats endpoints, plus the Linux implementation that derives CPU usage
//! from two `/proc/stat` readings and memory usage from `/proc/meminfo`.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Default window between the two CPU readings of one sample.
pub const DEFAULT_SAMPLE_WINDOW: Duration = Duration::from_millis(100);

/// One host metrics reading, both values in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Source of host CPU and memory usage.
///
/// Implementations may block for a short, bounded time; callers run them on
/// a blocking thread.
pub trait MetricsSampler: Send + Sync {
    fn sample(&self) -> Result<Sample, String>;
}

/// Aggregate CPU time counters from the `cpu` line of /proc/stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuStat {
    /// Calculate total CPU time (all fields).
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Calculate non-active time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Memory totals from /proc/meminfo in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryInfo {
    /// Share of memory in use, in percent.
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Parses the aggregate `cpu` line of /proc/stat content.
pub fn parse_cpu_stat(content: &str) -> Result<CpuStat, String> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| "No aggregate cpu line found in /proc/stat".to_string())?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 8 {
        return Err(format!(
            "Invalid cpu line in /proc/stat: expected at least 8 fields, got {}",
            parts.len()
        ));
    }

    let field = |idx: usize| -> Result<u64, String> {
        match parts.get(idx) {
            Some(v) => v
                .parse::<u64>()
                .map_err(|e| format!("Failed to parse cpu field {}: {}", idx, e)),
            None => Ok(0),
        }
    };

    Ok(CpuStat {
        user: field(1)?,
        nice: field(2)?,
        system: field(3)?,
        idle: field(4)?,
        iowait: field(5)?,
        irq: field(6)?,
        softirq: field(7)?,
        steal: field(8)?,
    })
}

/// Parses `MemTotal` and `MemAvailable` from /proc/meminfo content.
pub fn parse_memory_info(content: &str) -> Result<MemoryInfo, String> {
    let mut total_bytes: Option<u64> = None;
    let mut available_bytes: Option<u64> = None;

    for line in content.lines() {
        // Format: "MemTotal:       16384000 kB"
        let target = if line.starts_with("MemTotal:") {
            &mut total_bytes
        } else if line.starts_with("MemAvailable:") {
            &mut available_bytes
        } else {
            continue;
        };
        if let Some(kb) = line
            .split_whitespace()
            .nth(1)
            .and_then(|v| v.parse::<u64>().ok())
        {
            *target = Some(kb * 1024);
        }

        if total_bytes.is_some() && available_bytes.is_some() {
            break;
        }
    }

    match (total_bytes, available_bytes) {
        (Some(total), Some(available)) => Ok(MemoryInfo {
            total_bytes: total,
            available_bytes: available,
        }),
        _ => Err("Failed to parse MemTotal or MemAvailable from /proc/meminfo".to_string()),
    }
}

/// CPU busy share between two readings, in percent.
pub fn cpu_usage_percent(before: &CpuStat, after: &CpuStat) -> f64 {
    let delta_total = after.total().saturating_sub(before.total());
    let delta_idle = after.idle_total().saturating_sub(before.idle_total());
    if delta_total == 0 {
        return 0.0;
    }
    delta_total.saturating_sub(delta_idle) as f64 / delta_total as f64 * 100.0
}

/// Rounds a percentage to one decimal place.
pub fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Sampler backed by /proc/stat and /proc/meminfo.
#[derive(Debug, Clone)]
pub struct ProcSampler {
    window: Duration,
}

impl ProcSampler {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Returns a sampler if the host exposes the /proc files it reads.
    pub fn detect(window: Duration) -> Option<Self> {
        let available =
            Path::new("/proc/stat").is_file() && Path::new("/proc/meminfo").is_file();
        available.then(|| Self::new(window))
    }

    fn read_cpu_stat(&self) -> Result<CpuStat, String> {
        let content = fs::read_to_string("/proc/stat")
            .map_err(|e| format!("Failed to read /proc/stat: {}", e))?;
        parse_cpu_stat(&content)
    }

    fn read_memory_info(&self) -> Result<MemoryInfo, String> {
        let content = fs::read_to_string("/proc/meminfo")
            .map_err(|e| format!("Failed to read /proc/meminfo: {}", e))?;
        parse_memory_info(&content)
    }
}

impl MetricsSampler for ProcSampler {
    fn sample(&self) -> Result<Sample, String> {
        let before = self.read_cpu_stat()?;
        thread::sleep(self.window);
        let after = self.read_cpu_stat()?;
        let memory = self.read_memory_info()?;

        Ok(Sample {
            cpu_percent: round_percent(cpu_usage_percent(&before, &after)),
            memory_percent: round_percent(memory.used_percent()),
        })
    }
}

/// Returns the host name, or `None` if it cannot be determined.
///
/// Reads the kernel's node name first, then falls back to the `HOSTNAME`
/// environment variable.
pub fn hostname() -> Option<String> {
    read_hostname(Path::new("/proc/sys/kernel/hostname")).or_else(|| {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("COMPUTERNAME").ok())
            .filter(|name| !name.is_empty())
    })
}

fn read_hostname(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let name = content.trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "cpu  4705 356 584 3699 23 23 0 0 0 0\n\
                             cpu0 1393 280 220 1846 14 10 0 0 0 0\n\
                             intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]\n";

    #[test]
    fn test_parse_cpu_stat() {
        let stat = parse_cpu_stat(PROC_STAT).unwrap();
        assert_eq!(stat.user, 4705);
        assert_eq!(stat.idle, 3699);
        assert_eq!(stat.steal, 0);
        assert_eq!(stat.total(), 4705 + 356 + 584 + 3699 + 23 + 23);
        assert_eq!(stat.idle_total(), 3699 + 23);
    }

    #[test]
    fn test_parse_cpu_stat_without_steal_column() {
        let stat = parse_cpu_stat("cpu 10 0 10 80 0 0 0\n").unwrap();
        assert_eq!(stat.steal, 0);
        assert_eq!(stat.total(), 100);
    }

    #[test]
    fn test_parse_cpu_stat_invalid() {
        assert!(parse_cpu_stat("cpu0 1 2 3 4 5 6 7 8\n").is_err());
        assert!(parse_cpu_stat("cpu 1 2\n").is_err());
        assert!(parse_cpu_stat("cpu a b c d e f g h\n").is_err());
    }

    #[test]
    fn test_cpu_usage_percent() {
        let before = parse_cpu_stat("cpu 100 0 100 800 0 0 0 0\n").unwrap();
        let after = parse_cpu_stat("cpu 150 0 150 900 0 0 0 0\n").unwrap();
        assert!((cpu_usage_percent(&before, &after) - 50.0).abs() < 0.001);
        assert_eq!(cpu_usage_percent(&before, &before), 0.0);
    }

    #[test]
    fn test_parse_memory_info() {
        let meminfo = "MemTotal:       16000000 kB\nMemFree:         2000000 kB\nMemAvailable:    4000000 kB\n";
        let mem = parse_memory_info(meminfo).unwrap();
        assert_eq!(mem.total_bytes, 16000000 * 1024);
        assert_eq!(mem.available_bytes, 4000000 * 1024);
        assert!((mem.used_percent() - 75.0).abs() < 0.001);
    }

    #[test]
    fn test_parse_memory_info_missing_fields() {
        let meminfo = "MemFree:        8192000 kB\nSwapFree:        2048000 kB\n";
        assert!(parse_memory_info(meminfo).is_err());
    }

    #[test]
    fn test_round_percent() {
        assert_eq!(round_percent(12.345), 12.3);
        assert_eq!(round_percent(99.96), 100.0);
    }

    #[test]
    fn test_read_hostname_trims_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hostname");

        fs::write(&path, "web-01\n").unwrap();
        assert_eq!(read_hostname(&path), Some("web-01".to_string()));

        fs::write(&path, "\n").unwrap();
        assert_eq!(read_hostname(&path), None);

        assert_eq!(read_hostname(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_proc_sampler_on_linux() {
        let Some(sampler) = ProcSampler::detect(Duration::from_millis(10)) else {
            return;
        };
        let sample = sampler.sample().unwrap();
        assert!((0.0..=100.0).contains(&sample.cpu_percent));
        assert!((0.0..=100.0).contains(&sample.memory_percent));
    }
}
