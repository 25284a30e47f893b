//! Host metrics
//!
//! RAM, storage and uptime figures for /start and /stats.
//! Every call queries the OS fresh; nothing is cached.

use anyhow::Result;
use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::{Disks, System};
use tracing::debug;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Reads host metrics and tracks bot uptime from a fixed start instant
#[derive(Debug, Clone)]
pub struct SystemMonitor {
    started_at: Instant,
}

impl SystemMonitor {
    /// Probe the host once and capture the process start time.
    ///
    /// Fails if memory figures are unavailable; callers treat that as fatal.
    pub fn new() -> Result<Self> {
        Self::with_start(Instant::now())
    }

    /// Same as [`SystemMonitor::new`] with an explicit start instant
    pub fn with_start(started_at: Instant) -> Result<Self> {
        let mut sys = System::new();
        sys.refresh_memory();
        if sys.total_memory() == 0 {
            anyhow::bail!("Host memory metrics unavailable");
        }
        debug!(
            "System monitor ready: {} bytes RAM, uptime {}s",
            sys.total_memory(),
            System::uptime()
        );
        Ok(Self { started_at })
    }

    /// Used / total RAM, e.g. `3.2GB / 15.5GB`
    pub fn ram_usage(&self) -> String {
        let mut sys = System::new();
        sys.refresh_memory();
        format_usage(sys.used_memory(), sys.total_memory())
    }

    /// Used / total space of the root filesystem
    pub fn storage_usage(&self) -> String {
        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"));

        let (total, available) = match root {
            Some(disk) => (disk.total_space(), disk.available_space()),
            None => disks.list().iter().fold((0, 0), |(t, a), d| {
                (t + d.total_space(), a + d.available_space())
            }),
        };
        format_usage(total.saturating_sub(available), total)
    }

    /// Time since host boot
    pub fn system_uptime(&self) -> String {
        format_uptime(Duration::from_secs(System::uptime()))
    }

    /// Time since the bot started
    pub fn process_uptime(&self) -> String {
        format_uptime(self.started_at.elapsed())
    }

    /// Status block shared by /start and /stats
    pub fn stats_report(&self) -> String {
        format!(
            "• <b>RAM</b>: {}\n\
            • <b>Storage</b>: {}\n\
            • <b>System Uptime</b>: {}\n\
            • <b>Bot Uptime</b>: {}",
            self.ram_usage(),
            self.storage_usage(),
            self.system_uptime(),
            self.process_uptime()
        )
    }
}

/// Format a used/total byte pair in GiB with one decimal
pub fn format_usage(used: u64, total: u64) -> String {
    format!("{:.1}GB / {:.1}GB", used as f64 / GIB, total as f64 / GIB)
}

/// Format a duration as `H:MM:SS`, with a `N day(s), ` prefix past 24 hours
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;

    let clock = format!("{}:{:02}:{:02}", hours, mins, rem);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}
