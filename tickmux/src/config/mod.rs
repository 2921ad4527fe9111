//! Scheduler configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! scheduler:
//!   tick_micros: 1000
//!   capacity: 34
//!   clock_hz: 16000000
//! ```
//!
//! Every field is optional; missing values fall back to their defaults so a
//! partial (or absent) `scheduler:` section is accepted gracefully.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default target tick resolution: 1 ms.
pub const DEFAULT_TICK_MICROS: u32 = 1_000;

/// Default timer-table capacity.
pub const DEFAULT_CAPACITY: usize = 34;

/// Default counter input clock: 16 MHz.
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

/// Hard ceiling on the table capacity — handles are 8-bit slot indices.
pub const MAX_CAPACITY: usize = 256;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// This is kept private – callers work with [`SchedulerConfig`] instead.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scheduler: Option<ConfigEntry>,
}

/// Scheduler fields as they appear in the YAML file.
#[derive(Debug, Deserialize)]
struct ConfigEntry {
    #[serde(default = "default_tick_micros")]
    tick_micros: u32,
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default = "default_clock_hz")]
    clock_hz: u32,
}

fn default_tick_micros() -> u32 {
    DEFAULT_TICK_MICROS
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_clock_hz() -> u32 {
    DEFAULT_CLOCK_HZ
}

// ── SchedulerConfig ───────────────────────────────────────────────────────────

/// Everything the scheduler recognises at initialisation.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Target tick resolution in microseconds.
    pub tick_micros: u32,

    /// Fixed maximum number of concurrently attached timers.
    pub capacity: usize,

    /// Input clock frequency of the tick counter, in hertz.
    pub clock_hz: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_micros: DEFAULT_TICK_MICROS,
            capacity: DEFAULT_CAPACITY,
            clock_hz: DEFAULT_CLOCK_HZ,
        }
    }
}

impl SchedulerConfig {
    /// Parse `path` and return the validated configuration.
    ///
    /// * A file without a `scheduler:` section yields the defaults, with a
    ///   warning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, if the YAML is
    /// structurally invalid, or if a value fails [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        let config = match file.scheduler {
            Some(entry) => SchedulerConfig {
                tick_micros: entry.tick_micros,
                capacity: entry.capacity,
                clock_hz: entry.clock_hz,
            },
            None => {
                warn!("No scheduler section found in configuration file, using defaults");
                SchedulerConfig::default()
            }
        };

        config.validate()?;

        info!(
            tick_micros = config.tick_micros,
            capacity = config.capacity,
            clock_hz = config.clock_hz,
            "Scheduler configuration loaded"
        );

        Ok(config)
    }

    /// Check the configured values against the hardware limits.
    ///
    /// # Errors
    /// * `tick_micros` must be at least 1.
    /// * `capacity` must be in `1..=`[`MAX_CAPACITY`].
    /// * `clock_hz` must be at least 2 MHz — below that, one microsecond is
    ///   less than one sweep cycle and the rate arithmetic degenerates to a
    ///   zero-length sweep.
    pub fn validate(&self) -> Result<()> {
        if self.tick_micros == 0 {
            bail!("tick_micros must be at least 1");
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            bail!(
                "capacity must be between 1 and {MAX_CAPACITY}, got {}",
                self.capacity
            );
        }
        if self.clock_hz < 2_000_000 {
            bail!(
                "clock_hz must be at least 2000000 (2 MHz), got {}",
                self.clock_hz
            );
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
