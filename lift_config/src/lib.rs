#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and travel calibration parsing for the lift controller.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - The travel CSV loader enforces headers and fits seconds-per-percent
//!   through the origin, dropping gross outliers before the final fit.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Every logical channel the controller may drive.
pub const CHANNEL_NAMES: [&str; 6] = ["preset1", "preset2", "preset3", "preset4", "up", "down"];

/// Highest BCM GPIO line exposed on the Pi header.
pub const MAX_BCM_PIN: u8 = 27;

/// Seconds of directional pulse per percentage point observed on the
/// reference rig.
pub const DEFAULT_SECONDS_PER_PERCENT: f64 = 1.0 / 15.0;

/// Upper bound for any calibration constant, configured or fitted.
pub const MAX_SECONDS_PER_PERCENT: f64 = 10.0;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingCfg {
    /// Calibration constant: seconds of `up`/`down` per percentage point.
    pub seconds_per_percent: f64,
    /// How long a preset button is held.
    pub preset_press_ms: u64,
    /// Ceiling for a single directional pulse; 0 disables it.
    pub max_pulse_ms: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            seconds_per_percent: DEFAULT_SECONDS_PER_PERCENT,
            preset_press_ms: 125,
            max_pulse_ms: 5000,
        }
    }
}

/// Optional measured travel data; when present it replaces
/// `timing.seconds_per_percent`.
#[derive(Debug, Deserialize, Clone)]
pub struct CalibrationCfg {
    /// CSV path, relative paths resolve against the config file's directory.
    pub csv: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// How long each channel is asserted during a wiring walk.
    pub walk_hold_ms: u64,
    /// Pause between channels during a wiring walk.
    pub walk_gap_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            walk_hold_ms: 3000,
            walk_gap_ms: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Logical channel name to BCM pin.
    pub channels: BTreeMap<String, u8>,
    #[serde(default)]
    pub timing: TimingCfg,
    #[serde(default)]
    pub calibration: Option<CalibrationCfg>,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Channels
        let mut seen: BTreeMap<u8, &str> = BTreeMap::new();
        for (name, &pin) in &self.channels {
            if !CHANNEL_NAMES.contains(&name.as_str()) {
                eyre::bail!(
                    "channels.{name} is not a known channel (expected one of {})",
                    CHANNEL_NAMES.join(", ")
                );
            }
            if pin > MAX_BCM_PIN {
                eyre::bail!("channels.{name} pin {pin} is out of range (0..={MAX_BCM_PIN})");
            }
            if let Some(other) = seen.insert(pin, name) {
                eyre::bail!("channels.{name} and channels.{other} share pin {pin}");
            }
        }

        // Timing
        let k = self.timing.seconds_per_percent;
        if !k.is_finite() || k <= 0.0 {
            eyre::bail!("timing.seconds_per_percent must be a positive number");
        }
        if k > MAX_SECONDS_PER_PERCENT {
            eyre::bail!("timing.seconds_per_percent is unreasonably large (>10s per point)");
        }
        if !(1..=5000).contains(&self.timing.preset_press_ms) {
            eyre::bail!("timing.preset_press_ms must be in 1..=5000");
        }
        if self.timing.max_pulse_ms > 60_000 {
            eyre::bail!("timing.max_pulse_ms is unreasonably large (>60s)");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly (got {r:?})");
        }

        // Hardware
        if self.hardware.walk_hold_ms == 0 {
            eyre::bail!("hardware.walk_hold_ms must be >= 1");
        }

        Ok(())
    }

    /// Known channels with no pin assigned. Not a validation failure: an
    /// operation that needs one of these fails on its own.
    pub fn missing_channels(&self) -> Vec<&'static str> {
        CHANNEL_NAMES
            .iter()
            .copied()
            .filter(|n| !self.channels.contains_key(*n))
            .collect()
    }

    /// Resolve `[calibration].csv` against `base` (the config file's directory).
    pub fn calibration_path(&self, base: &Path) -> Option<PathBuf> {
        self.calibration.as_ref().map(|c| {
            if c.csv.is_absolute() {
                c.csv.clone()
            } else {
                base.join(&c.csv)
            }
        })
    }
}

/// Travel calibration CSV schema.
///
/// Expected headers:
/// percent,seconds
///
/// Each row is one timed run: holding `up` (or `down`) for `seconds`
/// moved the lift `percent` points.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TravelRow {
    pub percent: f64,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct TravelCalibration {
    pub seconds_per_percent: f64,
    /// Rows kept in the final fit.
    pub inliers: usize,
    /// RMS of the final fit's residuals, in seconds.
    pub rms_s: f64,
}

impl TravelCalibration {
    /// Least-squares fit of `seconds = k * percent` (no intercept: zero
    /// travel takes zero time). Rows further than 2 RMS from the first fit
    /// are dropped and the fit repeated when at least two rows remain.
    pub fn from_rows(rows: &[TravelRow]) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("travel calibration requires at least one row");
        }
        for (i, r) in rows.iter().enumerate() {
            if !(r.percent.is_finite() && r.percent > 0.0) {
                eyre::bail!("travel row {}: percent must be > 0", i + 1);
            }
            if !(r.seconds.is_finite() && r.seconds >= 0.0) {
                eyre::bail!("travel row {}: seconds must be >= 0", i + 1);
            }
        }

        let all: Vec<&TravelRow> = rows.iter().collect();
        let k0 = fit_through_origin(&all)?;
        let rms0 = rms(&all, k0);

        let (k, kept) = if rms0 > 0.0 && all.len() > 2 {
            let inliers: Vec<&TravelRow> = all
                .iter()
                .copied()
                .filter(|r| (r.seconds - k0 * r.percent).abs() <= 2.0 * rms0)
                .collect();
            if inliers.len() >= 2 && inliers.len() < all.len() {
                (fit_through_origin(&inliers)?, inliers)
            } else {
                (k0, all)
            }
        } else {
            (k0, all)
        };

        if k <= 0.0 {
            eyre::bail!("travel calibration produced a non-positive seconds_per_percent");
        }
        if k > MAX_SECONDS_PER_PERCENT {
            eyre::bail!("travel calibration is unreasonably slow (>10s per point)");
        }
        Ok(Self {
            seconds_per_percent: k,
            inliers: kept.len(),
            rms_s: rms(&kept, k),
        })
    }
}

fn fit_through_origin(rows: &[&TravelRow]) -> eyre::Result<f64> {
    let sxy: f64 = rows.iter().map(|r| r.percent * r.seconds).sum();
    let sxx: f64 = rows.iter().map(|r| r.percent * r.percent).sum();
    if !sxx.is_finite() || sxx == 0.0 {
        eyre::bail!("travel calibration cannot determine slope");
    }
    let k = sxy / sxx;
    if !k.is_finite() {
        eyre::bail!("travel calibration produced non-finite slope");
    }
    Ok(k)
}

fn rms(rows: &[&TravelRow], k: f64) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sumsq: f64 = rows
        .iter()
        .map(|r| {
            let e = r.seconds - k * r.percent;
            e * e
        })
        .sum();
    (sumsq / rows.len() as f64).sqrt()
}

impl TryFrom<&[TravelRow]> for TravelCalibration {
    type Error = eyre::Report;
    fn try_from(rows: &[TravelRow]) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_travel_csv(path: &Path) -> eyre::Result<TravelCalibration> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open travel CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["percent", "seconds"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "travel CSV must have headers 'percent,seconds', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TravelRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        }
    }

    TravelCalibration::try_from(rows.as_slice())
}
