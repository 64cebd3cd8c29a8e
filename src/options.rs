use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::synth::SynthPreset;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    pub window: WindowOptions,
    pub analyzer: AnalyzerOptions,
    pub render: RenderOptions,
    pub feed: FeedOptions,
    pub osc: OscOptions,
    pub tracks: Vec<TrackEntry>,
}

impl Options {
    /// Reads a config file; the format follows the file extension.
    pub fn load(path: &Path) -> Result<Options, String> {
        Options::from_config_file(path)
            .map_err(|err| format!("Cannot read config {}: {}", path.display(), err))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        WindowOptions {
            title: "klangbild".to_string(),
            width: 960,
            height: 540,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Samples per transform, a power of two
    pub fft_size: usize,
    /// Weight of the previous frame when smoothing magnitudes (0..1)
    pub smoothing: f32,
    pub min_db: f32,
    pub max_db: f32,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
        }
    }
}

impl AnalyzerOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.fft_size < 32 || !self.fft_size.is_power_of_two() {
            return Err(format!(
                "FFT size must be a power of two >= 32, got {}",
                self.fft_size
            ));
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(format!(
                "Smoothing must be in [0, 1), got {}",
                self.smoothing
            ));
        }
        if self.min_db >= self.max_db {
            return Err(format!(
                "min_db ({}) must be below max_db ({})",
                self.min_db, self.max_db
            ));
        }
        Ok(())
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

pub const MAX_FRAME_RATE_HZ: f32 = 1000.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub frame_rate_hz: f32,
    pub particle_count: usize,
    /// Initial visualization, by short name
    pub mode: String,
    pub measure_fps: bool,
}

impl RenderOptions {
    pub fn validate(&self) -> Result<(), String> {
        if !self.frame_rate_hz.is_finite()
            || self.frame_rate_hz <= 0.0
            || self.frame_rate_hz > MAX_FRAME_RATE_HZ
        {
            return Err(format!(
                "Frame rate must be in (0, {}] Hz, got {}",
                MAX_FRAME_RATE_HZ, self.frame_rate_hz
            ));
        }
        Ok(())
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            frame_rate_hz: 60.0,
            particle_count: 100,
            mode: "circle".to_string(),
            measure_fps: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedOptions {
    pub enabled: bool,
    pub api_base: String,
    pub username: String,
    pub page_size: u32,
    pub max_cards: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            enabled: true,
            api_base: "https://api.github.com".to_string(),
            username: "Special-Srit".to_string(),
            page_size: 6,
            max_cards: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OscOptions {
    pub listen: Option<SocketAddr>,
}

/// A track added to the catalog by the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    pub path: Option<PathBuf>,
    pub synth: Option<SynthPreset>,
}
