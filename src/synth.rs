use std::f64::consts::PI;
use std::sync::Arc;

use crate::tracks::TrackSource;
use crate::wavcodec::{self, ContainerError};

pub const SAMPLE_RATE: u32 = 44100;

const TONE_AMPLITUDE: f64 = 0.3;
const HARMONIC_PARTIALS: [(f64, f64); 3] = [(1.0, 0.3), (1.5, 0.2), (2.0, 0.1)];
const PULSE_ENVELOPE_HZ: f64 = 0.5;

/// Mono PCM samples in [-1, 1] generated in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedWaveform {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl SynthesizedWaveform {
    /// Phases are computed in f64; only the finished sample is narrowed.
    fn generate(duration_secs: f32, sample: impl Fn(f64) -> f64) -> SynthesizedWaveform {
        let sample_count = sample_count(SAMPLE_RATE, duration_secs);
        let samples = (0..sample_count)
            .map(|i| sample(i as f64 / SAMPLE_RATE as f64) as f32)
            .collect();

        SynthesizedWaveform {
            sample_rate: SAMPLE_RATE,
            samples,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encodes the waveform into a WAV container the player can open.
    pub fn into_resource(self) -> Result<TrackSource, ContainerError> {
        Ok(TrackSource::Memory(Arc::from(wavcodec::encode(&self)?)))
    }
}

fn sample_count(sample_rate: u32, duration_secs: f32) -> usize {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return 0;
    }

    (sample_rate as f64 * duration_secs as f64).round() as usize
}

pub fn synthesize_tone(frequency: f32, duration_secs: f32) -> SynthesizedWaveform {
    let frequency = frequency as f64;
    SynthesizedWaveform::generate(duration_secs, |t| {
        (2.0 * PI * frequency * t).sin() * TONE_AMPLITUDE
    })
}

/// Sums three partials with falling weights for a fuller timbre.
pub fn synthesize_harmonic_tone(base_frequency: f32, duration_secs: f32) -> SynthesizedWaveform {
    let base_frequency = base_frequency as f64;
    SynthesizedWaveform::generate(duration_secs, |t| {
        HARMONIC_PARTIALS
            .iter()
            .map(|(ratio, weight)| (2.0 * PI * base_frequency * ratio * t).sin() * weight)
            .sum()
    })
}

/// Square wave whose level swells with a slow sine envelope.
pub fn synthesize_pulse_tone(frequency: f32, duration_secs: f32) -> SynthesizedWaveform {
    let frequency = frequency as f64;
    SynthesizedWaveform::generate(duration_secs, |t| {
        let pulse = if (2.0 * PI * frequency * t).sin() > 0.0 {
            TONE_AMPLITUDE
        } else {
            -TONE_AMPLITUDE
        };
        let envelope = 0.5 + 0.5 * (2.0 * PI * PULSE_ENVELOPE_HZ * t).sin();
        pulse * envelope
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveshape {
    Sine,
    Harmonic,
    Pulse,
}

/// Recipe for a synthesized demo track.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize)]
pub struct SynthPreset {
    pub shape: Waveshape,
    pub frequency: f32,
    pub duration_secs: f32,
}

impl SynthPreset {
    pub fn render(&self) -> SynthesizedWaveform {
        match self.shape {
            Waveshape::Sine => synthesize_tone(self.frequency, self.duration_secs),
            Waveshape::Harmonic => synthesize_harmonic_tone(self.frequency, self.duration_secs),
            Waveshape::Pulse => synthesize_pulse_tone(self.frequency, self.duration_secs),
        }
    }
}
