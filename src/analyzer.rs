use dft::{Operation, Plan};
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use crate::audiosource::AudioSource;
use crate::options::AnalyzerOptions;
use crate::playbackstate::PlaybackState;

/// Byte magnitudes, one per frequency bin, overwritten on every refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencySnapshot {
    bins: Vec<u8>,
}

impl FrequencySnapshot {
    fn new(bin_count: usize) -> FrequencySnapshot {
        FrequencySnapshot {
            bins: vec![0; bin_count],
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }
}

fn blackman_window(index: usize, size: usize) -> f32 {
    let phase = 2.0 * PI * index as f32 / size as f32;
    0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
}

/// Everything built when the analyzer first attaches to a source.
struct AnalysisGraph {
    tap: Arc<Mutex<PlaybackState>>,
    plan: Plan<f32>,
    window: Vec<f32>,
    scratch: Vec<f32>,
    smoothed: Vec<f32>,
    snapshot: FrequencySnapshot,
}

pub struct Analyzer {
    options: AnalyzerOptions,
    graph: Option<AnalysisGraph>,
    suspended: bool,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Analyzer {
        Analyzer {
            options,
            graph: None,
            suspended: false,
        }
    }

    /// Attaches to the source's sample tap. Does nothing once attached; a
    /// failure is logged and leaves the analyzer without data.
    pub fn initialize(&mut self, source: &dyn AudioSource) {
        if self.graph.is_some() {
            return;
        }

        if let Err(msg) = self.options.validate() {
            log::error!("Cannot set up audio analysis: {}", msg);
            return;
        }

        let tap = match source.tap() {
            Ok(tap) => tap,
            Err(msg) => {
                log::error!("Cannot set up audio analysis: {}", msg);
                return;
            }
        };

        let fft_size = self.options.fft_size;
        let bin_count = self.options.bin_count();
        self.graph = Some(AnalysisGraph {
            tap,
            plan: Plan::<f32>::new(Operation::Forward, fft_size),
            window: (0..fft_size).map(|i| blackman_window(i, fft_size)).collect(),
            scratch: vec![0.0; fft_size],
            smoothed: vec![0.0; bin_count],
            snapshot: FrequencySnapshot::new(bin_count),
        });

        log::info!(
            "Audio analysis attached: {} point transform, {} bins",
            fft_size,
            bin_count
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Pulls fresh magnitudes unless suspended. `None` until initialized.
    pub fn refresh(&mut self) -> Option<&FrequencySnapshot> {
        let options = &self.options;
        let graph = self.graph.as_mut()?;

        if !self.suspended {
            graph.update(options);
        }

        Some(&graph.snapshot)
    }
}

impl AnalysisGraph {
    fn update(&mut self, options: &AnalyzerOptions) {
        match self.tap.lock() {
            Ok(playback_state) => playback_state.copy_window(&mut self.scratch),
            Err(_) => {
                log::warn!("Playback state is poisoned, skipping analysis");
                return;
            }
        }

        for (sample, weight) in self.scratch.iter_mut().zip(&self.window) {
            *sample *= weight;
        }

        dft::transform(&mut self.scratch[..], &self.plan);

        // Real transforms come back packed: [re(0), re(n/2), re(1), im(1), re(2), im(2), ...]
        let scale_factor = 1.0 / self.scratch.len() as f32;
        let db_range = options.max_db - options.min_db;
        let smoothing = options.smoothing;

        for (k, (smoothed, bin)) in self
            .smoothed
            .iter_mut()
            .zip(self.snapshot.bins.iter_mut())
            .enumerate()
        {
            let (re, im) = if k == 0 {
                (self.scratch[0], 0.0)
            } else {
                (self.scratch[2 * k], self.scratch[2 * k + 1])
            };
            let magnitude = (re * re + im * im).sqrt() * scale_factor;

            *smoothed = smoothing * *smoothed + (1.0 - smoothing) * magnitude;
            if !smoothed.is_finite() {
                *smoothed = 0.0;
            }

            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 / db_range * (db - options.min_db);
            *bin = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audiosource::fake::FakeSource;
    use crate::synth::synthesize_tone;
    use crate::wavcodec::quantize;

    fn tone_samples(bin: usize, count: usize) -> Vec<i16> {
        let frequency = bin as f32 * 44100.0 / 256.0;
        synthesize_tone(frequency, 1.0)
            .samples
            .iter()
            .take(count)
            .map(|&s| quantize(s))
            .collect()
    }

    #[test]
    fn uninitialized_analyzer_has_no_data() {
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        assert!(!analyzer.is_initialized());
        assert!(analyzer.refresh().is_none());
    }

    #[test]
    fn failed_tap_leaves_analyzer_uninitialized() {
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        analyzer.initialize(&FakeSource::broken());
        assert!(!analyzer.is_initialized());
        assert!(analyzer.refresh().is_none());
    }

    #[test]
    fn invalid_options_leave_analyzer_uninitialized() {
        let mut options = AnalyzerOptions::default();
        options.fft_size = 100;
        let mut analyzer = Analyzer::new(options);
        analyzer.initialize(&FakeSource::new(100));
        assert!(!analyzer.is_initialized());
    }

    #[test]
    fn initialization_is_idempotent() {
        let source = FakeSource::new(256);
        let state = source.state.clone().unwrap();
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());

        analyzer.initialize(&source);
        analyzer.initialize(&source);

        assert!(analyzer.is_initialized());
        // One handle in the test, one in the source, one in the graph
        assert_eq!(Arc::strong_count(&state), 3);
        assert_eq!(analyzer.refresh().unwrap().len(), 128);
    }

    #[test]
    fn silence_gives_zero_bins() {
        let source = FakeSource::new(256);
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        analyzer.initialize(&source);

        let snapshot = analyzer.refresh().unwrap();
        assert!(snapshot.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn pure_tone_peaks_in_its_bin() {
        let source = FakeSource::new(256);
        source.feed(&tone_samples(10, 256));
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        analyzer.initialize(&source);

        for _ in 0..30 {
            analyzer.refresh();
        }
        let bins = analyzer.refresh().unwrap().as_slice();

        assert_eq!(bins[10], 255);
        assert!(bins[100] < 64, "bin 100 is {}", bins[100]);
    }

    #[test]
    fn refresh_reuses_the_snapshot_buffer() {
        let source = FakeSource::new(256);
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        analyzer.initialize(&source);

        let first = analyzer.refresh().unwrap().as_slice().as_ptr();
        source.feed(&tone_samples(20, 256));
        let second = analyzer.refresh().unwrap().as_slice().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn suspended_analyzer_keeps_last_snapshot() {
        let source = FakeSource::new(256);
        let mut analyzer = Analyzer::new(AnalyzerOptions::default());
        analyzer.initialize(&source);
        let before = analyzer.refresh().unwrap().clone();

        analyzer.suspend();
        source.feed(&tone_samples(10, 256));
        assert_eq!(analyzer.refresh().unwrap(), &before);

        analyzer.resume();
        assert_ne!(analyzer.refresh().unwrap(), &before);
    }

    #[test]
    fn blackman_window_shape() {
        assert!(blackman_window(0, 256).abs() < 1e-6);
        assert!((blackman_window(128, 256) - 1.0).abs() < 1e-6);
    }
}
