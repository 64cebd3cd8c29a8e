use rand::rngs::StdRng;
use std::time::{Duration, Instant};

use crate::analyzer::Analyzer;
use crate::audiosource::AudioSource;
use crate::effects::bars::Bars;
use crate::effects::circle::Circle;
use crate::effects::particles::Particles;
use crate::effects::wave::Wave;
use crate::effects::{VisualEffect, VisualizationMode};
use crate::framescheduler::{FrameHandle, FrameScheduler};
use crate::options::{AnalyzerOptions, RenderOptions};
use crate::surface::DrawingSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Running(FrameHandle),
}

/// Drives the frame loop: pulls a snapshot from the analyzer each frame and
/// hands it to the effect of the current mode.
pub struct Visualizer {
    analyzer: Analyzer,
    scheduler: FrameScheduler,
    state: RenderState,
    mode: VisualizationMode,
    bars: Bars,
    wave: Wave,
    circle: Circle,
    particles: Particles,
}

impl Visualizer {
    pub fn new(
        analyzer_options: AnalyzerOptions,
        render_options: &RenderOptions,
        mode: VisualizationMode,
        rng: StdRng,
    ) -> Visualizer {
        Visualizer {
            analyzer: Analyzer::new(analyzer_options),
            scheduler: FrameScheduler::new(
                render_options.frame_rate_hz,
                render_options.measure_fps,
            ),
            state: RenderState::Idle,
            mode,
            bars: Bars,
            wave: Wave::new(),
            circle: Circle,
            particles: Particles::new(render_options.particle_count, rng),
        }
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: VisualizationMode) {
        if mode != self.mode {
            log::info!("Visualization: {}", mode.name());
        }
        self.mode = mode;
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RenderState::Running(_))
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending_frames()
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Playback started: attach the analyzer if needed and start drawing.
    pub fn on_play(&mut self, source: &dyn AudioSource, now: Instant) {
        self.analyzer.initialize(source);
        self.analyzer.resume();
        self.start(now);
    }

    pub fn on_pause(&mut self) {
        self.analyzer.suspend();
        self.stop();
    }

    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }
        self.state = RenderState::Running(self.scheduler.request_frame(now));
    }

    pub fn stop(&mut self) {
        if let RenderState::Running(handle) = self.state {
            self.scheduler.cancel_frame(handle);
        }
        self.state = RenderState::Idle;
    }

    /// How long the caller may wait before the next frame is due.
    pub fn time_until_next_frame(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_due(now)
    }

    pub fn frame_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Runs a frame if one is due. Returns whether anything was drawn.
    pub fn poll_frame(&mut self, now: Instant, surface: &mut dyn DrawingSurface) -> bool {
        let Some(handle) = self.scheduler.take_due(now) else {
            return false;
        };
        if self.state != RenderState::Running(handle) {
            return false;
        }

        // Schedule the next frame before drawing this one
        self.state = RenderState::Running(self.scheduler.request_frame(now));
        self.render_frame(surface)
    }

    /// Draws the current snapshot. Without an attached analyzer this does nothing.
    pub fn render_frame(&mut self, surface: &mut dyn DrawingSurface) -> bool {
        let Some(snapshot) = self.analyzer.refresh() else {
            return false;
        };
        let bins = snapshot.as_slice();

        surface.clear();
        let effect: &mut dyn VisualEffect = match self.mode {
            VisualizationMode::Bars => &mut self.bars,
            VisualizationMode::Wave => &mut self.wave,
            VisualizationMode::Circle => &mut self.circle,
            VisualizationMode::Particles => &mut self.particles,
        };
        effect.draw(bins, surface);
        true
    }

    #[cfg(test)]
    pub(crate) fn particles(&self) -> &Particles {
        &self.particles
    }
}
