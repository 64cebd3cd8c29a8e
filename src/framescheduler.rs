use std::time::{Duration, Instant};

use crate::options::MAX_FRAME_RATE_HZ;

const FALLBACK_FRAME_RATE_HZ: f32 = 60.0;

/// Identifies one requested frame so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchedulerState {
    Idle,
    Pending { handle: FrameHandle, due: Instant },
}

/// Hands out at most one frame at a time, paced to a fixed rate.
pub struct FrameScheduler {
    interval: Duration,
    state: SchedulerState,
    next_handle: u64,
    last_tick: Option<Instant>,
    measure_fps: bool,
    last_fps_print: Instant,
    frames: u32,
}

impl FrameScheduler {
    /// Rates outside (0, 1000] Hz fall back to 60 Hz.
    pub fn new(freq_hz: f32, measure_fps: bool) -> FrameScheduler {
        let freq_hz = if freq_hz.is_finite() && freq_hz > 0.0 && freq_hz <= MAX_FRAME_RATE_HZ {
            freq_hz
        } else {
            log::warn!(
                "Invalid frame rate {} Hz, using {} Hz",
                freq_hz,
                FALLBACK_FRAME_RATE_HZ
            );
            FALLBACK_FRAME_RATE_HZ
        };
        let frame_duration_microsec = 1000.0 / freq_hz * 1000.0;

        FrameScheduler {
            interval: Duration::from_micros(frame_duration_microsec as u64),
            state: SchedulerState::Idle,
            next_handle: 1,
            last_tick: None,
            measure_fps,
            last_fps_print: Instant::now(),
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedules the next frame, replacing any frame still pending.
    pub fn request_frame(&mut self, now: Instant) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;

        let due = match self.last_tick {
            Some(last_tick) if last_tick + self.interval > now => last_tick + self.interval,
            Some(_) => {
                log::trace!("Renderer skipped a frame");
                now
            }
            None => now,
        };

        self.state = SchedulerState::Pending { handle, due };
        handle
    }

    /// Drops the pending frame if it is the one given. Returns whether it was.
    pub fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        match self.state {
            SchedulerState::Pending { handle: pending, .. } if pending == handle => {
                self.state = SchedulerState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn pending_frames(&self) -> usize {
        match self.state {
            SchedulerState::Idle => 0,
            SchedulerState::Pending { .. } => 1,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Pending { due, .. } => Some(due.saturating_duration_since(now)),
        }
    }

    /// Hands out the pending frame once it is due.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameHandle> {
        let SchedulerState::Pending { handle, due } = self.state else {
            return None;
        };
        if due > now {
            return None;
        }

        self.state = SchedulerState::Idle;
        self.last_tick = Some(now);
        if self.measure_fps {
            self.update_fps(now);
        }
        Some(handle)
    }

    fn update_fps(&mut self, now: Instant) {
        self.frames += 1;

        if now.saturating_duration_since(self.last_fps_print) > Duration::from_secs(1) {
            log::debug!("Renderer FPS: {}", self.frames);
            self.frames = 0;
            self.last_fps_print = now;
        }
    }
}
