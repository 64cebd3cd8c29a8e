/// State shared between the audio callback and the analyzer.
///
/// `window` is a ring buffer holding the most recently played samples,
/// `write_pos` points at the oldest one.
pub struct PlaybackState {
    pub window: Vec<f32>,
    pub write_pos: usize,
    pub file_pos: usize,
    pub finished: bool,
}

impl PlaybackState {
    pub fn new(window_size: usize) -> PlaybackState {
        PlaybackState {
            window: vec![0.0; window_size],
            write_pos: 0,
            file_pos: 0,
            finished: false,
        }
    }

    pub fn push_samples(&mut self, samples: &[i16]) {
        if self.window.is_empty() {
            return;
        }

        for &sample in samples {
            self.window[self.write_pos] = sample as f32 / i16::MAX as f32;
            self.write_pos = (self.write_pos + 1) % self.window.len();
        }
    }

    /// Copies the window into `out`, oldest sample first.
    pub fn copy_window(&self, out: &mut [f32]) {
        let len = self.window.len().min(out.len());
        let start = (self.write_pos + self.window.len() - len) % self.window.len().max(1);

        for (i, slot) in out.iter_mut().take(len).enumerate() {
            *slot = self.window[(start + i) % self.window.len()];
        }
    }

    pub fn silence(&mut self) {
        self.window.fill(0.0);
        self.write_pos = 0;
    }

    pub fn rewind(&mut self) {
        self.silence();
        self.file_pos = 0;
        self.finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_latest_samples_in_order() {
        let mut state = PlaybackState::new(4);
        state.push_samples(&[i16::MAX, 0, 0, 0, 0, i16::MAX]);

        let mut out = [9.0; 4];
        state.copy_window(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rewind_clears_position_and_window() {
        let mut state = PlaybackState::new(2);
        state.push_samples(&[100, 200]);
        state.file_pos = 10;
        state.finished = true;

        state.rewind();
        assert_eq!(state.window, vec![0.0, 0.0]);
        assert_eq!(state.file_pos, 0);
        assert!(!state.finished);
    }
}
