extern crate sdl2;

use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired, AudioStatus};
use sdl2::AudioSubsystem;
use std::sync::{Arc, Mutex};

use crate::audiosource::AudioSource;
use crate::playbackstate::PlaybackState;
use crate::synth::SAMPLE_RATE;
use crate::tracks::TrackSource;
use crate::wavcodec;

struct TrackCallback {
    samples: Vec<i16>,
    playback_state: Arc<Mutex<PlaybackState>>,
}

impl AudioCallback for TrackCallback {
    type Channel = i16;

    fn callback(&mut self, out: &mut [i16]) {
        let Ok(mut playback_state) = self.playback_state.lock() else {
            out.fill(0);
            return;
        };

        let start = playback_state.file_pos.min(self.samples.len());
        let end = (start + out.len()).min(self.samples.len());
        let played = end - start;

        out[..played].copy_from_slice(&self.samples[start..end]);
        out[played..].fill(0);
        playback_state.push_samples(out);
        playback_state.file_pos = end;

        if end == self.samples.len() {
            playback_state.finished = true;
        }
    }
}

fn read_samples(source: &TrackSource) -> Result<Vec<i16>, String> {
    let container = match source {
        TrackSource::Synth(preset) => {
            let waveform = preset.render();
            log::debug!(
                "Synthesized {:.1}s of {:?} at {} Hz",
                waveform.duration_secs(),
                preset.shape,
                preset.frequency
            );
            let resource = waveform
                .into_resource()
                .map_err(|err| format!("Cannot encode track: {}", err))?;
            return read_samples(&resource);
        }
        TrackSource::File(path) => {
            let bytes = std::fs::read(path)
                .map_err(|err| format!("Cannot read {}: {}", path.display(), err))?;
            wavcodec::decode(&bytes)
        }
        TrackSource::Memory(bytes) => wavcodec::decode(bytes),
    }
    .map_err(|err| format!("Cannot decode track: {}", err))?;

    if container.sample_rate != SAMPLE_RATE {
        return Err(format!(
            "WAV data needs to be s16le, {} Hz, mono (got {} Hz).",
            SAMPLE_RATE, container.sample_rate
        ));
    }

    Ok(container.samples)
}

pub struct SdlPlayer {
    device: AudioDevice<TrackCallback>,
    playback_state: Arc<Mutex<PlaybackState>>,
}

impl SdlPlayer {
    pub fn new(
        sdl_audio: &AudioSubsystem,
        playback_state: Arc<Mutex<PlaybackState>>,
    ) -> Result<SdlPlayer, String> {
        let desired_spec = AudioSpecDesired {
            freq: Some(SAMPLE_RATE as i32),
            channels: Some(1),
            samples: None, // Default sample buffer size
        };

        let callback_state = Arc::clone(&playback_state);
        let device = sdl_audio.open_playback(None, &desired_spec, |_spec| TrackCallback {
            samples: vec![],
            playback_state: callback_state,
        })?;

        let spec = device.spec();
        if spec.freq != SAMPLE_RATE as i32 || spec.channels != 1 {
            return Err(format!(
                "Audio device opened with {} Hz / {} channels, need {} Hz mono",
                spec.freq, spec.channels, SAMPLE_RATE
            ));
        }

        log::info!("Audio device opened: {} Hz mono", spec.freq);

        Ok(SdlPlayer {
            device,
            playback_state,
        })
    }
}

impl AudioSource for SdlPlayer {
    fn load(&mut self, source: &TrackSource) -> Result<(), String> {
        let samples = read_samples(source)?;
        self.device.pause();

        let sample_count = samples.len();
        self.device.lock().samples = samples;
        if let Ok(mut playback_state) = self.playback_state.lock() {
            playback_state.rewind();
        }

        log::info!(
            "Loaded {:.1}s of audio",
            sample_count as f32 / SAMPLE_RATE as f32
        );
        Ok(())
    }

    fn play(&mut self) {
        // The callback holds the device lock while it takes the state lock,
        // so never nest them the other way round.
        let sample_count = self.device.lock().samples.len();
        if let Ok(mut playback_state) = self.playback_state.lock() {
            // Starting over after the end, like a media element does
            if playback_state.finished || playback_state.file_pos >= sample_count {
                playback_state.rewind();
            }
        }
        self.device.resume();
    }

    fn pause(&mut self) {
        self.device.pause();
    }

    fn is_playing(&self) -> bool {
        self.device.status() == AudioStatus::Playing
    }

    fn take_finished(&mut self) -> bool {
        let finished = match self.playback_state.lock() {
            Ok(playback_state) => playback_state.finished,
            Err(_) => return false,
        };

        if finished && self.is_playing() {
            self.device.pause();
            return true;
        }
        false
    }

    fn tap(&self) -> Result<Arc<Mutex<PlaybackState>>, String> {
        if self.playback_state.is_poisoned() {
            return Err("Playback state is poisoned".to_string());
        }
        Ok(Arc::clone(&self.playback_state))
    }
}
