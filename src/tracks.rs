use std::path::PathBuf;
use std::sync::Arc;

use crate::options::TrackEntry;
use crate::synth::{SynthPreset, Waveshape};

/// Where the player gets a track's audio from.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSource {
    Synth(SynthPreset),
    File(PathBuf),
    /// An encoded WAV container held in memory.
    Memory(Arc<[u8]>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub source: TrackSource,
}

pub struct TrackCatalog {
    tracks: Vec<Track>,
}

fn demo_track(id: &str, title: &str, shape: Waveshape, frequency: f32) -> Track {
    Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: "Srit".to_string(),
        source: TrackSource::Synth(SynthPreset {
            shape,
            frequency,
            duration_secs: 30.0,
        }),
    }
}

impl TrackCatalog {
    pub fn demo() -> TrackCatalog {
        TrackCatalog {
            tracks: vec![
                demo_track("demo1", "Clearscapes", Waveshape::Harmonic, 220.0),
                demo_track("demo2", "The Hermit", Waveshape::Sine, 440.0),
                demo_track("demo3", "[Old] Wingbeats of flying", Waveshape::Pulse, 110.0),
            ],
        }
    }

    /// The demo catalog followed by the tracks listed in the config file.
    /// Entries reusing an existing id are skipped.
    pub fn with_entries(entries: &[TrackEntry]) -> TrackCatalog {
        let mut catalog = TrackCatalog::demo();

        for entry in entries {
            if catalog.get(&entry.id).is_some() {
                log::warn!("Ignoring duplicate track id {}", entry.id);
                continue;
            }

            let source = match (&entry.path, entry.synth) {
                (Some(path), _) => TrackSource::File(path.clone()),
                (None, Some(preset)) => TrackSource::Synth(preset),
                (None, None) => {
                    log::warn!("Track {} has neither a path nor a synth preset", entry.id);
                    continue;
                }
            };

            catalog.tracks.push(Track {
                id: entry.id.clone(),
                title: entry.title.clone(),
                artist: entry.artist.clone(),
                source,
            });
        }

        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.id == id)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}
