use std::sync::{Arc, Mutex};

use crate::playbackstate::PlaybackState;
use crate::tracks::TrackSource;

/// A playback device the visualizer can listen to.
///
/// The visualizer never drives transport itself; it only reacts to play and
/// pause and reads from the tap.
pub trait AudioSource {
    fn load(&mut self, source: &TrackSource) -> Result<(), String>;
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Returns true once after the loaded track played to its end.
    fn take_finished(&mut self) -> bool;
    /// Shared window of the samples currently being played.
    fn tap(&self) -> Result<Arc<Mutex<PlaybackState>>, String>;
}
