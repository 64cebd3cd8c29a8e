use std::time::Instant;

use crate::audiosource::AudioSource;
use crate::effects::VisualizationMode;
use crate::tracks::{Track, TrackCatalog};
use crate::visualizer::Visualizer;

/// Everything a user (keyboard or OSC) can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    SelectMode(String),
    SelectTrack(String),
    Play,
    Pause,
    TogglePlayback,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeButton {
    pub mode: VisualizationMode,
    pub active: bool,
}

/// The row of mode buttons; exactly one of them is active.
pub struct ModeSelector {
    buttons: [ModeButton; 4],
}

impl ModeSelector {
    pub fn new(initial: VisualizationMode) -> ModeSelector {
        ModeSelector {
            buttons: VisualizationMode::ALL.map(|mode| ModeButton {
                mode,
                active: mode == initial,
            }),
        }
    }

    /// Activates the button for `id`. Unknown ids change nothing.
    pub fn select(&mut self, id: &str) -> Option<VisualizationMode> {
        let mode = VisualizationMode::from_id(id)?;
        for button in &mut self.buttons {
            button.active = button.mode == mode;
        }
        Some(mode)
    }

    pub fn active(&self) -> VisualizationMode {
        self.buttons
            .iter()
            .find(|button| button.active)
            .map_or(VisualizationMode::default(), |button| button.mode)
    }

    pub fn buttons(&self) -> &[ModeButton] {
        &self.buttons
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
}

impl std::fmt::Display for NowPlaying {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.artist.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.title, self.artist)
        }
    }
}

/// Track picker plus the title/artist display.
pub struct TrackControls {
    catalog: TrackCatalog,
    now_playing: Option<NowPlaying>,
}

impl TrackControls {
    pub fn new(catalog: TrackCatalog) -> TrackControls {
        TrackControls {
            catalog,
            now_playing: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.catalog.get(id)
    }

    /// Looks up a track and shows it as current. Unknown ids change nothing.
    pub fn select(&mut self, id: &str) -> Option<&Track> {
        let track = self.catalog.get(id)?;
        self.now_playing = Some(NowPlaying {
            title: track.title.clone(),
            artist: track.artist.clone(),
        });
        Some(track)
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    /// Id of the n-th catalog entry, for number keys.
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.catalog.tracks().get(index).map(|track| track.id.as_str())
    }
}

/// Applies commands to the player and the visualizer, keeping the mode
/// buttons and the track display in step.
pub struct Controller {
    modes: ModeSelector,
    tracks: TrackControls,
}

impl Controller {
    pub fn new(catalog: TrackCatalog, mode: VisualizationMode) -> Controller {
        Controller {
            modes: ModeSelector::new(mode),
            tracks: TrackControls::new(catalog),
        }
    }

    pub fn modes(&self) -> &ModeSelector {
        &self.modes
    }

    pub fn tracks(&self) -> &TrackControls {
        &self.tracks
    }

    /// One line for the window title: the mode buttons with the active one
    /// bracketed, then the current track.
    pub fn status(&self) -> String {
        let buttons: Vec<String> = self
            .modes
            .buttons()
            .iter()
            .map(|button| {
                if button.active {
                    format!("[{}]", button.mode.name())
                } else {
                    button.mode.name().to_string()
                }
            })
            .collect();

        match self.tracks.now_playing() {
            Some(now_playing) => format!("{} | {}", buttons.join(" "), now_playing),
            None => buttons.join(" "),
        }
    }

    /// Returns false once the command asks to quit.
    pub fn apply(
        &mut self,
        command: ControlCommand,
        player: &mut dyn AudioSource,
        visualizer: &mut Visualizer,
        now: Instant,
    ) -> bool {
        match command {
            ControlCommand::SelectMode(id) => match self.modes.select(&id) {
                Some(mode) => visualizer.set_mode(mode),
                None => log::debug!("Ignoring unknown visualization {}", id),
            },
            ControlCommand::SelectTrack(id) => self.load_track(&id, player, visualizer),
            ControlCommand::Play => self.play(player, visualizer, now),
            ControlCommand::Pause => Controller::pause(player, visualizer),
            ControlCommand::TogglePlayback => {
                if player.is_playing() {
                    Controller::pause(player, visualizer);
                } else {
                    self.play(player, visualizer, now);
                }
            }
            ControlCommand::Quit => return false,
        }
        true
    }

    /// The loaded track ran out; handled like a pause.
    pub fn track_finished(&mut self, visualizer: &mut Visualizer) {
        log::debug!("Track finished");
        visualizer.on_pause();
    }

    fn load_track(&mut self, id: &str, player: &mut dyn AudioSource, visualizer: &mut Visualizer) {
        let Some(track) = self.tracks.get(id) else {
            log::debug!("Ignoring unknown track {}", id);
            return;
        };

        // Swapping the source stops playback, like a media element reload
        if player.is_playing() {
            Controller::pause(player, visualizer);
        }

        // The display only follows once the player holds the new audio
        if let Err(msg) = player.load(&track.source) {
            log::error!("Cannot load track {}: {}", track.id, msg);
            return;
        }
        if let Some(track) = self.tracks.select(id) {
            log::info!("Track: {} by {}", track.title, track.artist);
        }
    }

    fn play(&mut self, player: &mut dyn AudioSource, visualizer: &mut Visualizer, now: Instant) {
        if self.tracks.now_playing().is_none() {
            log::warn!("No track selected");
            return;
        }
        if !player.is_playing() {
            player.play();
        }
        visualizer.on_play(&*player, now);
    }

    fn pause(player: &mut dyn AudioSource, visualizer: &mut Visualizer) {
        if player.is_playing() {
            player.pause();
        }
        visualizer.on_pause();
    }
}
