pub(crate) mod analyzer;
pub(crate) mod audiosource;
pub(crate) mod controls;
pub(crate) mod effects;
pub(crate) mod feed;
pub(crate) mod framescheduler;
pub(crate) mod options;
pub(crate) mod osc;
pub(crate) mod playbackstate;
pub(crate) mod sdlplayer;
pub(crate) mod sdlsurface;
pub(crate) mod surface;
pub(crate) mod synth;
pub(crate) mod tracks;
pub(crate) mod visualizer;
pub(crate) mod wavcodec;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;

use crate::audiosource::AudioSource;
use crate::controls::{ControlCommand, Controller};
use crate::effects::VisualizationMode;
use crate::options::{FeedOptions, Options};
use crate::osc::OscReceiver;
use crate::playbackstate::PlaybackState;
use crate::sdlplayer::SdlPlayer;
use crate::sdlsurface::SdlSurface;
use crate::surface::DrawingSurface;
use crate::tracks::TrackCatalog;
use crate::visualizer::Visualizer;

#[derive(Parser)]
#[command(about = "Portfolio repository feed and audio visualizer")]
struct Cli {
    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Visualization to start with: bars, wave, circle or particles
    #[arg(short, long, value_name = "MODE")]
    mode: Option<String>,

    /// Track to load on startup
    #[arg(short, long, value_name = "ID")]
    track: Option<String>,

    /// Whose repositories to list
    #[arg(short, long, value_name = "NAME")]
    username: Option<String>,

    /// Skip fetching the repository feed
    #[arg(long)]
    no_feed: bool,

    /// Address to receive OSC control messages on
    #[arg(long, value_name = "ADDR")]
    osc_listen: Option<SocketAddr>,
}

fn load_options(args: &Cli) -> Result<Options, String> {
    let mut options = match args.config.as_deref() {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    if let Some(mode) = &args.mode {
        options.render.mode = mode.clone();
    }
    if let Some(username) = &args.username {
        options.feed.username = username.clone();
    }
    if args.no_feed {
        options.feed.enabled = false;
    }
    if args.osc_listen.is_some() {
        options.osc.listen = args.osc_listen;
    }

    options.render.validate()?;
    Ok(options)
}

fn spawn_feed(options: FeedOptions) -> Result<(), String> {
    thread::Builder::new()
        .name("Feed".to_string())
        .spawn(move || {
            let view = feed::render_feed(feed::fetch_repositories(&options), options.max_cards);
            print!("{}", view);
        })
        .map(|_| ())
        .map_err(|error| format!("Failed to create thread: {}", error))
}

fn spawn_osc(listen_addr: SocketAddr, sender: Sender<ControlCommand>) -> Result<(), String> {
    let osc_receiver = OscReceiver::new(listen_addr, sender)
        .map_err(|msg| format!("Cannot set up OSC: {}", msg))?;

    thread::Builder::new()
        .name("OSC".to_string())
        .spawn(move || {
            osc_receiver.run();
        })
        .map(|_| ())
        .map_err(|error| format!("Failed to create thread: {}", error))
}

fn key_command(keycode: Keycode, controller: &Controller) -> Option<ControlCommand> {
    let track = |index: usize| {
        controller
            .tracks()
            .id_at(index)
            .map(|id| ControlCommand::SelectTrack(id.to_string()))
    };
    let mode = |mode: VisualizationMode| Some(ControlCommand::SelectMode(mode.name().to_string()));

    match keycode {
        Keycode::Num1 => mode(VisualizationMode::Bars),
        Keycode::Num2 => mode(VisualizationMode::Wave),
        Keycode::Num3 => mode(VisualizationMode::Circle),
        Keycode::Num4 => mode(VisualizationMode::Particles),
        Keycode::F1 | Keycode::Q => track(0),
        Keycode::F2 | Keycode::W => track(1),
        Keycode::F3 | Keycode::E => track(2),
        Keycode::Space => Some(ControlCommand::TogglePlayback),
        Keycode::Escape => Some(ControlCommand::Quit),
        _ => None,
    }
}

fn run(args: Cli) -> Result<(), String> {
    let options = load_options(&args)?;

    let initial_mode = VisualizationMode::from_id(&options.render.mode).unwrap_or_else(|| {
        log::warn!(
            "Unknown visualization {}, using {}",
            options.render.mode,
            VisualizationMode::default().name()
        );
        VisualizationMode::default()
    });

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .map_err(|error| format!("Cannot install Ctrl-C handler: {}", error))?;

    if options.feed.enabled {
        spawn_feed(options.feed.clone())?;
    }

    let (command_sender, command_receiver) = mpsc::channel();
    if let Some(listen_addr) = options.osc.listen {
        spawn_osc(listen_addr, command_sender.clone())?;
    }

    let sdl = sdl2::init()?;
    let video = sdl.video()?;
    let audio = sdl.audio()?;

    let window = video
        .window(
            &options.window.title,
            options.window.width,
            options.window.height,
        )
        .position_centered()
        .resizable()
        .allow_highdpi()
        .build()
        .map_err(|error| error.to_string())?;
    let canvas = window
        .into_canvas()
        .accelerated()
        .build()
        .map_err(|error| error.to_string())?;
    let mut surface = SdlSurface::new(canvas);
    surface.clear();
    surface.present();

    let playback_state = Arc::new(Mutex::new(PlaybackState::new(options.analyzer.fft_size)));
    let mut player = SdlPlayer::new(&audio, Arc::clone(&playback_state))?;

    let mut visualizer = Visualizer::new(
        options.analyzer.clone(),
        &options.render,
        initial_mode,
        StdRng::from_entropy(),
    );
    let mut controller = Controller::new(TrackCatalog::with_entries(&options.tracks), initial_mode);

    if let Some(track) = &args.track {
        if command_sender
            .send(ControlCommand::SelectTrack(track.clone()))
            .is_err()
        {
            log::warn!("Cannot queue startup track {}", track);
        }
    }

    surface.set_title(&format!("{} - {}", options.window.title, controller.status()));

    let mut event_pump = sdl.event_pump()?;
    let frame_interval = visualizer.frame_interval();

    while running.load(Ordering::SeqCst) {
        let mut commands = vec![];
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => commands.push(ControlCommand::Quit),
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => commands.extend(key_command(keycode, &controller)),
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    surface.sync_with_window();
                    if !visualizer.is_running() {
                        surface.clear();
                        surface.present();
                    }
                }
                _ => {}
            }
        }
        commands.extend(command_receiver.try_iter());

        let now = Instant::now();
        let title_changed = !commands.is_empty();
        for command in commands {
            if !controller.apply(command, &mut player, &mut visualizer, now) {
                running.store(false, Ordering::SeqCst);
            }
        }
        if title_changed {
            surface.set_title(&format!("{} - {}", options.window.title, controller.status()));
        }

        if player.take_finished() {
            controller.track_finished(&mut visualizer);
        }

        if visualizer.poll_frame(Instant::now(), &mut surface) {
            surface.present();
        }

        let wait = visualizer
            .time_until_next_frame(Instant::now())
            .map_or(frame_interval, |wait| wait.min(frame_interval));
        thread::sleep(wait);
    }

    log::info!("Shutting down");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(msg) = run(args) {
        log::error!("{}", msg);
        std::process::exit(1);
    }
}
