// main.rs
mod audio_manager;
mod controls;
mod render;

use std::path::Path;

use audio_manager::AudioManager;
use controls::TouchTracker;
use fragment_maze::core::input::{InputMode, InputSource};
use fragment_maze::core::session::{GameEvent, GameState, Level, Session};
use fragment_maze::{GameConfig, Grid};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use raylib::prelude::*;
use render::{hud, topdown};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "maze.toml";
const SOUNDS_DIR: &str = "assets/sounds";

fn load_config() -> GameConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return GameConfig::default();
    }
    match GameConfig::load(CONFIG_PATH) {
        Ok(config) => {
            info!(path = CONFIG_PATH, "config loaded");
            config
        }
        Err(err) => {
            error!(%err, "bad config, using defaults");
            GameConfig::default()
        }
    }
}

/// Optional fixed first level from a text layout, like `maze.txt`.
fn load_layout(path: &str) -> Option<Grid> {
    let text = std::fs::read_to_string(path).ok()?;
    match Grid::parse(&text) {
        Ok(grid) => Some(grid),
        Err(err) => {
            warn!(path, %err, "ignoring maze layout");
            None
        }
    }
}

fn joystick_center(screen: Vec2, config: &GameConfig) -> Vec2 {
    let inset = config.joystick_radius * 2.0;
    Vec2::new(inset, screen.y - inset)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let window_width = 1300;
    let window_height = 900;
    let config = load_config();
    let layout_path = std::env::args().nth(1).unwrap_or_else(|| "maze.txt".to_string());
    let mut layout = load_layout(&layout_path);

    let (mut window, raylib_thread) = raylib::init()
        .size(window_width, window_height)
        .title("Fragment Maze")
        .build();
    window.set_target_fps(60);
    // Escape releases the pointer instead of quitting.
    window.set_exit_key(None);

    let audio = AudioManager::new().map(|mut a| {
        a.load_cues(SOUNDS_DIR);
        a
    });
    if audio.is_none() {
        warn!("no audio output device, playing silently");
    }

    let mut session: Option<Session> = None;
    let mut touches = TouchTracker::default();
    let mut pending = Vec::new();

    while !window.window_should_close() {
        let screen = Vec2::new(window.get_screen_width() as f32, window.get_screen_height() as f32);
        let dt = window.get_frame_time();

        match session.as_mut() {
            None => {
                if let Some(mode) = controls::pick_mode(&window) {
                    let input = match mode {
                        InputMode::Desktop => InputSource::desktop(),
                        InputMode::Touch => InputSource::touch(joystick_center(screen, &config), &config),
                    };
                    let mut s = Session::new(config.clone(), input, StdRng::from_entropy());
                    if let Some(grid) = layout.take() {
                        let size = grid.width();
                        let level = Level::from_grid(size, grid, &config, &mut rand::thread_rng());
                        s.start_with_level(level);
                    }
                    session = Some(s);
                }
            }
            Some(s) => {
                s.set_joystick_center(joystick_center(screen, &config));
                if s.state() == GameState::Won {
                    if controls::acknowledged(&window) {
                        s.acknowledge_win();
                        touches.clear();
                    }
                } else {
                    match s.input() {
                        InputSource::Desktop(d) => {
                            let captured = d.is_captured();
                            controls::poll_desktop(&mut window, captured, &mut pending);
                        }
                        InputSource::Touch(_) => touches.poll(&window, &mut pending),
                    }
                    if window.is_key_pressed(KeyboardKey::KEY_R) {
                        s.restart_level();
                    }
                }
                for event in pending.drain(..) {
                    s.handle_input(event);
                }
                s.tick(dt);

                for event in s.drain_events() {
                    match event {
                        GameEvent::Cue(cue) => {
                            if let Some(a) = &audio {
                                a.play(cue);
                            }
                        }
                        GameEvent::Won { .. } => window.enable_cursor(),
                        _ => {}
                    }
                }
            }
        }

        let mut d = window.begin_drawing(&raylib_thread);
        d.clear_background(Color::BLACK);
        match &session {
            None => hud::draw_title(&mut d, screen),
            Some(s) => {
                let objects = s.scene_objects();
                let view = topdown::View::fit(&objects, screen);
                topdown::draw_scene(&mut d, &view, &objects);
                topdown::draw_player(&mut d, &view, s.player());
                hud::draw_status(&mut d, s, screen);
                if let InputSource::Touch(t) = s.input() {
                    hud::draw_joystick(&mut d, t, t.joystick_center(), s.config().joystick_radius);
                }
                if s.state() == GameState::Won {
                    hud::draw_win_banner(&mut d, s, screen);
                }
            }
        }
    }
}
