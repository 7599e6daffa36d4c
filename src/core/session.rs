//! Level and session state, and the per-frame tick.
//!
//! A [`Session`] owns everything that changes while playing: the current
//! [`Level`], the player, the timer, counters and the input source. Front-ends
//! push [`InputEvent`]s in, call [`Session::tick`] once per frame and drain the
//! resulting [`GameEvent`]s for sound and HUD updates.
//!
//! ```text
//! Idle --capture--> Exploring --reach unlocked exit--> Won --acknowledge--> Exploring
//! ```
use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::audio::{AudioCue, FootstepTracker};
use crate::core::collision::{Bounds, WallSet, collect_first, is_blocked, within_exit};
use crate::core::input::{CaptureChange, InputEvent, InputSource, MovementIntent};
use crate::core::maze::{self, Grid, START};
use crate::core::placement::{
    KeyPlacement, LOST_FRAGMENT, Pickup, PlacementReport, Placer, keys_required,
};
use crate::core::player::Player;
use crate::core::scene::{self, SceneObject};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the first capture.
    Idle,
    Exploring,
    /// Waiting for the player to acknowledge the win.
    Won,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Cue(AudioCue),
    LevelStarted { maze_size: usize, keys_required: usize },
    FragmentCollected(String),
    KeyCollected { collected: usize, required: usize },
    ExitUnlocked,
    TimerStarted,
    TimerPaused,
    Won { elapsed: f32, next_maze_size: usize },
}

/// Simulated-time stopwatch. Start and pause are both idempotent.
#[derive(Clone, Debug, Default)]
pub struct Stopwatch {
    elapsed: f32,
    running: bool,
}

impl Stopwatch {
    /// Returns true when this call actually started it.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Returns true when this call actually stopped it.
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn advance(&mut self, dt: f32) {
        if self.running {
            self.elapsed += dt;
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// One built maze with its geometry and pickups.
#[derive(Clone, Debug)]
pub struct Level {
    pub maze_size: usize,
    pub grid: Grid,
    pub walls: WallSet,
    pub bounds: Bounds,
    pub exit_position: Vec3,
    pub collectibles: Vec<Pickup>,
    pub keys: Vec<Pickup>,
    pub keys_required: usize,
    pub key_report: PlacementReport,
}

impl Level {
    pub fn generate<R: Rng + ?Sized>(maze_size: usize, config: &GameConfig, rng: &mut R) -> Self {
        let grid = maze::generate(maze_size, rng);
        Self::from_grid(maze_size, grid, config, rng)
    }

    /// Builds geometry and scatters pickups over an existing grid.
    pub fn from_grid<R: Rng + ?Sized>(
        maze_size: usize,
        grid: Grid,
        config: &GameConfig,
        rng: &mut R,
    ) -> Self {
        let placer = Placer::new(config);
        let exit = grid.exit();
        let collectibles =
            placer.place_collectibles(&grid, config.collectibles_per_level, exit, rng);

        let wanted = keys_required(maze_size);
        let KeyPlacement { keys, report } =
            placer.place_keys(&grid, wanted, exit, &collectibles, rng);
        // Never ask for more keys than exist, or the level cannot be won.
        let keys_required = if keys.len() < wanted {
            warn!(wanted, placed = keys.len(), "lowering keys required to keys placed");
            keys.len()
        } else {
            wanted
        };

        let exit_planar = exit.to_world(config.cell_size);
        Self {
            maze_size,
            walls: WallSet::from_grid(&grid, config),
            bounds: Bounds::for_grid(&grid, config),
            exit_position: Vec3::new(exit_planar.x, config.player_height / 2.0, exit_planar.y),
            grid,
            collectibles,
            keys,
            keys_required,
            key_report: report,
        }
    }

    pub fn exit_planar(&self) -> Vec2 {
        Vec2::new(self.exit_position.x, self.exit_position.z)
    }
}

pub struct Session<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
    input: InputSource,
    state: GameState,
    level: Level,
    player: Player,
    timer: Stopwatch,
    footsteps: FootstepTracker,
    keys_collected: usize,
    narrative: Vec<String>,
    final_time: Option<f32>,
    maze_size: usize,
    events: Vec<GameEvent>,
}

impl Session<StdRng> {
    pub fn seeded(config: GameConfig, input: InputSource, seed: u64) -> Self {
        Self::new(config, input, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    /// Builds the first level at `config.start_maze_size`. The session stays
    /// `Idle` until the input source reports a capture.
    pub fn new(config: GameConfig, input: InputSource, mut rng: R) -> Self {
        let level = Level::generate(config.start_maze_size, &config, &mut rng);
        let mut session = Self {
            player: Player::new(&config),
            footsteps: FootstepTracker::new(config.footstep_distance),
            maze_size: config.start_maze_size,
            config,
            rng,
            input,
            state: GameState::Idle,
            level,
            timer: Stopwatch::default(),
            keys_collected: 0,
            narrative: Vec::new(),
            final_time: None,
            events: Vec::new(),
        };
        session.begin_level(false);
        session
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn input(&self) -> &InputSource {
        &self.input
    }

    /// Forwarded to the input source; keeps touch hit-testing in step with
    /// where the front-end draws the joystick.
    pub fn set_joystick_center(&mut self, center: Vec2) {
        self.input.set_joystick_center(center);
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Size of the level being played, or of the next one once won.
    pub fn maze_size(&self) -> usize {
        self.maze_size
    }

    pub fn keys_collected(&self) -> usize {
        self.keys_collected
    }

    pub fn keys_required(&self) -> usize {
        self.level.keys_required
    }

    pub fn exit_unlocked(&self) -> bool {
        self.keys_collected >= self.level.keys_required
    }

    pub fn elapsed(&self) -> f32 {
        self.timer.elapsed()
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn final_time(&self) -> Option<f32> {
        self.final_time
    }

    pub fn narrative(&self) -> &[String] {
        &self.narrative
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feeds one input message to the active source.
    pub fn handle_input(&mut self, event: InputEvent) {
        // Once won, only releases get through so nothing stays held.
        if self.state == GameState::Won && !event.is_release() {
            return;
        }
        match self.input.handle(&event) {
            Some(CaptureChange::Acquired) => match self.state {
                GameState::Idle => {
                    info!(mode = ?self.input.mode(), "exploration started");
                    self.state = GameState::Exploring;
                    self.start_timer();
                }
                GameState::Exploring => self.start_timer(),
                GameState::Won => {}
            },
            Some(CaptureChange::Released) => self.pause_timer(),
            None => {}
        }
    }

    /// Advances the simulation by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.clamp(0.0, self.config.max_frame_delta) } else { 0.0 };
        let intent = self.input.poll_intent();
        if self.state != GameState::Exploring || !self.input.is_active() {
            return;
        }

        self.timer.advance(dt);
        self.player.look(intent.look_delta, self.config.look_sensitivity);

        let before = self.player.planar();
        self.move_player(&intent, dt);
        let clamped = self.level.bounds.clamp(self.player.planar());
        self.player.set_planar(clamped);
        self.player.position.y = self.config.player_height;

        let travelled = clamped.distance(before);
        if let Some(cue) = self.footsteps.advance(travelled, intent.is_moving()) {
            self.events.push(GameEvent::Cue(cue));
        }

        self.resolve_pickups();
        self.check_win();
    }

    /// Each held direction is tried on its own against the walls.
    fn move_player(&mut self, intent: &MovementIntent, dt: f32) {
        let step = self.player.speed * dt;
        if step <= 0.0 {
            return;
        }
        let forward = self.player.forward();
        let right = self.player.right();
        let clearance = self.config.collision_distance();
        let attempts = [
            (intent.forward, forward),
            (intent.backward, -forward),
            (intent.left, -right),
            (intent.right, right),
        ];
        for (held, direction) in attempts {
            if !held {
                continue;
            }
            let p = self.player.position;
            let origin = Vec3::new(p.x, self.config.player_height * 0.5, p.z);
            if !is_blocked(&self.level.walls, origin, direction, step, clearance) {
                self.player.position += direction * step;
            }
        }
    }

    fn resolve_pickups(&mut self) {
        let here = self.player.planar();
        let r = self.player.radius + self.config.pickup_margin;

        let reach = r + self.config.collectible_radius;
        if let Some(fragment) = collect_first(here, &mut self.level.collectibles, reach) {
            let text = fragment.text.unwrap_or_else(|| LOST_FRAGMENT.to_string());
            debug!(cell = %fragment.cell, "fragment collected");
            self.narrative.push(text.clone());
            self.events.push(GameEvent::Cue(AudioCue::Collect));
            self.events.push(GameEvent::FragmentCollected(text));
        }

        let reach = r + self.config.key_radius;
        if let Some(key) = collect_first(here, &mut self.level.keys, reach) {
            self.keys_collected += 1;
            let required = self.level.keys_required;
            debug!(cell = %key.cell, collected = self.keys_collected, required, "key collected");
            self.events.push(GameEvent::Cue(AudioCue::KeyCollect));
            self.events.push(GameEvent::KeyCollected { collected: self.keys_collected, required });
            if self.keys_collected == required {
                info!("exit unlocked");
                self.events.push(GameEvent::ExitUnlocked);
            }
        }
    }

    fn check_win(&mut self) {
        if !self.exit_unlocked() {
            return;
        }
        if within_exit(self.player.planar(), self.level.exit_planar(), self.config.win_distance()) {
            self.win();
        }
    }

    fn win(&mut self) {
        self.state = GameState::Won;
        self.timer.pause();
        let elapsed = self.timer.elapsed();
        self.final_time = Some(elapsed);
        self.input.reset();
        self.footsteps.reset();
        self.maze_size += self.config.maze_size_step;
        info!(elapsed, next_maze_size = self.maze_size, "maze escaped");
        self.events.push(GameEvent::Cue(AudioCue::Victory));
        self.events.push(GameEvent::Won { elapsed, next_maze_size: self.maze_size });
    }

    /// Leaves the win screen for a freshly generated, larger maze. No-op
    /// unless the level has been won.
    pub fn acknowledge_win(&mut self) {
        if self.state != GameState::Won {
            return;
        }
        self.state = GameState::Exploring;
        let level = Level::generate(self.maze_size, &self.config, &mut self.rng);
        // The timer waits for the next capture, whatever the input source.
        self.enter_level(level, false);
    }

    /// Regenerates the current level at the same size.
    pub fn restart_level(&mut self) {
        let level = Level::generate(self.maze_size, &self.config, &mut self.rng);
        self.start_with_level(level);
    }

    /// Replaces the level in play, e.g. with one parsed from a layout file.
    pub fn start_with_level(&mut self, level: Level) {
        if self.state == GameState::Won {
            self.state = GameState::Exploring;
        }
        self.maze_size = level.maze_size;
        let mid_capture = self.timer.is_running();
        self.enter_level(level, mid_capture);
    }

    fn enter_level(&mut self, level: Level, keep_timing: bool) {
        self.level = level;
        self.begin_level(keep_timing);
    }

    /// Resets per-level progress for whatever level is now loaded. The timer
    /// restarts from zero only when it was already running for a live capture.
    fn begin_level(&mut self, keep_timing: bool) {
        let level = &self.level;
        info!(
            maze_size = level.maze_size,
            width = level.grid.width(),
            height = level.grid.height(),
            keys_required = level.keys_required,
            collectibles = level.collectibles.len(),
            "level built"
        );
        self.events.push(GameEvent::LevelStarted {
            maze_size: level.maze_size,
            keys_required: level.keys_required,
        });
        self.player.spawn_at(START, self.config.cell_size);
        self.keys_collected = 0;
        self.narrative.clear();
        self.final_time = None;
        self.footsteps.reset();
        self.timer.reset();
        if keep_timing && self.state == GameState::Exploring && self.input.is_active() {
            self.start_timer();
        }
    }

    fn start_timer(&mut self) {
        if self.timer.start() {
            self.events.push(GameEvent::TimerStarted);
        }
    }

    fn pause_timer(&mut self) {
        if self.timer.pause() {
            self.events.push(GameEvent::TimerPaused);
        }
    }

    /// Everything the renderer should show for the current level.
    pub fn scene_objects(&self) -> Vec<SceneObject> {
        let mut objects: Vec<SceneObject> =
            scene::floor_and_ceiling(&self.level.grid, &self.config).into();
        objects.extend(scene::wall_objects(&self.level.walls));
        objects.extend(
            self.level
                .collectibles
                .iter()
                .chain(&self.level.keys)
                .map(|p| scene::pickup_object(p, &self.config)),
        );
        objects.push(scene::exit_marker(
            self.level.exit_position,
            self.exit_unlocked(),
            &self.config,
        ));
        objects
    }

    pub fn timer_text(&self) -> String {
        format!("Time: {}s", self.timer.elapsed() as u64)
    }

    pub fn keys_text(&self) -> String {
        format!("Keys: {} / {}", self.keys_collected, self.level.keys_required)
    }

    pub fn narrative_text(&self) -> String {
        self.narrative.join("\n")
    }

    pub fn win_text(&self) -> Option<String> {
        let elapsed = self.final_time?;
        Some(format!(
            "You escaped!\nTime: {}s\nNext level: {size}x{size} maze\n(Click to continue)",
            elapsed as u64,
            size = self.maze_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, TouchRegion};
    use crate::core::maze::CellPos;
    use crate::core::placement::PickupKind;
    use crate::core::scene::MaterialRole;

    const CORRIDOR: &str = "#####\n#   #\n### #\n#   #\n#E###\n";

    fn config() -> GameConfig {
        GameConfig { collectibles_per_level: 0, ..GameConfig::default() }
    }

    fn corridor_session() -> Session {
        corridor_session_with(InputSource::desktop())
    }

    /// Session on the small corridor maze, one key at (3,1).
    fn corridor_session_with(input: InputSource) -> Session {
        let config = config();
        let mut session = Session::seeded(config.clone(), input, 7);
        let mut rng = StdRng::seed_from_u64(1);
        let mut level = Level::from_grid(5, Grid::parse(CORRIDOR).unwrap(), &config, &mut rng);
        level.keys = vec![Placer::new(&config).pickup_at(PickupKind::Key, CellPos::new(3, 1), None)];
        level.keys_required = 1;
        session.start_with_level(level);
        session.drain_events();
        session
    }

    fn teleport(session: &mut Session, x: f32, z: f32) {
        session.player.set_planar(Vec2::new(x, z));
    }

    #[test]
    fn idle_until_first_capture() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::KeyDown(KeyCode::W));
        session.tick(0.05);
        assert_eq!(session.state(), GameState::Idle);
        assert_eq!(session.player().planar(), Vec2::new(2.0, 2.0));
        assert_eq!(session.elapsed(), 0.0);

        session.handle_input(InputEvent::PointerLocked);
        assert_eq!(session.state(), GameState::Exploring);
        assert_eq!(session.drain_events(), vec![GameEvent::TimerStarted]);
        session.tick(0.05);
        assert!(session.player().planar().y > 2.0);
    }

    #[test]
    fn pausing_keeps_elapsed_time() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::PointerLocked);
        session.tick(0.05);
        session.tick(0.05);
        assert!((session.elapsed() - 0.1).abs() < 1e-6);

        session.handle_input(InputEvent::PointerUnlocked);
        session.handle_input(InputEvent::PointerUnlocked);
        session.tick(0.05);
        assert!((session.elapsed() - 0.1).abs() < 1e-6);
        assert_eq!(session.state(), GameState::Exploring);

        session.handle_input(InputEvent::PointerLocked);
        session.tick(0.05);
        assert!((session.elapsed() - 0.15).abs() < 1e-6);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::TimerStarted, GameEvent::TimerPaused, GameEvent::TimerStarted]
        );
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::PointerLocked);
        session.tick(5.0);
        assert!((session.elapsed() - 0.1).abs() < 1e-6);
        session.tick(f32::NAN);
        session.tick(-1.0);
        assert!((session.elapsed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn walls_stop_forward_motion() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::PointerLocked);
        session.handle_input(InputEvent::KeyDown(KeyCode::W));
        for _ in 0..10 {
            session.tick(0.1);
        }
        let p = session.player().planar();
        assert!((p.y - 2.5).abs() < 1e-4, "stopped short of the wall at z=2.95, got {p}");
        assert!((p.x - 2.0).abs() < 1e-4);
        assert_eq!(session.player().position.y, 1.6);
    }

    #[test]
    fn win_needs_keys_and_proximity() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::PointerLocked);

        teleport(&mut session, 2.0, 7.0);
        session.tick(0.016);
        assert_eq!(session.state(), GameState::Exploring);
        assert_eq!(session.scene_objects().last().map(|o| o.role), Some(MaterialRole::ExitLocked));

        teleport(&mut session, 6.0, 2.0);
        session.tick(0.016);
        assert_eq!(session.keys_collected(), 1);
        assert_eq!(session.state(), GameState::Exploring);
        assert_eq!(session.scene_objects().last().map(|o| o.role), Some(MaterialRole::ExitUnlocked));

        teleport(&mut session, 2.0, 7.0);
        session.tick(0.016);
        assert_eq!(session.state(), GameState::Won);
        assert!(!session.timer_running());
        assert_eq!(session.maze_size(), 7);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::ExitUnlocked));
        assert!(events.contains(&GameEvent::Cue(AudioCue::Victory)));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Won { next_maze_size: 7, .. })));
        assert!(session.win_text().is_some_and(|t| t.contains("7x7")));
    }

    #[test]
    fn won_state_ignores_input_until_acknowledged() {
        let mut session = corridor_session();
        session.handle_input(InputEvent::PointerLocked);
        teleport(&mut session, 6.0, 2.0);
        session.tick(0.016);
        teleport(&mut session, 2.0, 7.0);
        session.tick(0.016);
        assert_eq!(session.state(), GameState::Won);
        let frozen_at = session.elapsed();

        session.handle_input(InputEvent::PointerLocked);
        session.handle_input(InputEvent::KeyDown(KeyCode::W));
        session.tick(0.1);
        assert_eq!(session.state(), GameState::Won);
        assert_eq!(session.player().planar(), Vec2::new(2.0, 7.0));
        assert_eq!(session.elapsed(), frozen_at);

        session.acknowledge_win();
        assert_eq!(session.state(), GameState::Exploring);
        assert_eq!(session.level().maze_size, 7);
        assert_eq!(session.level().grid.width(), 7);
        assert_eq!(session.keys_collected(), 0);
        assert!(session.narrative().is_empty());
        assert_eq!(session.player().planar(), Vec2::new(2.0, 2.0));
        assert_eq!(session.elapsed(), 0.0);
        assert!(!session.timer_running());
        assert_eq!(session.final_time(), None);

        session.drain_events();
        session.handle_input(InputEvent::PointerLocked);
        assert_eq!(session.drain_events(), vec![GameEvent::TimerStarted]);
    }

    #[test]
    fn touch_timer_waits_for_a_touch_after_the_win() {
        let input = InputSource::touch(Vec2::new(100.0, 500.0), &config());
        let mut session = corridor_session_with(input);

        let look = |id| InputEvent::TouchStart {
            region: TouchRegion::Look,
            id,
            position: Vec2::new(500.0, 100.0),
        };
        session.handle_input(look(1));
        assert!(session.timer_running());
        teleport(&mut session, 6.0, 2.0);
        session.tick(0.016);
        teleport(&mut session, 2.0, 7.0);
        session.tick(0.016);
        assert_eq!(session.state(), GameState::Won);

        session.acknowledge_win();
        assert_eq!(session.state(), GameState::Exploring);
        assert!(!session.timer_running());
        session.tick(0.1);
        assert_eq!(session.elapsed(), 0.0);

        session.drain_events();
        session.handle_input(look(2));
        assert_eq!(session.drain_events(), vec![GameEvent::TimerStarted]);
        session.tick(0.05);
        assert!((session.elapsed() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn pickup_is_collected_once() {
        let mut session = corridor_session();
        let placer = Placer::new(session.config());
        session.level.collectibles = vec![placer.pickup_at(
            PickupKind::Collectible,
            CellPos::new(2, 1),
            Some("a fragment".to_string()),
        )];
        session.handle_input(InputEvent::PointerLocked);
        teleport(&mut session, 4.0, 2.0);
        session.tick(0.016);
        session.tick(0.016);

        let collected = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::FragmentCollected(_)))
            .count();
        assert_eq!(collected, 1);
        assert_eq!(session.narrative_text(), "a fragment");
        assert!(session.level().collectibles.is_empty());
    }

    #[test]
    fn touch_look_is_applied_once() {
        let config = config();
        let input = InputSource::touch(Vec2::new(100.0, 500.0), &config);
        let mut session = Session::seeded(config, input, 3);
        session.handle_input(InputEvent::TouchStart {
            region: TouchRegion::Look,
            id: 1,
            position: Vec2::new(500.0, 100.0),
        });
        assert_eq!(session.state(), GameState::Exploring);

        let yaw = session.player().yaw;
        session.handle_input(InputEvent::TouchMove { id: 1, position: Vec2::new(510.0, 100.0) });
        session.tick(0.016);
        let turned = session.player().yaw;
        assert!((turned - (yaw - 10.0 * 0.002)).abs() < 1e-5);
        session.tick(0.016);
        assert_eq!(session.player().yaw, turned);
    }

    #[test]
    fn restart_keeps_size_and_resets_progress() {
        let mut session = Session::seeded(config(), InputSource::desktop(), 11);
        session.handle_input(InputEvent::PointerLocked);
        session.tick(0.1);
        session.restart_level();
        assert_eq!(session.maze_size(), 10);
        assert_eq!(session.level().grid.width(), 11);
        assert_eq!(session.elapsed(), 0.0);
        assert!(session.timer_running());
        assert_eq!(session.keys_text(), "Keys: 0 / 1");
        assert_eq!(session.timer_text(), "Time: 0s");
    }

    #[test]
    fn stopwatch_is_idempotent() {
        let mut watch = Stopwatch::default();
        assert!(watch.start());
        assert!(!watch.start());
        watch.advance(1.5);
        assert!(watch.pause());
        assert!(!watch.pause());
        watch.advance(1.0);
        assert_eq!(watch.elapsed(), 1.5);
    }
}
