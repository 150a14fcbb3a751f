/// WorldState: the running session around the simulation snapshot.
///
/// ## Snapshot ownership
///
/// `snapshot` (map + player) is only ever replaced whole, through
/// `commit()`. Both the tick and lateral moves compute a new snapshot
/// from the current one and hand it back here.
///
/// ## Two-phase tick
///
/// When the tick timer fires the driver calls `begin_hop()`: the player
/// is drawn lifted for `hop_ms`. Then `advance()` computes the next
/// snapshot and commits it. Pausing, dying or restarting drops a pending
/// hop, and nothing is computed until commit, so a tick never half-applies.
///
/// ## Camera / Viewport
///
/// The map is narrow, so only the vertical axis scrolls:
///   - `camera.y` is the map row shown at the top of the viewport
///   - `screen_row = world_y - camera.y`
///   - the camera keeps a look-ahead below the falling player

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::SimConfig;
use crate::domain::entity::MoveDir;
use super::event::GameEvent;
use super::step::{self, Snapshot, StepOutcome};

/// Ticks a transient message stays on screen.
const MESSAGE_TICKS: u32 = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Camera: a vertical viewport into the map.
///
/// `view_h` is how many map rows fit on screen. It is computed from the
/// terminal size and set during `render()`.
#[derive(Clone, Debug)]
pub struct Camera {
    /// Map row of the top visible line
    pub y: usize,
    /// Number of map rows visible
    pub view_h: usize,
}

impl Camera {
    pub fn new() -> Self {
        Camera { y: 0, view_h: 0 }
    }

    /// Follow a target row. The player may drift freely between a small
    /// top margin and the look-ahead zone; the camera only scrolls when
    /// the target leaves that band.
    pub fn follow(&mut self, target_y: usize, world_h: usize) {
        if self.view_h == 0 { return; }

        let margin_top = self.view_h / 5;
        let lookahead = self.view_h / 2;
        let top_bound = self.y + margin_top;
        let bottom_bound = (self.y + self.view_h).saturating_sub(lookahead + 1);

        if target_y < top_bound {
            self.y = target_y.saturating_sub(margin_top);
        } else if target_y > bottom_bound {
            self.y = (target_y + lookahead + 1).saturating_sub(self.view_h);
        }
        self.clamp(world_h);
    }

    /// Snap so the target sits at the top margin. Used on new game.
    pub fn center_on(&mut self, target_y: usize, world_h: usize) {
        if self.view_h == 0 { return; }
        self.y = target_y.saturating_sub(self.view_h / 5);
        self.clamp(world_h);
    }

    fn clamp(&mut self, world_h: usize) {
        self.y = self.y.min(world_h.saturating_sub(self.view_h));
    }

    /// Convert a map row to a viewport row. `None` if off screen.
    pub fn world_to_view(&self, wy: usize) -> Option<usize> {
        let vy = wy.checked_sub(self.y)?;
        (vy < self.view_h).then_some(vy)
    }
}

pub struct WorldState {
    pub cfg: SimConfig,
    pub seed: u64,
    rng: Pcg32,

    // ── Simulation ──
    pub snapshot: Snapshot,

    // ── Meta ──
    pub phase: Phase,
    pub paused: bool,
    pub tick: u64,

    // ── Animation ──
    /// A tick has started its hop and will commit on `advance()`.
    pub hop_pending: bool,
    /// Flips on its own timer; armed bombs flash with it.
    pub blink: bool,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,

    // ── Camera / Viewport ──
    pub camera: Camera,
}

// ── Construction ──

impl WorldState {
    pub fn new(cfg: SimConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let snapshot = Snapshot::new_game(&mut rng, &cfg);
        WorldState {
            cfg,
            seed,
            rng,
            snapshot,
            phase: Phase::Playing,
            paused: false,
            tick: 0,
            hop_pending: false,
            blink: false,
            message: String::new(),
            message_timer: 0,
            camera: Camera::new(),
        }
    }

    /// Throw the map away and start over from `seed`.
    pub fn restart(&mut self, seed: u64) {
        log::info!("restart with seed {seed}");
        let view_h = self.camera.view_h;
        *self = WorldState::new(self.cfg.clone(), seed);
        self.camera.view_h = view_h;
        self.camera.center_on(self.snapshot.player.y, self.snapshot.map.height());
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}

// ── Tick / move ──

impl WorldState {
    fn accepts_input(&self) -> bool {
        self.phase == Phase::Playing && !self.paused
    }

    /// First half of a tick. Returns false when the session is not running.
    pub fn begin_hop(&mut self) -> bool {
        if !self.accepts_input() { return false; }
        self.hop_pending = true;
        true
    }

    /// Second half of a tick: compute and commit. No-op without a pending hop.
    pub fn advance(&mut self) -> Vec<GameEvent> {
        if !self.hop_pending || !self.accepts_input() {
            self.hop_pending = false;
            return vec![];
        }
        self.hop_pending = false;
        self.tick += 1;

        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }

        let outcome = step::tick(&self.snapshot, &self.cfg, &mut self.rng);
        self.commit(outcome)
    }

    pub fn move_player(&mut self, dir: MoveDir) -> Vec<GameEvent> {
        if !self.accepts_input() { return vec![]; }
        let outcome = step::move_player(&self.snapshot, dir, &self.cfg);
        self.commit(outcome)
    }

    /// Swap in the new snapshot and react to what happened.
    fn commit(&mut self, outcome: StepOutcome) -> Vec<GameEvent> {
        self.snapshot = outcome.snapshot;

        for ev in &outcome.events {
            match ev {
                GameEvent::LeveledUp { level } => {
                    self.set_message(&format!("LEVEL UP! Lv {level}"), MESSAGE_TICKS);
                }
                GameEvent::Healed { amount } => {
                    self.set_message(&format!("Sweet potato! +{amount} HP"), MESSAGE_TICKS);
                }
                GameEvent::PlayerDied => {
                    self.phase = Phase::GameOver;
                    self.hop_pending = false;
                    self.set_message("GAME OVER", 0);
                }
                _ => {}
            }
        }

        self.camera.follow(self.snapshot.player.y, self.snapshot.map.height());
        outcome.events
    }

    pub fn toggle_pause(&mut self) {
        if self.phase != Phase::Playing { return; }
        self.paused = !self.paused;
        if self.paused { self.hop_pending = false; }
    }

    pub fn toggle_blink(&mut self) {
        self.blink = !self.blink;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Player;
    use crate::sim::map::TileMap;

    fn world() -> WorldState {
        WorldState::new(SimConfig::default(), 42)
    }

    fn full_tick(w: &mut WorldState) -> Vec<GameEvent> {
        w.begin_hop();
        w.advance()
    }

    /// Player standing on `rows[1]`, quiet generator.
    fn scripted(rows: &[&str], px: usize, py: usize) -> WorldState {
        let mut w = world();
        w.cfg.map_height = 2;
        w.cfg.map_width = rows[0].len();
        w.cfg.bomb_chance = 0.0;
        w.cfg.sweetpotato_chance = 0.0;
        w.snapshot = Snapshot {
            map: TileMap::from_rows(rows),
            player: Player::new(px, py, &w.cfg),
        };
        w
    }

    #[test]
    fn new_game_is_playing() {
        let w = world();
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!((w.snapshot.player.x, w.snapshot.player.y), (5, 1));
        assert_eq!(w.snapshot.map.height(), 40);
    }

    #[test]
    fn same_seed_same_world() {
        assert_eq!(world().snapshot, world().snapshot);
        assert_ne!(world().snapshot.map, WorldState::new(SimConfig::default(), 43).snapshot.map);
    }

    #[test]
    fn advance_without_hop_does_nothing() {
        let mut w = world();
        let before = w.snapshot.clone();
        assert!(w.advance().is_empty());
        assert_eq!(w.tick, 0);
        assert_eq!(w.snapshot, before);
    }

    #[test]
    fn hop_then_advance_commits_one_tick() {
        let mut w = scripted(&[" ", " ", " ", "d"], 0, 0);
        assert!(w.begin_hop());
        assert!(w.hop_pending);
        assert_eq!(w.snapshot.player.y, 0);
        w.advance();
        assert!(!w.hop_pending);
        assert_eq!(w.tick, 1);
        assert_eq!(w.snapshot.player.y, 1);
    }

    #[test]
    fn pause_cancels_pending_hop_and_blocks_input() {
        let mut w = scripted(&["  ", "  ", "dd"], 0, 0);
        w.begin_hop();
        w.toggle_pause();
        assert!(!w.hop_pending);
        assert!(w.advance().is_empty());
        assert!(!w.begin_hop());
        w.move_player(MoveDir::Right);
        assert_eq!((w.snapshot.player.x, w.snapshot.player.y), (0, 0));

        w.toggle_pause();
        w.move_player(MoveDir::Right);
        assert_eq!(w.snapshot.player.x, 1);
    }

    #[test]
    fn death_ends_the_game() {
        let mut w = scripted(&[" ", "~", "~"], 0, 0);
        w.snapshot.player.health = 1;
        let events = full_tick(&mut w);
        assert!(events.contains(&GameEvent::PlayerDied));
        assert_eq!(w.phase, Phase::GameOver);
        assert_eq!(w.message, "GAME OVER");

        assert!(!w.begin_hop());
        assert!(w.move_player(MoveDir::Right).is_empty());
        w.toggle_pause();
        assert!(!w.paused);
    }

    #[test]
    fn level_up_shows_message_that_expires() {
        let mut w = scripted(&[" ", "d", "D", "D", "D", "D", "D"], 0, 0);
        w.snapshot.player.xp = 9;
        full_tick(&mut w);
        assert_eq!(w.snapshot.player.level, 2);
        assert!(w.message.starts_with("LEVEL UP"));
        for _ in 0..MESSAGE_TICKS {
            full_tick(&mut w);
        }
        assert!(w.message.is_empty());
    }

    #[test]
    fn restart_resets_everything() {
        let mut w = scripted(&[" ", "~", "~"], 0, 0);
        w.snapshot.player.health = 1;
        full_tick(&mut w);
        assert_eq!(w.phase, Phase::GameOver);

        w.camera.view_h = 12;
        w.restart(7);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.tick, 0);
        assert_eq!(w.seed, 7);
        assert_eq!(w.snapshot.player.health, w.snapshot.player.max_health);
        assert_eq!(w.camera.view_h, 12);
        assert!(w.message.is_empty());
    }

    #[test]
    fn blink_toggles() {
        let mut w = world();
        w.toggle_blink();
        assert!(w.blink);
        w.toggle_blink();
        assert!(!w.blink);
    }

    // ── Camera ──

    #[test]
    fn camera_scrolls_to_keep_lookahead() {
        let mut cam = Camera { y: 0, view_h: 10 };
        cam.follow(3, 100);
        assert_eq!(cam.y, 0);
        cam.follow(8, 100);
        // Player row 8 must leave 5 rows of look-ahead: top = 8 + 6 - 10.
        assert_eq!(cam.y, 4);
        assert_eq!(cam.world_to_view(8), Some(4));
        assert_eq!(cam.world_to_view(3), None);
        assert_eq!(cam.world_to_view(14), None);
    }

    #[test]
    fn camera_clamps_to_generated_rows() {
        let mut cam = Camera { y: 0, view_h: 10 };
        cam.follow(50, 20);
        assert_eq!(cam.y, 10);
        cam.center_on(0, 20);
        assert_eq!(cam.y, 0);
    }
}
