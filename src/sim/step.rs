/// The step function: produces the next snapshot from the current one.
///
/// Processing order for a tick:
///   1. Bomb resolution (arm, count down, detonate)
///   2. Gravity / dig (up to `fall_rows_per_tick` rows)
///   3. Map extension
///   4. Progression (XP from this tick's mining)
///   5. Death check
///
/// A lateral move runs the same contact rule against the current snapshot,
/// outside the tick.
///
/// Neither entry point touches its input. The caller commits the returned
/// snapshot as a whole, so a tick is all-or-nothing.

use rand::Rng;

use crate::config::SimConfig;
use crate::domain::entity::{MoveDir, Player};
use crate::domain::progression;
use crate::domain::rules::{self, Contact};
use crate::domain::tile::{Fuse, MineralKind, Tile};
use super::bomb;
use super::event::{GameEvent, HitCause};
use super::generate;
use super::map::TileMap;

/// Map + player: everything the simulation owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub map: TileMap,
    pub player: Player,
}

impl Snapshot {
    pub fn new_game(rng: &mut impl Rng, cfg: &SimConfig) -> Self {
        Snapshot {
            map: generate::generate_initial_map(rng, cfg),
            player: Player::spawn(cfg),
        }
    }
}

#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub snapshot: Snapshot,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════

pub fn tick(prev: &Snapshot, cfg: &SimConfig, rng: &mut impl Rng) -> StepOutcome {
    let mut next = prev.clone();
    let mut events = Vec::new();
    let was_alive = next.player.is_alive();

    bomb::resolve(&mut next.map, &mut next.player, cfg, &mut events);

    let mut xp = 0;
    if next.player.is_alive() {
        xp = resolve_gravity(&mut next, cfg, &mut events);
    }

    let added = generate::extend_below(&mut next.map, next.player.y, rng, cfg);
    if added > 0 {
        events.push(GameEvent::RowsGenerated { count: added });
    }

    award_xp(&mut next.player, xp, cfg, &mut events);
    check_death(was_alive, &next.player, &mut events);

    StepOutcome { snapshot: next, events }
}

pub fn move_player(prev: &Snapshot, dir: MoveDir, cfg: &SimConfig) -> StepOutcome {
    let mut next = prev.clone();
    let mut events = Vec::new();
    if !next.player.is_alive() {
        return StepOutcome { snapshot: next, events };
    }

    next.player.facing = dir.facing();
    let (x, y) = (next.player.x, next.player.y);
    let tx = dir.target_x(x, next.map.width());
    if tx != x {
        let outcome = rules::contact(next.map.get(tx, y), next.player.drill_power);
        let xp = apply_contact(&mut next, tx, y, outcome, true, cfg, &mut events);
        award_xp(&mut next.player, xp, cfg, &mut events);
        check_death(true, &next.player, &mut events);
    }

    StepOutcome { snapshot: next, events }
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Returns the XP earned by mining on the way down.
fn resolve_gravity(s: &mut Snapshot, cfg: &SimConfig, events: &mut Vec<GameEvent>) -> u64 {
    let mut xp = 0;
    let mut fell = 0;
    for _ in 0..cfg.fall_rows_per_tick {
        let (x, y) = (s.player.x, s.player.y + 1);
        let outcome = rules::contact(s.map.get(x, y), s.player.drill_power);
        xp += apply_contact(s, x, y, outcome, false, cfg, events);
        if !outcome.moves_player() {
            break;
        }
        fell += 1;
        if !s.player.is_alive() {
            break;
        }
    }
    if fell > 0 {
        events.push(GameEvent::PlayerFell { rows: fell });
    }
    xp
}

// ══════════════════════════════════════════════════════════════
// Contact: shared by gravity and lateral moves
// ══════════════════════════════════════════════════════════════

/// Write the contact result into the map and move the player if it says so.
/// Returns the XP earned (non-zero only when a mineral breaks).
fn apply_contact(
    s: &mut Snapshot,
    tx: usize, ty: usize,
    outcome: Contact,
    lateral: bool,
    cfg: &SimConfig,
    events: &mut Vec<GameEvent>,
) -> u64 {
    let Some(target) = s.map.get(tx, ty) else { return 0 };
    s.map.set(tx, ty, rules::tile_after(target, outcome));

    let mut xp = 0;
    match outcome {
        Contact::Chip { kind, remaining } => {
            events.push(GameEvent::MineralChipped { x: tx, y: ty, kind, remaining });
        }
        Contact::Break { kind } => {
            xp = rules::mining_xp(kind);
            s.player.minerals_mined = s.player.minerals_mined.saturating_add(1);
            log::debug!("mined {} at ({tx}, {ty})", kind.name());
            events.push(GameEvent::MineralMined { x: tx, y: ty, kind, xp });
            if kind == MineralKind::SweetPotato {
                let amount = s.player.heal(cfg.sweetpotato_heal);
                if amount > 0 {
                    events.push(GameEvent::Healed { amount });
                }
            }
        }
        // Walking into a dormant bomb lights it; landing on one does not.
        Contact::Bomb(Fuse::Inactive) if lateral => {
            s.map.set(tx, ty, Tile::Bomb { fuse: Fuse::Armed(cfg.bomb_countdown) });
            events.push(GameEvent::BombArmed { x: tx, y: ty });
        }
        _ => {}
    }

    if outcome.moves_player() {
        enter(&mut s.player, tx, ty, outcome == Contact::Lava, cfg, events);
    }
    xp
}

/// Move the player into a cell. Lava burns only on the transition in.
fn enter(
    player: &mut Player,
    x: usize, y: usize,
    is_lava: bool,
    cfg: &SimConfig,
    events: &mut Vec<GameEvent>,
) {
    player.x = x;
    player.y = y;
    if is_lava && !player.on_lava {
        player.hurt(cfg.lava_damage);
        events.push(GameEvent::PlayerHit { cause: HitCause::Lava, health: player.health });
    }
    player.on_lava = is_lava;
}

// ══════════════════════════════════════════════════════════════
// Progression / death
// ══════════════════════════════════════════════════════════════

fn award_xp(player: &mut Player, xp: u64, cfg: &SimConfig, events: &mut Vec<GameEvent>) {
    if xp == 0 {
        return;
    }
    if progression::add_xp(player, xp, cfg) > 0 {
        log::info!("level up: {} (drill power {})", player.level, player.drill_power);
        events.push(GameEvent::LeveledUp { level: player.level });
    }
}

fn check_death(was_alive: bool, player: &Player, events: &mut Vec<GameEvent>) {
    if was_alive && !player.is_alive() {
        log::info!("player died at depth {}", player.y);
        events.push(GameEvent::PlayerDied);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
