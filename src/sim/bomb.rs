/// Bomb resolver: fuse timers, detonation, blast effects.
///
/// Per tick, in two passes:
///   1. Scan every bomb against the *pre-tick* player position:
///      inactive within activation radius → armed at `bomb_countdown`,
///      armed > 0 → count down, armed == 0 → scheduled.
///   2. Detonate scheduled bombs in scan order (top-left first).
///
/// The scan finishes before any blast mutates the map, so a detonation
/// never changes what a later cell in the same scan sees.
///
/// A blast turns every in-bounds cell within Chebyshev `bomb_radius`
/// into Lava (bombs caught in it are consumed, not chained). A player
/// inside the square takes `bomb_damage` and is knocked back one column.
/// Each detonation hits separately; there is no per-tick dedup.

use crate::config::SimConfig;
use crate::domain::entity::Player;
use crate::domain::rules;
use crate::domain::tile::{Fuse, Tile};
use super::event::{GameEvent, HitCause};
use super::map::TileMap;

pub fn resolve(map: &mut TileMap, player: &mut Player, cfg: &SimConfig, events: &mut Vec<GameEvent>) {
    let (px, py) = (player.x, player.y);

    // ── Pass 1: scan ──
    let mut fuse_updates: Vec<(usize, usize, Fuse)> = Vec::new();
    let mut scheduled: Vec<(usize, usize)> = Vec::new();

    for (x, y, tile) in map.cells() {
        let Tile::Bomb { fuse } = tile else { continue };
        match fuse {
            Fuse::Inactive => {
                if rules::chebyshev(x, y, px, py) <= cfg.bomb_activation_radius {
                    fuse_updates.push((x, y, Fuse::Armed(cfg.bomb_countdown)));
                    events.push(GameEvent::BombArmed { x, y });
                }
            }
            Fuse::Armed(0) => scheduled.push((x, y)),
            Fuse::Armed(n) => fuse_updates.push((x, y, Fuse::Armed(n - 1))),
        }
    }

    for (x, y, fuse) in fuse_updates {
        map.set(x, y, Tile::Bomb { fuse });
    }

    // ── Pass 2: detonate ──
    for (bx, by) in scheduled {
        detonate(map, player, bx, by, cfg, events);
    }

    // A blast may have turned the player's own cell to lava. That is not an
    // entry, so only the flag is synced here.
    player.on_lava = map.get(player.x, player.y).is_some_and(Tile::is_lava);
}

fn detonate(
    map: &mut TileMap, player: &mut Player,
    bx: usize, by: usize,
    cfg: &SimConfig, events: &mut Vec<GameEvent>,
) {
    let r = cfg.bomb_radius;
    for y in by.saturating_sub(r)..=by + r {
        for x in bx.saturating_sub(r)..=bx + r {
            map.set(x, y, Tile::Lava);
        }
    }
    events.push(GameEvent::BombExploded { x: bx, y: by });
    log::debug!("bomb at ({bx}, {by}) exploded, radius {r}");

    if rules::chebyshev(player.x, player.y, bx, by) > r {
        return;
    }

    player.hurt(cfg.bomb_damage);
    events.push(GameEvent::PlayerHit { cause: HitCause::Blast, health: player.health });

    let row = player.y;
    let pushed = rules::knockback_target(player.x, bx, map.width(), |x| {
        map.get(x, row).is_some_and(Tile::is_passable)
    });
    if let Some(to_x) = pushed {
        events.push(GameEvent::KnockedBack { from_x: player.x, to_x });
        player.x = to_x;
    }
}
