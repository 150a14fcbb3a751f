/// Contact rules, truth-table driven.
///
/// Pure functions: they decide what happens when the player tries to
/// occupy a cell, without touching the map. Both gravity and lateral
/// moves go through `contact`.
///
/// ## Contact Truth Table
///
/// ┌──────────────────────────────┬───────────┬──────────────────────────┐
/// │ Target cell                   │ Player    │ Cell afterwards          │
/// ├──────────────────────────────┼───────────┼──────────────────────────┤
/// │ not generated / off map       │ stays     │ -                        │
/// │ Empty                         │ moves     │ Empty                    │
/// │ Lava                          │ moves     │ Lava (burn on entry)     │
/// │ Bomb                          │ stays     │ Bomb (lateral: arm)      │
/// │ Mineral, health > power       │ stays     │ Mineral, health - power  │
/// │ Mineral, health <= power      │ moves     │ Empty (+XP, potato heal) │
/// └──────────────────────────────┴───────────┴──────────────────────────┘
///
/// ## Knockback
///
/// Push one column away from the bomb. If that side is solid or off
/// the map, try the other side. Same column: right, then left.
/// Both blocked: no push.

use super::tile::{Fuse, MineralKind, Tile};

/// Outcome of trying to occupy a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    /// Nothing there yet (or outside the map).
    Void,
    Open,
    Lava,
    Bomb(Fuse),
    /// Mineral damaged but still standing.
    Chip { kind: MineralKind, remaining: u32 },
    /// Mineral destroyed; the cell is now free.
    Break { kind: MineralKind },
}

impl Contact {
    /// Does the player end up in the target cell?
    pub fn moves_player(self) -> bool {
        matches!(self, Contact::Open | Contact::Lava | Contact::Break { .. })
    }
}

pub fn contact(target: Option<Tile>, drill_power: u32) -> Contact {
    match target {
        None => Contact::Void,
        Some(Tile::Empty) => Contact::Open,
        Some(Tile::Lava) => Contact::Lava,
        Some(Tile::Bomb { fuse }) => Contact::Bomb(fuse),
        Some(Tile::Mineral { kind, health }) => {
            if health > drill_power {
                Contact::Chip { kind, remaining: health - drill_power }
            } else {
                Contact::Break { kind }
            }
        }
    }
}

/// The tile left behind in the target cell after `contact`.
pub fn tile_after(target: Tile, outcome: Contact) -> Tile {
    match outcome {
        Contact::Chip { kind, remaining } => Tile::Mineral { kind, health: remaining },
        Contact::Break { .. } => Tile::Empty,
        _ => target,
    }
}

/// XP for destroying a mineral: its base health, not what was left of it.
pub fn mining_xp(kind: MineralKind) -> u64 {
    kind.base_health() as u64
}

/// `max(|dx|, |dy|)`
#[inline]
pub fn chebyshev(ax: usize, ay: usize, bx: usize, by: usize) -> usize {
    ax.abs_diff(bx).max(ay.abs_diff(by))
}

/// Column the player is pushed to, or `None` when both sides are blocked.
/// `is_open(x)` reports whether column `x` on the player's row is passable.
pub fn knockback_target(
    px: usize, bx: usize, width: usize,
    is_open: impl Fn(usize) -> bool,
) -> Option<usize> {
    let left = px.checked_sub(1);
    let right = if px + 1 < width { Some(px + 1) } else { None };
    let order = if px < bx { [left, right] } else { [right, left] };
    order.into_iter().flatten().find(|&x| is_open(x))
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
