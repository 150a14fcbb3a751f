/// Events emitted during a simulation step.
/// The presentation layer consumes these for messages/sound.

use crate::domain::tile::MineralKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitCause {
    Blast,
    Lava,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum GameEvent {
    MineralChipped { x: usize, y: usize, kind: MineralKind, remaining: u32 },
    MineralMined { x: usize, y: usize, kind: MineralKind, xp: u64 },
    Healed { amount: u32 },
    BombArmed { x: usize, y: usize },
    BombExploded { x: usize, y: usize },
    PlayerHit { cause: HitCause, health: u32 },
    KnockedBack { from_x: usize, to_x: usize },
    PlayerFell { rows: usize },
    RowsGenerated { count: usize },
    LeveledUp { level: u32 },
    PlayerDied,
}
