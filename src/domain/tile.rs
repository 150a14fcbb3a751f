/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

/// Mineral kinds found underground.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MineralKind {
    Dirt,
    Copper,
    Silver,
    Gold,
    Diamond,
    SweetPotato, // Heals when mined
}

impl MineralKind {
    /// Kinds drawn uniformly by the generator (sweet potato has its own roll).
    pub const COMMON: [MineralKind; 5] = [
        MineralKind::Dirt,
        MineralKind::Copper,
        MineralKind::Silver,
        MineralKind::Gold,
        MineralKind::Diamond,
    ];

    /// Hit points of a freshly generated tile. Also the XP reward on destruction.
    pub fn base_health(self) -> u32 {
        match self {
            MineralKind::Dirt => 1,
            MineralKind::Copper => 2,
            MineralKind::Silver => 3,
            MineralKind::Gold => 4,
            MineralKind::Diamond => 5,
            MineralKind::SweetPotato => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MineralKind::Dirt => "dirt",
            MineralKind::Copper => "copper",
            MineralKind::Silver => "silver",
            MineralKind::Gold => "gold",
            MineralKind::Diamond => "diamond",
            MineralKind::SweetPotato => "sweet potato",
        }
    }
}

/// Bomb fuse: untouched until the player comes close, then counts down.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fuse {
    Inactive,
    Armed(u32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Mineral { kind: MineralKind, health: u32 },
    Bomb { fuse: Fuse },
    Lava, // Walkable, burns on entry
}

impl Tile {
    /// Full-health mineral of the given kind.
    pub fn mineral(kind: MineralKind) -> Tile {
        Tile::Mineral { kind, health: kind.base_health() }
    }

    pub fn inactive_bomb() -> Tile {
        Tile::Bomb { fuse: Fuse::Inactive }
    }

    /// Can the player occupy this cell without digging?
    pub fn is_passable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Lava)
    }

    pub fn is_lava(self) -> bool {
        matches!(self, Tile::Lava)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_health_table() {
        let table: Vec<u32> = [
            MineralKind::Dirt,
            MineralKind::Copper,
            MineralKind::Silver,
            MineralKind::Gold,
            MineralKind::Diamond,
            MineralKind::SweetPotato,
        ]
        .iter()
        .map(|k| k.base_health())
        .collect();
        assert_eq!(table, vec![1, 2, 3, 4, 5, 1]);
    }

    #[test]
    fn mineral_starts_at_base_health() {
        assert_eq!(
            Tile::mineral(MineralKind::Gold),
            Tile::Mineral { kind: MineralKind::Gold, health: 4 }
        );
    }

    #[test]
    fn passability() {
        assert!(Tile::Empty.is_passable());
        assert!(Tile::Lava.is_passable());
        assert!(!Tile::mineral(MineralKind::Dirt).is_passable());
        assert!(!Tile::inactive_bomb().is_passable());
        assert!(Tile::Lava.is_lava());
        assert!(!Tile::Empty.is_lava());
    }
}
