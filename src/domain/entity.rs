/// Entities: the player and the discrete inputs that move it.

use crate::config::SimConfig;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

/// Player-initiated lateral move. Vertical motion only comes from gravity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
}

impl MoveDir {
    /// Target column after a one-step move, clamped to the map.
    pub fn target_x(self, x: usize, width: usize) -> usize {
        match self {
            MoveDir::Left => x.saturating_sub(1),
            MoveDir::Right => (x + 1).min(width.saturating_sub(1)),
        }
    }

    pub fn facing(self) -> Facing {
        match self {
            MoveDir::Left => Facing::Left,
            MoveDir::Right => Facing::Right,
        }
    }
}

/// Player state. `(x, y)` is an absolute map coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub facing: Facing,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub drill_power: u32,
    /// Set while standing in lava so the burn only fires on entry.
    pub on_lava: bool,
    pub minerals_mined: u32,
}

impl Player {
    pub fn new(x: usize, y: usize, cfg: &SimConfig) -> Self {
        Player {
            x, y,
            facing: Facing::Right,
            health: cfg.max_health,
            max_health: cfg.max_health,
            level: 1,
            xp: 0,
            xp_to_next_level: super::progression::xp_to_next_level(1, cfg),
            drill_power: super::progression::drill_power(1, cfg),
            on_lava: false,
            minerals_mined: 0,
        }
    }

    /// Start position: centered column, just inside the safe zone.
    pub fn spawn(cfg: &SimConfig) -> Self {
        let y = if cfg.safe_rows >= 2 { 1 } else { 0 };
        Player::new(cfg.map_width / 2, y, cfg)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, floored at zero.
    pub fn hurt(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore health, capped at max. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_matches_start_scenario() {
        let cfg = SimConfig::default();
        let p = Player::spawn(&cfg);
        assert_eq!((p.x, p.y), (5, 1));
        assert_eq!((p.health, p.max_health), (3, 3));
        assert_eq!(p.level, 1);
        assert_eq!(p.xp_to_next_level, 10);
        assert_eq!(p.drill_power, 1);
    }

    #[test]
    fn target_x_is_clamped() {
        assert_eq!(MoveDir::Left.target_x(0, 10), 0);
        assert_eq!(MoveDir::Left.target_x(4, 10), 3);
        assert_eq!(MoveDir::Right.target_x(9, 10), 9);
        assert_eq!(MoveDir::Right.target_x(3, 10), 4);
    }

    #[test]
    fn hurt_floors_at_zero_and_heal_caps() {
        let mut p = Player::new(0, 0, &SimConfig::default());
        p.hurt(5);
        assert_eq!(p.health, 0);
        assert!(!p.is_alive());
        assert_eq!(p.heal(1), 1);
        p.health = 3;
        assert_eq!(p.heal(1), 0);
        assert_eq!(p.health, 3);
    }
}
