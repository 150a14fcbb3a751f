/// Experience and levelling.
///
/// Thresholds grow geometrically: `xp_base * xp_multiplier^(level-1)`
/// (10, 20, 40, 80, ... with the defaults). A grant is applied by
/// subtracting thresholds one level at a time, so a single large grant
/// can jump several levels and the remainder carries over. XP never
/// goes negative. At the level cap XP keeps accumulating.

use crate::config::SimConfig;
use super::entity::Player;

/// XP needed to leave `level`. Saturates instead of overflowing at high levels.
pub fn xp_to_next_level(level: u32, cfg: &SimConfig) -> u64 {
    let exp = level.saturating_sub(1);
    cfg.xp_base.saturating_mul(cfg.xp_multiplier.saturating_pow(exp))
}

/// Damage dealt to a mineral per dig at `level`.
pub fn drill_power(level: u32, cfg: &SimConfig) -> u32 {
    let bonus = level.saturating_sub(1).saturating_mul(cfg.drill_power_per_level);
    cfg.drill_base_power.saturating_add(bonus)
}

/// Add experience and resolve level-ups. Returns the number of levels gained.
pub fn add_xp(player: &mut Player, amount: u64, cfg: &SimConfig) -> u32 {
    player.xp = player.xp.saturating_add(amount);

    let mut gained = 0;
    while player.level < cfg.level_cap && player.xp >= player.xp_to_next_level {
        player.xp -= player.xp_to_next_level;
        player.level += 1;
        player.xp_to_next_level = xp_to_next_level(player.level, cfg);
        gained += 1;
    }
    if gained > 0 {
        player.drill_power = drill_power(player.level, cfg);
    }
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fresh() -> (Player, SimConfig) {
        let cfg = SimConfig::default();
        (Player::new(0, 0, &cfg), cfg)
    }

    #[test]
    fn thresholds_double() {
        let cfg = SimConfig::default();
        let t: Vec<u64> = (1..=4).map(|l| xp_to_next_level(l, &cfg)).collect();
        assert_eq!(t, vec![10, 20, 40, 80]);
    }

    #[test]
    fn threshold_saturates_near_cap() {
        let cfg = SimConfig::default();
        assert_eq!(xp_to_next_level(99, &cfg), u64::MAX);
    }

    #[test]
    fn grant_of_15_reaches_level_2_with_5_left() {
        let (mut p, cfg) = fresh();
        assert_eq!(add_xp(&mut p, 15, &cfg), 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 5);
        assert_eq!(p.xp_to_next_level, 20);
    }

    #[test]
    fn grant_of_25_stops_before_going_negative() {
        let (mut p, cfg) = fresh();
        add_xp(&mut p, 25, &cfg);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 15);
    }

    #[test]
    fn large_grant_jumps_multiple_levels() {
        let (mut p, cfg) = fresh();
        assert_eq!(add_xp(&mut p, 30, &cfg), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 0);
        assert_eq!(p.xp_to_next_level, 40);
    }

    #[test]
    fn drill_power_follows_level() {
        let (mut p, cfg) = fresh();
        assert_eq!(p.drill_power, 1);
        add_xp(&mut p, 30, &cfg);
        assert_eq!(p.drill_power, 3);
    }

    #[test]
    fn no_level_up_at_cap() {
        let mut cfg = SimConfig::default();
        cfg.level_cap = 2;
        let mut p = Player::new(0, 0, &cfg);
        add_xp(&mut p, 1_000, &cfg);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 990);
    }

    proptest! {
        #[test]
        fn level_never_exceeds_cap(grants in prop::collection::vec(0u64..500, 0..40)) {
            let (mut p, cfg) = fresh();
            for g in grants {
                add_xp(&mut p, g, &cfg);
                prop_assert!(p.level >= 1 && p.level <= cfg.level_cap);
                prop_assert!(p.level == cfg.level_cap || p.xp < p.xp_to_next_level);
            }
        }
    }
}
