/// Map generator: produces rows of tiles on demand.
///
/// Each cell is sampled independently:
///   1. bomb (inactive)        with probability `bomb_chance`
///   2. else sweet potato      with probability `sweetpotato_chance`
///   3. else a uniformly random common mineral at full health
///
/// Pure given the random source, so a seeded generator reproduces a map.

use rand::Rng;

use crate::config::SimConfig;
use crate::domain::tile::{MineralKind, Tile};
use super::map::TileMap;

pub fn generate_tile(rng: &mut impl Rng, cfg: &SimConfig) -> Tile {
    if rng.random::<f64>() < cfg.bomb_chance {
        return Tile::inactive_bomb();
    }
    if rng.random::<f64>() < cfg.sweetpotato_chance {
        return Tile::mineral(MineralKind::SweetPotato);
    }
    let idx = rng.random_range(0..MineralKind::COMMON.len());
    Tile::mineral(MineralKind::COMMON[idx])
}

pub fn generate_row(rng: &mut impl Rng, cfg: &SimConfig) -> Vec<Tile> {
    (0..cfg.map_width).map(|_| generate_tile(rng, cfg)).collect()
}

/// Initial buffer: `2 * map_height` rows, the first `safe_rows` cleared.
pub fn generate_initial_map(rng: &mut impl Rng, cfg: &SimConfig) -> TileMap {
    let mut map = TileMap::new(cfg.map_width);
    for y in 0..cfg.map_height * 2 {
        let row = generate_row(rng, cfg);
        if y < cfg.safe_rows {
            map.push_row(vec![Tile::Empty; cfg.map_width]);
        } else {
            map.push_row(row);
        }
    }
    log::debug!("generated initial map: {}x{}", map.width(), map.height());
    map
}

/// Append rows until at least `map_height` rows exist below the player.
/// Returns how many rows were added.
pub fn extend_below(map: &mut TileMap, player_y: usize, rng: &mut impl Rng, cfg: &SimConfig) -> usize {
    let mut added = 0;
    while map.height() <= player_y + cfg.map_height {
        map.push_row(generate_row(rng, cfg));
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn same_seed_same_rows() {
        let cfg = SimConfig::default();
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(generate_row(&mut a, &cfg), generate_row(&mut b, &cfg));
        }
    }

    #[test]
    fn generated_tiles_are_fresh() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..2_000 {
            match generate_tile(&mut rng, &cfg) {
                Tile::Mineral { kind, health } => assert_eq!(health, kind.base_health()),
                Tile::Bomb { fuse } => assert_eq!(fuse, crate::domain::tile::Fuse::Inactive),
                other => panic!("generator produced {other:?}"),
            }
        }
    }

    #[test]
    fn bucket_frequencies_are_plausible() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let n = 40_000;
        let (mut bombs, mut potatoes) = (0, 0);
        for _ in 0..n {
            match generate_tile(&mut rng, &cfg) {
                Tile::Bomb { .. } => bombs += 1,
                Tile::Mineral { kind: MineralKind::SweetPotato, .. } => potatoes += 1,
                _ => {}
            }
        }
        let bomb_rate = bombs as f64 / n as f64;
        let potato_rate = potatoes as f64 / n as f64;
        assert!((0.035..0.065).contains(&bomb_rate), "bomb rate {bomb_rate}");
        assert!((0.004..0.016).contains(&potato_rate), "potato rate {potato_rate}");
    }

    #[test]
    fn probabilities_at_extremes() {
        let mut cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        cfg.bomb_chance = 1.0;
        assert!(generate_row(&mut rng, &cfg).iter().all(|t| matches!(t, Tile::Bomb { .. })));
        cfg.bomb_chance = 0.0;
        cfg.sweetpotato_chance = 1.0;
        assert!(generate_row(&mut rng, &cfg)
            .iter()
            .all(|t| matches!(t, Tile::Mineral { kind: MineralKind::SweetPotato, .. })));
    }

    #[test]
    fn initial_map_has_safe_zone() {
        let cfg = SimConfig::default();
        let map = generate_initial_map(&mut Pcg32::seed_from_u64(5), &cfg);
        assert_eq!(map.height(), 40);
        assert!(map.row(0).unwrap().iter().all(|&t| t == Tile::Empty));
        assert!(map.row(1).unwrap().iter().all(|&t| t == Tile::Empty));
        assert!(map.row(2).unwrap().iter().all(|&t| t != Tile::Empty));
        assert!((0..map.height()).all(|y| map.row(y).unwrap().len() == 10));
    }

    #[test]
    fn extend_keeps_buffer_below_player() {
        let cfg = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut map = generate_initial_map(&mut rng, &cfg);
        assert_eq!(extend_below(&mut map, 5, &mut rng, &cfg), 0);
        assert_eq!(extend_below(&mut map, 20, &mut rng, &cfg), 1);
        assert_eq!(map.height(), 41);
        assert_eq!(extend_below(&mut map, 20, &mut rng, &cfg), 0);
    }
}
