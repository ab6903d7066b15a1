//! Procedural terrain: spreading water bodies, then scattered forests and mountains.

use conquest_protocol::{Hex, Terrain};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::map::GameMap;

/// Configuration for map generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConfig {
    /// Target share of all tiles turned to water (best effort).
    pub water_ratio: f64,
    /// Maximum number of water bodies grown from random seeds.
    pub water_seeds: usize,
    /// Share of remaining land converted to forest.
    pub forest_ratio: f64,
    /// Share of land left after forests converted to mountains.
    pub mountain_ratio: f64,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            water_ratio: 0.2,
            water_seeds: 5,
            forest_ratio: 0.15,
            mountain_ratio: 0.1,
        }
    }
}

/// Generate a `width` x `height` map with random terrain.
pub fn generate_map<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    config: &MapGenConfig,
    rng: &mut R,
) -> GameMap {
    let mut map = GameMap::new(width, height, Terrain::Land);

    spread_water(&mut map, config, rng);

    let land = hexes_with(&map, Terrain::Land);
    let forests = ratio_of(land.len(), config.forest_ratio);
    scatter(&mut map, &land, forests, Terrain::Forest, rng);

    let land = hexes_with(&map, Terrain::Land);
    let mountains = ratio_of(land.len(), config.mountain_ratio);
    scatter(&mut map, &land, mountains, Terrain::Mountain, rng);

    debug!(
        width,
        height,
        water = map.count_terrain(Terrain::Water),
        forest = map.count_terrain(Terrain::Forest),
        mountain = map.count_terrain(Terrain::Mountain),
        "generated map"
    );

    map
}

/// Grow water bodies from random seeds.
///
/// Each seed gets an equal share of the water budget as growth attempts. An attempt picks a
/// random hex already in that body and a random on-map neighbour of it; the neighbour joins
/// the body only if it was not water yet, so the final count may land below the target.
fn spread_water<R: Rng + ?Sized>(map: &mut GameMap, config: &MapGenConfig, rng: &mut R) {
    let positions: Vec<Hex> = map.hexes().collect();
    if positions.is_empty() {
        return;
    }

    let budget = ratio_of(positions.len(), config.water_ratio);
    let seed_count = config.water_seeds.min(positions.len());
    if seed_count == 0 {
        return;
    }
    let attempts_per_seed = budget / seed_count;

    let seeds: Vec<Hex> = positions
        .choose_multiple(rng, seed_count)
        .copied()
        .collect();

    for seed in seeds {
        map.set_terrain(seed, Terrain::Water);

        let mut body = vec![seed];
        for _ in 0..attempts_per_seed {
            let Some(&from) = body.choose(rng) else {
                break;
            };
            let neighbors: Vec<Hex> = map.neighbors_on_map(from).collect();
            let Some(&next) = neighbors.choose(rng) else {
                continue;
            };
            if map.terrain(next) != Some(Terrain::Water) {
                map.set_terrain(next, Terrain::Water);
                body.push(next);
            }
        }
    }
}

fn scatter<R: Rng + ?Sized>(
    map: &mut GameMap,
    candidates: &[Hex],
    count: usize,
    terrain: Terrain,
    rng: &mut R,
) {
    for &hex in candidates.choose_multiple(rng, count.min(candidates.len())) {
        map.set_terrain(hex, terrain);
    }
}

fn hexes_with(map: &GameMap, terrain: Terrain) -> Vec<Hex> {
    map.tiles()
        .iter()
        .filter(|t| t.terrain == terrain)
        .map(|t| t.hex)
        .collect()
}

#[inline]
fn ratio_of(total: usize, ratio: f64) -> usize {
    (total as f64 * ratio.max(0.0)).floor() as usize
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn every_cell_gets_exactly_one_tile() {
        let mut rng = StdRng::seed_from_u64(7);
        let map = generate_map(30, 20, &MapGenConfig::default(), &mut rng);
        assert_eq!(map.len(), 600);
        assert_eq!(map.hexes().collect::<std::collections::HashSet<_>>().len(), 600);
    }

    #[test]
    fn terrain_proportions_stay_near_targets() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let map = generate_map(30, 20, &MapGenConfig::default(), &mut rng);

            let water = map.count_terrain(Terrain::Water);
            let forest = map.count_terrain(Terrain::Forest);
            let mountain = map.count_terrain(Terrain::Mountain);
            let land = map.count_terrain(Terrain::Land);

            // Seeds plus at most one new tile per growth attempt.
            assert!(water >= 1 && water <= 5 + 120, "water = {water}");

            let land_after_water = 600 - water;
            assert_eq!(forest, ratio_of(land_after_water, 0.15));
            let land_after_forest = land_after_water - forest;
            assert_eq!(mountain, ratio_of(land_after_forest, 0.1));
            assert_eq!(land, land_after_forest - mountain);
        }
    }

    #[test]
    fn zero_ratios_leave_all_land() {
        let config = MapGenConfig {
            water_ratio: 0.0,
            water_seeds: 0,
            forest_ratio: 0.0,
            mountain_ratio: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let map = generate_map(5, 5, &config, &mut rng);
        assert_eq!(map.count_terrain(Terrain::Land), 25);
    }

    #[test]
    fn tiny_maps_do_not_panic() {
        let mut rng = StdRng::seed_from_u64(3);
        let map = generate_map(1, 1, &MapGenConfig::default(), &mut rng);
        assert_eq!(map.len(), 1);
        let empty = generate_map(0, 0, &MapGenConfig::default(), &mut rng);
        assert!(empty.is_empty());
    }
}
