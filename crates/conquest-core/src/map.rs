use std::collections::HashMap;

use conquest_protocol::{CityId, Hex, MapSnapshot, Terrain, TileSnapshot, UnitId, UnitKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub hex: Hex,
    pub terrain: Terrain,
    pub unit: Option<UnitId>,
    pub city: Option<CityId>,
}

impl Tile {
    pub fn new(hex: Hex, terrain: Terrain) -> Self {
        Self {
            hex,
            terrain,
            unit: None,
            city: None,
        }
    }
}

/// Hex grid keyed by axial coordinate.
///
/// The set of stored coordinates is the source of truth for validity; `width` and `height`
/// only describe the offset rectangle the map was generated from.
#[derive(Clone, Debug)]
pub struct GameMap {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    index: HashMap<Hex, usize>,
}

impl GameMap {
    /// Build an all-`terrain` map covering the `width` x `height` offset rectangle.
    pub fn new(width: u32, height: u32, terrain: Terrain) -> Self {
        let mut tiles = Vec::with_capacity((width as usize) * (height as usize));
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                tiles.push(Tile::new(Hex::from_offset(col, row), terrain));
            }
        }
        Self::from_tiles(width, height, tiles)
    }

    pub fn from_tiles(width: u32, height: u32, tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| (tile.hex, i))
            .collect();
        Self {
            width,
            height,
            tiles,
            index,
        }
    }

    /// Rebuild a map from a snapshot. Occupancy is left empty; the owner of the unit and city
    /// tables is expected to restore it from entity positions.
    pub fn from_snapshot(snapshot: &MapSnapshot) -> Self {
        let tiles = snapshot
            .tiles
            .iter()
            .map(|t| Tile::new(t.hex, t.terrain))
            .collect();
        Self::from_tiles(snapshot.width, snapshot.height, tiles)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            width: self.width,
            height: self.height,
            tiles: self
                .tiles
                .iter()
                .map(|t| TileSnapshot {
                    hex: t.hex,
                    terrain: t.terrain,
                    unit: t.unit,
                    city: t.city,
                })
                .collect(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in generation order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        self.tiles.iter().map(|t| t.hex)
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.index.contains_key(&hex)
    }

    pub fn get(&self, hex: Hex) -> Option<&Tile> {
        self.index.get(&hex).map(|&i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, hex: Hex) -> Option<&mut Tile> {
        let i = *self.index.get(&hex)?;
        self.tiles.get_mut(i)
    }

    pub fn set_terrain(&mut self, hex: Hex, terrain: Terrain) {
        if let Some(tile) = self.get_mut(hex) {
            tile.terrain = terrain;
        }
    }

    pub fn terrain(&self, hex: Hex) -> Option<Terrain> {
        self.get(hex).map(|t| t.terrain)
    }

    /// Neighbours of `hex` that exist on this map, in direction order.
    pub fn neighbors_on_map(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        hex.neighbors().filter(move |n| self.contains(*n))
    }

    /// Whether a unit of `kind` may stand on `hex`. Missing tiles are never passable.
    pub fn is_passable(&self, hex: Hex, kind: UnitKind) -> bool {
        self.get(hex)
            .is_some_and(|tile| kind.movement_class().can_enter(tile.terrain))
    }

    pub fn defense_modifier(&self, hex: Hex) -> i32 {
        self.get(hex).map_or(0, |tile| tile.terrain.defense_bonus())
    }

    pub fn unit_at(&self, hex: Hex) -> Option<UnitId> {
        self.get(hex).and_then(|t| t.unit)
    }

    pub fn city_at(&self, hex: Hex) -> Option<CityId> {
        self.get(hex).and_then(|t| t.city)
    }

    pub fn count_terrain(&self, terrain: Terrain) -> usize {
        self.tiles.iter().filter(|t| t.terrain == terrain).count()
    }
}
