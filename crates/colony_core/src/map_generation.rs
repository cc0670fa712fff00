//! Procedural hex map generation.
//!
//! Generates a square map of planet tiles where every tile is decided by a
//! seeded xorshift32 stream, consumed in a fixed order:
//!
//! 1. empty-space roll (30%, ignored inside the central safe zone)
//! 2. planet type, uniform over the six inhabitable types
//! 3. elevation
//! 4. visual biome, derived from the planet type
//! 5. resource bonus roll (30%), then its resource and signed delta
//! 6. outside the safe zone, hostile garrison roll (10%) and its contents
//!
//! Empty space stops after step 1. The same `(size, seed)` always yields an
//! identical [`MapData`], so the map is built once and shared read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coords::Coord;
use crate::kinds::{DefenseKind, UnitKind};
use crate::resources::{ResourceBundle, ResourceKind};

/// Chebyshev radius around the centre that never holds empty space or
/// hostile garrisons.
pub const SAFE_ZONE_RADIUS: u32 = 3;

/// Largest supported map edge.
pub const MAX_MAP_SIZE: u32 = 1024;

/// Chance, in percent, that a tile outside the safe zone is empty space.
const EMPTY_CHANCE_PCT: u32 = 30;
/// Chance, in percent, that a planet carries a resource bonus.
const BONUS_CHANCE_PCT: u32 = 30;
/// Chance, in percent, that a planet outside the safe zone hosts a garrison.
const NPC_CHANCE_PCT: u32 = 10;
/// Lowest bonus delta; deltas fall in `[MIN, MIN + SPAN)`.
const BONUS_DELTA_MIN: i32 = -5;
const BONUS_DELTA_SPAN: u32 = 20;

const GARRISON_NAMES: [&str; 4] = ["Raider Den", "Pirate Outpost", "Smuggler Haven", "Rogue Bastion"];

/// Planet classification of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetKind {
    /// Nothing to settle or attack.
    Empty,
    /// Earth-like world.
    Terran,
    /// Dry rock and sand.
    Desert,
    /// Water world.
    Oceanic,
    /// Active volcanism.
    Volcanic,
    /// Ice sheets.
    Frozen,
    /// Gas giant with orbital platforms.
    GasGiant,
}

impl PlanetKind {
    /// Non-empty planet types in roll order.
    pub const INHABITABLE: [Self; 6] = [
        Self::Terran,
        Self::Desert,
        Self::Oceanic,
        Self::Volcanic,
        Self::Frozen,
        Self::GasGiant,
    ];

    /// Visual biome shown for this planet type.
    #[must_use]
    pub const fn visual_biome(self) -> Option<VisualBiome> {
        match self {
            Self::Empty => None,
            Self::Terran => Some(VisualBiome::Temperate),
            Self::Desert => Some(VisualBiome::Arid),
            Self::Oceanic => Some(VisualBiome::Marine),
            Self::Volcanic => Some(VisualBiome::Molten),
            Self::Frozen => Some(VisualBiome::Glacial),
            Self::GasGiant => Some(VisualBiome::Nebular),
        }
    }
}

/// Terrain height of a tile; shifts mining yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Elevation {
    /// Lowlands, rich in ore and crystal.
    Low,
    /// Plateaus, a small bonus to everything.
    #[default]
    Mid,
    /// Highlands, favouring plasma.
    High,
}

impl Elevation {
    /// All elevations in roll order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Mid, Self::High];
}

/// Cosmetic biome for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualBiome {
    /// Green and blue.
    Temperate,
    /// Ochre dunes.
    Arid,
    /// Open ocean.
    Marine,
    /// Lava fields.
    Molten,
    /// Ice and snow.
    Glacial,
    /// Swirling gas bands.
    Nebular,
}

/// Resource bonus (or malus) of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Biome {
    /// Affected resource.
    pub resource: ResourceKind,
    /// Signed percentage applied to that resource's production.
    pub delta_pct: i32,
}

/// A hostile NPC force holding a tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcGarrison {
    /// Display name.
    pub name: String,
    /// Ships on station.
    pub units: BTreeMap<UnitKind, u32>,
    /// Planetary defenses.
    pub defenses: BTreeMap<DefenseKind, u32>,
    /// Resources an attacker can plunder.
    pub cache: ResourceBundle,
}

/// One map tile. Immutable after generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Planet type.
    pub kind: PlanetKind,
    /// Terrain height.
    pub elevation: Elevation,
    /// Cosmetic biome, absent for empty space.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_biome: Option<VisualBiome>,
    /// Resource bonus, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biome: Option<Biome>,
    /// Hostile garrison, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npc: Option<NpcGarrison>,
}

impl Tile {
    /// Empty space.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            kind: PlanetKind::Empty,
            elevation: Elevation::Mid,
            visual_biome: None,
            biome: None,
            npc: None,
        }
    }

    /// A plain planet with no bonus and no garrison.
    #[must_use]
    pub const fn planet(kind: PlanetKind, elevation: Elevation) -> Self {
        Self {
            kind,
            elevation,
            visual_biome: kind.visual_biome(),
            biome: None,
            npc: None,
        }
    }

    /// Check if the tile is empty space.
    #[must_use]
    pub fn is_empty_space(&self) -> bool {
        self.kind == PlanetKind::Empty
    }
}

/// A generated map: every tile keyed by its coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    size: u32,
    seed: u32,
    tiles: BTreeMap<Coord, Tile>,
}

impl MapData {
    /// Map edge length.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Seed the map was generated from.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// Centre tile, the default home of a new colony.
    #[must_use]
    pub fn center(&self) -> Coord {
        center_of(self.size)
    }

    /// Get a tile.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    /// Check if a coordinate lies on the map.
    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// The axial neighbours of `coord` that lie on the map.
    #[must_use]
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        coord
            .axial_neighbors()
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }

    /// Check if `coord` is inside the spawn safe zone.
    #[must_use]
    pub fn is_safe_zone(&self, coord: Coord) -> bool {
        coord.chebyshev_distance(self.center()) <= SAFE_ZONE_RADIUS
    }

    /// Number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Check if the map has no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Replace the tile at an on-map coordinate, for hand-built scenarios.
    /// Off-map coordinates are ignored.
    #[must_use]
    pub fn with_tile(mut self, coord: Coord, tile: Tile) -> Self {
        if let Some(slot) = self.tiles.get_mut(&coord) {
            *slot = tile;
        }
        self
    }

    /// Iterate tiles in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> {
        self.tiles.iter().map(|(c, t)| (*c, t))
    }
}

/// 32-bit xorshift stream used by the generator.
#[derive(Debug, Clone)]
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// A zero state would stay zero forever.
    const ZERO_SEED_REPLACEMENT: u32 = 0x9E37_79B9;

    const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 {
                Self::ZERO_SEED_REPLACEMENT
            } else {
                seed
            },
        }
    }

    fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..bound`. `bound` must be non-zero.
    fn below(&mut self, bound: u32) -> u32 {
        self.next() % bound
    }

    fn below_i32(&mut self, bound: u32) -> i32 {
        i32::try_from(self.below(bound)).unwrap_or(0)
    }

    fn chance(&mut self, pct: u32) -> bool {
        self.below(100) < pct
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
        items[self.below(len) as usize]
    }
}

fn center_of(size: u32) -> Coord {
    let mid = i32::try_from(size / 2).unwrap_or(i32::MAX);
    Coord::new(mid, mid)
}

/// Generate the map for `size` and `seed`.
///
/// Sizes above [`MAX_MAP_SIZE`] are clamped.
///
/// # Example
///
/// ```
/// use colony_core::coords::Coord;
/// use colony_core::map_generation::generate;
///
/// let a = generate(51, 1337);
/// let b = generate(51, 1337);
/// assert_eq!(a.tile(Coord::new(10, 10)), b.tile(Coord::new(10, 10)));
/// assert_eq!(a.len(), 51 * 51);
/// ```
#[must_use]
pub fn generate(size: u32, seed: u32) -> MapData {
    let size = if size > MAX_MAP_SIZE {
        tracing::warn!(size, max = MAX_MAP_SIZE, "map size clamped");
        MAX_MAP_SIZE
    } else {
        size
    };

    let mut rng = XorShift32::new(seed);
    let center = center_of(size);
    let edge = i32::try_from(size).unwrap_or(i32::MAX);
    let mut tiles = BTreeMap::new();

    for y in 0..edge {
        for x in 0..edge {
            let coord = Coord::new(x, y);
            let distance = coord.distance(center);
            let safe = coord.chebyshev_distance(center) <= SAFE_ZONE_RADIUS;
            tiles.insert(coord, generate_tile(&mut rng, safe, distance));
        }
    }

    tracing::debug!(size, seed, tiles = tiles.len(), "map generated");
    MapData { size, seed, tiles }
}

fn generate_tile(rng: &mut XorShift32, safe: bool, distance: u32) -> Tile {
    // the empty roll is always drawn so the stream does not depend on the zone
    let empty = rng.chance(EMPTY_CHANCE_PCT);
    if empty && !safe {
        return Tile::empty();
    }

    let kind = rng.pick(&PlanetKind::INHABITABLE);
    let elevation = rng.pick(&Elevation::ALL);
    let mut tile = Tile::planet(kind, elevation);

    if rng.chance(BONUS_CHANCE_PCT) {
        let resource = rng.pick(&ResourceKind::STORABLE);
        tile.biome = Some(Biome {
            resource,
            delta_pct: BONUS_DELTA_MIN + rng.below_i32(BONUS_DELTA_SPAN),
        });
    }

    if !safe && rng.chance(NPC_CHANCE_PCT) {
        tile.npc = Some(generate_garrison(rng, distance));
    }

    tile
}

/// Garrison strength grows with hex distance from the centre.
fn generate_garrison(rng: &mut XorShift32, distance: u32) -> NpcGarrison {
    let strength = 1 + distance / 4;

    let mut units = BTreeMap::new();
    units.insert(UnitKind::LightFighter, strength * 2 + rng.below(strength + 1));
    if strength >= 4 {
        units.insert(UnitKind::HeavyFighter, strength / 2 + rng.below(2));
    }
    if strength >= 8 {
        units.insert(UnitKind::Cruiser, strength / 4);
    }

    let mut defenses = BTreeMap::new();
    defenses.insert(DefenseKind::RocketLauncher, strength + rng.below(strength));

    let strength_i32 = i32::try_from(strength).unwrap_or(i32::MAX);
    let metallum = strength_i32.saturating_mul(2000).saturating_add(rng.below_i32(2000));
    let kristallin = strength_i32.saturating_mul(1000).saturating_add(rng.below_i32(1000));
    let cache = ResourceBundle::new(metallum, kristallin, strength_i32.saturating_mul(250));

    NpcGarrison {
        name: rng.pick(&GARRISON_NAMES).to_string(),
        units,
        defenses,
        cache,
    }
}
