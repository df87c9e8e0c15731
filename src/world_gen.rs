//! procedural chunk generation
//!
//! Everything here is a pure function of `(chunk, seed)`: rock comes from a
//! seeded Perlin field, per‑tile variation and enemy placement from an integer
//! bit‑mixer. No RNG stream is shared between chunks, so chunks can be
//! generated in any order (or regenerated after eviction) without drift.

use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::constants::*;
use crate::coords::{local_index, tile_center, ChunkCoord};
use crate::terrain::*;

const SALT_TILE: u32  = 0x71;
const SALT_COUNT: u32 = 0xC0;
const SALT_ENEMY: u32 = 0xE0;

/// splitmix‑style mix of seed, coordinate and salt
#[inline]
pub fn hash_u64(seed: u64, x: i32, y: i32, salt: u32) -> u64 {
    let mut v = seed
        ^ (x as i64 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as i64 as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ (salt as u64).wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^= v >> 30;
    v = v.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v ^= v >> 27;
    v = v.wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}

/// Producer side of the streamer.
pub trait ChunkSource {
    fn generate(&mut self, coord: ChunkCoord) -> ChunkData;

    /// called right before `coord` leaves the store
    fn evict(&mut self, _coord: ChunkCoord, _data: &ChunkData) {}
}

/// Global seed for the session.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSeed(pub u64);

impl Default for WorldSeed {
    fn default() -> Self {
        WorldSeed(DEFAULT_SEED)
    }
}

#[derive(Resource)]
pub struct WorldGen {
    seed: u64,
    rock: Perlin,
    pub generated: u64,
    pub evicted: u64,
}

impl WorldGen {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rock: Perlin::new((seed ^ (seed >> 32)) as u32),
            generated: 0,
            evicted: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn tile(&self, t: IVec2) -> Tile {
        let h = hash_u64(self.seed, t.x, t.y, SALT_TILE);
        let in_clearing = t.x * t.x + t.y * t.y <= SPAWN_CLEARING * SPAWN_CLEARING;
        let n = self
            .rock
            .get([t.x as f64 * ROCK_NOISE_SCALE, t.y as f64 * ROCK_NOISE_SCALE]);

        if n > ROCK_THRESHOLD && !in_clearing {
            let id = if h & 3 == 0 { TILE_SHALE } else { TILE_ROCK };
            Tile { id, solid: true }
        } else {
            let id = if h % 5 == 0 { TILE_SILT } else { TILE_MOSS };
            Tile { id, solid: false }
        }
    }

    /// tiles + enemies for one chunk
    pub fn build(&self, coord: ChunkCoord) -> ChunkData {
        let base = IVec2::new(coord.x * CHUNK_SIZE, coord.y * CHUNK_SIZE);

        let mut tiles = vec![Tile::default(); CHUNK_TILES];
        for ly in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let t = base + IVec2::new(lx, ly);
                tiles[local_index(t)] = self.tile(t);
            }
        }

        /* enemies: none in the spawn chunk ---------------------------------- */
        let mut enemies = Vec::new();
        if coord != ChunkCoord::new(0, 0) {
            let count = hash_u64(self.seed, coord.x, coord.y, SALT_COUNT)
                % (MAX_ENEMIES_PER_CHUNK + 1);
            for i in 0..count as u32 {
                let h = hash_u64(self.seed, coord.x, coord.y, SALT_ENEMY + i);
                let local = IVec2::new(
                    (h % CHUNK_SIZE as u64) as i32,
                    ((h >> 16) % CHUNK_SIZE as u64) as i32,
                );
                let t = base + local;
                if tiles[local_index(t)].solid {
                    continue; // never embed in rock
                }
                let kind = if (h >> 32) & 3 == 0 {
                    EnemyKind::Brute
                } else {
                    EnemyKind::Wisp
                };
                enemies.push(Enemy::spawn(kind, tile_center(t, TILE_SIZE)));
            }
        }

        ChunkData { tiles, enemies }
    }
}

impl Default for WorldGen {
    fn default() -> Self {
        WorldGen::new(DEFAULT_SEED)
    }
}

impl ChunkSource for WorldGen {
    fn generate(&mut self, coord: ChunkCoord) -> ChunkData {
        self.generated += 1;
        self.build(coord)
    }

    fn evict(&mut self, coord: ChunkCoord, data: &ChunkData) {
        self.evicted += 1;
        trace!(
            "evicting chunk ({}, {}) with {} enemies",
            coord.x,
            coord.y,
            data.enemies.len()
        );
    }
}

/// one‑shot generation without keeping a generator around
pub fn generate_chunk(coord: ChunkCoord, seed: u64) -> ChunkData {
    WorldGen::new(seed).build(coord)
}
