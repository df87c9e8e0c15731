//! chunk store: tiles & enemies of every resident chunk
//!
//! Chunks come and go with the streamer (`tile_stream.rs`); generation
//! itself is in `world_gen.rs`. Lookups into absent chunks never fail,
//! they answer with [`Tile::default`].

use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::constants::*;
use crate::coords::{chunk_span, local_index, tile_to_chunk2, world_to_tile2, ChunkCoord};

/// -------- tiles --------
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub id: u16,
    pub solid: bool,
}

pub const TILE_VOID: u16   = 0;
pub const TILE_MOSS: u16   = 1;
pub const TILE_SILT: u16   = 2;
pub const TILE_ROCK: u16   = 3;
pub const TILE_SHALE: u16  = 4;

/// -------- enemies --------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Wisp,
    Brute,
}

impl EnemyKind {
    pub fn radius(self) -> f32 {
        match self {
            EnemyKind::Wisp  => 5.0,
            EnemyKind::Brute => 9.0,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Wisp  => WISP_SPEED,
            EnemyKind::Brute => BRUTE_SPEED,
        }
    }

    pub fn max_health(self) -> f32 {
        match self {
            EnemyKind::Wisp  => WISP_HEALTH,
            EnemyKind::Brute => BRUTE_HEALTH,
        }
    }
}

/// Plain data, owned by the chunk that was resident when it was placed.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub vel: Vec2,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: kind.radius(),
            speed: kind.speed(),
            health: kind.max_health(),
            max_health: kind.max_health(),
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// -------- chunk payload --------
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    /// `CHUNK_SIZE²` tiles, row‑major, row 0 = lowest world y
    pub tiles: Vec<Tile>,
    pub enemies: Vec<Enemy>,
}

impl ChunkData {
    pub fn empty() -> Self {
        Self {
            tiles: vec![Tile::default(); CHUNK_TILES],
            enemies: Vec::new(),
        }
    }
}

/// -------- resource --------
#[derive(Resource, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoord, ChunkData>,
}

impl ChunkStore {
    pub fn set_chunk(&mut self, coord: ChunkCoord, data: ChunkData) {
        debug_assert_eq!(data.tiles.len(), CHUNK_TILES);
        self.chunks.insert(coord, data);
    }

    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&ChunkData> {
        self.chunks.get(&coord)
    }

    pub fn get_chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut ChunkData> {
        self.chunks.get_mut(&coord)
    }

    pub fn delete_chunk(&mut self, coord: ChunkCoord) -> Option<ChunkData> {
        self.chunks.remove(&coord)
    }

    pub fn has_chunk(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// tile by world‑tile coordinate
    pub fn tile_at(&self, t: IVec2) -> Tile {
        self.chunks
            .get(&tile_to_chunk2(t))
            .map(|c| c.tiles[local_index(t)])
            .unwrap_or_default()
    }

    /// tile under a world position
    #[inline]
    pub fn get_tile(&self, world: Vec2) -> Tile {
        self.tile_at(world_to_tile2(world))
    }

    /// shortcut used by collision; absent chunks are open ground
    #[inline]
    pub fn solid(&self, t: IVec2) -> bool {
        self.tile_at(t).solid
    }

    /// Enemies whose position lies inside the world rect `a`..`b`.
    ///
    /// Walks only the chunks overlapping the rect; recomputed on every call.
    pub fn entities_in_region(&self, a: Vec2, b: Vec2) -> impl Iterator<Item = &Enemy> + '_ {
        let (lo, hi) = chunk_span(a, b);
        let (min, max) = (a.min(b), a.max(b));
        (lo.y..=hi.y)
            .flat_map(move |cy| (lo.x..=hi.x).map(move |cx| ChunkCoord::new(cx, cy)))
            .filter_map(move |c| self.chunks.get(&c))
            .flat_map(move |chunk| chunk.enemies.iter().filter(move |e| inside(e.pos, min, max)))
    }

    /// Mutable twin of [`entities_in_region`](Self::entities_in_region):
    /// runs `f` on each enemy inside the rect, visiting only the chunks the
    /// rect overlaps.
    pub fn for_each_in_region_mut(&mut self, a: Vec2, b: Vec2, mut f: impl FnMut(&mut Enemy)) {
        let (lo, hi) = chunk_span(a, b);
        let (min, max) = (a.min(b), a.max(b));
        for cy in lo.y..=hi.y {
            for cx in lo.x..=hi.x {
                let Some(chunk) = self.chunks.get_mut(&ChunkCoord::new(cx, cy)) else { continue };
                for e in chunk.enemies.iter_mut().filter(|e| inside(e.pos, min, max)) {
                    f(e);
                }
            }
        }
    }

    /// every resident enemy, e.g. for AI
    pub fn enemies_mut(&mut self) -> impl Iterator<Item = &mut Enemy> + '_ {
        self.chunks.values_mut().flat_map(|c| c.enemies.iter_mut())
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.chunks.values().flat_map(|c| c.enemies.iter())
    }

    /// Drop dead enemies from the chunks overlapping `a`..`b`; returns how many.
    pub fn reap_dead_in_region(&mut self, a: Vec2, b: Vec2) -> usize {
        let (lo, hi) = chunk_span(a, b);
        let mut reaped = 0;
        for cy in lo.y..=hi.y {
            for cx in lo.x..=hi.x {
                if let Some(chunk) = self.chunks.get_mut(&ChunkCoord::new(cx, cy)) {
                    let before = chunk.enemies.len();
                    chunk.enemies.retain(Enemy::is_alive);
                    reaped += before - chunk.enemies.len();
                }
            }
        }
        reaped
    }
}

#[inline]
fn inside(p: Vec2, min: Vec2, max: Vec2) -> bool {
    p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
}

/* ===========================================================
   tile collision (square body of half‑extent `half`)
   =========================================================== */
/// Moves `pos` by `delta` in `COLLISION_STEPS` sub‑steps, x then y per
/// step. Returns the new position and which axes were blocked.
pub fn move_and_collide(store: &ChunkStore, pos: Vec2, half: f32, delta: Vec2) -> (Vec2, BVec2) {
    let mut p = pos;
    let mut blocked = BVec2::FALSE;
    let step = delta / COLLISION_STEPS as f32;
    let tile = |v: f32| (v / TILE_SIZE).floor() as i32;

    for _ in 0..COLLISION_STEPS {
        /* ---------- horizontal pass ---------- */
        if step.x != 0.0 && !blocked.x {
            let new_x = p.x + step.x;
            let tx = tile(new_x + step.x.signum() * half);
            let (y0, y1) = (tile(p.y - half + 0.1), tile(p.y + half - 0.1));
            if (y0..=y1).any(|ty| store.solid(IVec2::new(tx, ty))) {
                blocked.x = true;
            } else {
                p.x = new_x;
            }
        }

        /* ---------- vertical pass ---------- */
        if step.y != 0.0 && !blocked.y {
            let new_y = p.y + step.y;
            let ty = tile(new_y + step.y.signum() * half);
            let (x0, x1) = (tile(p.x - half + 0.1), tile(p.x + half - 0.1));
            if (x0..=x1).any(|tx| store.solid(IVec2::new(tx, ty))) {
                blocked.y = true;
            } else {
                p.y = new_y;
            }
        }
    }
    (p, blocked)
}
