//! world ↔ tile ↔ chunk conversions
//!
//! World space is bevy's (y up, 1 U = 1 px). Tile `(tx, ty)` covers
//! `[tx·size, (tx+1)·size)` on each axis, so negative coordinates floor
//! instead of truncating toward zero.

use bevy::prelude::*;

use crate::constants::{CHUNK_SIZE, TILE_SIZE};

/// Integer chunk coordinate. Value-equality key for every chunk map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in chunks.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// world position of the chunk's lower‑left corner
    pub fn origin_world(self) -> Vec2 {
        Vec2::new(
            (self.x * CHUNK_SIZE) as f32 * TILE_SIZE,
            (self.y * CHUNK_SIZE) as f32 * TILE_SIZE,
        )
    }

    /// world position of the chunk's centre
    pub fn center_world(self) -> Vec2 {
        self.origin_world() + Vec2::splat(CHUNK_SIZE as f32 * TILE_SIZE * 0.5)
    }
}

#[inline]
pub fn world_to_tile(v: f32, tile_size: f32) -> i32 {
    (v / tile_size).floor() as i32
}

/// world position → world‑tile coordinate
#[inline]
pub fn world_to_tile2(p: Vec2) -> IVec2 {
    IVec2::new(world_to_tile(p.x, TILE_SIZE), world_to_tile(p.y, TILE_SIZE))
}

#[inline]
pub fn tile_to_chunk(t: i32) -> i32 {
    t.div_euclid(CHUNK_SIZE)
}

#[inline]
pub fn tile_to_chunk2(t: IVec2) -> ChunkCoord {
    ChunkCoord::new(tile_to_chunk(t.x), tile_to_chunk(t.y))
}

#[inline]
pub fn world_to_chunk(p: Vec2) -> ChunkCoord {
    tile_to_chunk2(world_to_tile2(p))
}

/// row‑major index of a world tile inside its owning chunk
#[inline]
pub fn local_index(t: IVec2) -> usize {
    let lx = t.x.rem_euclid(CHUNK_SIZE);
    let ly = t.y.rem_euclid(CHUNK_SIZE);
    (ly * CHUNK_SIZE + lx) as usize
}

/// centre of a tile in world space, for any tile size
#[inline]
pub fn tile_center(t: IVec2, tile_size: f32) -> Vec2 {
    (t.as_vec2() + Vec2::splat(0.5)) * tile_size
}

/// inclusive chunk span covering the axis‑aligned world rect `a`..`b`
/// (corners in any order)
pub fn chunk_span(a: Vec2, b: Vec2) -> (ChunkCoord, ChunkCoord) {
    let lo = world_to_chunk(a.min(b));
    let hi = world_to_chunk(a.max(b));
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_world_positions_floor() {
        assert_eq!(world_to_tile(-0.1, 16.0), -1);
        assert_eq!(world_to_tile(0.0, 16.0), 0);
        assert_eq!(world_to_tile(15.99, 16.0), 0);
        assert_eq!(world_to_tile(-16.0, 16.0), -1);
        assert_eq!(world_to_tile(-16.01, 16.0), -2);
    }

    #[test]
    fn tiles_map_to_chunks_across_zero() {
        assert_eq!(tile_to_chunk(0), 0);
        assert_eq!(tile_to_chunk(CHUNK_SIZE - 1), 0);
        assert_eq!(tile_to_chunk(CHUNK_SIZE), 1);
        assert_eq!(tile_to_chunk(-1), -1);
        assert_eq!(tile_to_chunk(-CHUNK_SIZE), -1);
        assert_eq!(tile_to_chunk(-CHUNK_SIZE - 1), -2);
    }

    #[test]
    fn local_index_is_row_major() {
        assert_eq!(local_index(IVec2::new(0, 0)), 0);
        assert_eq!(local_index(IVec2::new(1, 0)), 1);
        assert_eq!(local_index(IVec2::new(0, 1)), CHUNK_SIZE as usize);
        // last tile of chunk (-1,-1)
        assert_eq!(
            local_index(IVec2::new(-1, -1)),
            (CHUNK_SIZE * CHUNK_SIZE - 1) as usize
        );
    }

    #[test]
    fn chunk_span_orders_corners() {
        let chunk_w = CHUNK_SIZE as f32 * TILE_SIZE;
        let (lo, hi) = chunk_span(Vec2::new(chunk_w + 1.0, 5.0), Vec2::new(-1.0, -5.0));
        assert_eq!(lo, ChunkCoord::new(-1, -1));
        assert_eq!(hi, ChunkCoord::new(1, 0));
    }

    #[test]
    fn chebyshev_is_max_axis() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.chebyshev(ChunkCoord::new(2, -1)), 2);
        assert_eq!(a.chebyshev(ChunkCoord::new(-3, 3)), 3);
    }
}
