use bevy::prelude::*;

/// -------- tiles & chunks --------
pub const TILE_SIZE: f32  = 16.0;
pub const CHUNK_SIZE: i32 = 32;
pub const CHUNK_TILES: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// -------- streaming --------
pub const STREAM_RADIUS: i32       = 2;   // Chebyshev, in chunks
pub const CHUNK_GEN_BUDGET: usize  = 1;   // chunks generated per tick
pub const DEFAULT_SEED: u64        = 0x5EED_0F_A11;

/// -------- world generation --------
pub const ROCK_NOISE_SCALE: f64    = 0.045;
pub const ROCK_THRESHOLD: f64      = 0.32;
pub const SPAWN_CLEARING: i32      = 6;   // tiles around the origin kept open
pub const MAX_ENEMIES_PER_CHUNK: u64 = 4;

/// -------- miasma --------
pub const MIASMA_TILE_SIZE: f32    = 4.0;
pub const MIASMA_PAD: i32          = 8;
pub const MIASMA_DRAW_PAD: i32     = 2;
pub const MIASMA_REGROW_PAD: i32   = 6;
pub const REGROW_DELAY: f32        = 2.5;  // seconds
pub const REGROW_CHANCE: f32       = 0.08;
pub const REGROW_SPEED: f32        = 1.0;
pub const REGROW_BUDGET: usize     = 256;
pub const CLEAR_BUDGET_CEILING: usize = 4096;
pub const MAX_DRAW_HOLES: usize    = 12_000;
pub const FOG_COLOR: Color         = Color::srgba(0.32, 0.18, 0.40, 0.92);

/// -------- beam --------
pub const BEAM_LEVEL_MAX: i32      = 10;
pub const BEAM_CROSSFADE: f32      = 0.35; // seconds
pub const BEAM_SMOOTH_HZ: f32      = 6.0;
pub const BEAM_STAMP_BUDGET: usize = 320;
pub const BEAM_MAX_STAMPS: usize   = 160;
pub const LANCE_DPS: f32           = 45.0;
pub const CONE_FAN_STAMPS: usize   = 7;

/// -------- player --------
pub const PLAYER_RADIUS: f32       = 6.0;
pub const WALK_SPEED: f32          = 140.0;
pub const MIASMA_DRAG: f32         = 0.55;  // speed factor while standing in fog
pub const COLLISION_STEPS: i32     = 4;

/// -------- enemies --------
pub const AGGRO_RADIUS: f32        = 20.0 * TILE_SIZE;
pub const WISP_SPEED: f32          = 70.0;
pub const BRUTE_SPEED: f32         = 38.0;
pub const WISP_HEALTH: f32         = 30.0;
pub const BRUTE_HEALTH: f32        = 110.0;
pub const ENEMY_KEEP_AWAY: f32     = 1.5 * TILE_SIZE;
pub const WANDER_TURN_CHANCE: f64  = 0.02;  // per tick

/// -------- wind --------
pub const PREVAILING_WIND_DEG: f32 = 20.0;
pub const PREVAILING_WIND_SPEED: f32 = 0.6; // tiles / second
pub const GUST_WIND_DEG: f32       = 200.0;
pub const GUST_WIND_SPEED: f32     = 1.4;
pub const GUST_PERIOD: f32         = 24.0; // seconds per gust cycle
pub const GUST_DURATION: f32       = 8.0;  // engaged at the end of each cycle
