use bevy::prelude::*;

use crate::coords::ChunkCoord;

/* ===========================================================
   shared resources (written by the shell, read by the core)
   =========================================================== */
/// world point the streamer and the miasma grid are centred on
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct Focus(pub Vec2);

/// visible area in world units
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ViewSize(pub Vec2);

impl Default for ViewSize {
    fn default() -> Self {
        ViewSize(Vec2::new(1280.0, 720.0))
    }
}

/* ===========================================================
   shared components
   =========================================================== */
#[derive(Component)]
pub struct Velocity(pub Vec2);

/* ===========================================================
   player
   =========================================================== */
#[derive(Component)]
pub struct Player;

/* ===========================================================
   render helpers
   =========================================================== */
#[derive(Component)]
pub struct ChunkSprite(pub ChunkCoord);

#[derive(Component)]
pub struct FogOverlay;
