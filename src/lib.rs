//! Top‑down fog‑clearing game core: chunk streaming, the miasma field, the
//! beam that cuts through it, wind and enemies.
//!
//! [`MiasmaCorePlugin`] owns the simulation and runs headless; the binary
//! layers input, camera and rendering on top.

pub mod beam;
pub mod camera;
pub mod components;
pub mod constants;
pub mod coords;
pub mod diagnostics;
pub mod enemy;
pub mod miasma;
pub mod player;
pub mod render;
pub mod terrain;
pub mod tile_stream;
pub mod wind;
pub mod world_gen;

use bevy::prelude::*;

use beam::{apply_beam_intents_system, beam_raycast_system, BeamAim, BeamController, BeamIntent};
use components::{Focus, ViewSize};
use enemy::{enemy_update_system, EnemyRng};
use miasma::{advance_miasma_system, MiasmaConfig, MiasmaField};
use terrain::ChunkStore;
use tile_stream::{
    stream_chunks_system, ChunkEntered, ChunkEvicted, ChunkExited, ChunkGenerated, ChunkStreamer,
};
use wind::{gust_cycle_system, GearTrain};
use world_gen::{WorldGen, WorldSeed};

/// The ordered simulation tick; shell systems go before (input) or after
/// (drawing) it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoreTick;

pub struct MiasmaCorePlugin;

impl Plugin for MiasmaCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldSeed>();
        let seed = app.world().resource::<WorldSeed>().0;
        info!("world seed {seed:#x}");

        if !app.world().contains_resource::<GearTrain>() {
            app.insert_resource(GearTrain::prevailing());
        }

        app
            /* state ------------------------------------------------------------ */
            .insert_resource(WorldGen::new(seed))
            .insert_resource(MiasmaField::new(MiasmaConfig { seed, ..default() }))
            .init_resource::<ChunkStore>()
            .init_resource::<ChunkStreamer>()
            .init_resource::<Focus>()
            .init_resource::<ViewSize>()
            .init_resource::<BeamController>()
            .init_resource::<BeamAim>()
            .init_resource::<EnemyRng>()

            /* events ----------------------------------------------------------- */
            .add_event::<ChunkEntered>()
            .add_event::<ChunkExited>()
            .add_event::<ChunkGenerated>()
            .add_event::<ChunkEvicted>()
            .add_event::<BeamIntent>()

            /* tick ------------------------------------------------------------- */
            .add_systems(Update, gust_cycle_system.before(CoreTick))
            .add_systems(
                Update,
                (
                    stream_chunks_system,      // chunks around the focus
                    advance_miasma_system,     // origin shift + regrowth
                    apply_beam_intents_system, // mode / level changes
                    beam_raycast_system,       // stamps + lance damage
                    enemy_update_system,       // AI, wind, collision
                )
                    .chain()
                    .in_set(CoreTick),
            );
    }
}
