//! game window: the miasma core plus input, camera & rendering
//!
//! Works with **Bevy 0.15**. `MIASMA_SEED=<u64>` picks the world.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin,
    LogDiagnosticsPlugin,
};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};

use project_miasma::camera::{camera_follow_system, setup_camera, view_size_system};
use project_miasma::constants::DEFAULT_SEED;
use project_miasma::diagnostics::MiasmaDiagnosticsPlugin;
use project_miasma::player::{
    beam_input_system, player_aim_system, player_move_system, spawn_player,
};
use project_miasma::render::{
    draw_beam_system, draw_enemies_system, fog_overlay_system, setup_fog_overlay,
    spawn_chunk_sprites_system, ChunkSprites,
};
use project_miasma::world_gen::WorldSeed;
use project_miasma::{CoreTick, MiasmaCorePlugin};

/* ------------------------------------------------------------------------ */
/* seed from the environment                                                */
/* ------------------------------------------------------------------------ */
fn seed_from_env() -> WorldSeed {
    match std::env::var("MIASMA_SEED") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(seed) => WorldSeed(seed),
            Err(err) => {
                warn!("MIASMA_SEED={raw:?} is not a u64 ({err}), using default seed");
                WorldSeed(DEFAULT_SEED)
            }
        },
        Err(_) => WorldSeed::default(),
    }
}

/* ------------------------------------------------------------------------ */
/* F11 borderless‑fullscreen toggle                                         */
/* ------------------------------------------------------------------------ */
fn toggle_fullscreen(
    keys: Res<ButtonInput<KeyCode>>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
) {
    if keys.just_pressed(KeyCode::F11) {
        let Ok(mut window) = window_q.get_single_mut() else { return };
        window.mode = match window.mode {
            WindowMode::Windowed => {
                WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
            }
            _ => WindowMode::Windowed,
        };
    }
}

/* ------------------------------------------------------------------------ */
/* main                                                                     */
/* ------------------------------------------------------------------------ */
fn main() {
    let mut app = App::new();
    app
        /* bevy core ------------------------------------------------------- */
        .insert_resource(ClearColor(Color::srgb(0.05, 0.04, 0.07)))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "miasma".into(),
                resolution: (1280., 720.).into(),
                mode: WindowMode::Windowed,
                ..default()
            }),
            ..default()
        }))

        /* diagnostics ----------------------------------------------------- */
        .add_plugins((
            LogDiagnosticsPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
            EntityCountDiagnosticsPlugin::default(),
            MiasmaDiagnosticsPlugin,
        ));

    // after DefaultPlugins: the seed warning needs the LogPlugin
    app.insert_resource(seed_from_env())
        .add_plugins(MiasmaCorePlugin)
        .init_resource::<ChunkSprites>()

        /* startup systems ------------------------------------------------- */
        .add_systems(Startup, (setup_camera, spawn_player, setup_fog_overlay))

        /* input → core tick ----------------------------------------------- */
        .add_systems(
            Update,
            (
                view_size_system,     // window → ViewSize
                beam_input_system,    // Q/E, 1‑5, wheel
                player_move_system,   // WASD + collision, writes Focus
                player_aim_system,    // cursor → BeamAim
                toggle_fullscreen,
            )
                .chain()
                .before(CoreTick),
        )

        /* core tick → pixels ---------------------------------------------- */
        .add_systems(
            Update,
            (
                spawn_chunk_sprites_system,
                fog_overlay_system,
                draw_enemies_system,
                draw_beam_system,
            )
                .after(CoreTick),
        )

        /* post‑update (camera) -------------------------------------------- */
        .add_systems(PostUpdate, camera_follow_system)
        .run();
}
