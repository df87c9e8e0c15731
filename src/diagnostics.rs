//! perf counters as bevy diagnostics, picked up by `LogDiagnosticsPlugin`

use bevy::diagnostic::{Diagnostic, DiagnosticPath, Diagnostics, RegisterDiagnostic};
use bevy::prelude::*;

use crate::beam::BeamController;
use crate::miasma::MiasmaField;
use crate::render::FogDrawStats;
use crate::tile_stream::ChunkStreamer;

pub const CLEARED_TILES: DiagnosticPath  = DiagnosticPath::const_new("miasma/cleared_tiles");
pub const LAST_REGROW: DiagnosticPath    = DiagnosticPath::const_new("miasma/last_regrow");
pub const DRAW_HOLES: DiagnosticPath     = DiagnosticPath::const_new("miasma/draw_holes");
pub const BEAM_STAMPS: DiagnosticPath    = DiagnosticPath::const_new("beam/stamps");
pub const BEAM_CLEARED: DiagnosticPath   = DiagnosticPath::const_new("beam/cleared");
pub const LOADED_CHUNKS: DiagnosticPath  = DiagnosticPath::const_new("stream/loaded_chunks");
pub const PENDING_CHUNKS: DiagnosticPath = DiagnosticPath::const_new("stream/pending_chunks");

pub struct MiasmaDiagnosticsPlugin;

impl Plugin for MiasmaDiagnosticsPlugin {
    fn build(&self, app: &mut App) {
        for path in [
            CLEARED_TILES,
            LAST_REGROW,
            DRAW_HOLES,
            BEAM_STAMPS,
            BEAM_CLEARED,
            LOADED_CHUNKS,
            PENDING_CHUNKS,
        ] {
            app.register_diagnostic(Diagnostic::new(path).with_smoothing_factor(0.0));
        }
        app.add_systems(PostUpdate, measure_system);
    }
}

fn measure_system(
    mut diagnostics: Diagnostics,
    field: Option<Res<MiasmaField>>,
    beam: Option<Res<BeamController>>,
    streamer: Option<Res<ChunkStreamer>>,
    draw: Option<Res<FogDrawStats>>,
) {
    if let Some(field) = field {
        diagnostics.add_measurement(&CLEARED_TILES, || field.cleared_len() as f64);
        diagnostics.add_measurement(&LAST_REGROW, || field.last_regrow() as f64);
    }
    if let Some(draw) = draw {
        diagnostics.add_measurement(&DRAW_HOLES, || draw.drawn as f64);
    }
    if let Some(beam) = beam {
        let stats = beam.stats();
        diagnostics.add_measurement(&BEAM_STAMPS, || stats.stamps as f64);
        diagnostics.add_measurement(&BEAM_CLEARED, || stats.cleared as f64);
    }
    if let Some(streamer) = streamer {
        diagnostics.add_measurement(&LOADED_CHUNKS, || streamer.loaded_len() as f64);
        diagnostics.add_measurement(&PENDING_CHUNKS, || streamer.pending_len() as f64);
    }
}
