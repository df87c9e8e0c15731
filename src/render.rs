//! everything that turns core state into pixels: chunk textures, the fog
//! overlay and gizmo outlines for enemies & the beam

use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::utils::HashMap;

use crate::beam::{BeamAim, BeamController, BeamMode};
use crate::components::{ChunkSprite, Focus, FogOverlay, ViewSize};
use crate::constants::*;
use crate::coords::{local_index, ChunkCoord};
use crate::miasma::MiasmaField;
use crate::terrain::*;
use crate::tile_stream::{ChunkEvicted, ChunkGenerated};

const Z_CHUNKS: f32 = 0.0;
const Z_FOG: f32    = 50.0;

#[inline]
fn rgba8(c: Color) -> [u8; 4] {
    let s = c.to_srgba();
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(s.red), q(s.green), q(s.blue), q(s.alpha)]
}

fn tile_color(t: Tile) -> Color {
    match t.id {
        TILE_MOSS  => Color::srgb(0.22, 0.36, 0.20),
        TILE_SILT  => Color::srgb(0.40, 0.36, 0.26),
        TILE_ROCK  => Color::srgb(0.30, 0.30, 0.34),
        TILE_SHALE => Color::srgb(0.22, 0.22, 0.27),
        _          => Color::srgb(0.05, 0.05, 0.06),
    }
}

fn blank_image(w: u32, h: u32, fill: [u8; 4]) -> Image {
    let mut img = Image::new_fill(
        Extent3d { width: w.max(1), height: h.max(1), depth_or_array_layers: 1 },
        TextureDimension::D2,
        &fill,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );
    img.sampler = ImageSampler::nearest();
    img
}

/* ===========================================================
   chunk textures (one pixel per tile)
   =========================================================== */
/// live chunk sprite per resident chunk
#[derive(Resource, Default)]
pub struct ChunkSprites(pub HashMap<ChunkCoord, Entity>);

/// RGBA bytes of a chunk, image row 0 = top tile row
pub fn chunk_pixels(data: &ChunkData) -> Vec<u8> {
    let n = CHUNK_SIZE as usize;
    let mut px = vec![0u8; n * n * 4];
    for ly in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            let t = data.tiles[local_index(IVec2::new(lx, ly))];
            let row = (CHUNK_SIZE - 1 - ly) as usize;
            let i = (row * n + lx as usize) * 4;
            px[i..i + 4].copy_from_slice(&rgba8(tile_color(t)));
        }
    }
    px
}

pub fn spawn_chunk_sprites_system(
    mut commands: Commands,
    mut generated: EventReader<ChunkGenerated>,
    mut evicted: EventReader<ChunkEvicted>,
    mut images: ResMut<Assets<Image>>,
    mut sprites: ResMut<ChunkSprites>,
    store: Res<ChunkStore>,
) {
    for ChunkEvicted(c) in evicted.read() {
        if let Some(e) = sprites.0.remove(c) {
            // dropping the sprite drops the last strong handle → image freed
            commands.entity(e).despawn();
        }
    }

    let span = CHUNK_SIZE as f32 * TILE_SIZE;
    for ChunkGenerated(c) in generated.read() {
        let Some(data) = store.get_chunk(*c) else { continue };
        let mut img = blank_image(CHUNK_SIZE as u32, CHUNK_SIZE as u32, [0; 4]);
        img.data = chunk_pixels(data);
        let handle = images.add(img);

        let e = commands
            .spawn((
                Sprite {
                    image: handle,
                    custom_size: Some(Vec2::splat(span)),
                    ..default()
                },
                Transform::from_translation(c.center_world().extend(Z_CHUNKS)),
                ChunkSprite(*c),
            ))
            .id();
        if let Some(old) = sprites.0.insert(*c, e) {
            commands.entity(old).despawn();
        }
    }
}

/* ===========================================================
   fog overlay
   =========================================================== */
#[derive(Resource)]
pub struct FogOverlayImage {
    pub handle: Handle<Image>,
    pub dims: UVec2,
}

/// what the last overlay redraw did
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FogDrawStats {
    pub drawn: usize,
    pub deferred: usize,
    pub next_start: usize,
}

pub fn setup_fog_overlay(mut commands: Commands, mut images: ResMut<Assets<Image>>) {
    let handle = images.add(blank_image(1, 1, rgba8(FOG_COLOR)));
    commands.spawn((
        Sprite {
            image: handle.clone(),
            custom_size: Some(Vec2::ONE),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, Z_FOG),
        FogOverlay,
    ));
    commands.insert_resource(FogOverlayImage { handle, dims: UVec2::ONE });
    commands.init_resource::<FogDrawStats>();
}

/// Refill the overlay fully fogged, then punch this frame's holes.
#[allow(clippy::too_many_arguments)]
pub fn fog_overlay_system(
    field: Res<MiasmaField>,
    focus: Res<Focus>,
    view: Res<ViewSize>,
    mut overlay: ResMut<FogOverlayImage>,
    mut stats: ResMut<FogDrawStats>,
    mut images: ResMut<Assets<Image>>,
    mut sprite_q: Query<(&mut Sprite, &mut Transform), With<FogOverlay>>,
    mut holes: Local<Vec<IVec2>>,
) {
    let Ok((mut sprite, mut tf)) = sprite_q.get_single_mut() else { return };
    let ts = field.tile_size();
    let half = view.0 * 0.5;
    let pad = IVec2::splat(field.config().draw_pad.max(0));
    let lo = field.world_to_tile(focus.0 - half).saturating_sub(pad);
    let hi = field.world_to_tile(focus.0 + half).saturating_add(pad);
    let dims = (hi - lo + IVec2::ONE).max(IVec2::ONE).as_uvec2();

    let Some(img) = images.get_mut(&overlay.handle) else { return };
    let fog = rgba8(FOG_COLOR);
    if dims != overlay.dims {
        *img = blank_image(dims.x, dims.y, fog);
        overlay.dims = dims;
    } else {
        for px in img.data.chunks_exact_mut(4) {
            px.copy_from_slice(&fog);
        }
    }

    let batch = field.visible_holes(focus.0 - half, focus.0 + half, stats.next_start, &mut holes);
    for &abs in holes.iter() {
        let rel = abs.saturating_sub(lo);
        if rel.x < 0 || rel.y < 0 || rel.x >= dims.x as i32 || rel.y >= dims.y as i32 {
            continue;
        }
        let row = dims.y as usize - 1 - rel.y as usize;
        let i = (row * dims.x as usize + rel.x as usize) * 4;
        img.data[i + 3] = 0;
    }
    *stats = FogDrawStats {
        drawn: batch.drawn,
        deferred: batch.deferred,
        next_start: batch.next_start,
    };

    let size = dims.as_vec2() * ts;
    sprite.custom_size = Some(size);
    let corner = lo.as_vec2() * ts;
    tf.translation = (corner + size * 0.5).extend(Z_FOG);
}

/* ===========================================================
   gizmos
   =========================================================== */
pub fn draw_enemies_system(mut gizmos: Gizmos, store: Res<ChunkStore>) {
    for e in store.enemies() {
        let color = match e.kind {
            EnemyKind::Wisp  => Color::srgb(0.70, 0.95, 0.90),
            EnemyKind::Brute => Color::srgb(0.95, 0.45, 0.30),
        };
        let iso = Isometry2d::from_translation(e.pos);
        gizmos.circle_2d(iso, e.radius, color);
        let frac = (e.health / e.max_health).clamp(0.0, 1.0);
        let bar = e.pos + Vec2::new(-e.radius, e.radius + 3.0);
        gizmos.line_2d(bar, bar + Vec2::X * 2.0 * e.radius * frac, Color::srgb(0.3, 0.9, 0.3));
    }
}

pub fn draw_beam_system(mut gizmos: Gizmos, beam: Res<BeamController>, aim: Res<BeamAim>) {
    let color = Color::srgba(1.0, 0.95, 0.6, 0.8);
    let frame = beam.weights();
    for mw in [frame.active, frame.fading] {
        if mw.effective() <= 0.0 {
            continue;
        }
        let shape = beam.smooth_shape(mw.mode);
        let color = color.with_alpha(0.8 * mw.effective());
        let o = aim.origin;
        let dir = Vec2::from_angle(aim.angle);
        match mw.mode {
            BeamMode::Off => {}
            BeamMode::Aura | BeamMode::Burst => {
                gizmos.circle_2d(Isometry2d::from_translation(o), shape.radius, color);
            }
            BeamMode::Cone => {
                let l = Vec2::from_angle(aim.angle + shape.spread);
                let r = Vec2::from_angle(aim.angle - shape.spread);
                let reach = shape.length / shape.spread.cos().max(0.1);
                gizmos.line_2d(o, o + l * reach, color);
                gizmos.line_2d(o, o + r * reach, color);
                gizmos.line_2d(o + l * reach, o + r * reach, color);
            }
            BeamMode::Lance => {
                let side = dir.perp() * shape.thickness;
                let end = o + dir * shape.length;
                gizmos.line_2d(o + side, end + side, color);
                gizmos.line_2d(o - side, end - side, color);
                gizmos.line_2d(end - side, end + side, color);
            }
        }
    }
}
