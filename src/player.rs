//! all player‑related systems (spawn, movement, aim, beam hot‑keys)

use bevy::input::mouse::MouseWheel;
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::beam::{BeamAim, BeamIntent, BeamMode};
use crate::components::*;
use crate::constants::*;
use crate::miasma::MiasmaField;
use crate::terrain::{move_and_collide, ChunkStore};

/* ===========================================================
   spawn
   =========================================================== */
pub fn spawn_player(mut commands: Commands) {
    commands.spawn((
        Sprite::from_color(Color::srgb(0.95, 0.85, 0.55), Vec2::splat(PLAYER_RADIUS * 2.0)),
        Transform::from_xyz(0.0, 0.0, 20.0),
        Player,
        Velocity(Vec2::ZERO),
    ));
}

/// WASD → unit direction (diagonals normalised)
pub fn wasd_direction(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let mut d = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyA) { d.x -= 1.0; }
    if keys.pressed(KeyCode::KeyD) { d.x += 1.0; }
    if keys.pressed(KeyCode::KeyS) { d.y -= 1.0; }
    if keys.pressed(KeyCode::KeyW) { d.y += 1.0; }
    d.normalize_or_zero()
}

/// walking velocity, slowed while standing in fog
#[inline]
pub fn walk_velocity(dir: Vec2, in_fog: bool) -> Vec2 {
    let speed = if in_fog { WALK_SPEED * MIASMA_DRAG } else { WALK_SPEED };
    dir * speed
}

/* ===========================================================
   movement & collision
   =========================================================== */
pub fn player_move_system(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut q: Query<(&mut Transform, &mut Velocity), With<Player>>,
    store: Res<ChunkStore>,
    field: Res<MiasmaField>,
    mut focus: ResMut<Focus>,
    mut aim: ResMut<BeamAim>,
) {
    let Ok((mut tf, mut vel)) = q.get_single_mut() else { return };
    let pos = tf.translation.truncate();

    vel.0 = walk_velocity(wasd_direction(&keys), field.sample(pos).is_fog());
    let (new_pos, blocked) = move_and_collide(&store, pos, PLAYER_RADIUS, vel.0 * time.delta_secs());
    if blocked.x {
        vel.0.x = 0.0;
    }
    if blocked.y {
        vel.0.y = 0.0;
    }

    tf.translation.x = new_pos.x;
    tf.translation.y = new_pos.y;
    focus.0 = new_pos;
    aim.origin = new_pos;
}

/* ===========================================================
   aim from the cursor
   =========================================================== */
pub fn player_aim_system(
    window_q: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut aim: ResMut<BeamAim>,
) {
    let Ok(window) = window_q.get_single() else { return };
    let Ok((camera, cam_tf)) = camera_q.get_single() else { return };
    let Some(cursor) = window.cursor_position() else { return };
    let Ok(world) = camera.viewport_to_world_2d(cam_tf, cursor) else { return };

    let d = world - aim.origin;
    if d.length_squared() > 1e-6 {
        aim.angle = d.y.atan2(d.x);
    }
}

/* ===========================================================
   beam hot‑keys: Q/E step mode, 1‑5 pick, wheel = level
   =========================================================== */
const MODE_KEYS: [(KeyCode, BeamMode); BeamMode::COUNT] = [
    (KeyCode::Digit1, BeamMode::Off),
    (KeyCode::Digit2, BeamMode::Aura),
    (KeyCode::Digit3, BeamMode::Burst),
    (KeyCode::Digit4, BeamMode::Cone),
    (KeyCode::Digit5, BeamMode::Lance),
];

pub fn beam_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut wheel: EventReader<MouseWheel>,
    mut intents: EventWriter<BeamIntent>,
) {
    if keys.just_pressed(KeyCode::KeyE) {
        intents.send(BeamIntent::StepMode(1));
    }
    if keys.just_pressed(KeyCode::KeyQ) {
        intents.send(BeamIntent::StepMode(-1));
    }
    for (key, mode) in MODE_KEYS {
        if keys.just_pressed(key) {
            intents.send(BeamIntent::SetMode(mode.name().to_owned()));
        }
    }

    let scroll: f32 = wheel.read().map(|ev| ev.y).sum();
    if scroll != 0.0 {
        intents.send(BeamIntent::StepLevel(scroll.signum() as i32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonals_are_normalised() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyD);
        let d = wasd_direction(&keys);
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert!(d.x > 0.0 && d.y > 0.0);

        keys.press(KeyCode::KeyA);
        assert_eq!(wasd_direction(&keys), Vec2::Y);
    }

    #[test]
    fn fog_slows_the_walk() {
        let clear = walk_velocity(Vec2::X, false);
        let fog = walk_velocity(Vec2::X, true);
        assert_eq!(clear.x, WALK_SPEED);
        assert!((fog.x - WALK_SPEED * MIASMA_DRAG).abs() < 1e-4);
    }

    #[test]
    fn every_mode_key_names_a_real_mode() {
        for (_, mode) in MODE_KEYS {
            assert_eq!(mode.name().parse::<BeamMode>(), Ok(mode));
        }
    }
}
