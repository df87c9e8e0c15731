use bevy::prelude::*;

use crate::components::{Player, ViewSize};

/// pixel snapping helper – keeps the camera on whole pixels so the fog
/// overlay and chunk textures never land on half‑pixels and shimmer
#[inline]
pub fn snap(v: f32) -> f32 {
    v.round()      // 1 U = 1 screen pixel in the default 2‑D camera
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// camera follow; the world is unbounded so there is nothing to clamp to
///
/// NOTE: runs in **PostUpdate**, after movement has been applied.
pub fn camera_follow_system(
    mut cam_q: Query<&mut Transform, (With<Camera>, Without<Player>)>,
    player_q:  Query<&Transform, With<Player>>,
) {
    let Ok(mut cam_tf) = cam_q.get_single_mut() else { return };
    let Ok(player_tf)  = player_q.get_single()      else { return };

    cam_tf.translation.x = snap(player_tf.translation.x);
    cam_tf.translation.y = snap(player_tf.translation.y);
}

/// keeps [`ViewSize`] in sync with the primary window
pub fn view_size_system(window_q: Query<&Window>, mut view: ResMut<ViewSize>) {
    let Ok(window) = window_q.get_single() else { return };
    let size = Vec2::new(window.width(), window.height());
    if size.x > 0.0 && size.y > 0.0 && view.0 != size {
        view.0 = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_rounds_to_whole_pixels() {
        assert_eq!(snap(10.4), 10.0);
        assert_eq!(snap(10.6), 11.0);
        assert_eq!(snap(-3.5), -4.0);
    }
}
