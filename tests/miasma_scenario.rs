//! fog field end to end: stamp, wait, regrow

use bevy::prelude::*;
use project_miasma::miasma::{MiasmaConfig, MiasmaField};

const VIEW: Vec2 = Vec2::new(800.0, 600.0);

fn field() -> MiasmaField {
    MiasmaField::with_view(
        MiasmaConfig {
            tile_size: 4.0,
            pad: 8,
            ..MiasmaConfig::default()
        },
        VIEW,
        Vec2::ZERO,
    )
}

#[test]
fn stamp_hold_then_regrow_the_rim() {
    let mut f = field();

    // tile centres (±0.5, ±1.5, ±2.5) within 3 tiles: 32 of them
    assert_eq!(f.clear_area(Vec2::ZERO, 12.0, 999), 32);
    assert_eq!(f.cleared_len(), 32);

    // younger than the delay: nothing regrows, even at chance 1
    f.config_mut().regrow_chance = 1.0;
    f.config_mut().regrow_speed = 1.0;
    let delay = f.config().regrow_delay;
    f.update(delay * 0.4, Vec2::ZERO, Vec2::ZERO, VIEW);
    assert_eq!(f.cleared_len(), 32);
    f.update(delay * 0.4, Vec2::ZERO, Vec2::ZERO, VIEW);
    assert_eq!(f.cleared_len(), 32);

    // past the delay: the whole fog‑adjacent rim goes in a single tick
    f.update(delay * 0.4, Vec2::ZERO, Vec2::ZERO, VIEW);
    assert_eq!(f.last_regrow(), 16);
    assert_eq!(f.cleared_len(), 16);

    // the inner core stays clear until it becomes the rim
    assert!(!f.sample(Vec2::new(2.0, 2.0)).is_fog());
    assert!(f.sample(Vec2::new(10.0, 2.0)).is_fog());
}

#[test]
fn stamps_survive_walking_around() {
    let mut f = field();
    f.clear_area(Vec2::ZERO, 12.0, 999);

    // walk 40 units right in uneven steps, then back
    let mut pos = Vec2::ZERO;
    for step in [3.3, 7.1, 0.4, 12.0, 17.2] {
        pos.x += step;
        f.update(0.01, pos, Vec2::new(step, 0.0), VIEW);
    }
    for step in [17.2, 12.0, 0.4, 7.1, 3.3] {
        pos.x -= step;
        f.update(0.01, pos, Vec2::new(-step, 0.0), VIEW);
    }
    assert_eq!(f.cleared_len(), 32);
    assert!(!f.sample(Vec2::new(1.0, 1.0)).is_fog());
    assert!(f.sample(Vec2::new(20.0, 0.0)).is_fog());
}
