//! enemy AI and movement
//!
//! Enemies are plain data inside their chunk (`ChunkData::enemies`), so they
//! stream, evict and regenerate with it. Each tick they either chase the
//! focus (inside the aggro radius, holding a small keep‑away buffer) or
//! wander, drift with the wind, and collide with rock. They never leave the
//! chunk they live in.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::Focus;
use crate::constants::*;
use crate::coords::ChunkCoord;
use crate::terrain::{move_and_collide, ChunkStore, Enemy, EnemyKind};
use crate::wind::{GearTrain, WindContext};
use crate::world_gen::WorldSeed;

impl EnemyKind {
    /// how strongly the wind pushes this kind
    pub fn wind_factor(self) -> f32 {
        match self {
            EnemyKind::Wisp  => 1.0,
            EnemyKind::Brute => 0.2,
        }
    }
}

/// wander dice
#[derive(Resource)]
pub struct EnemyRng(pub StdRng);

impl FromWorld for EnemyRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<WorldSeed>().copied().unwrap_or_default();
        EnemyRng(StdRng::seed_from_u64(seed.0 ^ 0xE4E1_1E5))
    }
}

/* ---------- AI: wander → aggro with keep‑away buffer ---------- */
fn think(enemy: &mut Enemy, target: Vec2, rng: &mut StdRng) {
    let to_target = target - enemy.pos;
    let dist = to_target.length();

    if dist < AGGRO_RADIUS {
        enemy.vel = if dist > ENEMY_KEEP_AWAY + enemy.radius {
            to_target / dist * enemy.speed
        } else {
            Vec2::ZERO // hold ground
        };
        return;
    }

    if rng.gen_bool(WANDER_TURN_CHANCE) {
        enemy.vel = if rng.gen_bool(0.25) {
            Vec2::ZERO
        } else {
            Vec2::from_angle(rng.gen::<f32>() * std::f32::consts::TAU) * enemy.speed * 0.5
        };
    }
}

/// One tick for every resident enemy.
pub fn step_enemies(
    store: &mut ChunkStore,
    target: Vec2,
    wind: &GearTrain,
    time: f32,
    dt: f32,
    rng: &mut StdRng,
) {
    if dt <= 0.0 {
        return;
    }
    // sorted so the wander dice are consumed in a stable order
    let mut coords: Vec<ChunkCoord> = store.coords().collect();
    coords.sort_unstable();

    for coord in coords {
        // lift the enemies out so collision can read the store
        let Some(chunk) = store.get_chunk_mut(coord) else { continue };
        let mut enemies = std::mem::take(&mut chunk.enemies);

        let lo = coord.origin_world();
        let hi = lo + Vec2::splat(CHUNK_SIZE as f32 * TILE_SIZE);

        for enemy in &mut enemies {
            think(enemy, target, rng);

            let ctx = WindContext { pos: enemy.pos, time };
            let drift = wind.velocity(&ctx) * TILE_SIZE * enemy.kind.wind_factor();
            let (pos, blocked) = move_and_collide(store, enemy.pos, enemy.radius, (enemy.vel + drift) * dt);
            if blocked.x {
                enemy.vel.x = 0.0;
            }
            if blocked.y {
                enemy.vel.y = 0.0;
            }

            // stay inside the owning chunk
            let r = Vec2::splat(enemy.radius);
            enemy.pos = pos.clamp(lo + r, hi - r);
        }

        if let Some(chunk) = store.get_chunk_mut(coord) {
            chunk.enemies = enemies;
        }
    }
}

pub fn enemy_update_system(
    time: Res<Time>,
    focus: Res<Focus>,
    wind: Res<GearTrain>,
    mut store: ResMut<ChunkStore>,
    mut rng: ResMut<EnemyRng>,
) {
    step_enemies(
        &mut store,
        focus.0,
        &wind,
        time.elapsed_secs(),
        time.delta_secs(),
        &mut rng.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::ChunkData;
    use crate::wind::WindGear;

    fn store_with(coord: ChunkCoord, enemies: Vec<Enemy>) -> ChunkStore {
        let mut store = ChunkStore::default();
        let mut data = ChunkData::empty();
        data.enemies = enemies;
        store.set_chunk(coord, data);
        store
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn enemies_chase_inside_aggro_radius() {
        let start = Vec2::new(100.0, 100.0);
        let mut store = store_with(ChunkCoord::new(0, 0), vec![Enemy::spawn(EnemyKind::Wisp, start)]);
        let target = Vec2::new(300.0, 100.0);
        step_enemies(&mut store, target, &GearTrain::default(), 0.0, 0.1, &mut rng());

        let e = store.enemies().next().cloned();
        let e = e.expect("enemy stays resident");
        assert!(e.pos.x > start.x);
        assert!((e.pos.x - start.x - WISP_SPEED * 0.1).abs() < 1e-3);
    }

    #[test]
    fn enemies_hold_the_keep_away_buffer() {
        let start = Vec2::new(100.0, 100.0);
        let mut store = store_with(ChunkCoord::new(0, 0), vec![Enemy::spawn(EnemyKind::Brute, start)]);
        step_enemies(&mut store, start + Vec2::new(5.0, 0.0), &GearTrain::default(), 0.0, 0.1, &mut rng());
        assert_eq!(store.enemies().next().map(|e| e.pos), Some(start));
    }

    #[test]
    fn wind_pushes_wisps_more_than_brutes() {
        let mut wind = GearTrain::default();
        wind.add(WindGear::new(90.0, 1.0));
        let far = Vec2::new(1e6, 0.0);
        let wisp = Vec2::new(100.0, 100.0);
        let brute = Vec2::new(300.0, 100.0);
        let mut store = store_with(
            ChunkCoord::new(0, 0),
            vec![Enemy::spawn(EnemyKind::Wisp, wisp), Enemy::spawn(EnemyKind::Brute, brute)],
        );
        // zero speed: wander can pick a heading but never moves them
        let mut idle = rng();
        for e in store.enemies_mut() {
            e.speed = 0.0;
        }
        step_enemies(&mut store, far, &wind, 0.0, 1.0, &mut idle);

        let ys: Vec<f32> = store.enemies().map(|e| e.pos.y).collect();
        assert!((ys[0] - (100.0 + TILE_SIZE)).abs() < 1e-3);
        assert!((ys[1] - (100.0 + TILE_SIZE * 0.2)).abs() < 1e-3);
    }

    #[test]
    fn enemies_never_leave_their_chunk() {
        let coord = ChunkCoord::new(-1, 0);
        let start = coord.origin_world() + Vec2::new(500.0, 20.0);
        let mut store = store_with(coord, vec![Enemy::spawn(EnemyKind::Wisp, start)]);
        let target = start + Vec2::new(200.0, 0.0); // across the border
        for _ in 0..100 {
            step_enemies(&mut store, target, &GearTrain::default(), 0.0, 0.05, &mut rng());
        }
        let pos = store.enemies().next().map(|e| e.pos).unwrap_or_default();
        assert_eq!(crate::coords::world_to_chunk(pos), coord);
        assert!(pos.x > start.x);
    }

    #[test]
    fn zero_dt_is_a_noop() {
        let start = Vec2::new(40.0, 40.0);
        let mut store = store_with(ChunkCoord::new(0, 0), vec![Enemy::spawn(EnemyKind::Wisp, start)]);
        step_enemies(&mut store, Vec2::ZERO, &GearTrain::prevailing(), 0.0, 0.0, &mut rng());
        assert_eq!(store.enemies().next().map(|e| e.pos), Some(start));
    }
}
