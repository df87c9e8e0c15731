//! ambient wind as a train of gears
//!
//! Each locked gear pushes `speed · (cos θ, sin θ) · coverage(ctx)`; the net
//! wind is the plain sum, so gear order never matters.

use bevy::prelude::*;

use crate::constants::*;

/// where / when the wind is sampled
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindContext {
    pub pos: Vec2,
    pub time: f32,
}

pub type Coverage = Box<dyn Fn(&WindContext) -> f32 + Send + Sync>;

pub struct WindGear {
    pub locked: bool,
    pub dir_deg: f32,
    /// tiles per second
    pub speed: f32,
    pub coverage: Coverage,
}

impl WindGear {
    /// uniform coverage of 1 everywhere
    pub fn new(dir_deg: f32, speed: f32) -> Self {
        Self {
            locked: true,
            dir_deg,
            speed,
            coverage: Box::new(|_| 1.0),
        }
    }

    pub fn with_coverage(
        mut self,
        coverage: impl Fn(&WindContext) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.coverage = Box::new(coverage);
        self
    }

    pub fn unlocked(mut self) -> Self {
        self.locked = false;
        self
    }

    pub fn contribution(&self, ctx: &WindContext) -> Vec2 {
        if !self.locked {
            return Vec2::ZERO;
        }
        Vec2::from_angle(self.dir_deg.to_radians()) * self.speed * (self.coverage)(ctx)
    }
}

#[derive(Resource, Default)]
pub struct GearTrain {
    gears: Vec<WindGear>,
    /// gear toggled by the gust cycle, if any
    gust: Option<usize>,
}

impl GearTrain {
    /// returns the gear's index for later `set_locked`
    pub fn add(&mut self, gear: WindGear) -> usize {
        self.gears.push(gear);
        self.gears.len() - 1
    }

    pub fn is_locked(&self, idx: usize) -> bool {
        self.gears.get(idx).is_some_and(|g| g.locked)
    }

    pub fn set_locked(&mut self, idx: usize, locked: bool) -> bool {
        match self.gears.get_mut(idx) {
            Some(g) => {
                g.locked = locked;
                true
            }
            None => false,
        }
    }

    /// Hand gear `idx` to the gust cycle; false if there is no such gear.
    pub fn set_gust_gear(&mut self, idx: usize) -> bool {
        if idx >= self.gears.len() {
            return false;
        }
        self.gust = Some(idx);
        true
    }

    pub fn gust_gear(&self) -> Option<usize> {
        self.gust
    }

    /// Engage or release the gust gear for time `t`; returns whether it is
    /// now engaged. Trains without a gust gear are left alone.
    pub fn cycle_gusts(&mut self, t: f32) -> bool {
        let Some(idx) = self.gust else { return false };
        let on = gusting(t);
        self.set_locked(idx, on);
        on
    }

    pub fn len(&self) -> usize {
        self.gears.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gears.is_empty()
    }

    /// net wind in tiles per second
    pub fn velocity(&self, ctx: &WindContext) -> Vec2 {
        self.gears.iter().map(|g| g.contribution(ctx)).sum()
    }

    /// steady prevailing breeze plus a gust gear that starts disengaged and
    /// only blows where a slow travelling wave is positive
    pub fn prevailing() -> Self {
        let mut train = GearTrain::default();
        train.add(WindGear::new(PREVAILING_WIND_DEG, PREVAILING_WIND_SPEED));
        let gust = train.add(
            WindGear::new(GUST_WIND_DEG, GUST_WIND_SPEED)
                .unlocked()
                .with_coverage(|ctx| {
                    let phase = ctx.pos.x / (8.0 * CHUNK_SIZE as f32 * TILE_SIZE) + ctx.time * 0.1;
                    (phase * std::f32::consts::TAU).sin().max(0.0)
                }),
        );
        train.set_gust_gear(gust);
        train
    }
}

/// true during the last `GUST_DURATION` seconds of every `GUST_PERIOD`
pub fn gusting(t: f32) -> bool {
    t.rem_euclid(GUST_PERIOD) >= GUST_PERIOD - GUST_DURATION
}

/* ===========================================================
   bevy glue
   =========================================================== */
pub fn gust_cycle_system(time: Res<Time>, mut train: ResMut<GearTrain>) {
    let was = train.gust_gear().is_some_and(|g| train.is_locked(g));
    let now = train.cycle_gusts(time.elapsed_secs());
    if now != was {
        debug!("gust gear {}", if now { "engaged" } else { "released" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn empty_train_is_calm() {
        assert_eq!(GearTrain::default().velocity(&WindContext::default()), Vec2::ZERO);
    }

    #[test]
    fn summation_is_order_independent() {
        let ctx = WindContext { pos: Vec2::new(3.0, -9.0), time: 2.0 };
        let mut ab = GearTrain::default();
        ab.add(WindGear::new(0.0, 1.0));
        ab.add(WindGear::new(90.0, 2.0));
        let mut ba = GearTrain::default();
        ba.add(WindGear::new(90.0, 2.0));
        ba.add(WindGear::new(0.0, 1.0));

        assert!(close(ab.velocity(&ctx), ba.velocity(&ctx)));
        assert!(close(ab.velocity(&ctx), Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn unlocked_gears_do_not_blow() {
        let mut train = GearTrain::default();
        let east = train.add(WindGear::new(0.0, 1.0));
        train.add(WindGear::new(180.0, 5.0).unlocked());
        let ctx = WindContext::default();
        assert!(close(train.velocity(&ctx), Vec2::X));

        assert!(train.set_locked(east, false));
        assert!(close(train.velocity(&ctx), Vec2::ZERO));
        assert!(!train.set_locked(99, true));
    }

    #[test]
    fn coverage_scales_per_context() {
        let mut train = GearTrain::default();
        train.add(WindGear::new(0.0, 2.0).with_coverage(|ctx| if ctx.pos.x < 0.0 { 0.0 } else { 0.5 }));
        let west = WindContext { pos: Vec2::new(-10.0, 0.0), time: 0.0 };
        let east = WindContext { pos: Vec2::new(10.0, 0.0), time: 0.0 };
        assert!(close(train.velocity(&west), Vec2::ZERO));
        assert!(close(train.velocity(&east), Vec2::X));
    }

    #[test]
    fn gust_gear_engages_on_demand() {
        let mut train = GearTrain::prevailing();
        let ctx = WindContext { pos: Vec2::new(2.0 * CHUNK_SIZE as f32 * TILE_SIZE, 0.0), time: 0.0 };
        let calm = train.velocity(&ctx);
        assert!((calm.length() - PREVAILING_WIND_SPEED).abs() < 1e-4);

        let gust = train.gust_gear().unwrap();
        train.set_locked(gust, true);
        assert!(train.velocity(&ctx).distance(calm) > 0.1);
    }

    #[test]
    fn gusts_blow_at_the_end_of_each_cycle() {
        assert!(!gusting(0.0));
        assert!(!gusting(GUST_PERIOD - GUST_DURATION - 0.5));
        assert!(gusting(GUST_PERIOD - GUST_DURATION + 0.5));
        assert!(!gusting(GUST_PERIOD + 0.5));
        assert!(gusting(3.0 * GUST_PERIOD - 0.5));
    }

    #[test]
    fn cycle_gusts_toggles_the_gust_gear() {
        let mut train = GearTrain::prevailing();
        let gust = train.gust_gear().unwrap();
        assert!(!train.is_locked(gust));

        assert!(train.cycle_gusts(GUST_PERIOD - 1.0));
        assert!(train.is_locked(gust));
        assert!(!train.cycle_gusts(GUST_PERIOD + 1.0));
        assert!(!train.is_locked(gust));
        assert!(train.is_locked(0));
    }

    #[test]
    fn trains_without_a_gust_gear_are_untouched() {
        let mut train = GearTrain::default();
        let a = train.add(WindGear::new(0.0, 1.0).unlocked());
        train.add(WindGear::new(90.0, 1.0).unlocked());
        assert!(!train.cycle_gusts(GUST_PERIOD - 1.0));
        assert!(!train.is_locked(a) && !train.is_locked(1));
        assert!(!train.set_gust_gear(7));
        assert_eq!(train.gust_gear(), None);
    }
}
