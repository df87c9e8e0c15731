//! the player's beam: discrete modes, a continuous level, crossfades,
//! smoothed hitbox/visual shapes and the per‑tick effect application
//! (fog stamps + lance damage)
//!
//! Time only advances on reads: every call that needs the clock takes the
//! absolute elapsed time (`now`, seconds) and the controller measures the
//! gap since its previous read. Two reads at the same instant are identical.

use std::f32::consts::TAU;
use std::str::FromStr;

use bevy::prelude::*;
use thiserror::Error;

use crate::constants::*;
use crate::miasma::MiasmaField;
use crate::terrain::ChunkStore;

/* ===========================================================
   modes
   =========================================================== */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BeamMode {
    #[default]
    Off,
    /// weak area around the player
    Aura,
    /// strong area around the player
    Burst,
    Cone,
    /// directional line, the only mode that deals damage
    Lance,
}

impl BeamMode {
    pub const COUNT: usize = 5;
    pub const ALL: [BeamMode; Self::COUNT] = [
        BeamMode::Off,
        BeamMode::Aura,
        BeamMode::Burst,
        BeamMode::Cone,
        BeamMode::Lance,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// clamps out‑of‑range indices to the last mode
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i.min(Self::COUNT - 1)]
    }

    pub fn name(self) -> &'static str {
        match self {
            BeamMode::Off   => "off",
            BeamMode::Aura  => "aura",
            BeamMode::Burst => "burst",
            BeamMode::Cone  => "cone",
            BeamMode::Lance => "lance",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown beam mode `{0}`")]
pub struct UnknownBeamMode(pub String);

impl FromStr for BeamMode {
    type Err = UnknownBeamMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none"    => Ok(BeamMode::Off),
            "aura" | "weak"   => Ok(BeamMode::Aura),
            "burst" | "strong" => Ok(BeamMode::Burst),
            "cone" | "fan"    => Ok(BeamMode::Cone),
            "lance" | "line"  => Ok(BeamMode::Lance),
            _ => Err(UnknownBeamMode(s.to_owned())),
        }
    }
}

/* ===========================================================
   shapes
   =========================================================== */
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeamShape {
    /// stamp radius (area modes, cone apex)
    pub radius: f32,
    pub length: f32,
    /// half‑width of the lance
    pub thickness: f32,
    /// cone half‑angle, radians
    pub spread: f32,
}

impl BeamShape {
    const ZERO: BeamShape = BeamShape { radius: 0.0, length: 0.0, thickness: 0.0, spread: 0.0 };

    pub fn lerp(a: BeamShape, b: BeamShape, t: f32) -> BeamShape {
        let l = |x: f32, y: f32| x + (y - x) * t;
        BeamShape {
            radius: l(a.radius, b.radius),
            length: l(a.length, b.length),
            thickness: l(a.thickness, b.thickness),
            spread: l(a.spread, b.spread),
        }
    }
}

/// (level 0, top level) per mode, indexed by `BeamMode::index`
const SHAPES: [(BeamShape, BeamShape); BeamMode::COUNT] = [
    (BeamShape::ZERO, BeamShape::ZERO),
    (
        BeamShape { radius: 28.0, length: 0.0, thickness: 0.0, spread: 0.0 },
        BeamShape { radius: 56.0, length: 0.0, thickness: 0.0, spread: 0.0 },
    ),
    (
        BeamShape { radius: 56.0, length: 0.0, thickness: 0.0, spread: 0.0 },
        BeamShape { radius: 112.0, length: 0.0, thickness: 0.0, spread: 0.0 },
    ),
    (
        BeamShape { radius: 10.0, length: 110.0, thickness: 0.0, spread: 0.30 },
        BeamShape { radius: 18.0, length: 220.0, thickness: 0.0, spread: 0.55 },
    ),
    (
        BeamShape { radius: 0.0, length: 180.0, thickness: 5.0, spread: 0.0 },
        BeamShape { radius: 0.0, length: 360.0, thickness: 12.0, spread: 0.0 },
    ),
];

/// widest enemy, used to pad the lance's query rect
const MAX_ENEMY_RADIUS: f32 = 16.0;

/* ===========================================================
   tuning & bookkeeping
   =========================================================== */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamTuning {
    pub crossfade_secs: f32,
    pub smooth_cutoff_hz: f32,
    /// fog budget of one full‑weight stamp
    pub stamp_budget: usize,
    pub lance_dps: f32,
    /// stamps per raycast, all modes together
    pub max_stamps: usize,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            crossfade_secs: BEAM_CROSSFADE,
            smooth_cutoff_hz: BEAM_SMOOTH_HZ,
            stamp_budget: BEAM_STAMP_BUDGET,
            lance_dps: LANCE_DPS,
            max_stamps: BEAM_MAX_STAMPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Crossfade {
    prev: BeamMode,
    blend: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeWeight {
    pub mode: BeamMode,
    pub weight: f32,
}

impl ModeWeight {
    /// `Off` never carries weight
    #[inline]
    pub fn effective(self) -> f32 {
        if self.mode == BeamMode::Off {
            0.0
        } else {
            self.weight
        }
    }
}

/// blend state of one read
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamFrame {
    pub active: ModeWeight,
    pub fading: ModeWeight,
    /// seconds since the previous read
    pub dt: f32,
}

impl BeamFrame {
    pub fn is_silent(&self) -> bool {
        self.active.effective() <= 0.0 && self.fading.effective() <= 0.0
    }
}

/// what the last raycast did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BeamStats {
    pub stamps: usize,
    pub cleared: usize,
    pub hits: usize,
    pub kills: usize,
}

/* ===========================================================
   controller
   =========================================================== */
#[derive(Resource)]
pub struct BeamController {
    tuning: BeamTuning,
    mode: BeamMode,
    level: i32,
    angle: f32,
    fade: Crossfade,
    smooth: [BeamShape; BeamMode::COUNT],
    last_read: Option<f64>,
    stats: BeamStats,
}

impl Default for BeamController {
    fn default() -> Self {
        BeamController::new(BeamTuning::default())
    }
}

impl BeamController {
    pub fn new(tuning: BeamTuning) -> Self {
        let level = BEAM_LEVEL_MAX / 2;
        let mut ctrl = Self {
            tuning,
            mode: BeamMode::Off,
            level,
            angle: 0.0,
            fade: Crossfade { prev: BeamMode::Off, blend: 1.0 },
            smooth: [BeamShape::ZERO; BeamMode::COUNT],
            last_read: None,
            stats: BeamStats::default(),
        };
        for mode in BeamMode::ALL {
            ctrl.smooth[mode.index()] = ctrl.target_shape(mode);
        }
        ctrl
    }

    /* ---------- intents ---------- */

    pub fn mode(&self) -> BeamMode {
        self.mode
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn tuning(&self) -> &BeamTuning {
        &self.tuning
    }

    pub fn tuning_mut(&mut self) -> &mut BeamTuning {
        &mut self.tuning
    }

    pub fn stats(&self) -> BeamStats {
        self.stats
    }

    /// Jump to `mode`; any actual change starts a crossfade from the mode
    /// that was current.
    pub fn set_mode(&mut self, mode: BeamMode) {
        if mode == self.mode {
            return;
        }
        self.fade = Crossfade { prev: self.mode, blend: 0.0 };
        self.mode = mode;
    }

    /// unknown names leave the controller untouched
    pub fn set_mode_named(&mut self, name: &str) -> bool {
        match name.parse::<BeamMode>() {
            Ok(mode) => {
                self.set_mode(mode);
                true
            }
            Err(err) => {
                debug!("{err}, ignored");
                false
            }
        }
    }

    pub fn step_mode(&mut self, delta: i32) {
        let idx = (self.mode.index() as i32 + delta).clamp(0, BeamMode::COUNT as i32 - 1);
        self.set_mode(BeamMode::from_index(idx as usize));
    }

    pub fn mode_up(&mut self, steps: u32) {
        self.step_mode(steps.min(BeamMode::COUNT as u32) as i32);
    }

    pub fn mode_down(&mut self, steps: u32) {
        self.step_mode(-(steps.min(BeamMode::COUNT as u32) as i32));
    }

    pub fn set_level(&mut self, level: i32) {
        self.level = level.clamp(0, BEAM_LEVEL_MAX);
    }

    pub fn step_level(&mut self, delta: i32) {
        self.set_level(self.level.saturating_add(delta));
    }

    /* ---------- shapes ---------- */

    /// authoritative shape of `mode` at the current level
    pub fn target_shape(&self, mode: BeamMode) -> BeamShape {
        let (base, max) = SHAPES[mode.index()];
        BeamShape::lerp(base, max, self.level as f32 / BEAM_LEVEL_MAX as f32)
    }

    /// target shape of the current mode
    pub fn params(&self) -> BeamShape {
        self.target_shape(self.mode)
    }

    /// last smoothed shape of `mode`, without advancing time
    pub fn smooth_shape(&self, mode: BeamMode) -> BeamShape {
        self.smooth[mode.index()]
    }

    /// weights as of the last read
    pub fn weights(&self) -> BeamFrame {
        BeamFrame {
            active: ModeWeight { mode: self.mode, weight: self.fade.blend },
            fading: ModeWeight { mode: self.fade.prev, weight: 1.0 - self.fade.blend },
            dt: 0.0,
        }
    }

    /// Advance the crossfade and the smoothing to `now`.
    pub fn advance(&mut self, now: f64) -> BeamFrame {
        let dt = self
            .last_read
            .map_or(0.0, |prev| (now - prev).max(0.0) as f32);
        self.last_read = Some(now);

        if dt > 0.0 {
            self.fade.blend = if self.tuning.crossfade_secs > 0.0 {
                (self.fade.blend + dt / self.tuning.crossfade_secs).min(1.0)
            } else {
                1.0
            };

            // one‑pole low‑pass, cutoff → per‑step blend factor
            let alpha = 1.0 - (-TAU * self.tuning.smooth_cutoff_hz.max(0.0) * dt).exp();
            for mode in BeamMode::ALL {
                let target = self.target_shape(mode);
                let cur = self.smooth[mode.index()];
                self.smooth[mode.index()] = BeamShape::lerp(cur, target, alpha);
            }
        }

        BeamFrame { dt, ..self.weights() }
    }

    /// smoothed shape of the current mode at `now` (advances time)
    pub fn smooth_params(&mut self, now: f64) -> BeamShape {
        self.advance(now);
        self.smooth_shape(self.mode)
    }

    /* ---------- effect application ---------- */

    /// Stamp the fog along every weighted mode's geometry and apply lance
    /// damage. Returns the number of newly cleared fog tiles.
    pub fn raycast(
        &mut self,
        now: f64,
        origin: Vec2,
        angle: f32,
        field: &mut MiasmaField,
        store: &mut ChunkStore,
    ) -> usize {
        self.angle = angle;
        let frame = self.advance(now);
        self.stats = BeamStats::default();
        if frame.is_silent() {
            return 0;
        }

        let dir = Vec2::from_angle(angle);
        let mut stats = BeamStats::default();
        for mw in [frame.active, frame.fading] {
            let weight = mw.effective();
            if weight <= 0.0 {
                continue;
            }
            let shape = self.smooth[mw.mode.index()];
            stats.cleared += stamp_mode(field, &self.tuning, mw.mode, shape, weight, origin, dir, &mut stats.stamps);

            if mw.mode == BeamMode::Lance {
                let dmg = self.tuning.lance_dps * frame.dt * weight;
                let (hits, kills) = lance_damage(store, origin, dir, shape, dmg);
                stats.hits += hits;
                stats.kills += kills;
            }
        }

        self.stats = stats;
        stats.cleared
    }
}

/* ===========================================================
   geometry
   =========================================================== */
#[allow(clippy::too_many_arguments)]
fn stamp_mode(
    field: &mut MiasmaField,
    tuning: &BeamTuning,
    mode: BeamMode,
    shape: BeamShape,
    weight: f32,
    origin: Vec2,
    dir: Vec2,
    stamps: &mut usize,
) -> usize {
    let budget = (tuning.stamp_budget as f32 * weight).round() as usize;
    if budget == 0 {
        return 0;
    }
    let mut stamp = |at: Vec2, radius: f32| -> usize {
        if *stamps >= tuning.max_stamps || radius <= 0.0 {
            return 0;
        }
        *stamps += 1;
        field.clear_area(at, radius, budget)
    };

    match mode {
        BeamMode::Off => 0,
        BeamMode::Aura | BeamMode::Burst => stamp(origin, shape.radius),
        BeamMode::Cone => {
            let mut cleared = 0;
            let n = CONE_FAN_STAMPS.max(1);
            let tan = shape.spread.tan();
            for i in 1..=n {
                let d = shape.length * i as f32 / n as f32;
                cleared += stamp(origin + dir * d, shape.radius.max(d * tan));
            }
            cleared
        }
        BeamMode::Lance => {
            let mut cleared = 0;
            let w = shape.thickness;
            let spacing = w.max(2.0);
            let steps = (shape.length / spacing).floor() as usize;
            let perp = dir.perp();
            for i in 0..=steps {
                let p = origin + dir * (i as f32 * spacing);
                cleared += stamp(p, w);
                // halo, every third step, staggered sides
                if i % 3 == 0 {
                    let side = if i % 6 == 0 { 1.0 } else { -1.0 };
                    cleared += stamp(p + perp * side * w * 1.6, w * 0.6);
                }
            }
            // tip flare
            cleared += stamp(origin + dir * shape.length, w * 1.5);
            cleared
        }
    }
}

/// returns `(hits, kills)`
fn lance_damage(
    store: &mut ChunkStore,
    origin: Vec2,
    dir: Vec2,
    shape: BeamShape,
    damage: f32,
) -> (usize, usize) {
    if damage <= 0.0 || shape.length <= 0.0 {
        return (0, 0);
    }
    let end = origin + dir * shape.length;
    let pad = Vec2::splat(shape.thickness + MAX_ENEMY_RADIUS);
    let (min, max) = (origin.min(end) - pad, origin.max(end) + pad);

    let mut hits = 0;
    store.for_each_in_region_mut(min, max, |enemy| {
        let rel = enemy.pos - origin;
        let along = rel.dot(dir);
        if along < 0.0 || along > shape.length {
            return;
        }
        if rel.perp_dot(dir).abs() > shape.thickness + enemy.radius {
            return;
        }
        enemy.health = (enemy.health - damage).max(0.0);
        hits += 1;
    });
    let kills = store.reap_dead_in_region(min, max);
    (hits, kills)
}

/* ===========================================================
   bevy glue
   =========================================================== */
/// discrete pointer/keyboard intents
#[derive(Event, Clone, Debug, PartialEq)]
pub enum BeamIntent {
    StepMode(i32),
    SetMode(String),
    StepLevel(i32),
    SetLevel(i32),
}

/// where the beam starts and points, written by the player systems
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct BeamAim {
    pub origin: Vec2,
    pub angle: f32,
}

pub fn apply_beam_intents_system(
    mut intents: EventReader<BeamIntent>,
    mut beam: ResMut<BeamController>,
) {
    for intent in intents.read() {
        match intent {
            BeamIntent::StepMode(d)  => beam.step_mode(*d),
            BeamIntent::SetMode(name) => {
                beam.set_mode_named(name);
            }
            BeamIntent::StepLevel(d) => beam.step_level(*d),
            BeamIntent::SetLevel(l)  => beam.set_level(*l),
        }
    }
}

pub fn beam_raycast_system(
    time: Res<Time>,
    aim: Res<BeamAim>,
    mut beam: ResMut<BeamController>,
    mut field: ResMut<MiasmaField>,
    mut store: ResMut<ChunkStore>,
) {
    beam.raycast(
        time.elapsed_secs_f64(),
        aim.origin,
        aim.angle,
        &mut field,
        &mut store,
    );
}
