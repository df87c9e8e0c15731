//! miasma – the fog‑of‑war field
//!
//! The world is fog everywhere except the tiles held in a sparse *cleared*
//! set. Keys are relative to a moving origin `(ox, oy)`, so the addressable
//! window is always `cols × rows` (viewport + pad) no matter where the camera
//! is. Memory follows the cleared area, not the world size.
//!
//! Per tick the field
//! 1. follows the focus by whole‑tile origin shifts (sub‑tile motion is
//!    accumulated, entries are re‑keyed so their absolute tile never moves),
//! 2. lets old, fog‑adjacent cleared tiles regrow, under its own budget.
//!
//! Clearing (`clear_area`) is budgeted per call and clamped by a global
//! ceiling, so one huge stamp can never turn into unbounded work.

use bevy::prelude::*;
use bevy::utils::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Focus, ViewSize};
use crate::constants::*;
use crate::coords::world_to_tile;

const NEIGHBORS: [IVec2; 4] = [IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Result of a fog query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FogSample {
    Clear,
    Fog,
}

impl FogSample {
    #[inline]
    pub fn density(self) -> f32 {
        match self {
            FogSample::Clear => 0.0,
            FogSample::Fog   => 1.0,
        }
    }

    #[inline]
    pub fn is_fog(self) -> bool {
        self == FogSample::Fog
    }
}

/* ===========================================================
   tunables
   =========================================================== */
#[derive(Clone, Debug, PartialEq)]
pub struct MiasmaConfig {
    /// world units per fog tile
    pub tile_size: f32,
    /// grid margin (tiles) beyond the view on every side
    pub pad: i32,
    /// margin (tiles) beyond the view that gets holes drawn
    pub draw_pad: i32,
    /// margin (tiles) beyond the view that may regrow
    pub regrow_pad: i32,
    /// seconds a tile stays clear before it may regrow
    pub regrow_delay: f32,
    pub regrow_chance: f32,
    /// multiplier on `regrow_chance`
    pub regrow_speed: f32,
    /// max tiles regrown per tick
    pub regrow_budget: usize,
    /// max tiles newly cleared by one `clear_area` call
    pub clear_budget_ceiling: usize,
    pub max_draw_holes: usize,
    pub seed: u64,
}

impl Default for MiasmaConfig {
    fn default() -> Self {
        Self {
            tile_size: MIASMA_TILE_SIZE,
            pad: MIASMA_PAD,
            draw_pad: MIASMA_DRAW_PAD,
            regrow_pad: MIASMA_REGROW_PAD,
            regrow_delay: REGROW_DELAY,
            regrow_chance: REGROW_CHANCE,
            regrow_speed: REGROW_SPEED,
            regrow_budget: REGROW_BUDGET,
            clear_budget_ceiling: CLEAR_BUDGET_CEILING,
            max_draw_holes: MAX_DRAW_HOLES,
            seed: DEFAULT_SEED,
        }
    }
}

/// one frame's worth of holes to punch into the fog overlay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoleBatch {
    pub drawn: usize,
    pub deferred: usize,
    /// pass back as `start` next frame so deferred holes get their turn
    pub next_start: usize,
}

/* ===========================================================
   resource
   =========================================================== */
#[derive(Resource)]
pub struct MiasmaField {
    config: MiasmaConfig,
    cols: i32,
    rows: i32,
    origin: IVec2,
    acc: Vec2,
    time: f32,
    view: Vec2,
    /// relative tile → time it was (last) cleared
    cleared: HashMap<IVec2, f32>,
    rng: StdRng,
    cleared_this_tick: usize,
    last_regrow: usize,
    rekey_scratch: Vec<(IVec2, f32)>,
    regrow_scratch: Vec<IVec2>,
}

impl MiasmaField {
    /// Empty field; the first `update` sizes it to the viewport.
    pub fn new(config: MiasmaConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            cols: 0,
            rows: 0,
            origin: IVec2::ZERO,
            acc: Vec2::ZERO,
            time: 0.0,
            view: Vec2::ZERO,
            cleared: HashMap::default(),
            rng,
            cleared_this_tick: 0,
            last_regrow: 0,
            rekey_scratch: Vec::new(),
            regrow_scratch: Vec::new(),
        }
    }

    pub fn with_view(config: MiasmaConfig, view: Vec2, center: Vec2) -> Self {
        let mut field = Self::new(config);
        field.init(view, center);
        field
    }

    /// (Re)size the grid to `view` and centre it on `center`. Destructive:
    /// every cleared tile is forgotten and the clock restarts.
    pub fn init(&mut self, view: Vec2, center: Vec2) {
        let ts = self.config.tile_size;
        let pad = self.config.pad.max(0);
        self.view = view;
        self.cols = (view.x.max(0.0) / ts).ceil() as i32 + 2 * pad;
        self.rows = (view.y.max(0.0) / ts).ceil() as i32 + 2 * pad;
        self.origin = self.centered_origin(center);
        self.acc = Vec2::ZERO;
        self.time = 0.0;
        self.cleared.clear();
        self.cleared_this_tick = 0;
        self.last_regrow = 0;
    }

    /* ---------- read accessors ---------- */

    pub fn config(&self) -> &MiasmaConfig {
        &self.config
    }

    /// runtime overrides (regrow tuning, budgets); grid geometry changes
    /// only take effect on the next `init`
    pub fn config_mut(&mut self) -> &mut MiasmaConfig {
        &mut self.config
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.config.tile_size
    }

    /// absolute tile that relative `(0, 0)` maps to
    #[inline]
    pub fn origin(&self) -> IVec2 {
        self.origin
    }

    pub fn dims(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn cleared_len(&self) -> usize {
        self.cleared.len()
    }

    pub fn cleared_this_tick(&self) -> usize {
        self.cleared_this_tick
    }

    pub fn last_regrow(&self) -> usize {
        self.last_regrow
    }

    /// absolute tiles currently clear
    pub fn cleared_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        let origin = self.origin;
        self.cleared.keys().map(move |&rel| rel.saturating_add(origin))
    }

    #[inline]
    pub fn world_to_tile(&self, world: Vec2) -> IVec2 {
        let ts = self.config.tile_size;
        IVec2::new(world_to_tile(world.x, ts), world_to_tile(world.y, ts))
    }

    /// fog state of an absolute fog tile
    #[inline]
    pub fn sample_tile(&self, abs: IVec2) -> FogSample {
        let (Some(x), Some(y)) = (
            abs.x.checked_sub(self.origin.x),
            abs.y.checked_sub(self.origin.y),
        ) else {
            return FogSample::Fog;
        };
        let rel = IVec2::new(x, y);
        if self.in_grid(rel) && self.cleared.contains_key(&rel) {
            FogSample::Clear
        } else {
            FogSample::Fog
        }
    }

    #[inline]
    pub fn sample(&self, world: Vec2) -> FogSample {
        self.sample_tile(self.world_to_tile(world))
    }

    /* ---------- clearing ---------- */

    /// Clear every tile whose centre lies inside the circle, spending one
    /// unit of `budget` per newly cleared tile. Tiles already clear cost
    /// nothing and only get their timestamp refreshed. Returns the number of
    /// newly cleared tiles.
    pub fn clear_area(&mut self, world: Vec2, radius: f32, budget: usize) -> usize {
        if !(radius > 0.0) || budget == 0 {
            return 0;
        }
        let mut budget = budget.min(self.config.clear_budget_ceiling);
        let ts = self.config.tile_size;
        let c = world / ts;
        let r = radius / ts;
        let r2 = r * r;

        // scan only the part of the circle's box that lies on the grid
        if self.cols <= 0 || self.rows <= 0 {
            return 0;
        }
        let grid_hi = self.origin.saturating_add(IVec2::new(self.cols - 1, self.rows - 1));
        let min = IVec2::new((c.x - r).floor() as i32, (c.y - r).floor() as i32).max(self.origin);
        let max = IVec2::new((c.x + r).ceil() as i32, (c.y + r).ceil() as i32).min(grid_hi);
        if min.x > max.x || min.y > max.y {
            return 0;
        }

        let mut fresh = 0;
        'scan: for ty in min.y..=max.y {
            let dy = ty as f32 + 0.5 - c.y;
            if dy * dy > r2 {
                continue;
            }
            for tx in min.x..=max.x {
                let dx = tx as f32 + 0.5 - c.x;
                if dx * dx + dy * dy > r2 {
                    continue;
                }
                let rel = IVec2::new(tx, ty) - self.origin;
                if !self.in_grid(rel) {
                    continue;
                }
                if let Some(at) = self.cleared.get_mut(&rel) {
                    *at = self.time;
                    continue;
                }
                if budget == 0 {
                    break 'scan;
                }
                self.cleared.insert(rel, self.time);
                budget -= 1;
                fresh += 1;
            }
        }
        self.cleared_this_tick += fresh;
        fresh
    }

    /* ---------- per‑tick update ---------- */

    pub fn update(&mut self, dt: f32, center: Vec2, motion: Vec2, view: Vec2) {
        self.time += dt.max(0.0);
        self.cleared_this_tick = 0;

        if view != self.view {
            info!(
                "miasma grid resized to {}x{} view, cleared history dropped",
                view.x, view.y
            );
            self.init(view, center);
            return;
        }

        /* fractional motion → whole‑tile shifts ----------------------------- */
        self.acc += motion / self.config.tile_size;
        let whole = self.acc.trunc();
        self.acc -= whole;
        let mut shift = whole.as_ivec2();

        /* resync after a jump the motion didn't report --------------------- */
        let drift = self
            .centered_origin(center)
            .saturating_sub(self.origin.saturating_add(shift));
        let pad = self.config.pad.max(0) as u32;
        if drift.x.unsigned_abs() > pad {
            shift.x = shift.x.saturating_add(drift.x);
        }
        if drift.y.unsigned_abs() > pad {
            shift.y = shift.y.saturating_add(drift.y);
        }
        self.shift_origin(shift);

        self.regrow(center);
    }

    /// Move the origin by `shift` tiles, re‑keying entries so their absolute
    /// tile is unchanged. Entries leaving the grid are dropped.
    pub fn shift_origin(&mut self, shift: IVec2) {
        if shift == IVec2::ZERO {
            return;
        }
        let prev = self.origin;
        self.origin = prev.saturating_add(shift);
        let shift = self.origin - prev;
        let (cols, rows) = (self.cols, self.rows);
        if shift.x.unsigned_abs() >= cols.max(0) as u32
            || shift.y.unsigned_abs() >= rows.max(0) as u32
        {
            self.cleared.clear(); // shifted past the whole grid
            return;
        }

        let mut scratch = std::mem::take(&mut self.rekey_scratch);
        scratch.extend(self.cleared.drain());
        for (rel, at) in scratch.drain(..) {
            let moved = rel - shift;
            if in_grid(moved, cols, rows) {
                self.cleared.insert(moved, at);
            }
        }
        self.rekey_scratch = scratch;
    }

    fn regrow(&mut self, center: Vec2) {
        self.last_regrow = 0;
        let chance = (self.config.regrow_chance * self.config.regrow_speed).clamp(0.0, 1.0);
        let budget = self.config.regrow_budget;
        if chance <= 0.0 || budget == 0 || self.cleared.is_empty() {
            return;
        }

        let half = self.view * 0.5;
        let pad = IVec2::splat(self.config.regrow_pad.max(0));
        let lo = self.world_to_tile(center - half).saturating_sub(pad);
        let hi = self.world_to_tile(center + half).saturating_add(pad);
        let delay = self.config.regrow_delay.max(0.0);
        let origin = self.origin;
        let now = self.time;

        let mut marked = std::mem::take(&mut self.regrow_scratch);
        marked.clear();
        for (&rel, &at) in &self.cleared {
            if marked.len() >= budget {
                break;
            }
            let abs = rel.saturating_add(origin);
            if abs.cmplt(lo).any() || abs.cmpgt(hi).any() {
                continue;
            }
            if now - at < delay {
                continue;
            }
            let fog_adjacent = NEIGHBORS
                .iter()
                .any(|&d| !self.cleared.contains_key(&(rel + d)));
            if !fog_adjacent {
                continue;
            }
            if self.rng.gen::<f32>() < chance {
                marked.push(rel);
            }
        }

        // removal after the scan: adjacency above saw one consistent snapshot
        for rel in &marked {
            self.cleared.remove(rel);
        }
        self.last_regrow = marked.len();
        self.regrow_scratch = marked;
    }

    /* ---------- drawing contract ---------- */

    /// Absolute tiles to punch out of a fully fogged `view_min..view_max`
    /// rect (+ draw pad), at most `max_draw_holes` of them. Candidates beyond
    /// the cap are deferred; feeding `next_start` back in rotates through them.
    pub fn visible_holes(
        &self,
        view_min: Vec2,
        view_max: Vec2,
        start: usize,
        out: &mut Vec<IVec2>,
    ) -> HoleBatch {
        out.clear();
        let pad = IVec2::splat(self.config.draw_pad.max(0));
        let lo = self.world_to_tile(view_min.min(view_max)).saturating_sub(pad);
        let hi = self.world_to_tile(view_min.max(view_max)).saturating_add(pad);
        let origin = self.origin;
        let in_view = |rel: &&IVec2| {
            let abs = rel.saturating_add(origin);
            abs.cmpge(lo).all() && abs.cmple(hi).all()
        };

        let total = self.cleared.keys().filter(in_view).count();
        if total == 0 {
            return HoleBatch::default();
        }
        let cap = self.config.max_draw_holes.min(total);
        let first = start % total;
        for (i, rel) in self.cleared.keys().filter(in_view).enumerate() {
            if (i + total - first) % total < cap {
                out.push(rel.saturating_add(origin));
            }
        }
        HoleBatch {
            drawn: out.len(),
            deferred: total - out.len(),
            next_start: (first + cap) % total,
        }
    }

    /* ---------- helpers ---------- */

    fn centered_origin(&self, center: Vec2) -> IVec2 {
        self.world_to_tile(center)
            .saturating_sub(IVec2::new(self.cols / 2, self.rows / 2))
    }

    #[inline]
    fn in_grid(&self, rel: IVec2) -> bool {
        in_grid(rel, self.cols, self.rows)
    }
}

impl Default for MiasmaField {
    fn default() -> Self {
        MiasmaField::new(MiasmaConfig::default())
    }
}

#[inline]
fn in_grid(rel: IVec2, cols: i32, rows: i32) -> bool {
    rel.x >= 0 && rel.y >= 0 && rel.x < cols && rel.y < rows
}

/* ===========================================================
   advance_miasma_system
   =========================================================== */
pub fn advance_miasma_system(
    time: Res<Time>,
    focus: Res<Focus>,
    view: Res<ViewSize>,
    mut field: ResMut<MiasmaField>,
    mut last_focus: Local<Option<Vec2>>,
) {
    let motion = last_focus.map_or(Vec2::ZERO, |prev| focus.0 - prev);
    *last_focus = Some(focus.0);
    field.update(time.delta_secs(), focus.0, motion, view.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Vec2 = Vec2::new(800.0, 600.0);

    fn config() -> MiasmaConfig {
        MiasmaConfig {
            tile_size: 4.0,
            pad: 8,
            ..MiasmaConfig::default()
        }
    }

    fn field() -> MiasmaField {
        MiasmaField::with_view(config(), VIEW, Vec2::ZERO)
    }

    #[test]
    fn grid_is_view_plus_pad_and_centred() {
        let f = field();
        assert_eq!(f.dims(), (200 + 16, 150 + 16));
        assert_eq!(f.origin(), IVec2::new(-108, -83));
        assert_eq!(f.time(), 0.0);
    }

    #[test]
    fn fog_is_the_default() {
        let f = field();
        assert_eq!(f.sample(Vec2::new(3.0, -7.0)), FogSample::Fog);
        assert_eq!(f.sample(Vec2::new(1e6, 1e6)).density(), 1.0);
    }

    #[test]
    fn clearing_is_idempotent() {
        let mut f = field();
        let first = f.clear_area(Vec2::new(10.0, 10.0), 20.0, 999);
        assert!(first > 0);
        assert_eq!(f.clear_area(Vec2::new(10.0, 10.0), 20.0, 999), 0);
        assert_eq!(f.cleared_len(), first);
        assert_eq!(f.sample(Vec2::new(10.0, 10.0)), FogSample::Clear);
    }

    #[test]
    fn disc_of_radius_twelve_clears_thirty_two_tiles() {
        let mut f = field();
        assert_eq!(f.clear_area(Vec2::ZERO, 12.0, 999), 32);
        // (0.5, 0.5)·4 is inside, (3.5, 0.5)·4 = 14 units out is not
        assert!(f.sample_tile(IVec2::new(0, 0)) == FogSample::Clear);
        assert!(f.sample_tile(IVec2::new(-3, -1)) == FogSample::Clear);
        assert!(f.sample_tile(IVec2::new(3, 0)) == FogSample::Fog);
        assert!(f.sample_tile(IVec2::new(2, 2)) == FogSample::Fog);
    }

    #[test]
    fn budget_and_ceiling_bound_each_call() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                clear_budget_ceiling: 50,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        assert_eq!(f.clear_area(Vec2::ZERO, 200.0, 10), 10);
        assert_eq!(f.clear_area(Vec2::ZERO, 200.0, 10_000), 50);
        assert_eq!(f.cleared_len(), 60);
    }

    #[test]
    fn degenerate_stamps_do_nothing() {
        let mut f = field();
        assert_eq!(f.clear_area(Vec2::ZERO, 0.0, 100), 0);
        assert_eq!(f.clear_area(Vec2::ZERO, -5.0, 100), 0);
        assert_eq!(f.clear_area(Vec2::ZERO, f32::NAN, 100), 0);
        assert_eq!(f.clear_area(Vec2::ZERO, 30.0, 0), 0);
        assert_eq!(f.cleared_len(), 0);
    }

    #[test]
    fn clearing_outside_the_grid_is_ignored() {
        let mut f = field();
        assert_eq!(f.clear_area(Vec2::new(5000.0, 0.0), 12.0, 999), 0);
    }

    #[test]
    fn huge_stamps_touch_only_the_grid() {
        let unbounded = MiasmaConfig {
            clear_budget_ceiling: usize::MAX,
            ..config()
        };
        let (cols, rows) = field().dims();
        let whole = (cols * rows) as usize;

        let mut f = MiasmaField::with_view(unbounded.clone(), VIEW, Vec2::ZERO);
        assert_eq!(f.clear_area(Vec2::ZERO, 64_000.0, usize::MAX), whole);
        assert_eq!(f.clear_area(Vec2::ZERO, 64_000.0, usize::MAX), 0);

        let mut f = MiasmaField::with_view(unbounded, VIEW, Vec2::ZERO);
        assert_eq!(f.clear_area(Vec2::splat(4000.0), 1.0e10, usize::MAX), whole);

        let mut f = field();
        assert_eq!(f.clear_area(Vec2::ZERO, 1.0e10, 10), 10);
        assert_eq!(f.clear_area(Vec2::splat(1.0e12), 12.0, 999), 0);
    }

    #[test]
    fn extreme_positions_read_as_fog() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);
        assert_eq!(f.sample(Vec2::new(1.0e12, 0.0)), FogSample::Fog);
        assert_eq!(f.sample(Vec2::splat(-1.0e12)), FogSample::Fog);
        assert_eq!(f.sample_tile(IVec2::MAX), FogSample::Fog);
        assert_eq!(f.sample_tile(IVec2::MIN), FogSample::Fog);
    }

    #[test]
    fn saturated_origin_survives_the_round_trip() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);

        let far = Vec2::splat(1.0e12);
        f.update(0.1, far, far, VIEW);
        assert_eq!(f.cleared_len(), 0);
        assert_eq!(f.clear_area(far, 12.0, 999), 0);
        assert_eq!(f.sample_tile(IVec2::MIN), FogSample::Fog);
        let mut holes = Vec::new();
        f.visible_holes(far - VIEW * 0.5, far + VIEW * 0.5, 0, &mut holes);

        f.update(0.1, Vec2::ZERO, -far, VIEW);
        assert_eq!(f.clear_area(Vec2::ZERO, 12.0, 999), 32);
        assert_eq!(f.sample_tile(IVec2::ZERO), FogSample::Clear);
    }

    #[test]
    fn sub_tile_motion_accumulates_into_one_shift() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);
        let before: Vec<IVec2> = {
            let mut v: Vec<_> = f.cleared_tiles().collect();
            v.sort_by_key(|t| (t.x, t.y));
            v
        };
        let origin = f.origin();

        let mut center = Vec2::ZERO;
        for _ in 0..3 {
            center.x += 1.0;
            f.update(0.0, center, Vec2::new(1.0, 0.0), VIEW);
            assert_eq!(f.origin(), origin);
        }
        center.x += 1.0;
        f.update(0.0, center, Vec2::new(1.0, 0.0), VIEW);
        assert_eq!(f.origin(), origin + IVec2::X);

        let mut after: Vec<_> = f.cleared_tiles().collect();
        after.sort_by_key(|t| (t.x, t.y));
        assert_eq!(before, after);
        // relative key moved by −1
        assert_eq!(f.sample_tile(IVec2::ZERO), FogSample::Clear);
    }

    #[test]
    fn negative_motion_shifts_back() {
        let mut f = field();
        let origin = f.origin();
        f.update(0.0, Vec2::new(0.0, -6.0), Vec2::new(0.0, -6.0), VIEW);
        assert_eq!(f.origin(), origin - IVec2::Y);
        f.update(0.0, Vec2::new(0.0, -8.0), Vec2::new(0.0, -2.0), VIEW);
        assert_eq!(f.origin(), origin - IVec2::Y * 2);
    }

    #[test]
    fn unreported_jump_recentres_and_forgets_far_tiles() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);
        let far = Vec2::new(4000.0, 0.0);
        f.update(0.0, far, Vec2::ZERO, VIEW);
        assert_eq!(f.origin(), IVec2::new(1000 - 108, -83));
        assert_eq!(f.cleared_len(), 0);
    }

    #[test]
    fn resize_reinitialises() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);
        f.update(1.0, Vec2::ZERO, Vec2::ZERO, Vec2::new(400.0, 300.0));
        assert_eq!(f.cleared_len(), 0);
        assert_eq!(f.time(), 0.0);
        assert_eq!(f.dims(), (100 + 16, 75 + 16));
    }

    #[test]
    fn nothing_regrows_before_the_delay() {
        for &delay in &[0.0_f32, 0.25, 1.0, 3.0] {
            let mut f = MiasmaField::with_view(
                MiasmaConfig {
                    regrow_delay: delay,
                    regrow_chance: 1.0,
                    regrow_budget: 10_000,
                    ..config()
                },
                VIEW,
                Vec2::ZERO,
            );
            f.update(0.5, Vec2::ZERO, Vec2::ZERO, VIEW);
            let cleared_at = f.time();
            f.clear_area(Vec2::ZERO, 12.0, 999);
            loop {
                f.update(0.125, Vec2::ZERO, Vec2::ZERO, VIEW);
                if f.time() - cleared_at < delay {
                    assert_eq!(f.cleared_len(), 32, "delay {delay}");
                } else {
                    assert!(f.cleared_len() < 32, "delay {delay}");
                    break;
                }
            }
        }
    }

    #[test]
    fn regrowth_peels_only_the_fog_facing_ring() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                regrow_delay: 1.0,
                regrow_chance: 1.0,
                regrow_budget: 10_000,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        f.clear_area(Vec2::ZERO, 12.0, 999);
        f.update(1.0, Vec2::ZERO, Vec2::ZERO, VIEW);
        assert_eq!(f.last_regrow(), 16);
        assert_eq!(f.cleared_len(), 16);
    }

    #[test]
    fn regrowth_respects_its_budget() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                regrow_delay: 0.0,
                regrow_chance: 1.0,
                regrow_budget: 5,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        f.clear_area(Vec2::ZERO, 12.0, 999);
        f.update(0.1, Vec2::ZERO, Vec2::ZERO, VIEW);
        assert_eq!(f.last_regrow(), 5);
        assert_eq!(f.cleared_len(), 27);
    }

    #[test]
    fn zero_chance_never_regrows() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                regrow_delay: 0.0,
                regrow_chance: 0.0,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        f.clear_area(Vec2::ZERO, 12.0, 999);
        for _ in 0..20 {
            f.update(1.0, Vec2::ZERO, Vec2::ZERO, VIEW);
        }
        assert_eq!(f.cleared_len(), 32);
    }

    #[test]
    fn tiles_beyond_the_regrow_window_hold() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                regrow_delay: 0.0,
                regrow_chance: 1.0,
                regrow_pad: 2,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        // view spans tiles −100..=100 on x; tile 105 is in the grid (pad 8)
        // but outside view + regrow pad
        let edge = Vec2::new(105.5 * 4.0, 2.0);
        assert_eq!(f.clear_area(edge, 1.0, 10), 1);
        for _ in 0..5 {
            f.update(1.0, Vec2::ZERO, Vec2::ZERO, VIEW);
        }
        assert_eq!(f.sample(edge), FogSample::Clear);
    }

    #[test]
    fn draw_holes_are_capped_and_rotate() {
        let mut f = MiasmaField::with_view(
            MiasmaConfig {
                max_draw_holes: 10,
                ..config()
            },
            VIEW,
            Vec2::ZERO,
        );
        f.clear_area(Vec2::ZERO, 12.0, 999);
        let (min, max) = (-VIEW * 0.5, VIEW * 0.5);

        let mut out = Vec::new();
        let mut seen = bevy::utils::HashSet::default();
        let mut start = 0;
        for _ in 0..4 {
            let batch = f.visible_holes(min, max, start, &mut out);
            assert_eq!(batch.drawn, 10);
            assert_eq!(batch.deferred, 22);
            seen.extend(out.iter().copied());
            start = batch.next_start;
        }
        assert_eq!(seen.len(), 32);
    }

    #[test]
    fn draw_holes_skip_offscreen_tiles() {
        let mut f = field();
        f.clear_area(Vec2::ZERO, 12.0, 999);
        let mut out = Vec::new();
        let batch = f.visible_holes(Vec2::new(100.0, 100.0), Vec2::new(200.0, 200.0), 0, &mut out);
        assert_eq!(batch, HoleBatch::default());
        assert!(out.is_empty());
    }
}
