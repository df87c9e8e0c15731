//! chunk streaming around a moving focus
//!
//! Keeps every chunk within a Chebyshev radius of the focus chunk resident,
//! generates at most `gen_budget` new chunks per tick (the rest wait in a
//! FIFO queue) and evicts whatever falls outside the window.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy::utils::HashSet;

use crate::components::Focus;
use crate::constants::{CHUNK_GEN_BUDGET, STREAM_RADIUS};
use crate::coords::{world_to_chunk, ChunkCoord};
use crate::terrain::ChunkStore;
use crate::world_gen::{ChunkSource, WorldGen};

/* ===========================================================
   events
   =========================================================== */
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkEntered(pub ChunkCoord);

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkExited(pub ChunkCoord);

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkGenerated(pub ChunkCoord);

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkEvicted(pub ChunkCoord);

/// focus‑chunk change, in emission order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkTransition {
    Exit(ChunkCoord),
    Enter(ChunkCoord),
}

/* ===========================================================
   streamer
   =========================================================== */
#[derive(Clone, Copy, Debug)]
pub struct StreamConfig {
    pub radius: i32,
    pub gen_budget: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            radius: STREAM_RADIUS,
            gen_budget: CHUNK_GEN_BUDGET,
        }
    }
}

/// What one `stream_around` call did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamReport {
    pub loaded: Vec<ChunkCoord>,
    pub generated: Vec<ChunkCoord>,
    pub evicted: Vec<ChunkCoord>,
    pub transitions: Vec<ChunkTransition>,
}

#[derive(Resource, Default)]
pub struct ChunkStreamer {
    config: StreamConfig,
    loaded: HashSet<ChunkCoord>,
    pending: VecDeque<ChunkCoord>,
    queued: HashSet<ChunkCoord>,
    current: Option<ChunkCoord>,
    needed: HashSet<ChunkCoord>,
}

impl ChunkStreamer {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    pub fn current_chunk(&self) -> Option<ChunkCoord> {
        self.current
    }

    pub fn is_loaded(&self, c: ChunkCoord) -> bool {
        self.loaded.contains(&c)
    }

    pub fn loaded(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.loaded.iter().copied()
    }

    pub fn loaded_len(&self) -> usize {
        self.loaded.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn stream_around<S: ChunkSource + ?Sized>(
        &mut self,
        focus: Vec2,
        store: &mut ChunkStore,
        source: &mut S,
    ) -> StreamReport {
        let mut report = StreamReport::default();
        let center = world_to_chunk(focus);
        let r = self.config.radius.max(0);

        /* needed window (square) ------------------------------------------- */
        self.needed.clear();
        for cy in center.y - r..=center.y + r {
            for cx in center.x - r..=center.x + r {
                self.needed.insert(ChunkCoord::new(cx, cy));
            }
        }

        /* enqueue missing, FIFO, never twice ---------------------------------- */
        for cy in center.y - r..=center.y + r {
            for cx in center.x - r..=center.x + r {
                let c = ChunkCoord::new(cx, cy);
                if !self.loaded.contains(&c) && self.queued.insert(c) {
                    self.pending.push_back(c);
                }
            }
        }

        /* evict out‑of‑window --------------------------------------------------- */
        let stale: Vec<ChunkCoord> = self
            .loaded
            .iter()
            .filter(|c| !self.needed.contains(*c))
            .copied()
            .collect();
        for c in stale {
            if let Some(data) = store.get_chunk(c) {
                source.evict(c, data);
            }
            store.delete_chunk(c);
            self.loaded.remove(&c);
            report.evicted.push(c);
        }

        /* drain the queue within budget ----------------------------------------- */
        let mut budget = self.config.gen_budget;
        while budget > 0 {
            let Some(c) = self.pending.pop_front() else { break };
            self.queued.remove(&c);
            if !self.needed.contains(&c) {
                continue; // left the window while waiting
            }
            store.set_chunk(c, source.generate(c));
            self.loaded.insert(c);
            report.generated.push(c);
            budget -= 1;
        }

        /* focus‑chunk transitions --------------------------------------------- */
        if self.current != Some(center) {
            if let Some(prev) = self.current {
                report.transitions.push(ChunkTransition::Exit(prev));
            }
            report.transitions.push(ChunkTransition::Enter(center));
            self.current = Some(center);
        }

        report.loaded.extend(self.loaded.iter().copied());
        report
    }
}

/* ===========================================================
   stream_chunks_system
   =========================================================== */
#[allow(clippy::too_many_arguments)]
pub fn stream_chunks_system(
    focus: Res<Focus>,
    mut streamer: ResMut<ChunkStreamer>,
    mut store: ResMut<ChunkStore>,
    mut world_gen: ResMut<WorldGen>,
    mut entered: EventWriter<ChunkEntered>,
    mut exited: EventWriter<ChunkExited>,
    mut generated: EventWriter<ChunkGenerated>,
    mut evicted: EventWriter<ChunkEvicted>,
) {
    let report = streamer.stream_around(focus.0, &mut store, &mut *world_gen);

    for &c in &report.evicted {
        trace!("chunk ({}, {}) evicted", c.x, c.y);
        evicted.send(ChunkEvicted(c));
    }
    for &c in &report.generated {
        trace!("chunk ({}, {}) generated", c.x, c.y);
        generated.send(ChunkGenerated(c));
    }
    for t in report.transitions {
        match t {
            ChunkTransition::Exit(c) => {
                debug!("left chunk ({}, {})", c.x, c.y);
                exited.send(ChunkExited(c));
            }
            ChunkTransition::Enter(c) => {
                debug!("entered chunk ({}, {})", c.x, c.y);
                entered.send(ChunkEntered(c));
            }
        }
    }
}
