//! Concurrent greedy placement.
//!
//! Each worker claims an unfinished tile, scores every template variant at the
//! tile's darkest cell (or at every cell, in high precision mode), commits the best
//! one and repeats until the tile is done. A monitor stops all workers once the
//! global darkness has not changed for the stagnation timeout.

use {
  super::Solver,
  crate::{
    geometry::{Point, Shape},
    grid::Coverage,
  },
  rand::{Rng, SeedableRng},
  rand_pcg::Pcg64,
  std::{
    collections::BTreeSet,
    sync::{Mutex, MutexGuard, PoisonError, atomic::{AtomicBool, AtomicUsize, Ordering}},
    thread,
    time::{Duration, Instant},
  },
};

const MONITOR_POLL: Duration = Duration::from_millis(10);
/// Pause before a worker re-claims after a tile without candidates.
const STUCK_BACKOFF: Duration = Duration::from_millis(10);

/// State shared by the workers and the monitor of one placement run.
#[derive(Debug, Default)]
pub(crate) struct RunContext {
  /// Set by the monitor, checked by workers between candidates.
  stop: AtomicBool,
  placed: AtomicUsize,
  active_workers: AtomicUsize,
  /// Tiles already reported as having no crossing candidate.
  stuck: Mutex<BTreeSet<usize>>,
}

impl RunContext {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub(crate) fn stopped(&self) -> bool {
    self.stop.load(Ordering::Relaxed)
  }

  pub(crate) fn placed(&self) -> usize {
    self.placed.load(Ordering::Relaxed)
  }

  /// Record `tile` as stuck. True only the first time in this run.
  pub(crate) fn mark_stuck(&self, tile: usize) -> bool {
    self.stuck.lock().unwrap_or_else(PoisonError::into_inner).insert(tile)
  }

  pub(crate) fn stuck_tiles(&self) -> Vec<usize> {
    self.stuck.lock().unwrap_or_else(PoisonError::into_inner).iter().copied().collect()
  }
}

/// Decrements the active worker count when a worker leaves, even by panic.
struct ActiveWorker<'a>(&'a AtomicUsize);

impl Drop for ActiveWorker<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::AcqRel);
  }
}

/// Best scoring candidate, with the cells it crosses.
pub(super) struct Candidate {
  pub shape: Shape,
  pub coverage: Coverage,
}

impl Solver {
  /// Fill unfinished tiles until all are done or placement stagnates.
  /// Returns how many shapes were placed.
  pub fn place(&mut self) -> usize {
    self.place_with(&RunContext::new())
  }

  pub(super) fn place_with(&mut self, context: &RunContext) -> usize {
    let _span = tracing::info_span!("placement").entered();
    let workers = self.config.workers;
    let seeds: Vec<u64> = (0..workers).map(|_| self.rng.gen()).collect();
    context.active_workers.store(workers, Ordering::Release);
    let this = &*self;

    thread::scope(|scope| {
      for seed in seeds {
        scope.spawn(move || {
          let _active = ActiveWorker(&context.active_workers);
          this.work(context, &mut Pcg64::seed_from_u64(seed));
        });
      }
      this.monitor(context);
    });

    let stuck = context.stuck_tiles();
    if !stuck.is_empty() {
      tracing::info!(?stuck, "tiles left without any crossing candidate");
    }
    context.placed()
  }

  fn work(&self, context: &RunContext, rng: &mut Pcg64) {
    let mut current = self.claim_tile(rng);
    while let Some((tile, guard)) = current.take() {
      if context.stopped() {
        tracing::debug!(tile, "worker stopped by monitor");
        break;
      }
      let candidate = match self.best_candidate(tile, rng) {
        Some(candidate) => candidate,
        None => {
          if context.mark_stuck(tile) {
            tracing::warn!(tile, "no candidate crosses any cell");
          } else {
            tracing::trace!(tile, "still no candidate crosses any cell");
          }
          drop(guard);
          thread::sleep(STUCK_BACKOFF);
          current = self.claim_tile(rng);
          continue;
        }
      };
      self.grid.commit(tile, candidate.shape, &candidate.coverage);
      context.placed.fetch_add(1, Ordering::Relaxed);

      current = if self.grid.is_done(tile) {
        drop(guard);
        self.claim_tile(rng)
      } else {
        Some((tile, guard))
      };
    }
  }

  /// Claim an unfinished tile, scanning forward from a random index, then backward.
  fn claim_tile(&self, rng: &mut Pcg64) -> Option<(usize, MutexGuard<'_, ()>)> {
    self.claim_from(rng.gen_range(0..self.grid.len()))
  }

  /// Claim the first free unfinished tile in `start..`, then in `..start` going backward.
  pub(super) fn claim_from(&self, start: usize) -> Option<(usize, MutexGuard<'_, ()>)> {
    let count = self.grid.len();
    (start..count).chain((0..start).rev())
      .find_map(|i| {
        let guard = self.grid.tile(i).try_claim()?;
        (!self.grid.is_done(i)).then(|| (i, guard))
      })
  }

  /// Where candidates are tried within a tile.
  fn positions(&self, tile: usize) -> Vec<Point> {
    if self.config.high_precision {
      self.grid.tile(tile).pixels().iter().map(|p| p.midpoint()).collect()
    } else {
      vec![self.grid.darkest_pixel(tile)]
    }
  }

  /// Highest scoring variant placement, ties broken at random.
  pub(super) fn best_candidate(&self, tile: usize, rng: &mut Pcg64) -> Option<Candidate> {
    use rayon::prelude::*;

    let positions = self.positions(tile);
    let shapes: Vec<Shape> = self.templates.iter()
      .flat_map(|t| t.variants())
      .flat_map(|v| positions.iter().map(move |p| v.translated(p.to_vector())))
      .collect();

    let scored: Vec<(Shape, Coverage, f64)> = shapes.into_par_iter()
      .filter_map(|shape| {
        let coverage = self.grid.coverage(tile, &shape);
        let score = self.grid.insertion_score(tile, &coverage)?;
        Some((shape, coverage, score))
      })
      .collect();

    let best = scored.iter().map(|c| c.2).fold(f64::NEG_INFINITY, f64::max);
    let mut tied: Vec<_> = scored.into_iter().filter(|c| c.2 == best).collect();
    if tied.is_empty() {
      return None;
    }
    let (shape, coverage, _) = tied.swap_remove(rng.gen_range(0..tied.len()));
    Some(Candidate { shape, coverage })
  }

  /// Sample global darkness until all tiles are done, all workers left, or
  /// darkness stagnated for longer than the timeout.
  fn monitor(&self, context: &RunContext) {
    let interval = self.config.monitor_interval;
    let timeout = self.config.stagnation_timeout;
    let mut last_sample: Option<Instant> = None;
    let mut last_darkness = f64::MAX;
    let mut unchanged_since = Instant::now();

    tracing::debug!("shapes | unfinished tiles | mean darkness");
    while context.active_workers.load(Ordering::Acquire) > 0 {
      if last_sample.map_or(true, |t| t.elapsed() >= interval) {
        last_sample = Some(Instant::now());
        let unfinished = self.grid.unfinished_tiles();
        let darkness = self.grid.mean_darkness();
        tracing::debug!("{:>6} | {:>16} | {:>13.2}", context.placed(), unfinished, darkness);
        if unfinished == 0 {
          break;
        }
        if darkness != last_darkness {
          last_darkness = darkness;
          unchanged_since = Instant::now();
        } else if unchanged_since.elapsed() > timeout {
          tracing::info!(seconds = unchanged_since.elapsed().as_secs_f64(), "darkness stagnated, stopping placement");
          context.stop.store(true, Ordering::Relaxed);
          break;
        }
      }
      thread::sleep(MONITOR_POLL);
    }
  }
}
