//! Pruning of placed shapes by their marginal contribution.

use {
  super::Solver,
  itertools::Itertools,
};

/// Ranking token of one placed shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeScore {
  pub tile: usize,
  pub shape: usize,
  pub score: f64,
}

impl Solver {
  /// Score every placed shape by how much darker its neighborhood would get without it.
  pub fn score_shapes(&self) -> Vec<ShapeScore> {
    use rayon::prelude::*;

    let grid = &self.grid;
    let per_tile: Vec<Vec<ShapeScore>> = (0..grid.len()).into_par_iter()
      .map(|tile| {
        let coverages: Vec<_> = grid.tile(tile).read().shapes.iter()
          .map(|shape| grid.coverage(tile, shape))
          .collect();
        coverages.iter().enumerate()
          .map(|(shape, coverage)| ShapeScore {
            tile,
            shape,
            score: grid.removal_score(tile, coverage)
          })
          .collect()
      })
      .collect();
    per_tile.into_iter().flatten().collect()
  }

  /// Remove the lowest scoring fraction of all placed shapes.
  pub fn prune_worst(&mut self) -> usize {
    let count = (self.grid.shape_count() as f64 * self.config.refinement_percentage).floor() as usize;
    let mut scores = self.score_shapes();
    scores.sort_by(|a, b| a.score.total_cmp(&b.score));
    scores.truncate(count);
    self.remove_scored(scores)
  }

  /// Remove every shape that does not lower the darkness at all.
  pub fn prune_worthless(&mut self) -> usize {
    let scores = self.score_shapes()
      .into_iter()
      .filter(|s| s.score == 0.0)
      .collect();
    self.remove_scored(scores)
  }

  /// Remove scored shapes tile by tile.
  pub fn remove_scored(&mut self, scores: Vec<ShapeScore>) -> usize {
    let by_tile = scores.into_iter().into_group_map_by(|s| s.tile);
    by_tile.into_iter()
      .sorted_by_key(|(tile, _)| *tile)
      .map(|(tile, scores)| self.grid.remove_shapes(tile, scores.into_iter().map(|s| s.shape).collect()))
      .sum()
  }
}
