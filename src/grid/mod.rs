//! Darkness grid, partitioned into fixed-size tiles.
//!
//! Every tile owns a row-major block of cells, the shapes placed from it, and
//! how many stroke segments cross each of its cells. Tiles carry two locks: a
//! processing lock held by the worker developing the tile, and an access lock
//! guarding shapes and counts. Whenever several access locks are needed, they are
//! taken in ascending tile order.

use {
  crate::{
    config::Config,
    error::{Error, Result},
    geometry::{BoundingBox, Bounds, CanvasSpace, Point, Shape, boxes_touch, count_intersections, diagonal},
  },
  euclid::{Box2D, Point2D},
  std::{
    fmt::{Debug, Formatter},
    sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
  },
};


/// One darkness cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Pixel {
  pub rect: Box2D<u32, CanvasSpace>,
  /// Inverted luminance, 0 is white.
  pub darkness: u8,
}

impl Pixel {
  pub fn new(x: u32, y: u32, darkness: u8) -> Self {
    Self {
      rect: Box2D::new(Point2D::new(x, y), Point2D::new(x + 1, y + 1)),
      darkness
    }
  }

  pub fn bounds(&self) -> Bounds {
    self.rect.to_f64()
  }

  /// Closed outline, four edges.
  pub fn border(&self) -> [Point; 5] {
    let Bounds { min, max, .. } = self.bounds();
    [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y), min]
  }

  pub fn midpoint(&self) -> Point {
    self.bounds().center()
  }

  /// Raw darkness minus the ink of `intersects` stroke crossings, never below zero.
  pub fn adjusted_darkness(&self, intersects: u32, factor: f64) -> f64 {
    (self.darkness as f64 - intersects as f64 * factor).max(0.0)
  }

  pub fn is_white(&self, boundary: u8) -> bool {
    self.darkness <= boundary
  }
}

/// Mutable part of a tile, guarded by its access lock.
#[derive(Debug, Clone, Default)]
pub struct TileState {
  pub shapes: Vec<Shape>,
  /// Stroke crossings per cell, parallel to [`Tile::pixels`].
  pub intersects: Vec<u32>,
}

pub struct Tile {
  pub index: usize,
  /// Cell span of the tile.
  pub rect: Box2D<u32, CanvasSpace>,
  /// The tile's 2-D block of cells, row-major: local cell `(x, y)` sits at
  /// `y * tile width + x`.
  pixels: Vec<Pixel>,
  /// Sorted, including the tile itself.
  neighborhood: Vec<usize>,
  processing: Mutex<()>,
  state: RwLock<TileState>,
}

impl Tile {
  pub fn pixels(&self) -> &[Pixel] {
    &self.pixels
  }

  /// Tiles within the neighbor range, ascending, excluding this one.
  pub fn neighbors(&self) -> impl Iterator<Item = usize> + '_ {
    self.neighborhood.iter().copied().filter(move |&i| i != self.index)
  }

  pub fn neighborhood(&self) -> &[usize] {
    &self.neighborhood
  }

  pub fn bounds(&self) -> Bounds {
    self.rect.to_f64()
  }

  /// Take the processing lock without blocking.
  pub fn try_claim(&self) -> Option<MutexGuard<'_, ()>> {
    use std::sync::TryLockError;

    match self.processing.try_lock() {
      Ok(guard) => Some(guard),
      Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
      Err(TryLockError::WouldBlock) => None
    }
  }

  pub fn read(&self) -> RwLockReadGuard<'_, TileState> {
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, TileState> {
    self.state.write().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn state_mut(&mut self) -> &mut TileState {
    self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
  }

  fn mean_darkness(&self, state: &TileState, factor: f64) -> f64 {
    let total: f64 = self.pixels.iter()
      .zip(&state.intersects)
      .map(|(p, &c)| p.adjusted_darkness(c, factor))
      .sum();
    total / self.pixels.len() as f64
  }

  fn darkest_pixel(&self, state: &TileState, factor: f64) -> &Pixel {
    let mut best = (&self.pixels[0], f64::MIN);
    for (pixel, &count) in self.pixels.iter().zip(&state.intersects) {
      let darkness = pixel.adjusted_darkness(count, factor);
      if darkness > best.1 {
        best = (pixel, darkness);
      }
    }
    best.0
  }
}

/// One cell crossed by a shape, `count` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
  pub tile: usize,
  pub pixel: usize,
  pub count: u32,
}

/// Cells of a neighborhood crossed by a shape, ordered by tile then cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coverage {
  pub hits: Vec<Hit>,
}

impl Coverage {
  /// Crossings with multiplicity.
  pub fn intersections(&self) -> u32 {
    self.hits.iter().map(|h| h.count).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.hits.is_empty()
  }
}

/// How far, in tiles, a template can reach from the tile it is placed in.
pub fn neighbor_range<'a>(templates: impl IntoIterator<Item = &'a Shape>, tile_width: u32, tile_height: u32) -> u32 {
  let max_diagonal = templates.into_iter()
    .flat_map(|t| std::iter::once(t).chain(t.variants()))
    .map(|s| diagonal(s.bounding_box()))
    .fold(0.0, f64::max);
  let tile = tile_width.min(tile_height).max(1) as f64;
  (max_diagonal / 2.0 / tile).ceil() as u32
}

pub struct Grid {
  pub width: u32,
  pub height: u32,
  pub tile_width: u32,
  pub tile_height: u32,
  neighbor_range: u32,
  factor: f64,
  threshold: f64,
  white_boundary: u8,
  white_value: f64,
  tiles: Vec<Tile>,
}

impl Grid {
  /// Split a row-major `width` x `height` darkness map into tiles.
  pub fn new(darkness: Vec<u8>, width: u32, height: u32, config: &Config, neighbor_range: u32) -> Result<Self> {
    if darkness.is_empty() || width == 0 || height == 0 {
      return Err(Error::EmptyDarkness);
    }
    let expected = width as usize * height as usize;
    if darkness.len() != expected {
      return Err(Error::DarknessLength { expected, actual: darkness.len() });
    }
    let (tile_width, tile_height) = (config.tile_width, config.tile_height);
    if tile_width == 0 || tile_height == 0 || width % tile_width != 0 || height % tile_height != 0 {
      return Err(Error::GridSize { width, height, tile_width, tile_height });
    }

    let (tiles_x, tiles_y) = (width / tile_width, height / tile_height);
    let r = neighbor_range as i64;
    let tiles = itertools::iproduct!(0..tiles_y, 0..tiles_x)
      .enumerate()
      .map(|(index, (ty, tx))| {
        let min = Point2D::new(tx * tile_width, ty * tile_height);
        let rect = Box2D::new(min, min + euclid::Vector2D::new(tile_width, tile_height));
        let pixels: Vec<_> = itertools::iproduct!(rect.min.y..rect.max.y, rect.min.x..rect.max.x)
          .map(|(y, x)| Pixel::new(x, y, darkness[y as usize * width as usize + x as usize]))
          .collect();
        let neighborhood = itertools::iproduct!(
          (ty as i64 - r).max(0)..=(ty as i64 + r).min(tiles_y as i64 - 1),
          (tx as i64 - r).max(0)..=(tx as i64 + r).min(tiles_x as i64 - 1)
        ).map(|(y, x)| (y as u32 * tiles_x + x as u32) as usize)
          .collect();
        Tile {
          index,
          rect,
          neighborhood,
          processing: Mutex::new(()),
          state: RwLock::new(TileState { shapes: vec![], intersects: vec![0; pixels.len()] }),
          pixels,
        }
      })
      .collect();

    Ok(Self {
      width,
      height,
      tile_width,
      tile_height,
      neighbor_range,
      factor: config.darkness_factor,
      threshold: config.darkness_threshold,
      white_boundary: config.white_punishment_boundary,
      white_value: config.white_punishment_value,
      tiles,
    })
  }

  /// Build from a darkness function of cell coordinates.
  pub fn from_fn(width: u32, height: u32, config: &Config, neighbor_range: u32, f: impl Fn(u32, u32) -> u8) -> Result<Self> {
    let darkness = itertools::iproduct!(0..height, 0..width)
      .map(|(y, x)| f(x, y))
      .collect();
    Self::new(darkness, width, height, config, neighbor_range)
  }

  pub fn tiles(&self) -> &[Tile] {
    &self.tiles
  }

  pub fn tile(&self, index: usize) -> &Tile {
    &self.tiles[index]
  }

  pub fn len(&self) -> usize {
    self.tiles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tiles.is_empty()
  }

  pub fn neighbor_range(&self) -> u32 {
    self.neighbor_range
  }

  fn pixels_per_tile(&self) -> f64 {
    (self.tile_width * self.tile_height) as f64
  }

  /// Mean adjusted darkness of one tile.
  pub fn tile_darkness(&self, tile: usize) -> f64 {
    let tile = &self.tiles[tile];
    tile.mean_darkness(&tile.read(), self.factor)
  }

  pub fn is_done(&self, tile: usize) -> bool {
    self.tile_darkness(tile) <= self.threshold
  }

  /// Mean adjusted darkness over the whole canvas.
  pub fn mean_darkness(&self) -> f64 {
    (0..self.tiles.len())
      .map(|i| self.tile_darkness(i))
      .sum::<f64>() / self.tiles.len() as f64
  }

  pub fn unfinished_tiles(&self) -> usize {
    (0..self.tiles.len()).filter(|&i| !self.is_done(i)).count()
  }

  /// Midpoint of the first darkest cell of a tile, in row-major order.
  pub fn darkest_pixel(&self, tile: usize) -> Point {
    let tile = &self.tiles[tile];
    tile.darkest_pixel(&tile.read(), self.factor).midpoint()
  }

  /// Cells of `tile`'s neighborhood crossed by `shape`. Pure geometry, no locks.
  pub fn coverage(&self, tile: usize, shape: &Shape) -> Coverage {
    let shape_bounds = shape.bounding_box();
    let mut hits = vec![];
    for &t in &self.tiles[tile].neighborhood {
      let tile = &self.tiles[t];
      if !boxes_touch(&tile.bounds(), &shape_bounds) {
        continue;
      }
      for (i, pixel) in tile.pixels.iter().enumerate() {
        if !boxes_touch(&pixel.bounds(), &shape_bounds) {
          continue;
        }
        let border = pixel.border();
        let count: usize = shape.lines().iter()
          .map(|line| count_intersections(line.points(), &border))
          .sum();
        if count > 0 {
          hits.push(Hit { tile: t, pixel: i, count: count as u32 });
        }
      }
    }
    Coverage { hits }
  }

  /// Score of adding a shape with this coverage: the drop of the neighborhood mean
  /// darkness per crossing, minus the white punishment per crossing.
  /// `None` when the shape crosses nothing.
  pub fn insertion_score(&self, tile: usize, coverage: &Coverage) -> Option<f64> {
    let intersections = coverage.intersections();
    if intersections == 0 {
      return None;
    }
    let mut delta = 0.0;
    let mut punishment = 0.0;
    self.visit_hits(coverage, |pixel, count, k| {
      delta += pixel.adjusted_darkness(count, self.factor)
        - pixel.adjusted_darkness(count + k, self.factor);
      if pixel.is_white(self.white_boundary) {
        punishment += self.white_value * k as f64;
      }
    });
    let intersections = intersections as f64;
    Some(self.neighborhood_mean(tile, delta) / intersections - punishment / intersections)
  }

  /// Score of a placed shape: the rise of the neighborhood mean darkness per
  /// crossing if it were taken away. Zero when it crosses nothing.
  pub fn removal_score(&self, tile: usize, coverage: &Coverage) -> f64 {
    let intersections = coverage.intersections();
    if intersections == 0 {
      return 0.0;
    }
    let mut delta = 0.0;
    self.visit_hits(coverage, |pixel, count, k| {
      delta += pixel.adjusted_darkness(count.saturating_sub(k), self.factor)
        - pixel.adjusted_darkness(count, self.factor);
    });
    self.neighborhood_mean(tile, delta) / intersections as f64
  }

  /// Call `f(pixel, current count, hit count)` for every hit. One tile is read-locked
  /// at a time, in coverage order.
  fn visit_hits(&self, coverage: &Coverage, mut f: impl FnMut(&Pixel, u32, u32)) {
    let mut current: Option<(usize, RwLockReadGuard<'_, TileState>)> = None;
    for hit in &coverage.hits {
      if !matches!(&current, Some((t, _)) if *t == hit.tile) {
        drop(current.take());
        current = Some((hit.tile, self.tiles[hit.tile].read()));
      }
      if let Some((_, state)) = &current {
        f(&self.tiles[hit.tile].pixels[hit.pixel], state.intersects[hit.pixel], hit.count);
      }
    }
  }

  fn neighborhood_mean(&self, tile: usize, darkness_sum: f64) -> f64 {
    darkness_sum / (self.pixels_per_tile() * self.tiles[tile].neighborhood.len() as f64)
  }

  /// Place `shape` in `tile` for good. Access locks of the whole neighborhood are
  /// held, in ascending order, until the counts are updated.
  pub fn commit(&self, tile: usize, shape: Shape, coverage: &Coverage) {
    let neighborhood = &self.tiles[tile].neighborhood;
    let mut guards: Vec<_> = neighborhood.iter()
      .map(|&t| (t, self.tiles[t].write()))
      .collect();
    for hit in &coverage.hits {
      if let Some((_, state)) = guards.iter_mut().find(|(t, _)| *t == hit.tile) {
        state.intersects[hit.pixel] += hit.count;
      }
    }
    if let Some((_, state)) = guards.iter_mut().find(|(t, _)| *t == tile) {
      state.shapes.push(shape);
    }
  }

  /// Remove shapes of `tile` by index. Indices are processed from the highest down,
  /// each removal moves the last shape into the freed slot. Indices past the end
  /// are reported and skipped.
  pub fn remove_shapes(&mut self, tile: usize, mut indices: Vec<usize>) -> usize {
    indices.sort_unstable();
    indices.dedup();
    let mut removed = 0;
    for index in indices.into_iter().rev() {
      let shapes = &mut self.tiles[tile].state_mut().shapes;
      if index >= shapes.len() {
        tracing::warn!(tile, index, len = shapes.len(), "shape index out of range, nothing removed");
        continue;
      }
      let shape = shapes.swap_remove(index);
      let coverage = self.coverage(tile, &shape);
      for hit in coverage.hits {
        let count = &mut self.tiles[hit.tile].state_mut().intersects[hit.pixel];
        *count = count.saturating_sub(hit.count);
      }
      removed += 1;
    }
    removed
  }

  pub fn shape_count(&self) -> usize {
    self.tiles.iter().map(|t| t.read().shapes.len()).sum()
  }

  pub fn shape_counts(&self) -> Vec<usize> {
    self.tiles.iter().map(|t| t.read().shapes.len()).collect()
  }

  /// Polylines over all placed shapes.
  pub fn line_count(&self) -> usize {
    self.tiles.iter()
      .map(|t| t.read().shapes.iter().map(|s| s.lines().len()).sum::<usize>())
      .sum()
  }

  /// Shape lists of all tiles, for sequential post-processing.
  pub(crate) fn shape_lists_mut(&mut self) -> Vec<&mut Vec<Shape>> {
    self.tiles.iter_mut()
      .map(|t| &mut t.state_mut().shapes)
      .collect()
  }

  /// Neighbor lists of all tiles, excluding the tile itself.
  pub(crate) fn neighbor_lists(&self) -> Vec<Vec<usize>> {
    self.tiles.iter().map(|t| t.neighbors().collect()).collect()
  }

  /// All placed shapes, in tile order or reversed tile order.
  pub fn shapes(&self, reverse: bool) -> Vec<Shape> {
    let collect = |t: &Tile| t.read().shapes.clone();
    if reverse {
      self.tiles.iter().rev().flat_map(collect).collect()
    } else {
      self.tiles.iter().flat_map(collect).collect()
    }
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    use humansize::{FileSize, file_size_opts as options};

    let cells = self.width as usize * self.height as usize;
    let size = std::mem::size_of::<Self>()
      + self.tiles.len() * std::mem::size_of::<Tile>()
      + cells * (std::mem::size_of::<Pixel>() + std::mem::size_of::<u32>());
    f.debug_struct("Grid")
      .field("resolution", &(self.width, self.height))
      .field("tile_size", &(self.tile_width, self.tile_height))
      .field("tiles", &self.tiles.len())
      .field("neighbor_range", &self.neighbor_range)
      .field("shapes", &self.shape_count())
      .field("size", &size.file_size(options::BINARY).unwrap_or_else(|e| e))
      .finish()
  }
}
