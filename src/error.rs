//! Error types.
//!
//! Errors raised while setting up a run. Once a [`Solver`](crate::solver::Solver)
//! exists, placement and post-processing have no failure modes of their own.

/// Everything that can go wrong before placement starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("canvas {width}x{height} is not divisible by the tile size {tile_width}x{tile_height}")]
  GridSize {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
  },

  #[error("darkness map is empty")]
  EmptyDarkness,

  #[error("darkness map holds {actual} values, expected {expected}")]
  DarknessLength { expected: usize, actual: usize },

  #[error("no template shapes given")]
  NoTemplates,
}

/// Convenient wrapper around `std::Result`.
pub type Result<T> = ::std::result::Result<T, Error>;

/// Fail with [`Error::InvalidConfig`] unless `cond` holds.
macro_rules! ensure_config {
  ($cond: expr, $($arg: tt)+) => {
    if !$cond {
      return Err($crate::error::Error::InvalidConfig(format!($($arg)+)));
    }
  };
}
pub(crate) use ensure_config;
