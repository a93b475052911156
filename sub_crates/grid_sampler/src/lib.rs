//! Uniform sample grids over the unit cube.
//!
//! A grid of resolution `N` has `N` evenly spaced samples along each
//! axis, for `N³` points in total.  Point `i*N*N + j*N + k` sits at
//! `(axis[k], axis[j], axis[i])`, so the first coordinate varies
//! fastest and the third slowest.

mod cache;

use std::sync::Arc;

pub use cache::SampleCache;

/// How many resolutions a `GridSampler` keeps around by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    resolution: usize,
    points: Vec<[f32; 3]>,
}

impl Grid {
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points as one packed `[x, y, z, x, y, z, ...]` buffer.
    pub fn to_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.points.len() * 3);
        for p in self.points.iter() {
            flat.extend_from_slice(p);
        }
        flat
    }
}

/// Returned when asking for a grid with no samples, or with more
/// points than can be held in memory.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InvalidResolution(pub usize);

impl std::error::Error for InvalidResolution {}

impl std::fmt::Display for InvalidResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InvalidResolution: {} samples per axis doesn't make a usable sample grid.",
            self.0
        )
    }
}

/// `n` evenly spaced values from 0.0 to 1.0 inclusive.
///
/// The last value is exactly 1.0.  With `n == 1` the only value is 0.0.
pub fn linspace(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![0.0];
    }
    let norm = 1.0 / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                1.0
            } else {
                (i as f64 * norm) as f32
            }
        })
        .collect()
}

/// Number of points in a grid of resolution `n`, if such a grid can
/// be allocated at all.
fn grid_point_count(n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let count = n.checked_pow(3)?;
    let bytes = count.checked_mul(std::mem::size_of::<[f32; 3]>())?;
    if bytes > isize::MAX as usize {
        return None;
    }
    Some(count)
}

/// Builds the grid of resolution `n` from scratch.
pub fn uniform_samples(n: usize) -> Result<Grid, InvalidResolution> {
    let count = grid_point_count(n).ok_or(InvalidResolution(n))?;

    let axis = linspace(n);
    let mut points = Vec::with_capacity(count);
    for &c in axis.iter() {
        for &b in axis.iter() {
            for &a in axis.iter() {
                points.push([a, b, c]);
            }
        }
    }

    Ok(Grid {
        resolution: n,
        points: points,
    })
}

/// Hands out sample grids, computing each resolution only while it
/// stays in the cache.
#[derive(Debug)]
pub struct GridSampler {
    cache: SampleCache,
}

impl GridSampler {
    pub fn new() -> GridSampler {
        GridSampler::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> GridSampler {
        GridSampler {
            cache: SampleCache::new(capacity),
        }
    }

    pub fn samples(&mut self, n: usize) -> Result<Arc<Grid>, InvalidResolution> {
        if let Some(grid) = self.cache.get(n) {
            return Ok(grid);
        }
        let grid = Arc::new(uniform_samples(n)?);
        self.cache.insert(n, Arc::clone(&grid));
        Ok(grid)
    }

    pub fn cache(&self) -> &SampleCache {
        &self.cache
    }
}

impl Default for GridSampler {
    fn default() -> GridSampler {
        GridSampler::new()
    }
}
