//! Heightmap generation for terrain.
//!
//! Converts noise samples into clamped column heights for one chunk.

use crate::chunk::{ChunkPos, CHUNK_SIZE};
use crate::noise::NoiseSampler;
use crate::terrain::TerrainParams;

/// Lowest surface height a column can have.
pub const MIN_COLUMN_HEIGHT: i32 = 1;

/// Highest surface height a column can have.
pub const MAX_COLUMN_HEIGHT: i32 = CHUNK_SIZE as i32 - 1;

/// Surface height for one noise sample.
///
/// Remaps `noise` from `[-1, 1]` to `[0, 1]`, scales by the amplitude, floors,
/// offsets by the base height and clamps into
/// `[MIN_COLUMN_HEIGHT, MAX_COLUMN_HEIGHT]`. Arithmetic saturates, so extreme
/// parameters cannot overflow; a NaN sample contributes no offset.
pub fn column_height(noise: f32, params: &TerrainParams) -> i32 {
    let n = noise * 0.5 + 0.5;
    let offset = (n * params.height_amplitude as f32).floor() as i64;
    let height = i64::from(params.base_height).saturating_add(offset);
    height.clamp(i64::from(MIN_COLUMN_HEIGHT), i64::from(MAX_COLUMN_HEIGHT)) as i32
}

/// Heightmap for a single chunk.
///
/// Each value is the Y of the topmost solid cell at that (x, z) column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    /// Indexed as heights[z][x] for cache-friendly iteration.
    heights: [[i32; CHUNK_SIZE]; CHUNK_SIZE],
}

impl Heightmap {
    /// Generate a heightmap for the given chunk.
    ///
    /// Samples `noise` once per column at world coordinates
    /// `(chunk.x * N + lx, chunk.z * N + lz)`.
    pub fn generate<S>(noise: &S, chunk_pos: ChunkPos, params: &TerrainParams) -> Self
    where
        S: NoiseSampler + ?Sized,
    {
        let mut heights = [[0i32; CHUNK_SIZE]; CHUNK_SIZE];

        let chunk_origin_x = chunk_pos.origin_x();
        let chunk_origin_z = chunk_pos.origin_z();

        for (local_z, row) in heights.iter_mut().enumerate() {
            for (local_x, cell) in row.iter_mut().enumerate() {
                let world_x = chunk_origin_x.wrapping_add(local_x as i32);
                let world_z = chunk_origin_z.wrapping_add(local_z as i32);
                *cell = column_height(noise.sample(world_x, world_z), params);
            }
        }

        Self { heights }
    }

    /// Get the height at a specific local (x, z) column.
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds.
    pub fn get(&self, local_x: usize, local_z: usize) -> i32 {
        assert!(local_x < CHUNK_SIZE, "local_x out of bounds");
        assert!(local_z < CHUNK_SIZE, "local_z out of bounds");
        self.heights[local_z][local_x]
    }

    /// Get a reference to the raw height array, indexed as [z][x].
    pub fn heights(&self) -> &[[i32; CHUNK_SIZE]; CHUNK_SIZE] {
        &self.heights
    }

    /// Get the minimum height in this heightmap.
    pub fn min_height(&self) -> i32 {
        self.heights
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .min()
            .unwrap_or(MIN_COLUMN_HEIGHT)
    }

    /// Get the maximum height in this heightmap.
    pub fn max_height(&self) -> i32 {
        self.heights
            .iter()
            .flat_map(|row| row.iter())
            .copied()
            .max()
            .unwrap_or(MAX_COLUMN_HEIGHT)
    }

    /// Get the average height in this heightmap.
    pub fn avg_height(&self) -> f32 {
        let sum: i64 = self
            .heights
            .iter()
            .flat_map(|row| row.iter())
            .map(|&h| i64::from(h))
            .sum();
        sum as f32 / (CHUNK_SIZE * CHUNK_SIZE) as f32
    }
}
