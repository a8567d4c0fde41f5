//! Per-voxel surface normals from the occupancy field.
//!
//! Each solid cell gets the negated central-difference gradient of occupancy
//! (1 = solid, 0 = air or outside the chunk), normalised. Air cells and cells
//! whose neighbours cancel out get the zero vector.

use voxelcore_core::{MaterialId, Result, Vec3, MATERIAL_AIR};

use crate::chunk::{check_len, VoxelChunk, CHUNK_SIZE, CHUNK_VOLUME};

/// Squared gradient length below which a cell has no defined orientation.
pub const MIN_GRADIENT_LENGTH_SQ: f32 = 1e-4;

/// Counts gathered during a normal pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalStats {
    /// Non-air cells visited.
    pub solid: usize,
    /// Solid cells that received a non-zero normal.
    pub surface: usize,
}

impl NormalStats {
    /// Solid cells fully enclosed by same-occupancy neighbours.
    pub fn interior(&self) -> usize {
        self.solid - self.surface
    }

    /// Tally an existing normal buffer against its material buffer.
    pub fn tally(materials: &[MaterialId], normals: &[Vec3]) -> Self {
        let mut stats = Self::default();
        for (&id, &normal) in materials.iter().zip(normals) {
            if id != MATERIAL_AIR {
                stats.solid += 1;
                if normal != Vec3::ZERO {
                    stats.surface += 1;
                }
            }
        }
        stats
    }
}

/// Occupancy of a lattice position; anything outside the chunk is empty.
#[inline]
fn occupancy(materials: &[MaterialId], x: i32, y: i32, z: i32) -> f32 {
    let n = CHUNK_SIZE as i32;
    if x < 0 || y < 0 || z < 0 || x >= n || y >= n || z >= n {
        return 0.0;
    }
    let idx = VoxelChunk::index(x as usize, y as usize, z as usize);
    if materials[idx] != MATERIAL_AIR {
        1.0
    } else {
        0.0
    }
}

/// Outward normal of a single cell, pointing from solid toward empty.
///
/// # Panics
/// Panics if `materials` is shorter than [`CHUNK_VOLUME`] or the cell is
/// outside the chunk.
pub fn voxel_normal(materials: &[MaterialId], x: usize, y: usize, z: usize) -> Vec3 {
    debug_assert_eq!(materials.len(), CHUNK_VOLUME);
    if materials[VoxelChunk::index(x, y, z)] == MATERIAL_AIR {
        return Vec3::ZERO;
    }

    let (x, y, z) = (x as i32, y as i32, z as i32);
    let gradient = Vec3::new(
        occupancy(materials, x + 1, y, z) - occupancy(materials, x - 1, y, z),
        occupancy(materials, x, y + 1, z) - occupancy(materials, x, y - 1, z),
        occupancy(materials, x, y, z + 1) - occupancy(materials, x, y, z - 1),
    );
    let normal = -gradient;

    if normal.length_squared() > MIN_GRADIENT_LENGTH_SQ {
        normal.normalize()
    } else {
        Vec3::ZERO
    }
}

/// Compute a fresh normal buffer for a full material snapshot.
///
/// Fails with `SizeMismatch` unless `materials` holds exactly
/// [`CHUNK_VOLUME`] entries.
pub fn compute_normals(materials: &[MaterialId]) -> Result<Vec<Vec3>> {
    check_len("material", materials.len())?;
    let mut normals = vec![Vec3::ZERO; CHUNK_VOLUME];
    compute_normals_into(materials, &mut normals);
    Ok(normals)
}

/// Overwrite `normals` from `materials`. Both slices span a whole chunk.
pub(crate) fn compute_normals_into(materials: &[MaterialId], normals: &mut [Vec3]) -> NormalStats {
    assert_eq!(materials.len(), CHUNK_VOLUME, "material buffer must span a chunk");
    assert_eq!(normals.len(), CHUNK_VOLUME, "normal buffer must span a chunk");

    let mut stats = NormalStats::default();
    // Z outermost so the write walks the buffer in index order.
    for z in 0..CHUNK_SIZE {
        for y in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let idx = VoxelChunk::index(x, y, z);
                let normal = voxel_normal(materials, x, y, z);
                if materials[idx] != MATERIAL_AIR {
                    stats.solid += 1;
                    if normal != Vec3::ZERO {
                        stats.surface += 1;
                    }
                }
                normals[idx] = normal;
            }
        }
    }
    stats
}
