#![warn(missing_docs)]
//! Deterministic testing surfaces: noise fixtures, chunk fingerprints and
//! JSON metrics reports.

mod metrics;

use blake3::Hasher;
use voxelcore_world::{Heightmap, VoxelChunk, CHUNK_SIZE};

pub use metrics::*;

/// Sampler returning `value` everywhere. Produces perfectly flat terrain.
pub fn constant_noise(value: f32) -> impl Fn(i32, i32) -> f32 + Send + Sync + Copy {
    move |_x, _z| value
}

/// Sampler rising linearly from -1 to 1 across each chunk along +X and
/// wrapping at chunk borders. Every local X column gets a distinct height
/// under the default terrain parameters.
pub fn ramp_noise() -> impl Fn(i32, i32) -> f32 + Send + Sync + Copy {
    let span = (CHUNK_SIZE - 1) as f32;
    move |x, _z| {
        let local = x.rem_euclid(CHUNK_SIZE as i32) as f32;
        local / span * 2.0 - 1.0
    }
}

/// Stable hex digest of a chunk's material and flags buffers.
///
/// Normals are derived data and are left out, so two chunks with equal
/// fingerprints are bit-for-bit identical in everything a caller wrote.
pub fn chunk_fingerprint(chunk: &VoxelChunk) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"materials");
    hasher.update(chunk.materials());
    hasher.update(b"flags");
    hasher.update(chunk.flags());
    hasher.finalize().to_hex().to_string()
}

/// Stable hex digest of a heightmap, row by row.
pub fn heightmap_fingerprint(heightmap: &Heightmap) -> String {
    let mut hasher = Hasher::new();
    for row in heightmap.heights() {
        for height in row {
            hasher.update(&height.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
