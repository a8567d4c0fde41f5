#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod color;
pub mod error;

pub use color::Color;
pub use error::{ErrorKind, Result, VoxelError};

/// Plain 3-component float vector used for per-voxel normals.
pub use glam::Vec3;

/// Material identifier stored per voxel.
pub type MaterialId = u8;

/// Reserved material ID for empty space ("air").
pub const MATERIAL_AIR: MaterialId = 0;

/// Caller-owned per-voxel bitfield. The core never interprets it.
pub type VoxelFlags = u8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_zero() {
        assert_eq!(MATERIAL_AIR, 0);
    }
}
