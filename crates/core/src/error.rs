//! Error taxonomy for palette, chunk and terrain operations.
//!
//! Every failure is raised at the call that violates the contract. Nothing in
//! the core retries or logs-and-continues.

use thiserror::Error;

use crate::MaterialId;

/// Result alias used throughout the workspace libraries.
pub type Result<T, E = VoxelError> = std::result::Result<T, E>;

/// Coarse classification of a [`VoxelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A coordinate or ID lies outside its valid bounds.
    OutOfRange,
    /// A name or property failed validation.
    InvalidArgument,
    /// A name or ID lookup missed.
    NotFound,
    /// The palette has no free IDs left.
    CapacityExceeded,
    /// A caller-supplied buffer has the wrong length.
    SizeMismatch,
    /// Derived data was read while invalidated.
    Stale,
}

/// Errors raised by the voxel core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoxelError {
    /// Voxel coordinate outside `[0, size)` on some axis.
    #[error("voxel ({x}, {y}, {z}) out of range 0..{size}")]
    CoordOutOfRange {
        /// X coordinate as supplied.
        x: i32,
        /// Y coordinate as supplied.
        y: i32,
        /// Z coordinate as supplied.
        z: i32,
        /// Chunk edge length.
        size: usize,
    },

    /// Material ID beyond the palette's slot range.
    #[error("material id {id} out of range (limit {limit})")]
    MaterialIdOutOfRange {
        /// Requested ID.
        id: MaterialId,
        /// Exclusive upper bound.
        limit: usize,
    },

    /// Rejected argument, with a human-readable reason.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No material registered under this name.
    #[error("voxel material '{0}' is not registered")]
    MaterialNotFound(String),

    /// No material registered under this ID.
    #[error("voxel material id {0} is not registered")]
    MaterialIdNotFound(MaterialId),

    /// All palette slots are in use.
    #[error("voxel palette is full ({capacity} materials)")]
    CapacityExceeded {
        /// Total slot count, air included.
        capacity: usize,
    },

    /// Buffer length does not match the chunk volume.
    #[error("{buffer} buffer holds {actual} entries, expected {expected}")]
    SizeMismatch {
        /// Which buffer was rejected.
        buffer: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Normals were read after a voxel write without a recompute.
    #[error("voxel normals are stale; recompute them before reading")]
    StaleNormals,
}

impl VoxelError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VoxelError::CoordOutOfRange { .. } | VoxelError::MaterialIdOutOfRange { .. } => {
                ErrorKind::OutOfRange
            }
            VoxelError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            VoxelError::MaterialNotFound(_) | VoxelError::MaterialIdNotFound(_) => {
                ErrorKind::NotFound
            }
            VoxelError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            VoxelError::SizeMismatch { .. } => ErrorKind::SizeMismatch,
            VoxelError::StaleNormals => ErrorKind::Stale,
        }
    }

    /// Shorthand for an [`VoxelError::InvalidArgument`] built from any message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        VoxelError::InvalidArgument(message.into())
    }
}
