mod chunk;
mod heightmap;
mod noise;
mod normals;
mod palette;
mod terrain;

pub use self::chunk::*;
pub use self::heightmap::*;
pub use self::noise::*;
pub use self::normals::*;
pub use self::palette::*;
pub use self::terrain::*;

pub use voxelcore_core::{
    Color, ErrorKind, MaterialId, Result, Vec3, VoxelError, VoxelFlags, MATERIAL_AIR,
};
