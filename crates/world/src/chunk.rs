use std::fmt;

use tracing::debug;
use voxelcore_core::{MaterialId, Result, Vec3, VoxelError, VoxelFlags, MATERIAL_AIR};

use crate::normals::compute_normals_into;

/// Bits per axis in a packed voxel index.
pub const CHUNK_SHIFT: u32 = 6;
/// Chunk edge length in voxels (all three axes).
pub const CHUNK_SIZE: usize = 1 << CHUNK_SHIFT;
/// Voxels in one Y layer.
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Total voxel count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_AREA * CHUNK_SIZE;

const AXIS_MASK: usize = CHUNK_SIZE - 1;

/// Chunk-local position (X, Y, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalPos {
    /// Column X, `0..CHUNK_SIZE`.
    pub x: usize,
    /// Height, `0..CHUNK_SIZE`.
    pub y: usize,
    /// Column Z, `0..CHUNK_SIZE`.
    pub z: usize,
}

impl LocalPos {
    /// Validate signed coordinates against `[0, CHUNK_SIZE)`.
    pub fn try_new(x: i32, y: i32, z: i32) -> Result<Self> {
        let in_range = |v: i32| (0..CHUNK_SIZE as i32).contains(&v);
        if in_range(x) && in_range(y) && in_range(z) {
            Ok(Self {
                x: x as usize,
                y: y as usize,
                z: z as usize,
            })
        } else {
            Err(VoxelError::CoordOutOfRange {
                x,
                y,
                z,
                size: CHUNK_SIZE,
            })
        }
    }

    /// Convert to a linear index shared by the material, flags and normal arrays.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.x < CHUNK_SIZE);
        debug_assert!(self.y < CHUNK_SIZE);
        debug_assert!(self.z < CHUNK_SIZE);
        VoxelChunk::index(self.x, self.y, self.z)
    }

    /// Inverse of [`LocalPos::index`].
    #[inline]
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < CHUNK_VOLUME);
        Self {
            x: index & AXIS_MASK,
            y: (index >> CHUNK_SHIFT) & AXIS_MASK,
            z: (index >> (2 * CHUNK_SHIFT)) & AXIS_MASK,
        }
    }
}

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct ChunkPos {
    /// Chunk index along world X.
    pub x: i32,
    /// Chunk index along world Z.
    pub z: i32,
}

impl ChunkPos {
    /// Create a chunk position from chunk-space indices.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World X of the chunk's origin column. Wraps at the i32 boundary.
    #[inline]
    pub const fn origin_x(self) -> i32 {
        self.x.wrapping_mul(CHUNK_SIZE as i32)
    }

    /// World Z of the chunk's origin column. Wraps at the i32 boundary.
    #[inline]
    pub const fn origin_z(self) -> i32 {
        self.z.wrapping_mul(CHUNK_SIZE as i32)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Material and flags of one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Voxel {
    pub material: MaterialId,
    pub flags: VoxelFlags,
}

impl Voxel {
    #[inline]
    pub const fn new(material: MaterialId, flags: VoxelFlags) -> Self {
        Self { material, flags }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.material == MATERIAL_AIR
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Derived data invalidated by voxel writes.
    pub struct DirtyFlags: u8 {
        /// Normals no longer match the material buffer.
        const NORMALS = 0b0000_0001;
        /// Downstream mesh needs a rebuild.
        const MESH = 0b0000_0010;
    }
}

impl Default for DirtyFlags {
    fn default() -> Self {
        DirtyFlags::empty()
    }
}

/// Dense 64³ voxel chunk.
///
/// Material IDs, flags and normals are three flat arrays sharing
/// [`VoxelChunk::index`]. Normals are derived from the material array and are
/// only refreshed by [`VoxelChunk::recompute_normals`]; any material write in
/// between marks them stale.
#[derive(Clone)]
pub struct VoxelChunk {
    materials: Box<[MaterialId]>,
    flags: Box<[VoxelFlags]>,
    normals: Box<[Vec3]>,
    dirty: DirtyFlags,
}

impl VoxelChunk {
    /// Allocate a chunk filled with air. All normals are zero, which is
    /// already consistent with an all-air buffer.
    pub fn new() -> Self {
        Self {
            materials: vec![MATERIAL_AIR; CHUNK_VOLUME].into_boxed_slice(),
            flags: vec![0; CHUNK_VOLUME].into_boxed_slice(),
            normals: vec![Vec3::ZERO; CHUNK_VOLUME].into_boxed_slice(),
            dirty: DirtyFlags::MESH,
        }
    }

    /// Adopt a caller-supplied material buffer with zeroed flags.
    pub fn from_materials(materials: Vec<MaterialId>) -> Result<Self> {
        Self::from_buffers(materials, None)
    }

    /// Adopt caller-supplied buffers and compute normals from them.
    ///
    /// Both buffers must hold exactly [`CHUNK_VOLUME`] entries. Material IDs
    /// are not checked against any palette.
    pub fn from_buffers(
        materials: Vec<MaterialId>,
        flags: Option<Vec<VoxelFlags>>,
    ) -> Result<Self> {
        check_len("material", materials.len())?;
        let flags = match flags {
            Some(flags) => {
                check_len("flags", flags.len())?;
                flags
            }
            None => vec![0; CHUNK_VOLUME],
        };

        Ok(Self::adopt(materials, flags))
    }

    /// Take ownership of length-checked buffers and run the normal pass.
    fn adopt(materials: Vec<MaterialId>, flags: Vec<VoxelFlags>) -> Self {
        let mut chunk = Self {
            materials: materials.into_boxed_slice(),
            flags: flags.into_boxed_slice(),
            normals: vec![Vec3::ZERO; CHUNK_VOLUME].into_boxed_slice(),
            dirty: DirtyFlags::all(),
        };
        chunk.recompute_normals();
        chunk
    }

    /// Packed linear index: `x + y*N + z*N*N`, with X varying fastest.
    ///
    /// Each axis must be below [`CHUNK_SIZE`]; larger values alias other cells.
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < CHUNK_SIZE);
        debug_assert!(y < CHUNK_SIZE);
        debug_assert!(z < CHUNK_SIZE);
        x | (y << CHUNK_SHIFT) | (z << (2 * CHUNK_SHIFT))
    }

    /// Fetch a voxel copy.
    pub fn voxel(&self, x: i32, y: i32, z: i32) -> Result<Voxel> {
        let idx = LocalPos::try_new(x, y, z)?.index();
        Ok(Voxel::new(self.materials[idx], self.flags[idx]))
    }

    /// Overwrite material and flags of one cell.
    ///
    /// Normals are not touched; a material change marks them stale until the
    /// next [`VoxelChunk::recompute_normals`].
    pub fn set_voxel(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        material: MaterialId,
        flags: VoxelFlags,
    ) -> Result<()> {
        let idx = LocalPos::try_new(x, y, z)?.index();
        if self.materials[idx] != material {
            self.materials[idx] = material;
            self.dirty.insert(DirtyFlags::NORMALS | DirtyFlags::MESH);
        }
        if self.flags[idx] != flags {
            self.flags[idx] = flags;
            self.dirty.insert(DirtyFlags::MESH);
        }
        Ok(())
    }

    /// Recompute every normal from the current material buffer.
    pub fn recompute_normals(&mut self) {
        let stats = compute_normals_into(&self.materials, &mut self.normals);
        self.dirty.remove(DirtyFlags::NORMALS);
        debug!(
            solid = stats.solid,
            surface = stats.surface,
            "recomputed voxel normals"
        );
    }

    /// True if a material write happened since the last normal pass.
    #[inline]
    pub fn normals_stale(&self) -> bool {
        self.dirty.contains(DirtyFlags::NORMALS)
    }

    /// Borrow all normals, failing while they are stale.
    pub fn normals(&self) -> Result<&[Vec3]> {
        if self.normals_stale() {
            return Err(VoxelError::StaleNormals);
        }
        Ok(&self.normals)
    }

    /// Normal of one cell, failing while normals are stale.
    pub fn normal(&self, x: i32, y: i32, z: i32) -> Result<Vec3> {
        let idx = LocalPos::try_new(x, y, z)?.index();
        Ok(self.normals()?[idx])
    }

    /// Borrow the normal buffer as of the last recompute, stale or not.
    pub fn normals_unchecked(&self) -> &[Vec3] {
        &self.normals
    }

    /// Borrow raw material storage for meshing.
    pub fn materials(&self) -> &[MaterialId] {
        &self.materials
    }

    /// Borrow raw flags storage.
    pub fn flags(&self) -> &[VoxelFlags] {
        &self.flags
    }

    /// Current dirty flags, without clearing them.
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Consume the mesh dirty bit. Normal staleness is only cleared by a recompute.
    pub fn take_mesh_dirty(&mut self) -> bool {
        let was_dirty = self.dirty.contains(DirtyFlags::MESH);
        self.dirty.remove(DirtyFlags::MESH);
        was_dirty
    }

    /// Number of non-air cells.
    pub fn solid_count(&self) -> usize {
        self.materials
            .iter()
            .filter(|&&id| id != MATERIAL_AIR)
            .count()
    }

    /// Give the material and flags buffers back to the caller.
    pub fn into_buffers(self) -> (Vec<MaterialId>, Vec<VoxelFlags>) {
        (self.materials.into_vec(), self.flags.into_vec())
    }

    /// Simple test geometry: a ground slab of material 1, a mound of
    /// material 2 around the centre column and a hollow carved into it.
    pub fn demo_terrain() -> Self {
        let mut materials = vec![MATERIAL_AIR; CHUNK_VOLUME];
        let centre = (CHUNK_SIZE / 2) as i32;

        for z in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let idx = Self::index(x, y, z);
                    let yi = y as i32;
                    if yi < 16 {
                        materials[idx] = 1;
                    }

                    let dx = x as i32 - centre;
                    let dz = z as i32 - centre;
                    let dist2 = dx * dx + dz * dz;

                    if dist2 < 20 * 20 && yi < 16 + 8 - dist2 / 50 {
                        materials[idx] = 2;
                    }
                    if dist2 < 8 * 8 && (18..=22).contains(&yi) {
                        materials[idx] = MATERIAL_AIR;
                    }
                }
            }
        }

        Self::adopt(materials, vec![0; CHUNK_VOLUME])
    }
}

impl Default for VoxelChunk {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VoxelChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelChunk")
            .field("solid", &self.solid_count())
            .field("dirty", &self.dirty)
            .finish()
    }
}

pub(crate) fn check_len(buffer: &'static str, actual: usize) -> Result<()> {
    if actual != CHUNK_VOLUME {
        return Err(VoxelError::SizeMismatch {
            buffer,
            expected: CHUNK_VOLUME,
            actual,
        });
    }
    Ok(())
}
