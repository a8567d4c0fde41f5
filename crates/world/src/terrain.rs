//! Terrain generation from a heightmap and a fixed banding rule.
//!
//! Every column is filled bottom-up as stone, a dirt band, and a single
//! surface cell (grass, or sand near sea level), with air above.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};
use voxelcore_core::{MaterialId, Result, VoxelError, MATERIAL_AIR};

use crate::chunk::{ChunkPos, VoxelChunk, CHUNK_SIZE};
use crate::heightmap::Heightmap;
use crate::noise::{FbmNoise, NoiseConfig, NoiseSampler};
use crate::palette::Palette;

/// Shape parameters for terrain generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Surface cells at or below `sea_level + beach_margin` become sand.
    pub sea_level: i32,
    /// Height of a column sampled at noise -1.
    pub base_height: i32,
    /// Height range added on top of `base_height` across the noise range.
    pub height_amplitude: i32,
    /// Dirt cells directly beneath the surface cell.
    pub soil_depth: i32,
    /// Levels above `sea_level` that still count as shoreline.
    pub beach_margin: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            sea_level: 0,
            base_height: 1,
            height_amplitude: 24,
            soil_depth: 3,
            beach_margin: 1,
        }
    }
}

impl TerrainParams {
    /// Reject parameter sets the banding rule cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.soil_depth < 0 {
            return Err(VoxelError::invalid_argument(format!(
                "soil_depth {} must not be negative",
                self.soil_depth
            )));
        }
        Ok(())
    }
}

/// Material IDs used by the banding rule, resolved once per fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainMaterials {
    pub grass: MaterialId,
    pub dirt: MaterialId,
    pub stone: MaterialId,
    pub sand: MaterialId,
}

impl TerrainMaterials {
    /// Look up the terrain materials by name. Nothing is registered on a miss.
    pub fn resolve(palette: &Palette) -> Result<Self> {
        Ok(Self {
            grass: palette.get_id("grass")?,
            dirt: palette.get_id("dirt")?,
            stone: palette.get_id("stone")?,
            sand: palette.get_id("sand")?,
        })
    }
}

/// Material of cell `y` in a column whose surface sits at `column_height`.
pub fn classify(
    y: i32,
    column_height: i32,
    params: &TerrainParams,
    materials: &TerrainMaterials,
) -> MaterialId {
    if y > column_height {
        MATERIAL_AIR
    } else if y == column_height {
        if y <= params.sea_level.saturating_add(params.beach_margin) {
            materials.sand
        } else {
            materials.grass
        }
    } else if y >= column_height.saturating_sub(params.soil_depth) {
        materials.dirt
    } else {
        materials.stone
    }
}

/// Overwrite every cell of `chunk` with generated terrain.
///
/// All cells are written with flags 0. Normals are left stale; call
/// [`VoxelChunk::recompute_normals`] once the buffer is complete.
#[instrument(skip_all, fields(chunk_pos = %chunk_pos))]
pub fn fill_chunk<S>(
    chunk: &mut VoxelChunk,
    palette: &Palette,
    chunk_pos: ChunkPos,
    noise: &S,
    params: &TerrainParams,
) -> Result<Heightmap>
where
    S: NoiseSampler + ?Sized,
{
    params.validate()?;
    let materials = TerrainMaterials::resolve(palette)?;
    let heightmap = Heightmap::generate(noise, chunk_pos, params);

    for local_z in 0..CHUNK_SIZE {
        for local_x in 0..CHUNK_SIZE {
            let height = heightmap.get(local_x, local_z);
            trace!(local_x, local_z, height, "filling column");

            for y in 0..CHUNK_SIZE as i32 {
                let material = classify(y, height, params, &materials);
                chunk.set_voxel(local_x as i32, y, local_z as i32, material, 0)?;
            }
        }
    }

    debug!(
        min_height = heightmap.min_height(),
        max_height = heightmap.max_height(),
        "terrain fill complete"
    );
    Ok(heightmap)
}

/// Terrain generator bound to one noise sampler and parameter set.
///
/// Holds no mutable state, so a shared generator can fill distinct chunks
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct TerrainGenerator<S = FbmNoise> {
    sampler: S,
    params: TerrainParams,
}

impl TerrainGenerator<FbmNoise> {
    /// Build a generator around an [`FbmNoise`] sampler.
    pub fn from_config(noise: NoiseConfig, params: TerrainParams) -> Self {
        Self::new(FbmNoise::new(noise), params)
    }
}

impl<S: NoiseSampler> TerrainGenerator<S> {
    pub fn new(sampler: S, params: TerrainParams) -> Self {
        Self { sampler, params }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Fill an existing chunk in place. Normals are not recomputed.
    pub fn fill_chunk(
        &self,
        chunk: &mut VoxelChunk,
        palette: &Palette,
        chunk_pos: ChunkPos,
    ) -> Result<Heightmap> {
        fill_chunk(chunk, palette, chunk_pos, &self.sampler, &self.params)
    }

    /// Generate a new chunk with up-to-date normals.
    #[instrument(skip_all, fields(chunk_pos = %chunk_pos))]
    pub fn generate_chunk(&self, palette: &Palette, chunk_pos: ChunkPos) -> Result<VoxelChunk> {
        let mut chunk = VoxelChunk::new();
        self.fill_chunk(&mut chunk, palette, chunk_pos)?;
        chunk.recompute_normals();
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxelcore_core::ErrorKind;

    fn flat_params(height: i32) -> TerrainParams {
        TerrainParams {
            base_height: height,
            height_amplitude: 0,
            ..TerrainParams::default()
        }
    }

    fn flat_chunk(params: &TerrainParams) -> (VoxelChunk, Palette) {
        let palette = Palette::create_default();
        let mut chunk = VoxelChunk::new();
        fill_chunk(
            &mut chunk,
            &palette,
            ChunkPos::new(0, 0),
            &|_x: i32, _z: i32| 0.0f32,
            params,
        )
        .unwrap();
        (chunk, palette)
    }

    #[test]
    fn test_column_banding() {
        let params = flat_params(10);
        let (chunk, palette) = flat_chunk(&params);
        let mats = TerrainMaterials::resolve(&palette).unwrap();

        for (x, z) in [(0, 0), (31, 17), (63, 63)] {
            for y in 0..=6 {
                assert_eq!(chunk.voxel(x, y, z).unwrap().material, mats.stone, "y={}", y);
            }
            for y in 7..=9 {
                assert_eq!(chunk.voxel(x, y, z).unwrap().material, mats.dirt, "y={}", y);
            }
            assert_eq!(chunk.voxel(x, 10, z).unwrap().material, mats.grass);
            for y in 11..CHUNK_SIZE as i32 {
                assert!(chunk.voxel(x, y, z).unwrap().is_air(), "y={}", y);
            }
        }
    }

    #[test]
    fn test_low_surface_is_sand() {
        let params = flat_params(1);
        let (chunk, palette) = flat_chunk(&params);
        assert_eq!(chunk.voxel(5, 1, 5).unwrap().material, palette.get_id("sand").unwrap());
        assert_eq!(chunk.voxel(5, 0, 5).unwrap().material, palette.get_id("dirt").unwrap());
        assert!(chunk.voxel(5, 2, 5).unwrap().is_air());
    }

    #[test]
    fn test_classify_respects_beach_band() {
        let mats = TerrainMaterials {
            grass: 2,
            dirt: 1,
            stone: 3,
            sand: 4,
        };
        let params = TerrainParams {
            sea_level: 20,
            beach_margin: 1,
            ..TerrainParams::default()
        };
        assert_eq!(classify(21, 21, &params, &mats), mats.sand);
        assert_eq!(classify(22, 22, &params, &mats), mats.grass);
        assert_eq!(classify(23, 22, &params, &mats), MATERIAL_AIR);
        assert_eq!(classify(19, 22, &params, &mats), mats.dirt);
        assert_eq!(classify(18, 22, &params, &mats), mats.stone);

        let deep_soil = TerrainParams {
            soil_depth: 10,
            ..TerrainParams::default()
        };
        assert_eq!(classify(0, 5, &deep_soil, &mats), mats.dirt);
    }

    #[test]
    fn test_fill_writes_zero_flags_and_leaves_normals_stale() {
        let palette = Palette::create_default();
        let mut chunk = VoxelChunk::new();
        chunk.set_voxel(3, 40, 3, 2, 0xAA).unwrap();

        fill_chunk(
            &mut chunk,
            &palette,
            ChunkPos::new(0, 0),
            &|_x: i32, _z: i32| 0.0f32,
            &flat_params(10),
        )
        .unwrap();

        assert!(chunk.flags().iter().all(|&f| f == 0));
        assert!(chunk.voxel(3, 40, 3).unwrap().is_air());
        assert!(chunk.normals_stale());
        assert_eq!(chunk.normals().unwrap_err(), VoxelError::StaleNormals);
    }

    #[test]
    fn test_missing_materials_error() {
        let palette = Palette::new();
        let mut chunk = VoxelChunk::new();
        let err = fill_chunk(
            &mut chunk,
            &palette,
            ChunkPos::new(0, 0),
            &FbmNoise::default(),
            &TerrainParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, VoxelError::MaterialNotFound("grass".into()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        // Nothing was auto-registered or written.
        assert_eq!(palette.len(), 1);
        assert_eq!(chunk.solid_count(), 0);
    }

    #[test]
    fn test_negative_soil_depth_rejected() {
        let params = TerrainParams {
            soil_depth: -1,
            ..TerrainParams::default()
        };
        let gen = TerrainGenerator::new(|_x: i32, _z: i32| 0.0f32, params);
        let err = gen
            .generate_chunk(&Palette::create_default(), ChunkPos::new(0, 0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_generate_chunk_has_fresh_normals() {
        let gen =
            TerrainGenerator::from_config(NoiseConfig::with_seed(42), TerrainParams::default());
        let palette = Palette::create_default();
        let chunk = gen.generate_chunk(&palette, ChunkPos::new(3, -2)).unwrap();

        assert!(!chunk.normals_stale());
        assert!(chunk.solid_count() > 0);
        // Bottom layer is always solid because heights never drop below 1.
        for x in 0..CHUNK_SIZE as i32 {
            assert!(!chunk.voxel(x, 0, 0).unwrap().is_air());
        }
    }

    #[test]
    fn test_terrain_determinism() {
        let gen1 =
            TerrainGenerator::from_config(NoiseConfig::with_seed(789), TerrainParams::default());
        let gen2 =
            TerrainGenerator::from_config(NoiseConfig::with_seed(789), TerrainParams::default());
        let palette = Palette::create_default();

        let chunk1 = gen1.generate_chunk(&palette, ChunkPos::new(5, 5)).unwrap();
        let chunk2 = gen2.generate_chunk(&palette, ChunkPos::new(5, 5)).unwrap();
        assert_eq!(chunk1.materials(), chunk2.materials());
        assert_eq!(chunk1.normals().unwrap(), chunk2.normals().unwrap());
    }

    #[test]
    fn test_generator_is_sync() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<TerrainGenerator>();
    }
}
