use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, warn};
use voxelcore_core::Color;
use voxelcore_world::{
    ChunkPos, FbmNoise, MaterialProps, NoiseConfig, Palette, TerrainGenerator, TerrainParams,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/voxelcore.toml";

/// Extra palette entry, registered after the default terrain set.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MaterialEntry {
    pub name: String,
    pub albedo: Color,
    #[serde(flatten)]
    pub props: MaterialProps,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VoxelCoreConfig {
    pub noise: NoiseConfig,
    pub terrain: TerrainParams,
    /// Chunk to generate, as `[x, z]`.
    pub chunk: [i32; 2],
    pub materials: Vec<MaterialEntry>,
}

impl VoxelCoreConfig {
    /// Load from the default path, falling back to defaults on errors.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err:#}. Using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config not found at {}. Using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration from an explicit path, returning errors to the caller.
    pub fn try_load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.terrain.validate()?;
        Ok(cfg)
    }

    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.chunk[0], self.chunk[1])
    }

    /// Default terrain palette plus every configured extra material.
    pub fn build_palette(&self) -> Result<Palette> {
        let mut palette = Palette::create_default();
        for entry in &self.materials {
            let id = palette
                .register_with(&entry.name, entry.albedo, entry.props)
                .with_context(|| format!("Failed to register material '{}'", entry.name))?;
            debug!(id, name = %entry.name, "configured extra material");
        }
        Ok(palette)
    }

    pub fn generator(&self) -> TerrainGenerator<FbmNoise> {
        TerrainGenerator::from_config(self.noise.clone(), self.terrain)
    }
}
