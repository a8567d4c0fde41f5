//! Text renderings of a generated chunk for the debug driver.

use std::collections::BTreeMap;
use std::fmt::Write;

use anyhow::{bail, Result};
use voxelcore_testkit::material_histogram;
use voxelcore_world::{Heightmap, NormalStats, Palette, VoxelChunk, CHUNK_SIZE};

/// Shade ramp, lowest first.
const SHADES: [char; 5] = ['·', '░', '▒', '▓', '█'];

fn shade(height: i32, min: i32, max: i32) -> char {
    let normalized = if max > min {
        (height - min) as f32 / (max - min) as f32
    } else {
        0.5
    };
    let slot = (normalized * SHADES.len() as f32) as usize;
    SHADES[slot.min(SHADES.len() - 1)]
}

/// ASCII heightmap, one character per column, rows along +Z.
pub fn render_heightmap(heightmap: &Heightmap) -> String {
    let (min, max) = (heightmap.min_height(), heightmap.max_height());
    let mut out = String::with_capacity((CHUNK_SIZE + 1) * (CHUNK_SIZE + 4));

    out.push_str(&format!("Height range: {} to {}\n", min, max));
    out.push_str("Legend: █ = high, ▓ = med-high, ▒ = med-low, ░ = low, · = very low\n\n");

    for row in heightmap.heights() {
        for &height in row {
            out.push(shade(height, min, max));
        }
        out.push('\n');
    }
    out
}

/// Every non-air cell of one column, top down, with its normal.
pub fn describe_column(
    chunk: &VoxelChunk,
    palette: &Palette,
    local_x: usize,
    local_z: usize,
) -> Result<String> {
    if local_x >= CHUNK_SIZE || local_z >= CHUNK_SIZE {
        bail!("column ({}, {}) is outside the chunk", local_x, local_z);
    }
    let (x, z) = (local_x as i32, local_z as i32);

    let mut out = String::new();
    writeln!(out, "Column ({}, {})", local_x, local_z)?;
    for y in (0..CHUNK_SIZE as i32).rev() {
        let voxel = chunk.voxel(x, y, z)?;
        if voxel.is_air() {
            continue;
        }
        let name = palette
            .material(voxel.material)
            .map(|m| m.name.as_str())
            .unwrap_or("?");
        let n = chunk.normal(x, y, z)?;
        writeln!(
            out,
            "{:>3} {:<8} normal ({:+.2}, {:+.2}, {:+.2})",
            y, name, n.x, n.y, n.z
        )?;
    }
    Ok(out)
}

/// Material histogram and normal counts for a chunk.
pub struct ChunkStats {
    pub histogram: BTreeMap<String, usize>,
    pub normals: NormalStats,
}

impl ChunkStats {
    pub fn collect(chunk: &VoxelChunk, palette: &Palette) -> Result<Self> {
        Ok(Self {
            histogram: material_histogram(chunk, palette),
            normals: NormalStats::tally(chunk.materials(), chunk.normals()?),
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Materials:\n");
        for (name, count) in &self.histogram {
            out.push_str(&format!("  {:<10} {:>7}\n", name, count));
        }
        out.push_str("Normals:\n");
        out.push_str(&format!("  solid      {:>7}\n", self.normals.solid));
        out.push_str(&format!("  surface    {:>7}\n", self.normals.surface));
        out.push_str(&format!("  interior   {:>7}\n", self.normals.interior()));
        out
    }
}
