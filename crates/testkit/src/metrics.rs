//! Metrics collection and reporting for terrain and normal passes.
//!
//! Reports are exported as JSON so runs of the debug driver or the test
//! suite can be compared against each other.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use voxelcore_world::{Heightmap, NormalStats, Palette, VoxelChunk, CHUNK_VOLUME};

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test/run identifier
    pub test_name: String,

    /// Timestamp when metrics were collected (RFC 3339)
    pub timestamp: String,

    /// Overall test result
    pub result: TestResult,

    /// Terrain generation metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Normal pass metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normals: Option<NormalMetrics>,

    /// Wall-clock duration of the whole run (seconds)
    pub duration_seconds: f64,
}

/// Overall test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Run passed all validations
    Pass,
    /// Run failed
    Fail,
    /// Run was skipped
    Skip,
}

/// Terrain generation performance and shape metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Total chunks generated
    pub chunks_generated: usize,

    /// Total voxels written
    pub voxels_generated: usize,

    /// Average generation time per chunk (microseconds)
    pub avg_gen_time_us: f64,

    /// Min generation time (microseconds)
    pub min_gen_time_us: u128,

    /// Max generation time (microseconds)
    pub max_gen_time_us: u128,

    /// Total generation time (milliseconds)
    pub total_gen_time_ms: f64,

    /// Lowest column surface seen
    pub min_height: i32,

    /// Highest column surface seen
    pub max_height: i32,

    /// Voxel count per material name
    pub material_histogram: BTreeMap<String, usize>,
}

/// Normal pass metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalMetrics {
    /// Non-air voxels
    pub solid_voxels: usize,

    /// Solid voxels with a defined outward normal
    pub surface_voxels: usize,

    /// Solid voxels with a zero normal
    pub interior_voxels: usize,

    /// Average recompute time per chunk (microseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_recompute_time_us: Option<f64>,
}

impl NormalMetrics {
    /// Summarise normal counts, with an optional recompute timing.
    pub fn from_stats(stats: NormalStats, avg_recompute_time_us: Option<f64>) -> Self {
        Self {
            solid_voxels: stats.solid,
            surface_voxels: stats.surface,
            interior_voxels: stats.interior(),
            avg_recompute_time_us,
        }
    }
}

/// Voxel counts per material name. Unregistered IDs are reported as `#<id>`.
pub fn material_histogram(chunk: &VoxelChunk, palette: &Palette) -> BTreeMap<String, usize> {
    let mut counts = [0usize; 256];
    for &id in chunk.materials() {
        counts[id as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(id, &count)| {
            let name = palette
                .material(id as u8)
                .map(|m| m.name.clone())
                .unwrap_or_else(|_| format!("#{}", id));
            (name, count)
        })
        .collect()
}

/// Accumulates per-chunk generation samples into [`TerrainMetrics`].
#[derive(Debug, Default)]
pub struct TerrainMetricsCollector {
    timings_us: Vec<u128>,
    min_height: Option<i32>,
    max_height: Option<i32>,
    histogram: BTreeMap<String, usize>,
}

impl TerrainMetricsCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one generated chunk.
    pub fn record(
        &mut self,
        chunk: &VoxelChunk,
        heightmap: &Heightmap,
        palette: &Palette,
        elapsed: Duration,
    ) {
        self.timings_us.push(elapsed.as_micros());

        let (lo, hi) = (heightmap.min_height(), heightmap.max_height());
        self.min_height = Some(self.min_height.map_or(lo, |h| h.min(lo)));
        self.max_height = Some(self.max_height.map_or(hi, |h| h.max(hi)));

        for (name, count) in material_histogram(chunk, palette) {
            *self.histogram.entry(name).or_default() += count;
        }
    }

    /// Finish collection. Returns `None` if nothing was recorded.
    pub fn finish(self) -> Option<TerrainMetrics> {
        let chunks = self.timings_us.len();
        if chunks == 0 {
            return None;
        }
        let total: u128 = self.timings_us.iter().sum();

        Some(TerrainMetrics {
            chunks_generated: chunks,
            voxels_generated: chunks * CHUNK_VOLUME,
            avg_gen_time_us: total as f64 / chunks as f64,
            min_gen_time_us: self.timings_us.iter().copied().min().unwrap_or(0),
            max_gen_time_us: self.timings_us.iter().copied().max().unwrap_or(0),
            total_gen_time_ms: total as f64 / 1000.0,
            min_height: self.min_height.unwrap_or(0),
            max_height: self.max_height.unwrap_or(0),
            material_histogram: self.histogram,
        })
    }
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with test name
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                terrain: None,
                normals: None,
                duration_seconds: 0.0,
            },
        }
    }

    /// Set test result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set terrain metrics
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set normal metrics
    pub fn normals(mut self, metrics: NormalMetrics) -> Self {
        self.report.normals = Some(metrics);
        self
    }

    /// Set run duration
    pub fn duration(mut self, elapsed: Duration) -> Self {
        self.report.duration_seconds = elapsed.as_secs_f64();
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create metrics directory {}", parent.display())
            })?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        debug!(path = %self.path.display(), "wrote metrics report");
        Ok(())
    }
}
