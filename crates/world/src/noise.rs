//! 2D noise sampling for terrain generation.
//!
//! The terrain generator only relies on [`NoiseSampler`]: a deterministic,
//! side-effect-free map from integer world XZ to a value in `[-1, 1]`.
//! [`FbmNoise`] is the reference implementation; any closure with the same
//! contract can stand in for it.

use noise::{NoiseFn, OpenSimplex};
use serde::{Deserialize, Serialize};

/// Deterministic 2D height noise.
///
/// Implementations must return identical values for identical coordinates
/// and be safe to call from several threads at once.
pub trait NoiseSampler: Send + Sync {
    /// Sample at world column `(world_x, world_z)`. Returns a value in `[-1, 1]`.
    fn sample(&self, world_x: i32, world_z: i32) -> f32;
}

impl<F> NoiseSampler for F
where
    F: Fn(i32, i32) -> f32 + Send + Sync,
{
    fn sample(&self, world_x: i32, world_z: i32) -> f32 {
        self(world_x, world_z)
    }
}

/// Configuration for multi-octave noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Seed for deterministic generation
    pub seed: u32,
    /// Number of octaves (layers of detail)
    pub octaves: u32,
    /// Base frequency (scale)
    pub frequency: f64,
    /// Frequency multiplier between octaves
    pub lacunarity: f64,
    /// Amplitude multiplier between octaves (persistence)
    pub persistence: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 628,
            octaves: 4,
            frequency: 0.001,
            lacunarity: 2.0,
            persistence: 0.5,
        }
    }
}

impl NoiseConfig {
    /// Default fractal parameters with a different seed.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Fractal Brownian motion over OpenSimplex noise.
#[derive(Debug, Clone)]
pub struct FbmNoise {
    simplex: OpenSimplex,
    config: NoiseConfig,
}

impl FbmNoise {
    /// Create a new generator with the given configuration.
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            simplex: OpenSimplex::new(config.seed),
            config,
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Generate noise value at 2D coordinates with multi-octave sampling.
    ///
    /// Returns value in range [-1.0, 1.0].
    pub fn sample_2d(&self, x: f64, z: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.config.frequency;
        let mut max_value = 0.0;

        for _ in 0..self.config.octaves.max(1) {
            value += self.simplex.get([x * frequency, z * frequency]) * amplitude;
            max_value += amplitude;

            amplitude *= self.config.persistence;
            frequency *= self.config.lacunarity;
        }

        if max_value <= 0.0 {
            return 0.0;
        }
        // Normalize to [-1.0, 1.0]
        (value / max_value).clamp(-1.0, 1.0)
    }
}

impl Default for FbmNoise {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

impl NoiseSampler for FbmNoise {
    fn sample(&self, world_x: i32, world_z: i32) -> f32 {
        self.sample_2d(f64::from(world_x), f64::from(world_z)) as f32
    }
}
