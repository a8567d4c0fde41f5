//! Determinism Validation Worldtest
//!
//! Validates that terrain generation is a pure function of its inputs:
//! - Same seed produces identical chunks
//! - Chunk generation order independence
//! - Parallel generation across threads matches sequential generation
//! - Heightmap reproducibility

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;

use voxelcore_testkit::{
    chunk_fingerprint, heightmap_fingerprint, MetricsReportBuilder, MetricsSink, NormalMetrics,
    TerrainMetricsCollector, TestResult,
};
use voxelcore_world::{
    ChunkPos, Heightmap, NoiseConfig, NormalStats, Palette, TerrainGenerator, TerrainParams,
    VoxelChunk,
};

const WORLD_SEED: u32 = 628;
const CHUNK_RADIUS: i32 = 2; // 5×5 grid = 25 chunks
const WORKERS: usize = 4;

fn grid() -> Vec<ChunkPos> {
    let mut positions = Vec::new();
    for chunk_z in -CHUNK_RADIUS..=CHUNK_RADIUS {
        for chunk_x in -CHUNK_RADIUS..=CHUNK_RADIUS {
            positions.push(ChunkPos::new(chunk_x, chunk_z));
        }
    }
    positions
}

fn generator() -> TerrainGenerator {
    let noise = NoiseConfig {
        frequency: 0.01,
        ..NoiseConfig::with_seed(WORLD_SEED)
    };
    TerrainGenerator::from_config(noise, TerrainParams::default())
}

#[test]
fn determinism_worldtest() {
    let test_start = Instant::now();
    let palette = Palette::create_default();
    let terrain_gen = generator();
    let positions = grid();

    println!("\n=== Determinism Validation Worldtest ===");
    println!("  World seed: {}", WORLD_SEED);
    println!("  Chunks: {}", positions.len());

    // Phase 1: sequential generation
    let mut collector = TerrainMetricsCollector::new();
    let mut normal_stats = NormalStats::default();
    let mut sequential = BTreeMap::new();
    for &pos in &positions {
        let gen_start = Instant::now();
        let mut chunk = VoxelChunk::new();
        let heightmap = terrain_gen.fill_chunk(&mut chunk, &palette, pos).unwrap();
        chunk.recompute_normals();
        collector.record(&chunk, &heightmap, &palette, gen_start.elapsed());

        let stats = NormalStats::tally(chunk.materials(), chunk.normals().unwrap());
        normal_stats.solid += stats.solid;
        normal_stats.surface += stats.surface;
        sequential.insert(
            pos,
            (chunk_fingerprint(&chunk), heightmap_fingerprint(&heightmap)),
        );
    }

    // Phase 2: regeneration in a shuffled order with a fresh generator
    let mut shuffled = positions.clone();
    for i in 0..shuffled.len() {
        let step = (i as u64).wrapping_mul(u64::from(WORLD_SEED) + 7);
        let j = (step % shuffled.len() as u64) as usize;
        shuffled.swap(i, j);
    }
    let regen = generator();
    for pos in &shuffled {
        let chunk = regen.generate_chunk(&palette, *pos).unwrap();
        assert_eq!(
            chunk_fingerprint(&chunk),
            sequential[pos].0,
            "chunk {} differs when generated out of order",
            pos
        );
    }

    // Phase 3: heightmaps alone are reproducible
    for &pos in &positions {
        let heightmap = Heightmap::generate(terrain_gen.sampler(), pos, terrain_gen.params());
        assert_eq!(heightmap_fingerprint(&heightmap), sequential[&pos].1);
    }

    // Phase 4: neighbouring chunks differ
    let distinct: std::collections::BTreeSet<_> = sequential.values().map(|(c, _)| c).collect();
    assert!(distinct.len() > 1, "all chunks generated identically");

    let terrain = collector.finish().unwrap();
    assert_eq!(terrain.chunks_generated, positions.len());
    println!("  Height range: {} to {}", terrain.min_height, terrain.max_height);
    println!("  Avg: {:.2}ms/chunk", terrain.avg_gen_time_us / 1000.0);

    let report = MetricsReportBuilder::new("determinism_worldtest")
        .result(TestResult::Pass)
        .terrain(terrain)
        .normals(NormalMetrics::from_stats(normal_stats, None))
        .duration(test_start.elapsed())
        .build();
    let path =
        PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("metrics/determinism_worldtest.json");
    MetricsSink::create(&path).unwrap().write(&report).unwrap();
}

#[test]
fn parallel_generation_matches_sequential() {
    // Palette population completes before the fan-out; workers only read it.
    let palette = Palette::create_default();
    let terrain_gen = generator();
    let positions = grid();

    let expected: Vec<String> = positions
        .iter()
        .map(|&pos| chunk_fingerprint(&terrain_gen.generate_chunk(&palette, pos).unwrap()))
        .collect();

    let per_worker = positions.len().div_ceil(WORKERS);
    let parallel: Vec<String> = thread::scope(|scope| {
        let handles: Vec<_> = positions
            .chunks(per_worker)
            .map(|batch| {
                let (palette, terrain_gen) = (&palette, &terrain_gen);
                scope.spawn(move || {
                    batch
                        .iter()
                        .map(|&pos| {
                            let chunk = terrain_gen.generate_chunk(palette, pos).unwrap();
                            chunk_fingerprint(&chunk)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(parallel, expected);
}
