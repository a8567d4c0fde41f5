//! voxelcore - deterministic procedural voxel chunks
//!
//! Debug driver: generates one chunk from a config file and prints a
//! heightmap, a single column or chunk statistics.
//!
//! Usage:
//!   voxelcore heightmap --seed 12345 --chunk 0,0
//!   voxelcore column --x 10 --z 20 --config config/voxelcore.toml
//!   voxelcore stats --metrics target/metrics/stats.json

mod config;
mod debug;

use anyhow::{anyhow, bail, Context, Result};
use config::VoxelCoreConfig;
use std::{
    env,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::info;
use voxelcore_testkit::{
    MetricsReportBuilder, MetricsSink, NormalMetrics, TerrainMetricsCollector, TestResult,
};
use voxelcore_world::{ChunkPos, NormalStats, VoxelChunk, CHUNK_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Heightmap,
    Column { x: usize, z: usize },
    Stats,
    Help,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Heightmap => "heightmap",
            Command::Column { .. } => "column",
            Command::Stats => "stats",
            Command::Help => "help",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Command,
    config: Option<PathBuf>,
    chunk: Option<ChunkPos>,
    seed: Option<u32>,
    metrics: Option<PathBuf>,
}

fn parse_chunk(value: &str) -> Result<ChunkPos> {
    let (x, z) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("--chunk format: x,z"))?;
    let x = x.trim().parse().with_context(|| format!("Invalid chunk x: {x}"))?;
    let z = z.trim().parse().with_context(|| format!("Invalid chunk z: {z}"))?;
    Ok(ChunkPos::new(x, z))
}

fn parse_local(flag: &str, value: &str) -> Result<usize> {
    let v: usize = value
        .parse()
        .with_context(|| format!("Invalid {flag}: {value}"))?;
    if v >= CHUNK_SIZE {
        bail!("{flag} must be below {CHUNK_SIZE}, got {v}");
    }
    Ok(v)
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let Some(command) = args.next() else {
            return Ok(Self::help());
        };

        let mut opts = Self::help();
        let mut column_x = None;
        let mut column_z = None;

        while let Some(arg) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("{arg} requires an argument"))
            };
            match arg.as_str() {
                "--config" => opts.config = Some(PathBuf::from(value()?)),
                "--chunk" => opts.chunk = Some(parse_chunk(&value()?)?),
                "--seed" => {
                    let raw = value()?;
                    opts.seed = Some(raw.parse().with_context(|| format!("Invalid seed: {raw}"))?);
                }
                "--metrics" => opts.metrics = Some(PathBuf::from(value()?)),
                "--x" => column_x = Some(parse_local("--x", &value()?)?),
                "--z" => column_z = Some(parse_local("--z", &value()?)?),
                _ => bail!("Unknown option: {arg}"),
            }
        }

        opts.command = match command.as_str() {
            "heightmap" => Command::Heightmap,
            "column" => Command::Column {
                x: column_x.ok_or_else(|| anyhow!("column requires --x"))?,
                z: column_z.ok_or_else(|| anyhow!("column requires --z"))?,
            },
            "stats" => Command::Stats,
            "help" | "--help" | "-h" => Command::Help,
            other => bail!("Unknown command: {other}\nRun 'voxelcore help' for usage"),
        };
        Ok(opts)
    }

    fn help() -> Self {
        Self {
            command: Command::Help,
            config: None,
            chunk: None,
            seed: None,
            metrics: None,
        }
    }
}

fn print_help() {
    println!("voxelcore - voxel chunk generation debugging utility");
    println!();
    println!("Usage:");
    println!("  voxelcore <command> [options]");
    println!();
    println!("Commands:");
    println!("  heightmap          Visualize the chunk heightmap (ASCII art)");
    println!("  column             List materials and normals of one column");
    println!("  stats              Material histogram and normal counts");
    println!("  help               Show this help message");
    println!();
    println!("Options:");
    println!("  --config <file>    TOML config (default: {})", config::DEFAULT_CONFIG_PATH);
    println!("  --chunk <x,z>      Chunk to generate (overrides config)");
    println!("  --seed <number>    Noise seed (overrides config)");
    println!("  --x <n> --z <n>    Local column for 'column'");
    println!("  --metrics <file>   Write a JSON metrics report");
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var).
    // Logs go to stderr; stdout carries only command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = CliOptions::parse(env::args().skip(1))?;
    if cli.command == Command::Help {
        print_help();
        return Ok(());
    }
    run(cli)
}

fn run(cli: CliOptions) -> Result<()> {
    let started = Instant::now();

    let mut cfg = match &cli.config {
        Some(path) => VoxelCoreConfig::load_from_path(path),
        None => VoxelCoreConfig::load(),
    };
    if let Some(seed) = cli.seed {
        cfg.noise.seed = seed;
    }
    if let Some(pos) = cli.chunk {
        cfg.chunk = [pos.x, pos.z];
    }

    let palette = cfg.build_palette()?;
    let generator = cfg.generator();
    let chunk_pos = cfg.chunk_pos();
    info!(%chunk_pos, seed = cfg.noise.seed, "generating chunk");

    let mut chunk = VoxelChunk::new();
    let gen_started = Instant::now();
    let heightmap = generator.fill_chunk(&mut chunk, &palette, chunk_pos)?;
    let gen_elapsed = gen_started.elapsed();

    let normals_started = Instant::now();
    chunk.recompute_normals();
    let normals_elapsed = normals_started.elapsed();

    match cli.command {
        Command::Heightmap => print!("{}", debug::render_heightmap(&heightmap)),
        Command::Column { x, z } => print!("{}", debug::describe_column(&chunk, &palette, x, z)?),
        Command::Stats => print!("{}", debug::ChunkStats::collect(&chunk, &palette)?.render()),
        Command::Help => print_help(),
    }

    if let Some(path) = &cli.metrics {
        let mut collector = TerrainMetricsCollector::new();
        collector.record(&chunk, &heightmap, &palette, gen_elapsed);
        let stats = NormalStats::tally(chunk.materials(), chunk.normals()?);

        let mut report = MetricsReportBuilder::new(format!("voxelcore_{}", cli.command.name()))
            .result(TestResult::Pass)
            .normals(NormalMetrics::from_stats(stats, Some(micros(normals_elapsed))))
            .duration(started.elapsed());
        if let Some(terrain) = collector.finish() {
            report = report.terrain(terrain);
        }

        MetricsSink::create(path)?.write(&report.build())?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}

fn micros(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_args_is_help() {
        assert_eq!(parse(&[]).unwrap().command, Command::Help);
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
    }

    #[test]
    fn parses_flags() {
        let opts = parse(&[
            "stats",
            "--chunk",
            "-3, 7",
            "--seed",
            "99",
            "--config",
            "a.toml",
            "--metrics",
            "m.json",
        ])
        .unwrap();
        assert_eq!(opts.command, Command::Stats);
        assert_eq!(opts.chunk, Some(ChunkPos::new(-3, 7)));
        assert_eq!(opts.seed, Some(99));
        assert_eq!(opts.config, Some(PathBuf::from("a.toml")));
        assert_eq!(opts.metrics, Some(PathBuf::from("m.json")));
    }

    #[test]
    fn column_needs_coordinates() {
        assert_eq!(
            parse(&["column", "--x", "1", "--z", "63"]).unwrap().command,
            Command::Column { x: 1, z: 63 }
        );
        assert!(parse(&["column", "--x", "1"]).is_err());
        assert!(parse(&["column", "--x", "64", "--z", "0"]).is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["dance"]).is_err());
        assert!(parse(&["stats", "--seed"]).is_err());
        assert!(parse(&["stats", "--seed", "-1"]).is_err());
        assert!(parse(&["stats", "--chunk", "1"]).is_err());
        assert!(parse(&["stats", "--verbose"]).is_err());
    }
}
