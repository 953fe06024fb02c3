//! CLI driver for devops benchmark query generation.
//!
//! Provides commands for generating query descriptors, listing the shape
//! catalog, and benchmarking the generator itself.

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use querygen::{DevopsGenerator, Dialect, DialectKind, FreeListPool, GeneratorConfig, Shape};
use tracing_subscriber::EnvFilter;

/// querygen — Reproducible devops benchmark queries for time-series databases.
#[derive(Parser)]
#[command(name = "querygen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Generate query descriptors and write them to stdout.
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Output format.
        #[arg(long, default_value = "jsonl")]
        format: OutputFormat,
    },

    /// List the shape catalog.
    Shapes,

    /// Time query generation.
    Bench {
        #[command(flatten)]
        run: RunArgs,
    },
}

/// Run parameters; flags override values from `--config`.
#[derive(clap::Args)]
struct RunArgs {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon start (RFC 3339).
    #[arg(long)]
    start: Option<String>,

    /// Horizon end (RFC 3339).
    #[arg(long)]
    end: Option<String>,

    /// Simulated host population size.
    #[arg(long)]
    scale_var: Option<usize>,

    /// Random seed; omit for a non-reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Target dialect (cassandra, timescaledb, influxdb).
    #[arg(long)]
    dialect: Option<String>,

    /// Shape name, e.g. "single-groupby-1-1-1" (see `querygen shapes`).
    #[arg(long)]
    shape: Option<String>,

    /// Number of queries.
    #[arg(long)]
    count: Option<u64>,
}

/// Output format for generated queries.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One JSON descriptor per line.
    Jsonl,
    /// One human-readable description per line.
    Summary,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate { run, format } => cmd_generate(run, &format),
        Commands::Shapes => cmd_shapes(),
        Commands::Bench { run } => cmd_bench(run),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Merges `--config` with flag overrides and validates the merged result once.
fn resolve_config(run: RunArgs) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &run.config {
        Some(path) => GeneratorConfig::read_json_file(path)?,
        None => GeneratorConfig {
            start: "2016-01-01T00:00:00Z".to_string(),
            end: "2016-01-02T00:00:00Z".to_string(),
            scale_var: 1,
            seed: None,
            dialect: DialectKind::Cassandra,
            shape: String::new(),
            count: 1000,
        },
    };

    if let Some(start) = run.start {
        config.start = start;
    }
    if let Some(end) = run.end {
        config.end = end;
    }
    if let Some(scale_var) = run.scale_var {
        config.scale_var = scale_var;
    }
    if run.seed.is_some() {
        config.seed = run.seed;
    }
    if let Some(dialect) = run.dialect {
        config.dialect = dialect.parse()?;
    }
    if let Some(shape) = run.shape {
        config.shape = shape;
    }
    if let Some(count) = run.count {
        config.count = count;
    }

    if config.shape.is_empty() {
        return Err("no shape given; pass --shape or set \"shape\" in --config".into());
    }
    config.validate()?;
    Ok(config)
}

fn build_generator(
    config: &GeneratorConfig,
) -> Result<DevopsGenerator<DialectKind>, Box<dyn std::error::Error>> {
    Ok(DevopsGenerator::from_horizon(
        config.horizon()?,
        config.dialect,
        config.rng(),
        FreeListPool::default(),
    ))
}

/// Implements `querygen generate`.
fn cmd_generate(run: RunArgs, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(run)?;
    let shape = config.shape()?;
    let mut generator = build_generator(&config)?;

    tracing::info!(
        shape = %shape,
        dialect = config.dialect.name(),
        scale_var = config.scale_var,
        count = config.count,
        seed = ?config.seed,
        "generating queries"
    );

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for _ in 0..config.count {
        let q = generator.dispatch(&shape, config.scale_var)?;
        match format {
            OutputFormat::Jsonl => {
                serde_json::to_writer(&mut out, &q)?;
                writeln!(out)?;
            }
            OutputFormat::Summary => writeln!(out, "{}", q.human_description)?,
        }
        generator.recycle(q);
    }

    out.flush()?;
    Ok(())
}

/// Implements `querygen shapes`.
#[allow(clippy::unnecessary_wraps)] // Uniform signature across commands
fn cmd_shapes() -> Result<(), Box<dyn std::error::Error>> {
    for shape in Shape::catalog() {
        println!("{:<24} {}", shape.to_string(), shape.kind());
    }
    Ok(())
}

/// Implements `querygen bench`.
#[allow(clippy::cast_precision_loss)] // Benchmark stats are fine with f64 precision
fn cmd_bench(run: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(run)?;
    let shape = config.shape()?;
    let mut generator = build_generator(&config)?;

    println!("querygen dispatch benchmark");
    println!("  Shape: {shape}");
    println!("  Dialect: {}", config.dialect);
    println!("  Scale var: {}", config.scale_var);
    println!("  Queries: {}", config.count);
    println!();

    let start = Instant::now();
    let mut hosts = 0usize;

    for _ in 0..config.count {
        let q = generator.dispatch(&shape, config.scale_var)?;
        hosts += q.host_count();
        generator.recycle(q);
    }

    let elapsed = start.elapsed();
    let ns_per_query = elapsed.as_nanos() as f64 / config.count as f64;
    let queries_per_sec = config.count as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Elapsed: {elapsed:.3?}");
    println!("  Avg latency: {ns_per_query:.1} ns/query");
    println!("  Throughput: {queries_per_sec:.0} queries/sec");
    println!("  Hosts sampled: {hosts}");
    println!();

    Ok(())
}
