//! LOS probe
//!
//! Builds the line-of-sight index from a zone layout and answers a single
//! query, printing the build summary along the way.
//!
//! Run with: cargo run -p void_los_probe -- --layout zones.toml --region 1 \
//!           --from 50 50 100 --to 150 50 100 --stats

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use void_los::{LosCheckManager, LosConfig, RayStats, RegionId, ZoneLayout};
use void_math::Vec3;

#[derive(Debug, Parser)]
#[command(name = "los-probe", version, about = "Query the line-of-sight index")]
#[command(allow_negative_numbers = true)]
struct Args {
    /// LOS configuration file; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zone layout file listing regions and their zones
    #[arg(long)]
    layout: PathBuf,

    /// Overrides `geometry.directory` from the configuration
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Region to query
    #[arg(long)]
    region: RegionId,

    /// Segment start
    #[arg(long, required = true, num_args = 3, value_names = ["X", "Y", "Z"])]
    from: Vec<f32>,

    /// Segment end
    #[arg(long, required = true, num_args = 3, value_names = ["X", "Y", "Z"])]
    to: Vec<f32>,

    /// Print ray traversal counters
    #[arg(long)]
    stats: bool,
}

/// `num_args = 3` guarantees exactly three coordinates
fn point(values: &[f32]) -> Vec3 {
    Vec3::new(values[0], values[1], values[2])
}

fn run(args: &Args) -> void_los::Result<bool> {
    let mut config = match &args.config {
        Some(path) => LosConfig::load(path)?,
        None => LosConfig::default(),
    };
    if let Some(dir) = &args.geometry {
        config = config.with_geometry_dir(dir);
    }
    let layout = ZoneLayout::load(&args.layout)?;

    let los = LosCheckManager::initialize(&config, &layout);
    println!("{}", los.report());

    if !los.has_region(args.region) {
        log::warn!("Region {} is not in the layout; nothing can block", args.region);
    }

    let from = point(&args.from);
    let to = point(&args.to);
    let mut stats = RayStats::new();
    let stats_out = args.stats.then_some(&mut stats);
    let blocked = los.test_collision(args.region, from, to, stats_out);

    println!(
        "region {} {:?} -> {:?}: {}",
        args.region,
        from.to_array(),
        to.to_array(),
        if blocked { "blocked" } else { "clear" }
    );
    if args.stats {
        println!("stats: {}", stats);
    }
    Ok(blocked)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let args = Args::parse();
    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
