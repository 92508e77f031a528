use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;

use helmsman::HelmConfig;
use helmsman::control::{TurnController, TurnOutcome};
use helmsman::drive::LoggingSink;
use helmsman::heading::{FeedEvent, HeadingEstimator, spawn_ingest};
use helmsman::sensor::{AngleSource, ReplaySource};

#[derive(Parser, Debug)]
#[command(name = "helmsman")]
#[command(about = "Heading estimation and turn control for a differential-drive robot", long_about = None)]
struct Args {
    /// Recorded heading trace to replay (one angle in degrees per line)
    #[arg(long, conflicts_with = "simulate")]
    replay: Option<PathBuf>,

    /// Drive the estimator from a synthetic compass (requires the
    /// `simulation` feature)
    #[arg(long)]
    simulate: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Turn toward this bearing (degrees) once the heading window is primed
    #[arg(short, long)]
    target: Option<f32>,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Heading output rate in Hz
    #[arg(long, default_value = "5.0")]
    output_rate: f32,

    /// Interval between replayed/simulated samples in milliseconds
    #[arg(long, default_value = "20.0")]
    sample_interval_ms: f32,

    /// Simulated compass: starting heading in degrees
    #[arg(long, default_value = "0.0")]
    sim_start: f32,

    /// Simulated compass: turn rate in degrees per sample
    #[arg(long, default_value = "1.0")]
    sim_rate: f32,

    /// Simulated compass: Gaussian noise standard deviation in degrees
    #[arg(long, default_value = "2.0")]
    sim_noise: f32,

    /// Simulated compass: number of samples before the source ends
    #[arg(long, default_value = "2000")]
    sim_samples: usize,

    /// Simulated compass: RNG seed
    #[arg(long, default_value = "7")]
    sim_seed: u64,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct HeadingRecord {
    ts: String,
    heading_deg: f32,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &args.config {
        Some(path) => HelmConfig::load(path)?,
        None => HelmConfig::default(),
    };

    let sample_interval = Duration::from_secs_f32(args.sample_interval_ms / 1000.0);
    let source = build_source(&args, sample_interval)?;

    println!("=== helmsman ===");
    println!("Window size: {} samples", config.filter.window_size);
    println!(
        "Turn tolerance: {:.1} deg, timeout: {:.1} s",
        config.turn.tolerance_deg, config.turn.timeout_secs
    );
    println!();

    let estimator = Arc::new(HeadingEstimator::new(config.filter.clone()));
    let handle = spawn_ingest(source, Arc::clone(&estimator));

    // Let a full window of real samples displace the zero priming before
    // trusting the estimate.
    std::thread::sleep(sample_interval * config.filter.window_size as u32);

    if let Some(target) = args.target {
        let mut sink = LoggingSink;
        let mut controller = TurnController::new(estimator.as_ref(), &mut sink, config.turn.clone());
        match controller.turn_to_heading(target, None)? {
            TurnOutcome::Settled => println!(
                "Settled at {:.1} deg (target {:.1})",
                estimator.current_heading(),
                target
            ),
            TurnOutcome::TimedOut => println!("Turn toward {:.1} deg timed out", target),
            TurnOutcome::Cancelled => println!("Turn toward {:.1} deg cancelled", target),
        }
    }

    let output_interval = Duration::from_secs_f32(1.0 / args.output_rate.max(0.1));
    let mut last_output = Instant::now() - output_interval;

    while !handle.is_finished() {
        for event in handle.events().try_iter() {
            let FeedEvent::Stall { waited } = event;
            log::warn!("Heading feed stalled for {:?}; estimate is stale", waited);
        }

        if last_output.elapsed() >= output_interval {
            print_heading(args.format, estimator.current_heading())?;
            last_output = Instant::now();
        }

        std::thread::sleep(output_interval.min(Duration::from_millis(50)));
    }

    handle.shutdown()?;
    print_heading(args.format, estimator.current_heading())?;
    Ok(())
}

fn build_source(args: &Args, interval: Duration) -> anyhow::Result<Box<dyn AngleSource>> {
    if let Some(path) = &args.replay {
        return Ok(Box::new(ReplaySource::open(path)?.paced(interval)));
    }

    if args.simulate {
        #[cfg(feature = "simulation")]
        {
            let compass = helmsman::simulation::SimulatedCompass::new(
                args.sim_start,
                args.sim_rate,
                args.sim_noise,
                args.sim_samples,
                args.sim_seed,
            )?
            .paced(interval);
            return Ok(Box::new(compass));
        }
        #[cfg(not(feature = "simulation"))]
        anyhow::bail!("--simulate requires building with the `simulation` feature");
    }

    anyhow::bail!("specify a heading source: --replay <file> or --simulate")
}

fn print_heading(format: OutputFormat, heading_deg: f32) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!(
                "{} heading {:>6.1} deg",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                heading_deg
            );
        }
        OutputFormat::Json => {
            let record = HeadingRecord {
                ts: chrono::Local::now().to_rfc3339(),
                heading_deg,
            };
            println!("{}", serde_json::to_string(&record)?);
        }
    }
    Ok(())
}
