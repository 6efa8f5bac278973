//! Replays recorded perception output through the alertness monitor.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use driver_alertness::{
    config::{Config, EXAMPLE_CONFIG},
    monitor::{DriverMonitor, FrameInput, FrameReport},
};
use log::{info, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file with one frame per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// PnP solver override (iterative, opencv)
    #[arg(short, long)]
    solver: Option<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print an example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    info!("Driver Alertness Monitor");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {path}");
            Config::from_file(path).with_context(|| format!("loading {path}"))?
        }
        None => Config::default(),
    };
    if let Some(solver) = args.solver {
        config.head_pose.solver = solver;
    }
    config.validate().context("invalid configuration")?;

    let mut monitor = DriverMonitor::from_config(&config)?;

    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input).with_context(|| format!("opening {}", args.input))?;
        Box::new(BufReader::new(file))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping line {}: {e}", line_no + 1);
                skipped += 1;
                continue;
            }
        };

        let report = monitor.process_frame(&frame);
        write_report(&mut out, &report, args.format)?;
    }

    info!(
        "Processed {} frames ({} skipped)",
        monitor.frames_processed(),
        skipped
    );
    Ok(())
}

fn write_report(out: &mut impl Write, report: &FrameReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(report)?)?,
        OutputFormat::Text => writeln!(
            out,
            "t={:>9.3}  blink={:.2}  head={:.2} (pitch {:>6.1}, yaw {:>6.1}, roll {:>6.1})  alertness={:.2}  {}",
            report.timestamp,
            report.blink_score,
            report.head.score,
            report.head.pitch,
            report.head.yaw,
            report.head.roll,
            report.alertness_score,
            report.state
        )?,
    }
    Ok(())
}
