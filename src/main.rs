//! Command-line wavetable converter
//!
//! Usage:
//!   stratum-wavetable [--global] [--flip] [--average | --crop] [--wavelength N]
//!                     [--format float32|int16] [--no-thumb] [--jobs N] [--json] <file>...
//!
//! Each input is converted to `<stem>_mw.wav` beside it. Several inputs are
//! converted in parallel; each file's pipeline is single-threaded. Inputs
//! whose outputs would overwrite an earlier input's are skipped and reported
//! as failures. Reports are printed as each file finishes, so their order
//! follows completion, not the command line.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use rayon::prelude::*;
use stratum_wavetable::config::DEFAULT_WAVELENGTH;
use stratum_wavetable::io::paths::check_collisions;
use stratum_wavetable::{
    convert_file, ConversionConfig, ConversionError, ConversionResult, NormalizationMode,
    OutputFormat, ReductionMode,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// 32-bit float samples
    Float32,
    /// 16-bit integer samples
    Int16,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Float32 => OutputFormat::Float32,
            FormatArg::Int16 => OutputFormat::Int16,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stratum-wavetable")]
#[command(about = "Converts audio files into 64-wave wavetables", long_about = None)]
struct Args {
    /// Normalize the whole table to its loudest sample instead of each wave
    #[arg(long)]
    global: bool,

    /// Reverse the wave order in the wavetable
    #[arg(long)]
    flip: bool,

    /// Sum groups of waves instead of picking every Nth wave
    #[arg(long)]
    average: bool,

    /// Keep the first 64 waves only (takes precedence over --average)
    #[arg(long)]
    crop: bool,

    /// Samples per wave
    #[arg(long, default_value_t = DEFAULT_WAVELENGTH)]
    wavelength: usize,

    /// Output sample format
    #[arg(long, value_enum, default_value_t = FormatArg::Float32)]
    format: FormatArg,

    /// Skip the thumbnail image
    #[arg(long)]
    no_thumb: bool,

    /// Parallel workers (default: CPU-1)
    #[arg(long)]
    jobs: Option<usize>,

    /// Emit one JSON object per file (JSONL) on stdout
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Audio files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Args {
    fn config(&self) -> ConversionConfig {
        ConversionConfig {
            wavelength: self.wavelength,
            reduction: ReductionMode::from_flags(self.crop, self.average),
            normalization: if self.global {
                NormalizationMode::Global
            } else {
                NormalizationMode::Local
            },
            flip: self.flip,
            output_format: self.format.into(),
            thumbnail: !self.no_thumb,
            ..Default::default()
        }
    }
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_human(result: &ConversionResult) {
    let m = &result.metadata;
    eprintln!(
        "{}: {} samples at {} Hz, max excursion {:.4}",
        result.input.display(),
        m.input_samples,
        result.sample_rate,
        result.source_peak
    );
    println!(
        "{}: reduced by factor {} to {} waves ({} reduction, {} normalization{})",
        result.output.display(),
        m.reduction_factor.unwrap_or(1),
        m.waves_out,
        m.reduction.name(),
        m.normalization.name(),
        if m.flipped { ", flipped" } else { "" }
    );
    if let Some(thumb) = &result.thumbnail {
        eprintln!("{}: thumbnail written", thumb.display());
    }
}

/// Print one file's outcome as soon as it is known
fn report(path: &Path, outcome: &Result<ConversionResult, ConversionError>, json: bool) {
    match outcome {
        Ok(result) if json => println!("{}", json_line(result)),
        Ok(result) => print_human(result),
        Err(e) => {
            if json {
                println!(
                    "{}",
                    json_line(&serde_json::json!({
                        "file": path,
                        "error": e.to_string(),
                    }))
                );
            }
            eprintln!("{}: {}", path.display(), e);
        }
    }
}

fn json_line<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config();
    if let Err(e) = config.validate() {
        eprintln!("ERROR: {}", e);
        return ExitCode::from(2);
    }

    let jobs = args.jobs.map(|j| j.max(1)).unwrap_or_else(default_jobs);
    log::debug!("Batch: {} files, jobs={}", args.files.len(), jobs);

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("ERROR: failed to build thread pool: {}", e);
            return ExitCode::from(2);
        }
    };

    let checks = check_collisions(&args.files, config.thumbnail);

    let t0 = Instant::now();
    let failures = pool.install(|| {
        args.files
            .par_iter()
            .zip(checks.into_par_iter())
            .map(|(path, check)| {
                let outcome = check.and_then(|()| convert_file(path, &config));
                report(path, &outcome, args.json);
                outcome.is_ok()
            })
            .filter(|ok| !ok)
            .count()
    });

    log::info!(
        "Done: ok={}/{} wall={:.0}ms",
        args.files.len() - failures,
        args.files.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
