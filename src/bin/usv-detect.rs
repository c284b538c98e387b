//! usv-detect CLI
//!
//! Usage:
//!   usv-detect detect [--config cfg.json] [--jobs N] [--out-dir DIR] <audio>...
//!   usv-detect score --provided P --detected D --fs FS [--json]
//!
//! Notes:
//! - `detect` parallelizes across files. Default workers: (available CPU threads - 1).
//! - Each recording's labels are written to `<stem>.txt` next to it, or into `--out-dir`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use usv_detect::labels::text_format::write_detected_labels;
use usv_detect::{decode_audio, score_label_files, DetectionError, Detector, DetectorConfig};

#[derive(Parser)]
#[command(
    name = "usv-detect",
    about = "Detect ultrasonic vocalizations and score label files",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect vocalizations in audio files
    Detect {
        /// Detector configuration (JSON); defaults to the PSD detector
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parallel workers (default: CPU-1)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Directory for label files (default: next to each input)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Audio files to analyze
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Score a detected label file against a provided one
    Score {
        /// Reference (annotated) label file
        #[arg(short, long)]
        provided: PathBuf,

        /// Detector output label file
        #[arg(short, long)]
        detected: PathBuf,

        /// Sample rate used to derive label indices
        #[arg(long)]
        fs: f64,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn label_path(input: &Path, out_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".txt");
    match out_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn detect_file(
    detector: &Detector,
    input: &Path,
    out_dir: Option<&Path>,
) -> Result<(PathBuf, usize), DetectionError> {
    let signal = decode_audio(input)?;
    let labels = detector.detect(&signal)?;
    let out = label_path(input, out_dir);
    write_detected_labels(&out, &labels)?;
    Ok((out, labels.len()))
}

fn run_detect(
    config: Option<PathBuf>,
    jobs: Option<usize>,
    out_dir: Option<PathBuf>,
    inputs: Vec<PathBuf>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };
    let detector = Detector::new(config)?;

    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)?;
    }

    let jobs = jobs.map(|j| j.max(1)).unwrap_or_else(default_jobs);
    log::info!(
        "Batch: {} files, method={}, jobs={}",
        inputs.len(),
        detector.config().method(),
        jobs
    );

    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let t0 = Instant::now();
    let results: Vec<(PathBuf, Result<(PathBuf, usize), DetectionError>)> = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| (input.clone(), detect_file(&detector, input, out_dir.as_deref())))
            .collect()
    });

    let mut all_ok = true;
    for (input, result) in &results {
        match result {
            Ok((out, count)) => {
                println!("{}\t{} labels\t{}", input.display(), count, out.display())
            }
            Err(e) => {
                all_ok = false;
                eprintln!("{}\tERROR: {}", input.display(), e);
            }
        }
    }

    log::info!(
        "Processed {} files in {:.2}s",
        results.len(),
        t0.elapsed().as_secs_f64()
    );

    Ok(all_ok)
}

fn run_score(
    provided: PathBuf,
    detected: PathBuf,
    fs: f64,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let stats = score_label_files(&provided, &detected, fs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Provided labels: {}", stats.total_provided);
        println!("Detected labels: {}", stats.total_detected);
        println!("True positives:  {}", stats.true_positives);
        println!("False positives: {}", stats.false_positives);
        println!("False negatives: {}", stats.false_negatives);
        println!("Precision:       {:.4}", stats.precision);
        println!("Recall:          {:.4}", stats.recall);
        println!("F1 score:        {:.4}", stats.f1_score);
    }

    Ok(true)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Detect {
            config,
            jobs,
            out_dir,
            inputs,
        } => run_detect(config, jobs, out_dir, inputs),
        Commands::Score {
            provided,
            detected,
            fs,
            json,
        } => run_score(provided, detected, fs, json),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(2)
        }
    }
}
