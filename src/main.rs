use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use dtwarp_core::{Dtw, FeatureSequence};
use dtwarp_io::{AlignmentReport, FeatureReader, ResultWriter, RunName};

#[derive(Parser)]
#[command(name = "dtwarp")]
#[command(about = "Banded Dynamic Time Warping alignment of multivariate feature sequences")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Align two feature CSV files and print the optimal path
    Align {
        /// CSV file for the first sequence (one frame per row)
        #[arg(long)]
        seq1: PathBuf,

        /// CSV file for the second sequence (one frame per row)
        #[arg(long)]
        seq2: PathBuf,

        /// Multiplier applied to the diagonal predecessor
        #[arg(long, default_value_t = 1.0)]
        w_diag: f32,

        /// Sakoe-Chiba band window (-1 = unconstrained)
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        band_win: i64,

        /// Treat the first row of each CSV as a header
        #[arg(long, default_value_t = false)]
        header: bool,

        /// Output directory for the alignment artifact
        #[arg(long, requires = "run")]
        output_dir: Option<PathBuf>,

        /// Run name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long, requires = "output_dir")]
        run: Option<String>,

        /// Omit the per-step path from stdout
        #[arg(long, default_value_t = false)]
        summary_only: bool,
    },

    /// Print version and shared-library information
    Info,
}

#[derive(Serialize)]
struct AlignOutput {
    seq1: String,
    seq2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    artifact: Option<String>,
    #[serde(flatten)]
    report: AlignmentReport,
}

#[derive(Serialize)]
struct InfoOutput {
    name: &'static str,
    version: &'static str,
    library: String,
    symbols: [&'static str; 3],
}

fn read_sequence(path: &Path, header: bool) -> Result<FeatureSequence> {
    FeatureReader::new(path)
        .with_header(header)
        .read()
        .with_context(|| format!("failed to read features from {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Align {
            seq1,
            seq2,
            w_diag,
            band_win,
            header,
            output_dir,
            run,
            summary_only,
        } => {
            let dtw = Dtw::from_raw(w_diag, band_win).context("invalid alignment parameters")?;

            // Validate the run name before doing any work
            let writer = match (output_dir, run) {
                (Some(dir), Some(run)) => {
                    let run = RunName::new(run).context("invalid run name")?;
                    Some(ResultWriter::new(&dir, run).context("failed to prepare output directory")?)
                }
                _ => None,
            };

            let a = read_sequence(&seq1, header)?;
            let b = read_sequence(&seq2, header)?;
            info!(
                n1 = a.len(),
                n2 = b.len(),
                dim = a.dim(),
                band = %dtw.constraint(),
                w_diag = dtw.diagonal_weight(),
                "aligning"
            );

            let alignment = match dtw.compute_path(a.as_view(), b.as_view()) {
                Ok(alignment) => alignment,
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "band too narrow");
                    return Err(anyhow::Error::new(e)
                        .context("alignment failed; widen --band-win or pass -1"));
                }
                Err(e) => return Err(e).context("alignment failed"),
            };

            let report = AlignmentReport::new(&dtw, a.as_view(), b.as_view(), &alignment);
            let artifact = writer
                .map(|w| w.write_alignment(&report))
                .transpose()
                .context("failed to write alignment artifact")?;

            info!(
                path_length = report.path_length,
                total_cost = report.total_cost,
                "alignment complete"
            );

            let output = AlignOutput {
                seq1: seq1.display().to_string(),
                seq2: seq2.display().to_string(),
                artifact: artifact.map(|p| p.display().to_string()),
                report: if summary_only { report.without_path() } else { report },
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Info => {
            let output = InfoOutput {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
                library: dtwarp_ffi::library_file_name(),
                symbols: ["dtw_compute_path", "dtw_release_path", "dtw_status_message"],
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
