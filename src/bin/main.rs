use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use contact_probability_rs::report::{write_contact_report, write_frames_in_range, write_residue_report};
use contact_probability_rs::{
    average_by_residue, compute_probabilities, load_inputs, resolve_q_values, write_q_values,
    AnalysisConfig, AnalysisError, DEFAULT_CUTOFF,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line tool for native contact probabilities along a folding trajectory
#[derive(Parser)]
#[command(name = "contact-probability")]
#[command(about = "Q values and conditional contact probabilities from MD trajectories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Path to the trajectory (.xtc, or multi-model .pdb)
    #[arg(short, long)]
    trajectory: PathBuf,

    /// Path to the contact list (SMOG contact file, or CSV with columns i, j)
    #[arg(short, long)]
    contacts: PathBuf,

    /// Number of residues in the protein; every frame must match it
    #[arg(short, long)]
    residues: usize,

    /// Distance at or below which a residue pair is in contact
    #[arg(long, default_value_t = DEFAULT_CUTOFF)]
    cutoff: f64,

    /// Maximum number of frames to read (default: all frames)
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Args)]
struct FilterArgs {
    /// Lowest Q value a frame may have (inclusive)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    q_low: i64,

    /// Highest Q value a frame may have (inclusive, default: no limit)
    #[arg(long, allow_hyphen_values = true)]
    q_high: Option<i64>,

    /// First frame to consider, 1-based (inclusive)
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    time_low: i64,

    /// Last frame to consider, 1-based (inclusive, default: last frame)
    #[arg(long, allow_hyphen_values = true)]
    time_high: Option<i64>,

    /// Precomputed Q values, one per line (default: computed from the trajectory)
    #[arg(long)]
    q_file: Option<PathBuf>,

    /// Output report path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the Q value of every frame and write one per line
    QValues {
        #[command(flatten)]
        input: InputArgs,

        /// Output Q file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Probability of each contact over frames in the Q and time ranges
    Probability {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Average contact probability of every residue over frames in the Q and time ranges
    Average {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

fn build_config(input: &InputArgs, filter: Option<&FilterArgs>) -> AnalysisConfig {
    let mut config = AnalysisConfig::new(input.residues).with_cutoff(input.cutoff);
    if let Some(filter) = filter {
        config = config
            .with_q_range(filter.q_low, filter.q_high.unwrap_or(i64::MAX))
            .with_time_range(filter.time_low, filter.time_high.unwrap_or(i64::MAX));
    }
    config
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, AnalysisError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| AnalysisError::resource(path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn report_error(path: Option<&Path>, e: io::Error) -> AnalysisError {
    AnalysisError::resource(path.unwrap_or(Path::new("<stdout>")), e)
}

fn run(cli: Cli) -> Result<(), AnalysisError> {
    match cli.command {
        Commands::QValues { input, output } => {
            let config = build_config(&input, None);
            info!("Reading trajectory: {:?}", input.trajectory);
            info!("Using contacts: {:?}", input.contacts);
            info!("Cutoff distance: {}", config.cutoff);

            let inputs = load_inputs(&input.trajectory, &input.contacts, &config, input.max_frames)?;
            let q_values = resolve_q_values(&inputs, &config, None)?;
            write_q_values(&output, &q_values)?;

            info!("✅ Calculated Q values for {} frames", q_values.len());
            info!("📄 Q values saved to: {:?}", output);
        }

        Commands::Probability { input, filter } => {
            let config = build_config(&input, Some(&filter));
            info!("Q range: {:?}, time range: {:?}", config.q_range, config.time_range);

            let inputs = load_inputs(&input.trajectory, &input.contacts, &config, input.max_frames)?;
            let q_values = resolve_q_values(&inputs, &config, filter.q_file.as_deref())?;
            let result = compute_probabilities(
                &inputs.trajectory,
                &inputs.contacts,
                &q_values,
                config.time_range,
                config.q_range,
                config.cutoff,
            );

            let target = filter.output.as_deref();
            let mut out = open_output(target)?;
            write_frames_in_range(&mut out, result.frames_in_range).map_err(|e| report_error(target, e))?;
            write_contact_report(&mut out, &result.records).map_err(|e| report_error(target, e))?;
            out.flush().map_err(|e| report_error(target, e))?;

            info!("✅ Reported {} contacts", result.records.len());
        }

        Commands::Average { input, filter } => {
            let config = build_config(&input, Some(&filter));
            info!("Q range: {:?}, time range: {:?}", config.q_range, config.time_range);

            let inputs = load_inputs(&input.trajectory, &input.contacts, &config, input.max_frames)?;
            let q_values = resolve_q_values(&inputs, &config, filter.q_file.as_deref())?;
            let result = compute_probabilities(
                &inputs.trajectory,
                &inputs.contacts,
                &q_values,
                config.time_range,
                config.q_range,
                config.cutoff,
            );
            let averages = average_by_residue(config.residue_count, &result.records);

            let target = filter.output.as_deref();
            let mut out = open_output(target)?;
            write_residue_report(&mut out, &averages).map_err(|e| report_error(target, e))?;
            out.flush().map_err(|e| report_error(target, e))?;

            info!("✅ Reported {} residues", averages.len());
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("❌ {}", e);
        std::process::exit(1);
    }
}
