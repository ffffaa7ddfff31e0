use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ocean_cmd::config::DeflateConfig;
use ocean_cmd::{combine, deflate, gather};

#[derive(Parser, Debug)]
#[command(name = "ocean")]
#[command(version)]
#[command(about = "Post-processing command processor for NEMO/FVCOM ocean-model runs")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Deflate variables in netCDF files using Lempel-Ziv compression
    ///
    /// Converts files to netCDF-4 format; each deflated file replaces the
    /// original file. Effectively `ncks -4 -L4 -O FILEPATH FILEPATH` for
    /// each FILEPATH, with a bounded number of concurrent ncks processes.
    Deflate {
        /// Paths/names of the netCDF files to deflate
        #[arg(required = true, value_name = "FILEPATH")]
        filepaths: Vec<PathBuf>,

        /// Maximum number of concurrent deflation processes
        #[arg(
            short,
            long,
            default_value_t = default_jobs(),
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        jobs: u64,
    },

    /// Combine per-processor results files from an MPI run into single files
    ///
    /// Runs the model's rebuild_nemo tool for each set of per-processor
    /// results files in the current directory, then deletes the
    /// per-processor files.
    Combine {
        /// Path/name of the run description YAML file
        #[arg(value_name = "RUN_DESC_FILE")]
        run_desc_file: PathBuf,
    },

    /// Gather results files from a run into a results directory
    ///
    /// Moves the results files, run description, namelists, and other
    /// run-defining files from the current directory into RESULTS_DIR,
    /// creating it if necessary, and deletes leftover symbolic links.
    Gather {
        /// Directory to store results into
        #[arg(value_name = "RESULTS_DIR")]
        results_dir: PathBuf,
    },
}

fn default_jobs() -> u64 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u64)
        .unwrap_or(1)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cwd = std::env::current_dir()?;

    match args.command {
        Commands::Deflate { filepaths, jobs } => {
            let config = DeflateConfig::default();
            deflate::deflate(&filepaths, jobs as usize, &config).await?;
        }
        Commands::Combine { run_desc_file } => {
            combine::combine(&cwd, &run_desc_file).await?;
        }
        Commands::Gather { results_dir } => {
            gather::gather(&cwd, &results_dir)?;
        }
    }

    Ok(())
}
