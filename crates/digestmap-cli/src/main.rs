//! digestmap: print chunked fingerprints of the files in a directory

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use digestmap_cli::logging::setup_logging;
use digestmap_core::pipeline::DEFAULT_WORKERS;
use digestmap_core::PipelineConfig;

#[derive(Parser)]
#[command(name = "digestmap")]
#[command(author, version, about = "Returns the chunked md5 fingerprint of the files in a directory, or of a single file", long_about = None)]
struct Cli {
    /// Path to a directory or file
    path: PathBuf,

    /// Number of concurrent digest workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Measure total working time and average number of live tasks
    #[arg(short, long)]
    profiling: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = PipelineConfig::new().with_workers(cli.workers);
    let mut stdout = std::io::stdout().lock();

    if digestmap_cli::run(&cli.path, &config, cli.profiling, &mut stdout).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
