use anyhow::Context;
use clap::Parser;
use equity_merge::MergeProcessor;
use equity_merge::cli::Args;
use std::process;
use tracing::debug;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    match run(&args) {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.to_config();
    let mut processor =
        MergeProcessor::new(config).context("Failed to prepare equity merge")?;
    let stats = processor
        .process()
        .with_context(|| format!("Failed to merge {}", args.input_dir.display()))?;

    debug!(
        "Processed {} files into {} records in {}ms",
        stats.files_processed, stats.total_records, stats.processing_time_ms
    );
    Ok(())
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("equity_merge={}", args.log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}
