//! lw-analyze — analyze web server access logs from the command line.
//!
//! Reports go to stdout (or `--output`); progress and diagnostics go to
//! stderr through tracing, so piped output stays clean.

use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lw_analyze::cli::{Cli, OutputFormat};
use lw_analyze::render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --quiet drops the progress chatter.
    let default_level = if cli.quiet { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = cli.engine_config()?;
    tracing::info!(path = %cli.logfile.display(), "analyzing log file");

    let started = Instant::now();
    let output = lw_engine::analyze_file(&cli.logfile, &config).await?;
    tracing::info!(
        parsed = output.parsing_stats.parsed_count,
        errors = output.parsing_stats.error_count,
        elapsed = %render::format_duration(started.elapsed().as_secs_f64()),
        "analysis complete"
    );

    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&output)?,
        OutputFormat::Text => render::render_text(&output),
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            tracing::info!(path = %path.display(), "report saved");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
