use std::path::PathBuf;

use clap::Parser;
use skintone_triage::intake::collect_files;
use skintone_triage::{AppError, Configuration, TriageCoordinator, TriageRecord};
use tracing_subscriber::EnvFilter;

/// Ranks image files by how much skin tone they contain.
#[derive(Debug, Parser)]
#[command(name = "skintone-triage", version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON object per tagged file.
    #[arg(long)]
    json: bool,

    /// Scan each image on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Files or directories to triage.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_record(record: &TriageRecord, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string(record)?);
    } else {
        println!(
            "{}  {} ({})",
            record.tag,
            record.path.display(),
            record.signature.name()
        );
        println!("{}\n", record.comment);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let configuration = Configuration::load(cli.config.as_deref())?;
    init_logging(&configuration.log_level);

    let mut builder = TriageCoordinator::builder(configuration);
    if cli.sequential {
        builder = builder.parallel(false);
    }
    let coordinator = builder.build()?;

    let cancel_token = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling triage job");
            cancel_token.cancel();
        }
    });

    let files = collect_files(&cli.paths).await;
    let summary = coordinator.run(files).await;
    for record in &summary.records {
        print_record(record, cli.json)?;
    }

    if let Some(report) = coordinator.finish()
        && !cli.json
    {
        println!("{}", report);
    }
    Ok(())
}
