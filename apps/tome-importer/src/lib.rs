use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tracing_subscriber::EnvFilter;

use tome_domain::catalog::BookRecord;
use tome_service::RecommendService;
use tome_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = tome_cli::VERSION,
	rename_all = "kebab",
	styles = tome_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON file holding an array of catalog records.
	#[arg(long, short = 'b', value_name = "FILE")]
	pub catalog: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = tome_config::load(&args.config)?;

	init_tracing(&config);

	let records = read_catalog(&args.catalog)?;

	tracing::info!(total = records.len(), catalog = %args.catalog.display(), "Catalog loaded.");

	let store = QdrantStore::new(&config.storage.qdrant)?;
	let service = RecommendService::new(config, store);
	let report = service.import_catalog(&records).await?;

	for error in &report.errors {
		tracing::warn!(%error, "Record skipped.");
	}

	tracing::info!(
		total = report.total,
		success_count = report.success_count,
		error_count = report.error_count,
		"Import finished."
	);

	Ok(())
}

fn read_catalog(path: &Path) -> color_eyre::Result<Vec<BookRecord>> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read catalog file {}.", path.display()))?;
	let records: Vec<BookRecord> = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse catalog file {}.", path.display()))?;

	Ok(records)
}

fn init_tracing(config: &tome_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
