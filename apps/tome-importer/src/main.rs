use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = tome_importer::Args::parse();

	tome_importer::run(args).await
}
