use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = turnover_sync::Args::parse();

	turnover_sync::run(args).await
}
