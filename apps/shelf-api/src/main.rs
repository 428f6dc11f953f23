use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = shelf_api::Args::parse();
	shelf_api::run(args).await
}
