use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = notes_bot::Args::parse();

	notes_bot::run(args).await
}
