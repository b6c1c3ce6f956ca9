#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::style)]

use clap::Parser;
use raylink::cli::{Args, DEFAULT_LINK_OUTPUT};
use raylink::generator::{Generator, generate_from_link, write_config};
use tracing::Level;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let is_verbose = args.verbose;
    tracing_subscriber::fmt()
        .with_max_level(if is_verbose {
            Level::TRACE
        } else {
            Level::INFO
        })
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let path = if let Some(link) = args.link.as_deref() {
        let config = generate_from_link(link, args.inbound_port)?;
        let output = args.output.as_deref().unwrap_or(DEFAULT_LINK_OUTPUT);
        write_config(&config, output).await?
    } else if let Some(source) = args.generator.as_deref() {
        tracing::info!("Loading generator config from: {}", source);
        let generator = Generator::load(source).await?;
        generator.generate_to_file(args.output.as_deref()).await?
    } else {
        anyhow::bail!("Either --link or --generator is required");
    };

    tracing::info!("Config generation complete: {}", path.display());
    Ok(())
}
