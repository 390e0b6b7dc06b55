use anyhow::Result;
use bedit::{App, Config, StdConsole};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bedit")]
#[command(about = "A line-numbered, BASIC-style text editor")]
#[command(version)]
struct Cli {
    /// File to edit (starts an unnamed buffer if omitted)
    path: Option<PathBuf>,

    /// Spacing between line numbers when the file is loaded
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    gap: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Stay quiet on the terminal unless RUST_LOG asks for more
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Warn);
    }
    logger.init();

    let cli = Cli::parse();

    let mut config = Config::load().await;
    if let Some(gap) = cli.gap {
        config.editor.gap = gap;
    }

    println!("Welcome to BEdit v{}", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(&config, StdConsole::new());
    if let Some(path) = cli.path {
        app.open(path).await;
    } else {
        log::info!("No file specified, starting with empty buffer");
    }

    if let Err(err) = app.run().await {
        eprintln!("Input error: {}", err);
        log::error!("Application error: {:#}", err);
    }

    Ok(())
}
