mod cli;
mod converter;
mod epub_reader;
mod epub_writer;
mod flatten;
mod markup;
mod metadata;
mod reader;
#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use converter::Outcome;
use std::process;

fn main() -> Result<()> {
    init_tracing();

    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                print!("{}", err.render());
                process::exit(1);
            }
        },
    };

    if !cli.input.is_file() {
        println!("File not found: {}", cli.input.display());
        process::exit(1);
    }

    if let Outcome::Written(path) = converter::convert(&cli)? {
        println!("Flattened EPUB saved as: {}", path.display());
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();
}
