//! kanakira font builder
//!
//! Reads a JSON config naming a Japanese font and a monospace Latin font,
//! and writes a new font where every Katakana carries its Romaji above it.

use std::path::PathBuf;

use clap::Parser;
use kanakira::{config::DEFAULT_CONFIG_FILE, Config, Error, RomajiTable};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The config file.
    #[arg(default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Write the font here instead of the config's output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the romanization of some Katakana text and exit
    #[arg(long, value_name = "TEXT")]
    romanize: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(text) = &args.romanize {
        println!("{}", RomajiTable::hepburn().romanize(text));
        return;
    }

    if let Err(e) = build(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn build(args: &Args) -> Result<(), Error> {
    let mut config = Config::load(&args.config)?;
    if let Some(output) = &args.output {
        config.fonts.output = output.clone();
    }
    kanakira::run(&config)?;
    Ok(())
}
