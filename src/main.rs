use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

mod app;
mod audio;
mod config;
mod error;
mod library;
mod playback;
mod runtime;
mod ui;

#[derive(Parser)]
#[command(name = "cueloop", version)]
#[command(about = "A terminal cue player: one cue at a time, each looping until stopped")]
struct Args {
    /// Audio files and/or folders to load at startup
    paths: Vec<PathBuf>,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    runtime::run(&args.paths, args.config.as_deref())
}
