//! `infocard` commands: `card` renders and inspects info cards, `font`
//! reports which font files the card roles resolve to, and `image` builds
//! gallery thumbnails.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

pub mod card;
pub mod common;
pub mod compress;
pub mod font;
pub mod utils;

/// Parsed CLI entrypoint for the `infocard` binary.
#[derive(Parser, Debug)]
#[command(
    name = "infocard",
    version,
    about = "Exhibition info cards with QR links, plus gallery thumbnails"
)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Card(card::CardCommand),
    #[command(subcommand)]
    Font(font::FontCommand),
    #[command(subcommand)]
    Image(compress::ImageCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Card(cmd) => card::handle(cmd),
        Command::Font(cmd) => font::handle(cmd),
        Command::Image(cmd) => compress::handle(cmd),
    }
}
