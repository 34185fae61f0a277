//! Font discovery (`infocard font ...`).

use anyhow::Result;
use clap::{Args, Subcommand};
use infocard::FontRole;

use crate::cli::common::LayoutArgs;

/// Supported `infocard font` subcommands.
#[derive(Subcommand, Debug)]
pub enum FontCommand {
    /// Report which font file each card role resolves to.
    Probe(FontProbeArgs),
}

/// Arguments for `infocard font probe`.
#[derive(Args, Debug)]
pub struct FontProbeArgs {
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Execute a font command.
pub fn handle(command: FontCommand) -> Result<()> {
    match command {
        FontCommand::Probe(args) => probe(args),
    }
}

fn probe(args: FontProbeArgs) -> Result<()> {
    let spec = args.layout.load_spec()?;
    let locator = args.layout.locator();

    println!("Search directories:");
    for dir in locator.dirs() {
        let marker = if dir.is_dir() { "" } else { " (missing)" };
        println!("  {}{}", dir.display(), marker);
    }
    println!("Faces:");
    for role in FontRole::ALL {
        let size = spec.fonts.get(role);
        let face = locator.face(role.candidates(), size);
        let source = face
            .source()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in bitmap font".to_string());
        println!("  {:<8} {:>3}px  {}", role.to_string(), size, source);
    }
    Ok(())
}
