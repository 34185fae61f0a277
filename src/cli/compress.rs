//! Gallery image commands (`infocard image ...`).

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use infocard::{CompressOptions, compress_dir};

/// Supported `infocard image` subcommands.
#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Downscale and re-encode every image in a directory.
    Compress(ImageCompressArgs),
}

/// Arguments for `infocard image compress`.
#[derive(Args, Debug)]
pub struct ImageCompressArgs {
    /// Directory holding the source images.
    #[arg(long, default_value = "src/img")]
    pub input: PathBuf,
    /// Directory receiving the thumbnails.
    #[arg(short = 'o', long = "output", default_value = "src/img_thumb")]
    pub output: PathBuf,
    /// JPEG quality.
    #[arg(long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,
    /// Longest edge of a thumbnail in pixels.
    #[arg(
        long = "max-size",
        default_value_t = 800,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_size: u32,
}

/// Execute an image command.
pub fn handle(command: ImageCommand) -> Result<()> {
    match command {
        ImageCommand::Compress(args) => compress(args),
    }
}

fn compress(args: ImageCompressArgs) -> Result<()> {
    let options = CompressOptions {
        quality: args.quality,
        max_size: args.max_size,
    };
    let report = compress_dir(&args.input, &args.output, &options)?;
    println!(
        "Compressed {} image(s) into {}",
        report.written.len(),
        args.output.display()
    );
    if !report.is_success() {
        for failure in &report.failed {
            println!("  failed {}: {}", failure.path.display(), failure.reason);
        }
        bail!("{} image(s) could not be compressed", report.failed.len());
    }
    Ok(())
}
