//! Card commands (`infocard card ...`).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use infocard::{FontRole, TextMeasure, load_faces, load_records, render_all, wrap_with};
use tracing::info;

use crate::cli::common::{FontRoleArg, LayoutArgs};
use crate::cli::utils::{read_text_arg, write_output};

/// Supported `infocard card` subcommands.
#[derive(Subcommand, Debug)]
pub enum CardCommand {
    /// Render one PNG card per work in a data file.
    Render(CardRenderArgs),
    /// Show how a piece of text wraps with a card font.
    Wrap(CardWrapArgs),
    /// Print the effective layout as JSON.
    Spec(CardSpecArgs),
}

/// Arguments for `infocard card render`.
#[derive(Args, Debug)]
pub struct CardRenderArgs {
    /// JSON array of works.
    #[arg(long, default_value = "data/works.json")]
    pub data: PathBuf,
    /// Directory receiving `<id>.png` files.
    #[arg(short = 'o', long = "output", default_value = "output")]
    pub output: PathBuf,
    /// Only render works with this id (repeatable).
    #[arg(long = "id")]
    pub ids: Vec<String>,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Arguments for `infocard card wrap`.
#[derive(Args, Debug)]
pub struct CardWrapArgs {
    /// Text to wrap.
    #[arg(long)]
    pub text: Option<String>,
    /// Read the text from a file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    /// Maximum line width in pixels (defaults to the card's text column).
    #[arg(long)]
    pub width: Option<u32>,
    /// Font role whose face and size are used for measuring.
    #[arg(long, default_value_t = FontRoleArg::Body, value_enum)]
    pub role: FontRoleArg,
    /// Font size in pixels (defaults to the role's size in the layout).
    #[arg(long)]
    pub size: Option<u32>,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Arguments for `infocard card spec`.
#[derive(Args, Debug)]
pub struct CardSpecArgs {
    /// Output file (`-` for stdout).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Execute a card command.
pub fn handle(command: CardCommand) -> Result<()> {
    match command {
        CardCommand::Render(args) => render(args),
        CardCommand::Wrap(args) => wrap(args),
        CardCommand::Spec(args) => spec(args),
    }
}

fn render(args: CardRenderArgs) -> Result<()> {
    let spec = args.layout.load_spec()?;
    let mut records = load_records(&args.data)?;
    if !args.ids.is_empty() {
        records.retain(|record| args.ids.iter().any(|id| *id == record.id));
        if records.is_empty() {
            bail!("no works in {} match the requested ids", args.data.display());
        }
    }
    info!(count = records.len(), data = %args.data.display(), "loaded works");

    let faces = load_faces(&spec, &args.layout.locator());
    let report = render_all(&records, &spec, &faces, &args.output)?;

    println!(
        "Rendered {} card(s) into {}",
        report.written.len(),
        args.output.display()
    );
    if !report.is_success() {
        for failure in &report.failed {
            println!("  failed {}: {}", failure.id, failure.reason);
        }
        bail!(
            "{} of {} card(s) failed",
            report.failed.len(),
            records.len()
        );
    }
    Ok(())
}

fn wrap(args: CardWrapArgs) -> Result<()> {
    let spec = args.layout.load_spec()?;
    let text = read_text_arg(args.text, args.from)?;
    let role: FontRole = args.role.into();
    let face = args
        .layout
        .locator()
        .face(role.candidates(), args.size.unwrap_or_else(|| spec.fonts.get(role)));
    let width = args.width.unwrap_or_else(|| spec.usable_width());

    let result = wrap_with(&face, &text, width)
        .with_context(|| format!("failed to wrap text with the {role} font"))?;
    for (idx, line) in result.iter().enumerate() {
        println!("{:>3} {:>5}px | {}", idx + 1, line.width, line.text);
    }
    println!(
        "{} line(s), {}px tall at {}px wide ({})",
        result.len(),
        result.height(face.line_height(), spec.line_spacing),
        width,
        face.source()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "built-in bitmap font".to_string())
    );
    Ok(())
}

fn spec(args: CardSpecArgs) -> Result<()> {
    let spec = args.layout.load_spec()?;
    let mut json = serde_json::to_string_pretty(&spec).context("failed to serialise layout")?;
    json.push('\n');
    write_output(&args.output, &json)
}
