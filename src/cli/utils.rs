//! Text input and output for the card commands.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// `-` stands for stdin or stdout.
fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Text given inline with `--text`, else read from `--from`, else from stdin.
pub fn read_text_arg(text: Option<String>, from: Option<PathBuf>) -> Result<String> {
    match (text, from) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) if !is_stdio(&path) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read text from {}", path.display())),
        (None, _) => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

/// Write `content` to `path`, or to stdout for `-`.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if is_stdio(path) {
        io::stdout()
            .write_all(content.as_bytes())
            .context("failed to write to stdout")?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
