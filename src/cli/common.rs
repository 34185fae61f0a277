//! Shared clap helper types for CLI commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use infocard::{CardSpec, FontLocator, FontRole, OverflowPolicy};

/// Font roles selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FontRoleArg {
    Title,
    Subtitle,
    Body,
    Small,
}

impl From<FontRoleArg> for FontRole {
    fn from(value: FontRoleArg) -> FontRole {
        match value {
            FontRoleArg::Title => FontRole::Title,
            FontRoleArg::Subtitle => FontRole::Subtitle,
            FontRoleArg::Body => FontRole::Body,
            FontRoleArg::Small => FontRole::Small,
        }
    }
}

/// Options that shape the card layout, shared by the card and font commands.
#[derive(Args, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// JSON file overriding any part of the default layout.
    #[arg(long)]
    pub layout: Option<PathBuf>,
    /// Extra directory to search for font files (repeatable, searched first).
    #[arg(long = "font-dir")]
    pub font_dirs: Vec<PathBuf>,
    /// Base URL encoded into the QR link (`?id=` is appended).
    #[arg(long = "base-url")]
    pub base_url: Option<String>,
    /// Also print the story field below the concept.
    #[arg(long = "include-story")]
    pub include_story: bool,
    /// Keep cards whose text runs into the code caption instead of failing them.
    #[arg(long = "allow-overflow")]
    pub allow_overflow: bool,
}

impl LayoutArgs {
    /// Defaults, then the layout file, then command-line overrides.
    pub fn load_spec(&self) -> Result<CardSpec> {
        let mut spec = match &self.layout {
            Some(path) => CardSpec::from_json_file(path)?,
            None => CardSpec::default(),
        };
        if let Some(url) = &self.base_url {
            spec.base_url = url.clone();
        }
        if self.include_story {
            spec.include_story = true;
        }
        if self.allow_overflow {
            spec.overflow = OverflowPolicy::Allow;
        }
        Ok(spec)
    }

    pub fn locator(&self) -> FontLocator {
        FontLocator::new(self.font_dirs.iter().cloned())
    }
}
