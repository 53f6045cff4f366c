use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for hexdoc
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "hexdoc: web books for Minecraft Patchouli books"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the hexdoc CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render the book in every language into the output directory.
  Build {
    /// Render a released version instead of the unreleased docs of a branch.
    #[arg(long)]
    release: bool,

    /// Branch name for unreleased docs. Defaults to the configured branch.
    #[arg(long)]
    branch: Option<String>,

    /// Languages to render (can be specified multiple times). Defaults to
    /// the configured languages, or every language with a lang file.
    #[arg(short, long = "lang", action = clap::ArgAction::Append)]
    langs: Vec<String>,
  },

  /// Merge rendered books into the versioned site and rebuild its sitemap.
  Merge {
    /// Refuse to overwrite any existing rendered book.
    #[arg(long)]
    release: bool,

    /// Directory of rendered books. Defaults to the output directory.
    #[arg(long)]
    src: Option<PathBuf>,

    /// Versioned site directory. Defaults to the merge directory.
    #[arg(long)]
    dst: Option<PathBuf>,
  },

  /// Build, merge, and serve the merged site locally.
  #[cfg(feature = "serve")]
  Serve {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Build and merge as a release.
    #[arg(long)]
    release: bool,
  },

  /// Initialize a new hexdoc configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "hexdoc.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(long)]
    force: bool,
  },

  /// Export the built-in templates to a directory for customization.
  ExportTemplates {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_global_options_after_subcommand() {
    let cli = Cli::try_parse_from([
      "hexdoc",
      "build",
      "--release",
      "--lang",
      "en_us",
      "-l",
      "ru_ru",
      "--config",
      "version=1.0",
      "-v",
    ])
    .unwrap();

    assert!(cli.verbose);
    assert_eq!(cli.config_overrides, vec!["version=1.0"]);
    let Commands::Build { release, langs, .. } = cli.command else {
      panic!("expected the build command");
    };
    assert!(release);
    assert_eq!(langs, vec!["en_us", "ru_ru"]);
  }
}
