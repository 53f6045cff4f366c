use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use hexdoc::{
  build::{self, BuildOptions},
  cli::{Cli, Commands},
};
use hexdoc_config::Config;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => {
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }

      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!("Failed to generate configuration file: {}", output.display())
      })?;
      info!("Configuration file created. Edit it to point at your book.");
      Ok(())
    },

    Commands::ExportTemplates { output_dir, force } => {
      Config::export_templates(output_dir, *force).wrap_err_with(|| {
        format!("Failed to export templates to {}", output_dir.display())
      })
    },

    Commands::Build {
      release,
      branch,
      langs,
    } => {
      let config = load_config(&cli)?;
      build::build(&config, &BuildOptions {
        release: *release,
        branch:  branch.clone(),
        langs:   langs.clone(),
      })?;
      Ok(())
    },

    Commands::Merge { release, src, dst } => {
      let config = load_config(&cli)?;
      let src = src.as_deref().unwrap_or(&config.output_dir);
      let dst = dst.as_deref().unwrap_or(&config.merge_dir);
      build::merge(src, dst, *release)?;
      Ok(())
    },

    #[cfg(feature = "serve")]
    Commands::Serve { port, release } => {
      let config = load_config(&cli)?;
      build::build(&config, &BuildOptions {
        release: *release,
        ..BuildOptions::default()
      })?;
      build::merge(&config.output_dir, &config.merge_dir, *release)?;
      hexdoc::serve::serve(&config.merge_dir, *port)
    },
  }
}

fn load_config(cli: &Cli) -> Result<Config> {
  Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")
}
