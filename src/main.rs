mod archive;
mod commands;
mod core;
mod release;
mod repository;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use crate::core::error::{PackError, print_error};
use std::path::{Component, Path, PathBuf};

/// Package a KiCad library as a PCM add-on release
#[derive(Parser)]
#[command(name = "kicad-pcm-pack")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Version to release: major[.minor[.patch]] (prompted for when omitted)
  #[arg(value_name = "VERSION")]
  release_version: Option<String>,

  /// Library root containing the content directories and templates
  #[arg(short = 'C', long, global = true, default_value = ".")]
  root: PathBuf,

  /// Output results in JSON format
  #[arg(long, global = true)]
  json: bool,

  /// Hide the banner and progress bar
  #[arg(short, long, global = true)]
  quiet: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Recheck recorded hashes and sizes against the generated files
  Verify,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing() {
  let filter =
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing();

  let root = match std::env::current_dir() {
    Ok(dir) => resolve_root(&dir, &cli.root),
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let ctx = match crate::core::context::PackContext::build(&root) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Some(Commands::Verify) => commands::run_verify(&ctx, cli.json),
    None => commands::run_package(
      &ctx,
      cli.release_version,
      commands::PackageOptions {
        json: cli.json,
        quiet: cli.quiet,
      },
    ),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Join `root` onto the working directory without `.` components
fn resolve_root(cwd: &Path, root: &Path) -> PathBuf {
  let relative: PathBuf = root.components().filter(|c| !matches!(c, Component::CurDir)).collect();
  if relative.as_os_str().is_empty() {
    return cwd.to_path_buf();
  }
  cwd.join(relative)
}

fn handle_error(err: PackError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
