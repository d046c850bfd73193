use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};
use ts2hx_core::{Diagnostic, Severity};
use ts2hx_emit::config::DEFAULT_OUT_DIR;
use ts2hx_emit::output::JsonFormatter;
use ts2hx_emit::{EmitterConfig, OutputFormat, ProjectEmitter};

#[derive(Parser)]
#[command(name = "ts2hx")]
#[command(about = "Translate a TypeScript project into Haxe sources")]
#[command(version)]
struct Cli {
    /// Path to the project's tsconfig.json.
    #[arg(short, long, default_value = "tsconfig.json")]
    project: PathBuf,

    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Dotted Haxe package the generated modules live under.
    #[arg(short, long, default_value = "")]
    base_package: String,

    /// Remove the output directory before writing.
    #[arg(long)]
    clean: bool,

    /// Print the project's source files and their Haxe modules, then exit.
    #[arg(long)]
    list_files: bool,

    /// Translate without writing and print one diagnostic per abandoned file.
    #[arg(long)]
    list_diagnostics: bool,

    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Plain report text without ANSI colors.
    #[arg(long)]
    no_color: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => OutputFormat::Text,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}

#[derive(Serialize)]
struct ListedFile {
    source: PathBuf,
    module: String,
}

fn install_subscriber(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    install_subscriber(cli.verbose);
    let use_colors = !cli.no_color && cli.format == ReportFormat::Text;
    if !use_colors {
        colored::control::set_override(false);
    }

    let config = EmitterConfig::default()
        .with_out_dir(&cli.out_dir)
        .with_base_package(cli.base_package.clone())
        .with_clean(cli.clean)
        .with_colors(use_colors);

    debug!(project = %cli.project.display(), "loading project");
    let emitter = match ProjectEmitter::load(&cli.project, config) {
        Ok(emitter) => emitter,
        Err(err) => {
            print_diagnostics(&[err.diagnostic()], cli.format)?;
            return Err(anyhow!("could not load {}", cli.project.display()));
        }
    };

    if cli.list_files || cli.list_diagnostics {
        if cli.list_files {
            cmd_list_files(&emitter, cli.format)?;
        }
        if cli.list_diagnostics {
            let plan = emitter.plan();
            print_diagnostics(&plan.diagnostics(), cli.format)?;
        }
        return Ok(());
    }

    let report = emitter.emit()?;
    print!(
        "{}",
        report.render(cli.format.into(), emitter.config().use_colors)?
    );
    Ok(())
}

fn cmd_list_files(emitter: &ProjectEmitter, format: ReportFormat) -> Result<()> {
    let files: Vec<ListedFile> = emitter
        .program()
        .translatable_units()
        .map(|(_, unit)| ListedFile {
            source: unit.relative_path.clone(),
            module: unit.address.qualified_name(),
        })
        .collect();

    match format {
        ReportFormat::Json => print!("{}", JsonFormatter::to_string(&files)?),
        ReportFormat::Text => {
            for file in &files {
                println!("{} {}", file.source.display(), file.module.bright_blue());
            }
        }
    }
    Ok(())
}

/// Configuration errors go to stderr in text mode; JSON always goes to stdout.
fn print_diagnostics(diagnostics: &[Diagnostic], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => print!("{}", JsonFormatter::to_string(&diagnostics)?),
        ReportFormat::Text => {
            for diagnostic in diagnostics {
                let text = diagnostic.to_string();
                let painted = match diagnostic.severity {
                    Severity::Error => text.bright_red(),
                    Severity::Warning => text.yellow(),
                    Severity::Info => text.normal(),
                };
                eprintln!("{}", painted);
            }
        }
    }
    Ok(())
}
