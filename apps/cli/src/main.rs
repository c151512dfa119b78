mod config;
mod render;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use woodshed_builder::{BuildLimits, ScheduleBuilder};
use woodshed_features::{builtin_registry, FeatureRegistry};
use woodshed_formats::{codec_for, ParseReport, ParseWarning, ScheduleFormat};
use woodshed_services::{FileStore, ScheduleArchive};

use crate::config::{load_config, CliConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan and check practice schedules", long_about = None)]
struct Cli {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a schedule between the text and JSON formats
    Convert {
        input: PathBuf,
        /// Output format; defaults to the one the input is not in
        #[arg(long)]
        to: Option<ScheduleFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the rows of a schedule with their nesting
    Outline { input: PathBuf },
    /// Validate a schedule and print its timeline
    Build {
        input: PathBuf,
        /// Do not remember this schedule as the last one
        #[arg(long)]
        no_commit: bool,
    },
    /// List categories, feature types and their arguments
    Features { category: Option<String> },
    /// Print the last committed schedule
    Last,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let registry = builtin_registry().context("registering built-in features")?;

    match cli.command {
        Command::Convert { input, to, output } => {
            let (text, from) = read_input(&input)?;
            let to = to.unwrap_or_else(|| from.other());
            let report = parse(&registry, &config, &text, from)?;
            let converted = codec_for(to, &registry, &config.default_category)?
                .serialize(&report.document)?;
            match output {
                Some(path) => fs::write(&path, converted)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{converted}"),
            }
        }
        Command::Outline { input } => {
            let (text, from) = read_input(&input)?;
            let report = parse(&registry, &config, &text, from)?;
            print!("{}", render::outline(&report.document)?);
        }
        Command::Build { input, no_commit } => {
            let (text, from) = read_input(&input)?;
            let mut document = parse(&registry, &config, &text, from)?.into_document();
            if document.name.is_empty() {
                document.name = file_stem(&input);
            }
            let schedule = ScheduleBuilder::new(&registry)
                .with_limits(BuildLimits::from_minutes(config.max_total_minutes))
                .build(&document)?;
            print!("{}", render::schedule(&schedule)?);
            if !no_commit {
                archive(&config, &registry)?.commit(&document)?;
                info!(name = %document.name, "committed as last schedule");
            }
        }
        Command::Features { category } => {
            print!("{}", render::features(&registry, category.as_deref())?);
        }
        Command::Last => match archive(&config, &registry)?.restore()? {
            Some(report) => {
                print_warnings(&report.warnings);
                let text = codec_for(ScheduleFormat::Text, &registry, &config.default_category)?
                    .serialize(&report.document)?;
                if !report.document.name.is_empty() {
                    eprintln!("last schedule: {}", report.document.name);
                }
                print!("{text}");
            }
            None => eprintln!("no schedule has been committed yet"),
        },
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<(String, ScheduleFormat)> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let format = ScheduleFormat::from_path(path).unwrap_or_else(|| ScheduleFormat::detect(&text));
    Ok((text, format))
}

fn parse(
    registry: &FeatureRegistry,
    config: &CliConfig,
    text: &str,
    format: ScheduleFormat,
) -> Result<ParseReport> {
    let report = codec_for(format, registry, &config.default_category)?.parse(text)?;
    print_warnings(&report.warnings);
    Ok(report)
}

fn print_warnings(warnings: &[ParseWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn archive<'a>(
    config: &CliConfig,
    registry: &'a FeatureRegistry,
) -> Result<ScheduleArchive<'a, FileStore>> {
    let store = match &config.store_dir {
        Some(dir) => FileStore::new(dir.clone()),
        None => FileStore::at_default_location()?,
    };
    Ok(ScheduleArchive::new(store, registry))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
