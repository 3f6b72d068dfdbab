//! casetrack-import binary.
//!
//! Rebuilds the sparse series history from raw wide-format source files:
//! loads the area registry, folds in every `time_series*.csv` found in the
//! source directory (the file name says which metric it carries, a `_US`
//! suffix marks the county-level variant), recomputes the derived
//! aggregates and writes `series.csv`.

use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use casetrack_core::Metric;
use casetrack_feeds::{registry, wide};
use casetrack_store::Dataset;
use clap::Parser;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Casetrack series importer")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "casetrack.toml")]
  config: PathBuf,

  /// Directory holding areas.csv. Overrides the config file.
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// Directory holding the raw wide CSV files. Overrides the config file.
  #[arg(long)]
  source_dir: Option<PathBuf>,

  /// Path to write the series history to. Overrides the config file.
  #[arg(long)]
  output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ImportConfig {
  #[serde(default = "default_data_dir")]
  data_dir:   PathBuf,
  #[serde(default = "default_source_dir")]
  source_dir: PathBuf,
  #[serde(default = "default_output")]
  output:     PathBuf,
}

fn default_data_dir() -> PathBuf {
  PathBuf::from("data")
}

fn default_source_dir() -> PathBuf {
  PathBuf::from("sources")
}

fn default_output() -> PathBuf {
  PathBuf::from("data/series.csv")
}

fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration; flags override file and environment.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("CASETRACK"))
    .build()
    .context("failed to read config")?;
  let cfg: ImportConfig = settings
    .try_deserialize()
    .context("failed to deserialise ImportConfig")?;

  let data_dir = cli.data_dir.unwrap_or(cfg.data_dir);
  let source_dir = cli.source_dir.unwrap_or(cfg.source_dir);
  let output = cli.output.unwrap_or(cfg.output);

  // Load the area registry; every series starts empty.
  let areas_path = data_dir.join("areas.csv");
  let areas_text = fs::read_to_string(&areas_path)
    .with_context(|| format!("failed to read {areas_path:?}"))?;
  let areas = registry::parse(&areas_text)?;
  let mut dataset = Dataset::from_areas(areas);

  // Fold in every wide source file.
  let mut entries: Vec<PathBuf> = fs::read_dir(&source_dir)
    .with_context(|| format!("failed to read {source_dir:?}"))?
    .filter_map(|entry| entry.ok().map(|e| e.path()))
    .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
    .collect();
  entries.sort();

  for path in entries {
    let name = path
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or_default()
      .to_string();
    if !name.starts_with("time_series") {
      continue;
    }
    let Some(metric) = metric_for_file(&name) else {
      tracing::warn!(%name, "no metric in source file name, skipping");
      continue;
    };

    tracing::info!(%name, %metric, "importing wide series");
    let text = fs::read_to_string(&path)
      .with_context(|| format!("failed to read {path:?}"))?;

    if name.ends_with("_US.csv") {
      let rows = wide::parse_wide_us(&text)?;
      dataset.apply_wide_us(metric, &rows)?;
    } else {
      let rows = wide::parse_wide(&text)?;
      dataset.apply_wide(metric, &rows)?;
    }
  }

  // Derived series are absent from the raw files; rebuild them here.
  dataset.recompute_aggregates()?;

  let global = dataset.fetch("", "")?;
  tracing::info!(
    days = global.len(),
    deaths = global.total_deaths(),
    confirmed = global.total_confirmed(),
    "global series after import"
  );

  write_output(&dataset, &output)?;
  Ok(())
}

/// The metric a source file carries, read from its name.
fn metric_for_file(name: &str) -> Option<Metric> {
  Metric::ALL.into_iter().find(|m| name.contains(&m.to_string()))
}

fn write_output(dataset: &Dataset, output: &Path) -> anyhow::Result<()> {
  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  casetrack_store::save(dataset, output)
    .with_context(|| format!("failed to write {output:?}"))?;
  Ok(())
}
