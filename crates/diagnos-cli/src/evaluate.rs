//! CLI helpers for running the evaluation pipeline on a CSV file.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use diagnos_classifiers::config::PipelineConfig;
use diagnos_classifiers::io::read_wdbc_csv;
use diagnos_classifiers::report;
use diagnos_classifiers::runner::{run, RunSummary};

/// Command line overrides applied on top of the JSON configuration.
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    pub data: PathBuf,
    pub config: Option<PathBuf>,
    pub seed: Option<u64>,
    pub threads: Option<usize>,
    pub output: Option<PathBuf>,
}

/// Load a pipeline configuration from a JSON file. Missing sections take
/// their defaults.
pub fn load_pipeline_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: PipelineConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// Resolve the configuration for a run: file (or defaults), then overrides.
pub fn resolve_config(options: &EvaluateOptions) -> Result<PipelineConfig> {
    let mut config = match &options.config {
        Some(path) => load_pipeline_config(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = options.seed {
        config = config.with_seed(seed);
    }
    if let Some(threads) = options.threads {
        config.harness.n_threads = Some(threads);
    }
    config.validate().context("Invalid pipeline configuration")?;
    Ok(config)
}

/// Load the data, run the pipeline and optionally write the JSON summary.
pub fn run_evaluation(options: &EvaluateOptions) -> Result<RunSummary> {
    let config = resolve_config(options)?;
    let dataset = read_wdbc_csv(&options.data)
        .with_context(|| format!("Failed to load dataset: {}", options.data.display()))?;

    let summary = run(&dataset, &config).context("Pipeline run failed")?;

    if let Some(output) = &options.output {
        write_summary(&summary, output)?;
        log::info!("Wrote results to {}", output.display());
    }
    Ok(summary)
}

pub fn write_summary<P: AsRef<Path>>(summary: &RunSummary, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize results")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write results: {}", path.as_ref().display()))?;
    Ok(())
}

pub fn render_report(summary: &RunSummary) -> String {
    report::render(summary)
}

pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(&PipelineConfig::default())
        .context("Failed to serialize default config")
}
