//! Comma-separated diagnostic table reader (WDBC layout).
//!
//! Expected layout: a header row, an identifier column, a label column and
//! numeric feature columns. Exports of this table often end every line with
//! a comma, which produces an unnamed empty column; such columns are skipped.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data_handling::{Dataset, Diagnosis, Record};

/// Configuration for reading diagnostic CSV files.
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    /// Column holding the diagnosis (`M`/`B`).
    pub label_column: String,
    /// Identifier column, dropped on load. Ignored when absent.
    pub id_column: String,
    pub delimiter: u8,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "diagnosis".to_string(),
            id_column: "id".to_string(),
            delimiter: b',',
        }
    }
}

/// Read a diagnostic CSV file into a `Dataset`.
pub fn read_wdbc_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    read_wdbc_csv_with_config(path, &CsvReaderConfig::default())
}

pub fn read_wdbc_csv_with_config<P: AsRef<Path>>(path: P, config: &CsvReaderConfig) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open CSV file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;
    let id_idx = find_column(&headers, &config.id_column);

    let feature_indices: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(idx, header)| {
            *idx != label_idx && Some(*idx) != id_idx && !is_blank_column(header)
        })
        .map(|(idx, _)| idx)
        .collect();
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected in CSV header"));
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        // header is line 1
        let line = row_idx + 2;
        let record = result.with_context(|| format!("Failed to read line {}", line))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing label value at line {}", line))?
            .parse::<Diagnosis>()
            .map_err(|e| anyhow!("Invalid label at line {}: {}", line, e))?;

        let mut features = Vec::with_capacity(feature_indices.len());
        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at line {}", line))?;
            let parsed = value.trim().parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at line {}",
                    headers.get(idx).unwrap_or(""),
                    line
                )
            })?;
            if !parsed.is_finite() {
                return Err(anyhow!(
                    "Non-finite feature '{}' at line {}",
                    headers.get(idx).unwrap_or(""),
                    line
                ));
            }
            features.push(parsed);
        }
        records.push(Record::new(features, label));
    }

    if records.is_empty() {
        return Err(anyhow!(
            "CSV file {} contains no records",
            path.as_ref().display()
        ));
    }

    let feature_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").trim().to_string())
        .collect();

    let dataset = Dataset::from_records(&records, feature_names)
        .context("Failed to build dataset from CSV records")?;
    log::debug!(
        "Read {} records with {} features from {}",
        dataset.len(),
        dataset.n_features(),
        path.as_ref().display()
    );
    Ok(dataset)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

/// Empty header, or the placeholder name spreadsheet exports give one.
fn is_blank_column(header: &str) -> bool {
    let header = header.trim();
    header.is_empty() || header.starts_with("Unnamed:")
}
