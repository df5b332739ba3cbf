//! Plain-text rendering of a finished run.
//!
//! The report only reads a [`RunSummary`]; it never recomputes metrics.
use std::fmt::Write;

use crate::data_handling::{ClassCounts, Diagnosis};
use crate::evaluation::{EvaluationResult, SplitKind};
use crate::runner::RunSummary;

/// Fixed-width table with a header row; the first column is left aligned,
/// the rest right aligned.
struct TextTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        let line = |cells: &[String], out: &mut String| {
            let mut text = String::new();
            for (i, (cell, w)) in cells.iter().zip(&widths).enumerate() {
                if i == 0 {
                    let _ = write!(text, "{:<w$}", cell, w = *w);
                } else {
                    let _ = write!(text, "  {:>w$}", cell, w = *w);
                }
            }
            out.push_str(text.trim_end());
            out.push('\n');
        };

        line(&self.header, out);
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            line(row, out);
        }
    }
}

fn heading(out: &mut String, title: &str) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push('\n');
}

fn counts_row(name: &str, counts: &ClassCounts) -> Vec<String> {
    vec![
        name.to_string(),
        counts.total().to_string(),
        counts.benign.to_string(),
        counts.malignant.to_string(),
    ]
}

fn render_splits(summary: &RunSummary, out: &mut String) {
    heading(out, "Data partitions");
    let _ = writeln!(
        out,
        "{} records, {} features, seed {}",
        summary.n_records, summary.n_features, summary.seed
    );
    let mut table = TextTable::new(["Partition", "Records", "Benign", "Malignant"]);
    table.push(counts_row("train", &summary.partitions.train));
    table.push(counts_row("validation", &summary.partitions.validation));
    table.push(counts_row("test", &summary.partitions.test));
    table.push(counts_row("train (balanced)", &summary.balance.after));
    table.render(out);

    match summary.balance.minority {
        Some(minority) => {
            let _ = writeln!(
                out,
                "Oversampled {} with {} synthetic records",
                minority, summary.balance.synthetic
            );
        }
        None => out.push_str("Training classes were already balanced\n"),
    }
}

fn render_components(summary: &RunSummary, out: &mut String) {
    heading(out, "Principal components");
    let mut table = TextTable::new(["Component", "Variance", "Ratio", "Cumulative"]);
    let mut cumulative = 0.0;
    for pc in &summary.components {
        cumulative += pc.explained_variance_ratio;
        table.push(vec![
            format!("PC{}", pc.index + 1),
            format!("{:.4}", pc.explained_variance),
            format!("{:.4}", pc.explained_variance_ratio),
            format!("{:.4}", cumulative),
        ]);
    }
    table.render(out);
    match summary.condition_estimate {
        Some(c) => {
            let _ = writeln!(out, "Covariance condition estimate: {:.3e}", c);
        }
        None => out.push_str("Covariance condition estimate: singular\n"),
    }
}

fn render_metrics(results: &[EvaluationResult], out: &mut String) {
    let mut table = TextTable::new(["Model", "Accuracy", "Precision", "Recall", "F1"]);
    for r in results {
        table.push(vec![
            r.model.clone(),
            format!("{:.4}", r.accuracy),
            format!("{:.4}", r.precision),
            format!("{:.4}", r.recall),
            format!("{:.4}", r.f1),
        ]);
    }
    table.render(out);
}

fn render_confusion(result: &EvaluationResult, out: &mut String) {
    let [[tn, fp], [fn_, tp]] = result.confusion.table();
    let mut table = TextTable::new(["actual \\ predicted", "Benign", "Malignant"]);
    table.push(vec!["Benign".to_string(), tn.to_string(), fp.to_string()]);
    table.push(vec!["Malignant".to_string(), fn_.to_string(), tp.to_string()]);
    table.render(out);
}

fn render_class_report(result: &EvaluationResult, out: &mut String) {
    let mut table = TextTable::new(["", "precision", "recall", "f1-score", "support"]);
    for report in &result.class_reports {
        table.push(vec![
            report.label.to_string(),
            format!("{:.2}", report.precision),
            format!("{:.2}", report.recall),
            format!("{:.2}", report.f1),
            report.support.to_string(),
        ]);
    }
    let support = result.confusion.total().to_string();
    table.push(vec![
        "accuracy".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", result.accuracy),
        support.clone(),
    ]);
    for (name, avg) in [
        ("macro avg", &result.macro_avg),
        ("weighted avg", &result.weighted_avg),
    ] {
        table.push(vec![
            name.to_string(),
            format!("{:.2}", avg.precision),
            format!("{:.2}", avg.recall),
            format!("{:.2}", avg.f1),
            support.clone(),
        ]);
    }
    table.render(out);
}

fn render_split(summary: &RunSummary, split: SplitKind, out: &mut String) {
    let results = summary.results(split);
    heading(out, &format!("Results on {} partition", split));
    render_metrics(results, out);
    if let Some(best) = summary.best_model(split) {
        let _ = writeln!(out, "Best F1 ({}): {}", Diagnosis::Malignant, best);
    }

    for result in results {
        let _ = writeln!(out, "\n{} ({})", result.model, split);
        render_confusion(result, out);
        out.push('\n');
        render_class_report(result, out);
        for flag in &result.undefined {
            let _ = writeln!(out, "note: {}", flag);
        }
    }
}

/// Render the whole run as text.
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();
    render_splits(summary, &mut out);
    render_components(summary, &mut out);
    render_split(summary, SplitKind::Validation, &mut out);
    render_split(summary, SplitKind::Test, &mut out);
    out
}
