//! Passive renderer. Turns a `PresentationState` snapshot into terminal lines.

use crate::domain::{AnalysisPayload, PresentationState};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const CHART_FILE_NAME: &str = "chart.png";

/// What happened to the chart that came with a result.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutput {
    Absent,
    Saved(PathBuf),
    Failed(String),
}

/// Decode the result chart and write it as `chart.png` under `dir`.
pub fn save_chart(payload: &AnalysisPayload, dir: &Path) -> ChartOutput {
    let png = match payload.chart_png() {
        Ok(Some(png)) => png,
        Ok(None) => return ChartOutput::Absent,
        Err(e) => {
            warn!(error = %e, "chart not decodable");
            return ChartOutput::Failed(e.to_string());
        }
    };
    let path = dir.join(CHART_FILE_NAME);
    match std::fs::write(&path, &png) {
        Ok(()) => {
            info!(path = %path.display(), bytes = png.len(), "chart saved");
            ChartOutput::Saved(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "chart not saved");
            ChartOutput::Failed(format!("{}: {}", path.display(), e))
        }
    }
}

/// Spinner shown while a submission is in flight.
pub fn analyzing_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Analyzing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// ML predictions are opaque: strings print bare, anything else as JSON.
fn opaque(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn result_lines(payload: &AnalysisPayload, chart: &ChartOutput) -> Vec<String> {
    let mut lines = Vec::new();
    for (name, score) in [
        ("TEXT", &payload.text),
        ("IMAGE", &payload.image),
        ("AUDIO", &payload.audio),
    ] {
        lines.push(format!("{:<6} {:<12} {:>6}", name, score.label, score.percent()));
    }
    match chart {
        ChartOutput::Absent => {}
        ChartOutput::Saved(path) => lines.push(format!("Chart saved to {}", path.display())),
        ChartOutput::Failed(reason) => lines.push(format!("Chart unavailable: {}", reason)),
    }
    lines.push(format!(
        "Decision Tree: {}   K-Nearest Neighbors: {}",
        opaque(&payload.ml_predictions.decision_tree),
        opaque(&payload.ml_predictions.knn)
    ));
    lines.push(format!(
        "Analysis saved. Total records: {}",
        payload.total_records
    ));
    lines
}

/// Lines for the results panel.
pub fn format_state(state: &PresentationState, chart: &ChartOutput) -> Vec<String> {
    if state.loading {
        return vec!["Analyzing...".to_string()];
    }
    if let Some(error) = &state.error {
        return vec![format!("Error: {}", error)];
    }
    match &state.result {
        Some(payload) => result_lines(payload, chart),
        None => vec![
            "Awaiting analysis...".to_string(),
            "Provide all inputs and choose Analyze".to_string(),
        ],
    }
}

/// Print the panel. A result's chart is written under `chart_dir` first.
pub fn print_state(state: &PresentationState, chart_dir: &Path) {
    let chart = match &state.result {
        Some(payload) if !state.loading => save_chart(payload, chart_dir),
        _ => ChartOutput::Absent,
    };
    println!();
    for line in format_state(state, &chart) {
        println!("  {}", line);
    }
    println!();
}
