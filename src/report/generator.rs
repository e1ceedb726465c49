//! Markdown and JSON report generation.
//!
//! This module renders an aggregation result as the tables a dashboard
//! would chart: KPI totals, the ranked bar-chart table, the region pie
//! table, the correlation heatmap and the scatter series.

use crate::models::{
    AggregationResult, ColumnSummary, CorrelationMatrix, GlobalTotals, Metric, Overview, Panel,
    Record, RegionSums, Report, ReportMetadata, ScatterPoint,
};
use anyhow::Result;

/// Which optional sections a report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub include_summary: bool,
    pub include_scatter: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_scatter: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# COVID-19 Country Statistics\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    match &report.result {
        AggregationResult::AllEntities(overview) => {
            output.push_str(&generate_overview(overview, options));
        }
        AggregationResult::SingleEntity(snapshot) => {
            output.push_str(&generate_snapshot_section(&snapshot.record));
        }
    }

    if !report.preview.is_empty() {
        output.push_str(&generate_preview_section(&report.preview));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
///
/// Sections turned off in `options` are left out of the output.
pub fn generate_json_report(report: &Report, options: &ReportOptions) -> Result<String> {
    if let AggregationResult::AllEntities(overview) = &report.result {
        if !options.include_summary || !options.include_scatter {
            let mut trimmed = overview.clone();
            if !options.include_summary {
                trimmed.summary.clear();
            }
            if !options.include_scatter {
                trimmed.scatter.clear();
            }
            let report = Report {
                metadata: report.metadata.clone(),
                result: AggregationResult::AllEntities(trimmed),
                preview: report.preview.clone(),
            };
            return serde_json::to_string_pretty(&report).map_err(Into::into);
        }
    }

    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data File:** `{}`\n", metadata.data_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Countries:** {}\n", metadata.entities));
    section.push_str(&format!("- **Selection:** {}\n", metadata.selection));
    section.push_str(&format!(
        "- **Computation Time:** {:.3}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_overview(overview: &Overview, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str(&generate_totals_section(&overview.totals));
    output.push_str(&generate_top_section(overview.metric, &overview.top));
    output.push_str(&generate_regions_section(&overview.regions));
    output.push_str(&generate_correlation_section(&overview.correlation));

    if options.include_summary {
        output.push_str(&generate_summary_section(&overview.summary));
    }
    if options.include_scatter {
        output.push_str(&generate_scatter_section(&overview.scatter));
    }

    output
}

fn generate_totals_section(totals: &GlobalTotals) -> String {
    let mut section = String::new();

    section.push_str("## Global Totals\n\n");
    section.push_str("| Confirmed | Deaths | Recovered |\n");
    section.push_str("|---:|---:|---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        format_count(totals.confirmed),
        format_count(totals.deaths),
        format_count(totals.recovered)
    ));

    section
}

fn generate_top_section(metric: Metric, top: &[Record]) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## Top {} Countries by {}\n\n",
        top.len(),
        metric
    ));
    section.push_str(&format!("| # | Country | {} | WHO Region |\n", metric));
    section.push_str("|---:|:---|---:|:---|\n");

    for (i, record) in top.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            record.country,
            format_count(metric.value(record)),
            record.region
        ));
    }
    section.push('\n');

    section
}

fn generate_regions_section(regions: &[RegionSums]) -> String {
    let mut section = String::new();

    section.push_str("## Cases by WHO Region\n\n");

    let metrics: Vec<Metric> = regions
        .first()
        .map(|r| r.sums.keys().copied().collect())
        .unwrap_or_default();

    section.push_str("| Region | Countries |");
    for metric in &metrics {
        section.push_str(&format!(" {} |", metric));
    }
    section.push('\n');
    section.push_str("|:---|---:|");
    for _ in &metrics {
        section.push_str("---:|");
    }
    section.push('\n');

    for region in regions {
        section.push_str(&format!("| {} | {} |", region.region, region.entities));
        for metric in &metrics {
            section.push_str(&format!(" {} |", format_count(region.get(*metric))));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_correlation_section(panel: &Panel<CorrelationMatrix>) -> String {
    let mut section = String::new();

    section.push_str("## Correlation Matrix\n\n");

    let matrix = match panel {
        Panel::Ready(matrix) => matrix,
        Panel::Skipped { reason } => {
            section.push_str(&format!("> Correlation unavailable: {}\n\n", reason));
            return section;
        }
    };

    section.push_str("| |");
    for metric in &matrix.metrics {
        section.push_str(&format!(" {} |", metric));
    }
    section.push('\n');
    section.push_str("|:---|");
    for _ in &matrix.metrics {
        section.push_str("---:|");
    }
    section.push('\n');

    for (metric, row) in matrix.metrics.iter().zip(&matrix.values) {
        section.push_str(&format!("| **{}** |", metric));
        for value in row {
            section.push_str(&format!(" {:.2} |", value));
        }
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_summary_section(summary: &[ColumnSummary]) -> String {
    let mut section = String::new();

    section.push_str("## Dataset Summary\n\n");
    section.push_str("| Column | Count | Mean | Std | Min | 25% | 50% | 75% | Max |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|---:|\n");

    for s in summary {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            s.column,
            s.count,
            format_stat(s.mean),
            format_stat(s.std),
            format_stat(s.min),
            format_stat(s.p25),
            format_stat(s.median),
            format_stat(s.p75),
            format_stat(s.max)
        ));
    }
    section.push('\n');

    section
}

fn generate_scatter_section(points: &[ScatterPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Death Rate vs Recovery Rate\n\n");
    section.push_str(
        "| Country | WHO Region | Deaths / 100 Cases | Recovered / 100 Cases | Confirmed | Deaths | Recovered |\n",
    );
    section.push_str("|:---|:---|---:|---:|---:|---:|---:|\n");

    for p in points {
        section.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} | {} | {} | {} |\n",
            p.country,
            p.region,
            p.deaths_per_100_cases,
            p.recovered_per_100_cases,
            format_count(p.confirmed),
            format_count(p.deaths),
            format_count(p.recovered)
        ));
    }
    section.push('\n');

    section
}

fn generate_snapshot_section(record: &Record) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", record.country));
    section.push_str(&format!("*WHO Region: {}*\n\n", record.region));
    section.push_str("| Statistic | Value |\n");
    section.push_str("|:---|---:|\n");

    for metric in Metric::ALL {
        section.push_str(&format!(
            "| {} | {} |\n",
            metric,
            format_count(metric.value(record))
        ));
    }
    section.push_str(&format!(
        "| Deaths / 100 Cases | {:.2} |\n",
        record.deaths_per_100_cases
    ));
    section.push_str(&format!(
        "| Recovered / 100 Cases | {:.2} |\n\n",
        record.recovered_per_100_cases
    ));

    section
}

fn generate_preview_section(rows: &[Record]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Raw Data (first {} rows)\n\n", rows.len()));
    section.push_str(
        "| Country/Region | Confirmed | Deaths | Recovered | Active | Deaths / 100 Cases | Recovered / 100 Cases | WHO Region |\n",
    );
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|:---|\n");

    for r in rows {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.2} | {:.2} | {} |\n",
            r.country,
            r.confirmed,
            r.deaths,
            r.recovered,
            r.active,
            r.deaths_per_100_cases,
            r.recovered_per_100_cases,
            r.region
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by covistat*\n".to_string()
}

/// Format a count with thousands separators.
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}
