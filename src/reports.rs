use crate::config::DashboardConfig;
use crate::loader::{LoadReport, LogTable};
use crate::metrics::MetricsReport;
use crate::output::markdown_table;
use crate::types::{ColumnStatusRow, DailyAggregate, DailyAggregateRow, SummaryStats, REQUIRED_COLUMNS};
use crate::util::{format_int, format_number, format_optional};
use std::fmt::Write;

pub const AWAITING_INPUT: &str = "Please upload a valid CSV with required fields.";

pub fn g_force_status(drop_detected: bool) -> &'static str {
    if drop_detected {
        "DROP DETECTED!"
    } else {
        "Stable"
    }
}

pub fn daily_rows(daily: &[DailyAggregate]) -> Vec<DailyAggregateRow> {
    daily
        .iter()
        .map(|d| DailyAggregateRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            samples: format_int(d.samples),
            avg_utilization: format_optional(d.avg_utilization, 2),
            avg_flow_rate: format_optional(d.avg_flow_rate, 2),
            avg_shaker3: format_optional(d.avg_shaker3, 2),
            max_shaker3: format_optional(d.max_shaker3, 2),
            exceeds_threshold: if d.exceeds_threshold { "YES" } else { "no" }.to_string(),
        })
        .collect()
}

/// One line per metric that could not be computed.
pub fn warnings(report: &MetricsReport) -> Vec<String> {
    report
        .unavailable()
        .into_iter()
        .map(|(metric, err)| format!("{metric} skipped: {err}"))
        .collect()
}

pub fn load_diagnostics(load: &LoadReport) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Processing dataset... ({} rows read, {} loaded)",
        format_int(load.total_rows),
        format_int(load.loaded_rows)
    );
    if load.parse_errors > 0 {
        let _ = writeln!(
            output,
            "Note: {} rows skipped as malformed.",
            format_int(load.parse_errors)
        );
    }
    if !load.missing_columns.is_empty() {
        let _ = writeln!(
            output,
            "Warning: missing required columns: {}",
            load.missing_columns.join(", ")
        );
    }
    output
}

pub fn build_summary(report: &MetricsReport, config: &DashboardConfig) -> String {
    let mut output = String::new();
    if report.is_no_data() {
        let _ = writeln!(output, "No data rows in upload. {AWAITING_INPUT}");
        return output;
    }

    let _ = writeln!(output, "# Shaker Health Summary");
    let _ = writeln!(
        output,
        "Mesh {} (capacity {}), utilization threshold {}%",
        config.mesh_type,
        config.mesh_type.capacity(),
        config.utilization_threshold
    );
    let _ = writeln!(output);

    if let Ok(avg) = report.average_utilization {
        let _ = writeln!(output, "Average Screen Utilization: {}%", format_number(avg, 2));
    }
    if let Ok(life) = report.remaining_life_hrs {
        let _ = writeln!(output, "Estimated Remaining Screen Life: {} hrs", format_number(life, 1));
    }
    if let Ok(drop) = report.g_force_drop {
        let _ = writeln!(output, "Shaker G-Force Health: {}", g_force_status(drop));
    }

    let warnings = warnings(report);
    if !warnings.is_empty() {
        let _ = writeln!(output);
        for w in &warnings {
            let _ = writeln!(output, "Warning: {w}");
        }
    }

    if let Ok(daily) = &report.daily {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Daily Aggregates");
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", markdown_table(&daily_rows(daily)));
    }
    output
}

pub fn summary_stats(report: &MetricsReport, config: &DashboardConfig) -> SummaryStats {
    let daily = report.daily.as_deref().unwrap_or(&[]);
    SummaryStats {
        mesh_type: config.mesh_type.to_string(),
        mesh_capacity: config.mesh_type.capacity(),
        utilization_threshold: config.utilization_threshold,
        total_records: report.derived.len(),
        avg_screen_utilization_pct: report.average_utilization.as_ref().ok().copied(),
        remaining_screen_life_hrs: report.remaining_life_hrs.as_ref().ok().copied(),
        g_force_drop_detected: report.g_force_drop.as_ref().ok().copied(),
        days: daily.len(),
        days_exceeding_threshold: daily.iter().filter(|d| d.exceeds_threshold).count(),
        warnings: warnings(report),
    }
}

pub fn column_status_rows(table: &LogTable) -> Vec<ColumnStatusRow> {
    let mut rows: Vec<ColumnStatusRow> = REQUIRED_COLUMNS
        .iter()
        .map(|c| ColumnStatusRow {
            column: c.to_string(),
            status: if table.has_column(c) { "present" } else { "MISSING" }.to_string(),
        })
        .collect();
    rows.extend(table.extra_columns().into_iter().map(|c| ColumnStatusRow {
        column: c.to_string(),
        status: "extra".to_string(),
    }));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_table;
    use crate::loader::tests::{row, table_from};
    use crate::metrics::calculate;

    #[test]
    fn summary_shows_kpis_and_daily_table() {
        let table = table_from(&[
            row("2024/03/01", "00:00:00", 20.0, 10.0, 500.0),
            row("2024/03/01", "00:01:00", 20.0, 25.0, 501.0),
        ]);
        let config = DashboardConfig::default();
        let text = build_summary(&calculate(&table, &config), &config);
        assert!(text.contains("Average Screen Utilization: 40.04%"));
        assert!(text.contains("Estimated Remaining Screen Life: 19.9 hrs"));
        assert!(text.contains("Shaker G-Force Health: DROP DETECTED!"));
        assert!(text.contains("## Daily Aggregates"));
        assert!(text.contains("2024-03-01"));
        assert!(!text.contains("Warning:"));
    }

    #[test]
    fn summary_for_empty_upload_is_no_data_notice() {
        let config = DashboardConfig::default();
        let text = build_summary(&calculate(&table_from(&[]), &config), &config);
        assert!(text.starts_with("No data rows"));
        assert!(!text.contains("Average Screen Utilization"));
    }

    #[test]
    fn missing_columns_surface_as_warnings() {
        let csv = "YYYY/MM/DD,HH:MM:SS,SHAKER #3 (PERCENT)\n2024/01/01,00:00:00,12\n";
        let (table, _) = read_table(csv.as_bytes()).unwrap();
        let config = DashboardConfig::default();
        let report = calculate(&table, &config);
        let text = build_summary(&report, &config);
        assert!(text.contains("Average Screen Utilization: 0.00%"));
        assert!(text.contains(
            "Warning: Estimated Remaining Screen Life skipped: missing column 'Weight on Bit (klbs)'"
        ));
        assert!(text.contains("available columns: YYYY/MM/DD, HH:MM:SS, SHAKER #3 (PERCENT)"));

        let stats = summary_stats(&report, &config);
        assert_eq!(stats.remaining_screen_life_hrs, None);
        assert_eq!(stats.g_force_drop_detected, None);
        assert_eq!(stats.warnings.len(), 2);
    }

    #[test]
    fn daily_rows_format_values() {
        let table = table_from(&[row("2024/03/01", "00:00:00", 25.0, 1234.5, 500.0)]);
        let config = DashboardConfig::new(
            crate::config::MeshType::Api100,
            50,
            crate::config::Heuristics::default(),
        )
        .unwrap();
        let report = calculate(&table, &config);
        let rows = daily_rows(report.daily.as_ref().unwrap());
        assert_eq!(rows[0].avg_utilization, "50.00");
        assert_eq!(rows[0].max_shaker3, "1,234.50");
        assert_eq!(rows[0].exceeds_threshold, "no");

        let stats = summary_stats(&report, &config);
        assert_eq!(stats.days, 1);
        assert_eq!(stats.days_exceeding_threshold, 0);
        assert_eq!(stats.mesh_capacity, 250);
    }

    #[test]
    fn column_status_marks_missing_and_extra() {
        let csv = "YYYY/MM/DD,Rig Name\n";
        let (table, _) = read_table(csv.as_bytes()).unwrap();
        let rows = column_status_rows(&table);
        assert_eq!(rows.len(), REQUIRED_COLUMNS.len() + 1);
        assert_eq!(rows[0].status, "present");
        assert_eq!(rows[1].status, "MISSING");
        assert_eq!(rows.last().unwrap().column, "Rig Name");
        assert_eq!(rows.last().unwrap().status, "extra");
    }

    #[test]
    fn load_diagnostics_mentions_missing_columns() {
        let load = LoadReport {
            total_rows: 1200,
            loaded_rows: 1198,
            parse_errors: 2,
            missing_columns: vec!["MA_Temp (degF)".to_string()],
        };
        let text = load_diagnostics(&load);
        assert!(text.contains("1,200 rows read, 1,198 loaded"));
        assert!(text.contains("2 rows skipped"));
        assert!(text.contains("MA_Temp (degF)"));
    }
}
