use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote JSON");
    Ok(())
}

pub fn markdown_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnStatusRow;

    fn sample() -> Vec<ColumnStatusRow> {
        vec![ColumnStatusRow {
            column: "SHAKER #3 (PERCENT)".to_string(),
            status: "present".to_string(),
        }]
    }

    #[test]
    fn markdown_table_has_header_row() {
        let table = markdown_table(&sample());
        assert!(table.contains("| Column"));
        assert!(table.contains("SHAKER #3 (PERCENT)"));
        assert_eq!(markdown_table::<ColumnStatusRow>(&[]), "(no rows)");
    }

    #[test]
    fn writes_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("columns.csv");
        let json_path = dir.path().join("columns.json");
        write_csv(&csv_path, &sample()).unwrap();
        write_json(&json_path, &sample()).unwrap();

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv, "column,status\nSHAKER #3 (PERCENT),present\n");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json[0]["status"], "present");
    }

    #[test]
    fn write_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("columns.csv");
        let err = write_csv(&path, &sample()).unwrap_err();
        assert!(err.to_string().contains("columns.csv"));
        assert!(err.chain().count() > 1);
    }
}
