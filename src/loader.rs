use crate::error::{LoadError, MetricError, TimestampError};
use crate::types::{RawRow, Record, COL_DATE, COL_TIME, REQUIRED_COLUMNS};
use crate::util::{parse_f64_safe, parse_timestamp};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub missing_columns: Vec<String>,
}

/// A parsed rig log: records plus what the file did and did not provide.
#[derive(Debug, Clone)]
pub struct LogTable {
    pub records: Vec<Record>,
    pub headers: Vec<String>,
    /// `Ok` when every row got a timestamp and the records are sorted by it.
    pub timestamps: Result<(), TimestampError>,
}

impl LogTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// `Ok` if the column exists, else a warning-ready error listing what the file has.
    pub fn require(&self, name: &str) -> Result<(), MetricError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(MetricError::MissingColumn {
                column: name.to_string(),
                available: self.headers.clone(),
            })
        }
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    pub fn extra_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| !REQUIRED_COLUMNS.contains(h))
            .collect()
    }
}

pub fn load_and_clean(path: &Path) -> Result<(LogTable, LoadReport), LoadError> {
    let file = File::open(path)?;
    read_table(file)
}

pub fn read_table<R: Read>(input: R) -> Result<(LogTable, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(input);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut raw: Vec<(usize, RawRow)> = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        match result {
            Ok(r) => raw.push((total_rows, r)),
            Err(e) => {
                debug!(row = total_rows, error = %e, "skipping malformed row");
                parse_errors += 1;
            }
        }
    }

    let mut table = LogTable {
        records: Vec::with_capacity(raw.len()),
        headers,
        timestamps: Ok(()),
    };

    let missing_columns: Vec<String> = table
        .missing_required()
        .into_iter()
        .map(str::to_string)
        .collect();
    for column in &missing_columns {
        warn!(column = %column, "required column missing from upload");
    }

    let mut dates: Vec<(Option<String>, Option<String>)> = Vec::with_capacity(raw.len());
    for (row, r) in raw {
        dates.push((r.date.clone(), r.time.clone()));
        table.records.push(clean_row(row, r));
    }

    table.timestamps = assign_timestamps(&mut table, &dates);
    match &table.timestamps {
        Ok(()) => table.records.sort_by_key(|r| r.timestamp),
        Err(e) => warn!(error = %e, "timestamp construction failed; time-based views will be skipped"),
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: table.records.len(),
        parse_errors,
        missing_columns,
    };
    Ok((table, report))
}

fn clean_row(row: usize, r: RawRow) -> Record {
    let num = |s: &Option<String>| parse_f64_safe(s.as_deref());
    Record {
        row,
        timestamp: None,
        hole_depth: num(&r.hole_depth),
        bit_depth: num(&r.bit_depth),
        hook_load: num(&r.hook_load),
        total_mud_volume: num(&r.total_mud_volume),
        weight_on_bit: num(&r.weight_on_bit),
        tool_face: num(&r.tool_face),
        shaker_1: num(&r.shaker_1),
        shaker_2: num(&r.shaker_2),
        shaker_3: num(&r.shaker_3),
        flow_rate: num(&r.flow_rate),
        heavy_ratio: num(&r.heavy_ratio),
        pvt_gain_loss: num(&r.pvt_gain_loss),
        total_mud_low_warning: num(&r.total_mud_low_warning),
        flow_low_warning: num(&r.flow_low_warning),
        flow_high_warning: num(&r.flow_high_warning),
        trip_mud_high_warning: num(&r.trip_mud_high_warning),
        mud_temp: num(&r.mud_temp),
        site_mud_volume: num(&r.site_mud_volume),
        inactive_mud_volume: num(&r.inactive_mud_volume),
        screen_utilization_pct: num(&r.screen_utilization_pct),
    }
}

/// All-or-nothing: one bad row fails the whole column and no record keeps a timestamp.
fn assign_timestamps(
    table: &mut LogTable,
    dates: &[(Option<String>, Option<String>)],
) -> Result<(), TimestampError> {
    for column in [COL_DATE, COL_TIME] {
        if !table.has_column(column) {
            return Err(TimestampError::MissingColumn(column.to_string()));
        }
    }

    let mut parsed = Vec::with_capacity(dates.len());
    for (record, (date, time)) in table.records.iter().zip(dates) {
        let date = date.as_deref().unwrap_or("");
        let time = time.as_deref().unwrap_or("");
        match parse_timestamp(date, time) {
            Some(ts) => parsed.push(ts),
            None => {
                return Err(TimestampError::Unparseable {
                    row: record.row,
                    value: format!("{} {}", date.trim(), time.trim()),
                })
            }
        }
    }

    for (record, ts) in table.records.iter_mut().zip(parsed) {
        record.timestamp = Some(ts);
    }
    Ok(())
}

/// Header row only, for the `inspect` command.
pub fn read_headers(path: &Path) -> Result<LogTable, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    Ok(LogTable {
        records: Vec::new(),
        headers,
        timestamps: Ok(()),
    })
}
