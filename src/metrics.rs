//! Shaker performance calculator.
//!
//! A pure function of a parsed [`LogTable`] and a [`DashboardConfig`]. Each
//! KPI carries its own `Result`, so one missing column only blanks out the
//! metrics that depend on it.

use crate::config::DashboardConfig;
use crate::error::MetricError;
use crate::loader::LogTable;
use crate::types::{
    DailyAggregate, DerivedRecord, Record, COL_FLOW_RATE, COL_SCREEN_UTILIZATION, COL_SHAKER_3,
    COL_WEIGHT_ON_BIT,
};
use crate::util::{max, mean};
use std::collections::BTreeMap;
use tracing::debug;

pub type MetricResult<T> = Result<T, MetricError>;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub derived: Vec<DerivedRecord>,
    pub average_utilization: MetricResult<f64>,
    pub remaining_life_hrs: MetricResult<f64>,
    pub g_force_drop: MetricResult<bool>,
    pub daily: MetricResult<Vec<DailyAggregate>>,
}

impl MetricsReport {
    /// Defined result for an upload without data rows.
    pub fn no_data() -> Self {
        Self {
            derived: Vec::new(),
            average_utilization: Err(MetricError::NoData),
            remaining_life_hrs: Err(MetricError::NoData),
            g_force_drop: Err(MetricError::NoData),
            daily: Err(MetricError::NoData),
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.derived.is_empty()
    }

    /// Every metric that could not be computed, for the warning list.
    pub fn unavailable(&self) -> Vec<(&'static str, &MetricError)> {
        let mut out = Vec::new();
        if let Err(e) = &self.average_utilization {
            out.push(("Average Screen Utilization", e));
        }
        if let Err(e) = &self.remaining_life_hrs {
            out.push(("Estimated Remaining Screen Life", e));
        }
        if let Err(e) = &self.g_force_drop {
            out.push(("Shaker G-Force Health", e));
        }
        if let Err(e) = &self.daily {
            out.push(("Daily Aggregates", e));
        }
        out
    }
}

/// Where per-record utilization comes from for this upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UtilizationSource {
    /// Derived from weight on bit, flow rate and the selected mesh.
    Derived,
    /// No sources, but the file carries a `Screen Utilization (%)` column.
    Column,
    /// Neither available; counts as zero.
    Zero,
}

pub fn calculate(table: &LogTable, config: &DashboardConfig) -> MetricsReport {
    if table.is_empty() {
        debug!("no records; returning no-data report");
        return MetricsReport::no_data();
    }

    let has_sources = table.has_column(COL_WEIGHT_ON_BIT) && table.has_column(COL_FLOW_RATE);
    let source = if has_sources {
        UtilizationSource::Derived
    } else if table.has_column(COL_SCREEN_UTILIZATION) {
        UtilizationSource::Column
    } else {
        UtilizationSource::Zero
    };
    debug!(?source, mesh = %config.mesh_type, "deriving per-record columns");

    let derived: Vec<DerivedRecord> = table
        .records
        .iter()
        .map(|r| derive_record(r, source, config.mesh_capacity()))
        .collect();

    let average_utilization = average_utilization(&derived);
    let remaining_life_hrs = require_all(table, &[COL_WEIGHT_ON_BIT, COL_FLOW_RATE])
        .and_then(|()| remaining_screen_life(&derived, config));
    let g_force_drop = require_all(table, &[COL_SHAKER_3, COL_FLOW_RATE])
        .map(|()| g_force_drop(&derived, config));
    let daily = match &table.timestamps {
        Ok(()) => Ok(daily_aggregates(&derived, config.utilization_threshold)),
        Err(e) => Err(MetricError::Timestamp(e.clone())),
    };

    debug!(
        avg_utilization = ?average_utilization.as_ref().ok(),
        remaining_life = ?remaining_life_hrs.as_ref().ok(),
        drop = ?g_force_drop.as_ref().ok(),
        "metrics computed"
    );

    MetricsReport {
        derived,
        average_utilization,
        remaining_life_hrs,
        g_force_drop,
        daily,
    }
}

fn require_all(table: &LogTable, columns: &[&str]) -> MetricResult<()> {
    columns.iter().try_for_each(|c| table.require(c))
}

fn derive_record(r: &Record, source: UtilizationSource, mesh_capacity: f64) -> DerivedRecord {
    let solids_volume_rate = match (r.weight_on_bit, r.flow_rate) {
        (Some(wob), Some(flow)) => Some(wob * flow / 100.0),
        _ => None,
    };
    let screen_utilization_pct = match source {
        UtilizationSource::Column => r.screen_utilization_pct,
        UtilizationSource::Derived => solids_volume_rate.map(|s| s / mesh_capacity * 100.0),
        UtilizationSource::Zero => Some(0.0),
    };
    let rop_proxy = match (r.weight_on_bit, r.flow_rate) {
        (Some(wob), Some(flow)) => Some(wob * flow),
        _ => None,
    };
    DerivedRecord {
        timestamp: r.timestamp,
        shaker_1: r.shaker_1,
        shaker_2: r.shaker_2,
        shaker_3: r.shaker_3,
        flow_rate: r.flow_rate,
        solids_volume_rate,
        screen_utilization_pct,
        rop_proxy,
    }
}

pub fn average_utilization(derived: &[DerivedRecord]) -> MetricResult<f64> {
    if derived.is_empty() {
        return Err(MetricError::NoData);
    }
    mean(derived.iter().map(|d| d.screen_utilization_pct))
        .ok_or_else(|| MetricError::NoValues(COL_SCREEN_UTILIZATION.to_string()))
}

/// `expected − mean(ROP proxy) / divisor × hours_per_usage`, held within `[0, expected]`.
pub fn remaining_screen_life(
    derived: &[DerivedRecord],
    config: &DashboardConfig,
) -> MetricResult<f64> {
    if derived.is_empty() {
        return Err(MetricError::NoData);
    }
    let h = &config.heuristics;
    let mean_rop = mean(derived.iter().map(|d| d.rop_proxy))
        .ok_or_else(|| MetricError::NoValues("ROP Proxy".to_string()))?;
    let usage_factor = mean_rop / h.usage_divisor;
    let life_used = usage_factor * h.life_hours_per_usage;
    Ok((h.expected_life_hrs - life_used).clamp(0.0, h.expected_life_hrs))
}

/// True if any adjacent pair shows a SHAKER #3 jump while flow holds steady.
/// Pairs with a gap in either series never flag.
pub fn g_force_drop(derived: &[DerivedRecord], config: &DashboardConfig) -> bool {
    let h = &config.heuristics;
    derived.windows(2).any(|pair| {
        match (
            pair[0].shaker_3,
            pair[1].shaker_3,
            pair[0].flow_rate,
            pair[1].flow_rate,
        ) {
            (Some(s0), Some(s1), Some(f0), Some(f1)) => {
                (s1 - s0).abs() > h.shaker_jump && (f1 - f0).abs() < h.flow_tolerance
            }
            _ => false,
        }
    })
}

/// Group by calendar date, ascending. Days with no samples are absent.
pub fn daily_aggregates(derived: &[DerivedRecord], threshold: u32) -> Vec<DailyAggregate> {
    let mut by_day: BTreeMap<chrono::NaiveDate, Vec<&DerivedRecord>> = BTreeMap::new();
    for d in derived {
        if let Some(ts) = d.timestamp {
            by_day.entry(ts.date()).or_default().push(d);
        }
    }

    by_day
        .into_iter()
        .map(|(date, rows)| {
            let avg_utilization = mean(rows.iter().map(|d| d.screen_utilization_pct));
            DailyAggregate {
                date,
                samples: rows.len(),
                avg_utilization,
                avg_flow_rate: mean(rows.iter().map(|d| d.flow_rate)),
                avg_shaker3: mean(rows.iter().map(|d| d.shaker_3)),
                max_shaker3: max(rows.iter().map(|d| d.shaker_3)),
                exceeds_threshold: avg_utilization.is_some_and(|u| u > f64::from(threshold)),
            }
        })
        .collect()
}
