// Time-series SVG charts: utilization, the three shaker outputs, flow rate.
use crate::types::DerivedRecord;
use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

struct Series {
    label: &'static str,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

/// Hours since the first sample. `None` if any record lacks a timestamp.
fn elapsed_hours(derived: &[DerivedRecord]) -> Option<Vec<f64>> {
    let t0 = derived.first()?.timestamp?;
    derived
        .iter()
        .map(|d| d.timestamp.map(|ts| (ts - t0).num_milliseconds() as f64 / 3_600_000.0))
        .collect()
}

fn series(
    label: &'static str,
    color: RGBColor,
    hours: &[f64],
    derived: &[DerivedRecord],
    value: impl Fn(&DerivedRecord) -> Option<f64>,
) -> Series {
    let points = hours
        .iter()
        .zip(derived)
        .filter_map(|(h, d)| value(d).map(|v| (*h, v)))
        .collect();
    Series { label, color, points }
}

pub fn render_all(dir: &Path, derived: &[DerivedRecord]) -> Result<Vec<PathBuf>> {
    let hours = elapsed_hours(derived)
        .ok_or_else(|| anyhow!("charts need a timestamp on every record"))?;
    std::fs::create_dir_all(dir)?;

    let charts = [
        (
            "screen_utilization.svg",
            "Screen Utilization Over Time",
            "% Utilization",
            vec![series("Utilization", BLUE, &hours, derived, |d| {
                d.screen_utilization_pct
            })],
        ),
        (
            "shaker_outputs.svg",
            "Shaker Outputs",
            "Reading",
            vec![
                series("SHAKER #1", RGBColor(31, 119, 180), &hours, derived, |d| d.shaker_1),
                series("SHAKER #2", RGBColor(255, 127, 14), &hours, derived, |d| d.shaker_2),
                series("SHAKER #3", RGBColor(44, 160, 44), &hours, derived, |d| d.shaker_3),
            ],
        ),
        (
            "flow_rate.svg",
            "Flow Rate Over Time",
            "GPM",
            vec![series("Flow Rate", RGBColor(200, 0, 100), &hours, derived, |d| {
                d.flow_rate
            })],
        ),
    ];

    let mut written = Vec::with_capacity(charts.len());
    for (file, title, y_desc, lines) in charts {
        let path = dir.join(file);
        draw_line_chart(&path, title, y_desc, &lines)?;
        info!(path = %path.display(), "wrote chart");
        written.push(path);
    }
    Ok(written)
}

fn bounds(lines: &[Series]) -> (f64, f64, f64) {
    let points = lines.iter().flat_map(|s| s.points.iter());
    let (mut x_max, mut y_min, mut y_max) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in points {
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        return (x_max, 0.0, 1.0);
    }
    let pad = ((y_max - y_min) * 0.05).max(1.0);
    (x_max, y_min - pad, y_max + pad)
}

fn draw_line_chart(path: &Path, title: &str, y_desc: &str, lines: &[Series]) -> Result<()> {
    let root = SVGBackend::new(path, (1280, 720)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_max, y_min, y_max) = bounds(lines);
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Hours since first sample")
        .y_desc(y_desc)
        .x_label_formatter(&|v| format!("{:.1}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    for line in lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), &color))?
            .label(line.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color));
    }

    if lines.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(hour: u32, value: f64) -> DerivedRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap();
        DerivedRecord {
            timestamp: Some(ts),
            shaker_1: Some(value),
            shaker_2: Some(value + 1.0),
            shaker_3: Some(value + 2.0),
            flow_rate: Some(500.0),
            solids_volume_rate: Some(100.0),
            screen_utilization_pct: Some(40.0),
            rop_proxy: Some(10_000.0),
        }
    }

    #[test]
    fn elapsed_hours_are_relative_to_first_sample() {
        let hours = elapsed_hours(&[record(1, 0.0), record(4, 0.0)]).unwrap();
        assert_eq!(hours, vec![0.0, 3.0]);

        let mut missing = vec![record(1, 0.0), record(2, 0.0)];
        missing[1].timestamp = None;
        assert!(elapsed_hours(&missing).is_none());
    }

    #[test]
    fn bounds_pad_flat_series() {
        let flat = Series {
            label: "x",
            color: BLUE,
            points: vec![(0.0, 5.0), (0.0, 5.0)],
        };
        assert_eq!(bounds(&[flat]), (1.0, 4.0, 6.0));
    }

    #[test]
    fn refuses_records_without_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = record(1, 10.0);
        r.timestamp = None;
        assert!(render_all(dir.path(), &[r]).is_err());
    }

    #[test]
    fn writes_three_svg_files() {
        let dir = tempfile::tempdir().unwrap();
        let derived: Vec<DerivedRecord> = (0..6).map(|h| record(h, 20.0 + h as f64)).collect();
        let written = render_all(dir.path(), &derived).unwrap();
        assert_eq!(written.len(), 3);
        for path in written {
            let svg = std::fs::read_to_string(&path).unwrap();
            assert!(svg.contains("<svg"), "{} is not an SVG", path.display());
        }
    }
}
