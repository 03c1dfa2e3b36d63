use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const COL_DATE: &str = "YYYY/MM/DD";
pub const COL_TIME: &str = "HH:MM:SS";
pub const COL_WEIGHT_ON_BIT: &str = "Weight on Bit (klbs)";
pub const COL_SHAKER_1: &str = "SHAKER #1 (Units)";
pub const COL_SHAKER_2: &str = "SHAKER #2 (Units)";
pub const COL_SHAKER_3: &str = "SHAKER #3 (PERCENT)";
pub const COL_FLOW_RATE: &str = "MA_Flow_Rate (gal/min)";
pub const COL_SCREEN_UTILIZATION: &str = "Screen Utilization (%)";

/// Columns a rig log export is expected to carry.
pub const REQUIRED_COLUMNS: [&str; 21] = [
    COL_DATE,
    COL_TIME,
    "Hole Depth (feet)",
    "Bit Depth (feet)",
    "Hook Load (klbs)",
    "Total Mud Volume (barrels)",
    COL_WEIGHT_ON_BIT,
    COL_SHAKER_1,
    "Tool Face (degrees)",
    COL_SHAKER_2,
    COL_SHAKER_3,
    "Heavy Ratio (percent)",
    "PVT Monitor Mud Gain/Loss (barrels)",
    "Total Mud Low Warning (barrels)",
    "Flow Low Warning (flow_percent)",
    "Flow High Warning (flow_percent)",
    "Trip Mud High Warning (barrels)",
    "MA_Temp (degF)",
    COL_FLOW_RATE,
    "Site Mud Volume (barrels)",
    "Inactive Mud Volume (barrels)",
];

#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "YYYY/MM/DD")]
    pub date: Option<String>,
    #[serde(rename = "HH:MM:SS")]
    pub time: Option<String>,
    #[serde(rename = "Hole Depth (feet)")]
    pub hole_depth: Option<String>,
    #[serde(rename = "Bit Depth (feet)")]
    pub bit_depth: Option<String>,
    #[serde(rename = "Hook Load (klbs)")]
    pub hook_load: Option<String>,
    #[serde(rename = "Total Mud Volume (barrels)")]
    pub total_mud_volume: Option<String>,
    #[serde(rename = "Weight on Bit (klbs)")]
    pub weight_on_bit: Option<String>,
    #[serde(rename = "SHAKER #1 (Units)")]
    pub shaker_1: Option<String>,
    #[serde(rename = "Tool Face (degrees)")]
    pub tool_face: Option<String>,
    #[serde(rename = "SHAKER #2 (Units)")]
    pub shaker_2: Option<String>,
    #[serde(rename = "SHAKER #3 (PERCENT)")]
    pub shaker_3: Option<String>,
    #[serde(rename = "Heavy Ratio (percent)")]
    pub heavy_ratio: Option<String>,
    #[serde(rename = "PVT Monitor Mud Gain/Loss (barrels)")]
    pub pvt_gain_loss: Option<String>,
    #[serde(rename = "Total Mud Low Warning (barrels)")]
    pub total_mud_low_warning: Option<String>,
    #[serde(rename = "Flow Low Warning (flow_percent)")]
    pub flow_low_warning: Option<String>,
    #[serde(rename = "Flow High Warning (flow_percent)")]
    pub flow_high_warning: Option<String>,
    #[serde(rename = "Trip Mud High Warning (barrels)")]
    pub trip_mud_high_warning: Option<String>,
    #[serde(rename = "MA_Temp (degF)")]
    pub mud_temp: Option<String>,
    #[serde(rename = "MA_Flow_Rate (gal/min)")]
    pub flow_rate: Option<String>,
    #[serde(rename = "Site Mud Volume (barrels)")]
    pub site_mud_volume: Option<String>,
    #[serde(rename = "Inactive Mud Volume (barrels)")]
    pub inactive_mud_volume: Option<String>,
    #[serde(rename = "Screen Utilization (%)")]
    pub screen_utilization_pct: Option<String>,
}

/// One sensor sample with every cell parsed. A `None` is a blank or
/// unparseable cell, or a column the file does not have.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// 1-based data row in the source file.
    pub row: usize,
    pub timestamp: Option<NaiveDateTime>,
    pub hole_depth: Option<f64>,
    pub bit_depth: Option<f64>,
    pub hook_load: Option<f64>,
    pub total_mud_volume: Option<f64>,
    pub weight_on_bit: Option<f64>,
    pub tool_face: Option<f64>,
    pub shaker_1: Option<f64>,
    pub shaker_2: Option<f64>,
    pub shaker_3: Option<f64>,
    pub flow_rate: Option<f64>,
    pub heavy_ratio: Option<f64>,
    pub pvt_gain_loss: Option<f64>,
    pub total_mud_low_warning: Option<f64>,
    pub flow_low_warning: Option<f64>,
    pub flow_high_warning: Option<f64>,
    pub trip_mud_high_warning: Option<f64>,
    pub mud_temp: Option<f64>,
    pub site_mud_volume: Option<f64>,
    pub inactive_mud_volume: Option<f64>,
    /// Only set when the file already carries a utilization column.
    pub screen_utilization_pct: Option<f64>,
}

/// Per-record values derived by the calculator, plus the series the charts plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "SHAKER #1 (Units)")]
    pub shaker_1: Option<f64>,
    #[serde(rename = "SHAKER #2 (Units)")]
    pub shaker_2: Option<f64>,
    #[serde(rename = "SHAKER #3 (PERCENT)")]
    pub shaker_3: Option<f64>,
    #[serde(rename = "MA_Flow_Rate (gal/min)")]
    pub flow_rate: Option<f64>,
    #[serde(rename = "Solids Volume Rate (gpm)")]
    pub solids_volume_rate: Option<f64>,
    #[serde(rename = "Screen Utilization (%)")]
    pub screen_utilization_pct: Option<f64>,
    #[serde(rename = "ROP Proxy")]
    pub rop_proxy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub samples: usize,
    pub avg_utilization: Option<f64>,
    pub avg_flow_rate: Option<f64>,
    pub avg_shaker3: Option<f64>,
    pub max_shaker3: Option<f64>,
    pub exceeds_threshold: bool,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyAggregateRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Samples")]
    #[tabled(rename = "Samples")]
    pub samples: String,
    #[serde(rename = "AvgUtilization")]
    #[tabled(rename = "AvgUtilization (%)")]
    pub avg_utilization: String,
    #[serde(rename = "AvgFlowRate")]
    #[tabled(rename = "AvgFlowRate (gpm)")]
    pub avg_flow_rate: String,
    #[serde(rename = "AvgShaker3")]
    #[tabled(rename = "AvgShaker3 (%)")]
    pub avg_shaker3: String,
    #[serde(rename = "MaxShaker3")]
    #[tabled(rename = "MaxShaker3 (%)")]
    pub max_shaker3: String,
    #[serde(rename = "ExceedsThreshold")]
    #[tabled(rename = "ExceedsThreshold")]
    pub exceeds_threshold: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ColumnStatusRow {
    #[tabled(rename = "Column")]
    pub column: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

/// Machine-readable KPI snapshot written as `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub mesh_type: String,
    pub mesh_capacity: u32,
    pub utilization_threshold: u32,
    pub total_records: usize,
    pub avg_screen_utilization_pct: Option<f64>,
    pub remaining_screen_life_hrs: Option<f64>,
    pub g_force_drop_detected: Option<bool>,
    pub days: usize,
    pub days_exceeding_threshold: usize,
    pub warnings: Vec<String>,
}
