// Dashboard configuration.
//
// Replaces the sidebar widgets of the dashboard with an immutable value that
// is built once at startup and handed to the calculator.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_UTILIZATION_THRESHOLD: u32 = 80;
pub const UTILIZATION_THRESHOLD_RANGE: std::ops::RangeInclusive<u32> = 50..=100;

/// Screen mesh API rating. Each rating maps to a fixed, positive
/// solids-handling capacity, so utilization never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshType {
    #[default]
    #[serde(rename = "API 100")]
    Api100,
    #[serde(rename = "API 140")]
    Api140,
    #[serde(rename = "API 170")]
    Api170,
    #[serde(rename = "API 200")]
    Api200,
}

impl MeshType {
    pub const ALL: [MeshType; 4] = [
        MeshType::Api100,
        MeshType::Api140,
        MeshType::Api170,
        MeshType::Api200,
    ];

    pub fn capacity(self) -> u32 {
        match self {
            MeshType::Api100 => 250,
            MeshType::Api140 => 200,
            MeshType::Api170 => 160,
            MeshType::Api200 => 120,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshType::Api100 => "API 100",
            MeshType::Api140 => "API 140",
            MeshType::Api170 => "API 170",
            MeshType::Api200 => "API 200",
        }
    }
}

impl fmt::Display for MeshType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeshType {
    type Err = ConfigError;

    /// Accepts `API 100`, `api100`, `api-100` and a bare `100`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("api")
            .trim_start_matches(['-', '_', ' '])
            .to_string();
        match digits.as_str() {
            "100" => Ok(MeshType::Api100),
            "140" => Ok(MeshType::Api140),
            "170" => Ok(MeshType::Api170),
            "200" => Ok(MeshType::Api200),
            _ => Err(ConfigError::UnknownMesh(s.to_string())),
        }
    }
}

/// Empirical constants behind the screen-life and G-force rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    pub expected_life_hrs: f64,
    /// Mean ROP proxy is divided by this to get the usage factor.
    pub usage_divisor: f64,
    /// Screen hours consumed per unit of usage factor.
    pub life_hours_per_usage: f64,
    /// Minimum |Δ SHAKER #3| between adjacent samples to count as a jump.
    pub shaker_jump: f64,
    /// Maximum |Δ flow rate| for the jump to be attributed to the screen.
    pub flow_tolerance: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            expected_life_hrs: 120.0,
            usage_divisor: 1000.0,
            life_hours_per_usage: 10.0,
            shaker_jump: 10.0,
            flow_tolerance: 2.0,
        }
    }
}

impl Heuristics {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("expected_life_hrs", self.expected_life_hrs),
            ("usage_divisor", self.usage_divisor),
            ("life_hours_per_usage", self.life_hours_per_usage),
            ("shaker_jump", self.shaker_jump),
            ("flow_tolerance", self.flow_tolerance),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidHeuristic {
                    name,
                    reason: format!("expected a finite non-negative number, got {value}"),
                });
            }
        }
        if self.usage_divisor == 0.0 {
            return Err(ConfigError::InvalidHeuristic {
                name: "usage_divisor",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardConfig {
    pub mesh_type: MeshType,
    pub utilization_threshold: u32,
    pub heuristics: Heuristics,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mesh_type: MeshType::default(),
            utilization_threshold: DEFAULT_UTILIZATION_THRESHOLD,
            heuristics: Heuristics::default(),
        }
    }
}

impl DashboardConfig {
    pub fn new(
        mesh_type: MeshType,
        utilization_threshold: u32,
        heuristics: Heuristics,
    ) -> Result<Self, ConfigError> {
        if !UTILIZATION_THRESHOLD_RANGE.contains(&utilization_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(utilization_threshold));
        }
        heuristics.validate()?;
        Ok(Self {
            mesh_type,
            utilization_threshold,
            heuristics,
        })
    }

    pub fn mesh_capacity(&self) -> f64 {
        f64::from(self.mesh_type.capacity())
    }
}

/// Shape of the optional TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mesh_type: Option<String>,
    pub utilization_threshold: Option<u32>,
    pub heuristics: Heuristics,
}

pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()?;
    Ok(settings.try_deserialize::<FileConfig>()?)
}

/// Merge defaults, an optional file and CLI overrides (highest precedence).
pub fn resolve(
    file: Option<FileConfig>,
    mesh_override: Option<MeshType>,
    threshold_override: Option<u32>,
) -> Result<DashboardConfig, ConfigError> {
    let file = file.unwrap_or_default();
    let mesh_type = match (mesh_override, file.mesh_type.as_deref()) {
        (Some(m), _) => m,
        (None, Some(s)) => s.parse()?,
        (None, None) => MeshType::default(),
    };
    let threshold = threshold_override
        .or(file.utilization_threshold)
        .unwrap_or(DEFAULT_UTILIZATION_THRESHOLD);
    DashboardConfig::new(mesh_type, threshold, file.heuristics)
}
