use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PlanError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub name: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub baseline_count: u32,
    /// Plant spacing in inches.
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub spacing: u32,
    #[serde(default)]
    pub trellised: bool,
}

impl Crop {
    pub fn new(name: impl Into<String>, baseline_count: u32, spacing: u32, trellised: bool) -> Self {
        Self {
            name: name.into(),
            baseline_count,
            spacing,
            trellised,
        }
    }

    /// Plant count after scaling by `multiplier`, rounded up. `None` if the
    /// count does not fit in a `u64`.
    pub fn scaled_count(&self, multiplier: f64) -> Option<u64> {
        let count = (self.baseline_count as f64 * multiplier).ceil();
        if count.is_nan() || count >= u64::MAX as f64 {
            return None;
        }
        Some(count.max(0.0) as u64)
    }
}

/// A contiguous planting segment of one crop. Pieces are never split further
/// by the packer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub length: u32,
    pub label: String,
    pub crop: String,
}

impl Piece {
    pub fn new(length: u32, label: impl Into<String>, crop: impl Into<String>) -> Self {
        Self {
            length,
            label: label.into(),
            crop: crop.into(),
        }
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} in)", self.label, self.length)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub pieces: Vec<Piece>,
}

impl Row {
    pub fn used(&self) -> u64 {
        self.pieces.iter().map(|p| p.length as u64).sum()
    }

    pub fn remaining(&self, row_length: u32) -> u64 {
        (row_length as u64).saturating_sub(self.used())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingResult {
    pub scaled_counts: BTreeMap<String, u64>,
    /// Pieces in crop order, before the packer sorts them.
    pub pieces: Vec<Piece>,
    pub rows: Vec<Row>,
    pub row_length: u32,
    pub total_length: u64,
    pub waste: u64,
}

impl PackingResult {
    pub fn capacity(&self) -> u64 {
        self.row_length as u64 * self.rows.len() as u64
    }

    pub fn waste_percent(&self) -> f64 {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0.0;
        }
        self.waste as f64 / capacity as f64 * 100.0
    }
}

/// An exact multiplier `num / den`, kept in lowest terms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    pub fn new(num: u64, den: u64) -> Self {
        let g = gcd(num, den).max(1);
        Self {
            num: num / g,
            den: den / g,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Ratio {}

impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ratio {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.num as u128 * other.den as u128).cmp(&(other.num as u128 * self.den as u128))
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Largest accepted number of rows.
pub const MAX_ROWS: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_row_length", deserialize_with = "deserialize_u32_from_number")]
    pub row_length: u32,
    #[serde(default = "default_bed_width", deserialize_with = "deserialize_u32_from_number")]
    pub bed_width: u32,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations", deserialize_with = "deserialize_u32_from_number")]
    pub max_iterations: u32,
    #[serde(default = "default_multiplier_ceiling")]
    pub multiplier_ceiling: f64,
}

fn default_rows() -> usize {
    12
}

fn default_row_length() -> u32 {
    360
}

fn default_bed_width() -> u32 {
    36
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_max_iterations() -> u32 {
    60
}

fn default_multiplier_ceiling() -> f64 {
    1e6
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            row_length: default_row_length(),
            bed_width: default_bed_width(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            multiplier_ceiling: default_multiplier_ceiling(),
        }
    }
}

impl PlannerConfig {
    pub fn capacity(&self) -> u64 {
        self.row_length as u64 * self.rows as u64
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(PlanError::InvalidInput("number of rows must be non-zero".to_string()));
        }
        if self.rows > MAX_ROWS {
            return Err(PlanError::InvalidInput(format!(
                "number of rows must be at most {MAX_ROWS}, got {}",
                self.rows
            )));
        }
        if self.row_length == 0 {
            return Err(PlanError::InvalidInput("row length must be non-zero".to_string()));
        }
        if (self.row_length as u64).checked_mul(self.rows as u64).is_none() {
            return Err(PlanError::InvalidInput(format!(
                "{} rows of {} in exceed the representable garden length",
                self.rows, self.row_length
            )));
        }
        if self.bed_width == 0 {
            return Err(PlanError::InvalidInput("bed width must be non-zero".to_string()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PlanError::InvalidInput(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if !(self.multiplier_ceiling.is_finite() && self.multiplier_ceiling >= 1.0) {
            return Err(PlanError::InvalidInput(format!(
                "multiplier ceiling must be at least 1, got {}",
                self.multiplier_ceiling
            )));
        }
        Ok(())
    }
}

/// Accepts any JSON number that holds a non-negative integer (`12` or `12.0`).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(D::Error::custom(format!(
            "expected a non-negative integer, got {value}"
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_count_rounds_up() {
        let crop = Crop::new("kale", 40, 12, false);
        assert_eq!(crop.scaled_count(0.0), Some(0));
        assert_eq!(crop.scaled_count(1.0), Some(40));
        assert_eq!(crop.scaled_count(1.01), Some(41));
        assert_eq!(crop.scaled_count(0.5), Some(20));
    }

    #[test]
    fn test_scaled_count_out_of_range() {
        let crop = Crop::new("beans", 1, 2, true);
        assert_eq!(crop.scaled_count(9.223372036854775808e18), Some(1 << 63));
        assert_eq!(crop.scaled_count(1.8446744073709551616e19), None);
        assert_eq!(crop.scaled_count(f64::MAX), None);
        assert_eq!(crop.scaled_count(f64::NAN), None);
    }

    #[test]
    fn test_ratio_compares_by_value() {
        assert_eq!(Ratio::new(120, 100), Ratio::new(6, 5));
        assert!(Ratio::new(1, 3) < Ratio::new(1, 2));
        assert_eq!(Ratio::new(120, 100).to_string(), "6/5");
        assert_eq!(Ratio::new(0, 40).to_string(), "0/1");
    }

    #[test]
    fn test_config_validation() {
        assert!(PlannerConfig::default().validate().is_ok());
        let zero_rows = PlannerConfig {
            rows: 0,
            ..PlannerConfig::default()
        };
        assert!(matches!(zero_rows.validate(), Err(PlanError::InvalidInput(_))));
        let bad_tolerance = PlannerConfig {
            tolerance: -1.0,
            ..PlannerConfig::default()
        };
        assert!(bad_tolerance.validate().is_err());
    }

    #[test]
    fn test_config_rejects_huge_row_counts() {
        let at_limit = PlannerConfig {
            rows: MAX_ROWS,
            row_length: u32::MAX,
            ..PlannerConfig::default()
        };
        assert!(at_limit.validate().is_ok());
        assert_eq!(at_limit.capacity(), MAX_ROWS as u64 * u32::MAX as u64);

        for rows in [MAX_ROWS + 1, usize::MAX / 4, usize::MAX] {
            let config = PlannerConfig {
                rows,
                ..PlannerConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(PlanError::InvalidInput(_))),
                "{rows} rows accepted"
            );
        }
    }

    #[test]
    fn test_crop_deserializes_float_counts() {
        let crop: Crop =
            serde_json::from_str(r#"{"name": "peas", "baseline_count": 40.0, "spacing": 5}"#).unwrap();
        assert_eq!(crop, Crop::new("peas", 40, 5, false));
    }

    #[test]
    fn test_crop_rejects_negative_count() {
        let parsed: std::result::Result<Crop, _> =
            serde_json::from_str(r#"{"name": "peas", "baseline_count": -4, "spacing": 5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: PlannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rows, 12);
        assert_eq!(config.row_length, 360);
        assert_eq!(config.capacity(), 4320);
    }
}
