use std::path::Path;

use crate::error::Result;
use crate::types::Crop;

/// Per-person planting list: (name, plants, spacing in inches, trellised).
const PER_PERSON: &[(&str, u32, u32, bool)] = &[
    ("asparagus", 25, 9, false),
    ("broccoli", 15, 18, false),
    ("bush green beans", 50, 6, false),
    ("cabbage", 10, 12, false),
    ("carrots", 120, 3, false),
    ("celery", 10, 6, false),
    ("corn, sweet", 100, 12, false),
    ("cucumbers", 4, 12, true),
    ("dried beans", 50, 6, true),
    ("garlic", 50, 4, false),
    ("green onions", 15, 3, false),
    ("kale", 40, 12, false),
    ("lettuce/other greens", 40, 12, false),
    ("onion bulbs", 50, 5, false),
    ("peppers", 7, 12, false),
    ("potatoes", 50, 12, false),
    ("snap peas", 40, 5, true),
    ("summer squash", 2, 12, false),
    ("sweet potatoes", 8, 12, false),
    ("tomatoes (>50% paste)", 12, 12, true),
    ("winter squash", 4, 12, false),
];

pub fn baseline_crops() -> Vec<Crop> {
    PER_PERSON
        .iter()
        .map(|&(name, count, spacing, trellised)| Crop::new(name, count, spacing, trellised))
        .collect()
}

/// Reads a JSON array of crops.
pub fn load_crops(path: impl AsRef<Path>) -> Result<Vec<Crop>> {
    let text = std::fs::read_to_string(path)?;
    parse_crops(&text)
}

pub fn parse_crops(text: &str) -> Result<Vec<Crop>> {
    Ok(serde_json::from_str(text)?)
}
