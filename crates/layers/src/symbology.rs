//! Marker style attributes and the default-fill step.

use formats::{MarkerLayerConfig, MarkerRecord};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_NAME: &str = "unidentified";
pub const DEFAULT_SHAPE: &str = "circle";
pub const DEFAULT_COLOR: &str = "red";
pub const DEFAULT_WEIGHT: f64 = 2.0;
pub const DEFAULT_RADIUS: f64 = 15.0;
pub const DEFAULT_OPACITY: f64 = 0.5;
pub const MAX_RADIUS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub name: String,
    pub description: String,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub radius: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: String::new(),
            color: DEFAULT_COLOR.to_string(),
            weight: DEFAULT_WEIGHT,
            opacity: DEFAULT_OPACITY,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl Style {
    /// Reads a marker's style, substituting defaults for invalid fields.
    pub fn from_record(record: &MarkerRecord) -> Self {
        let defaults = Self::default();
        Self {
            name: non_empty_str(record, "name").unwrap_or(defaults.name),
            description: record
                .str("description")
                .map(str::to_string)
                .unwrap_or(defaults.description),
            color: non_empty_str(record, "color").unwrap_or(defaults.color),
            weight: record.non_negative("weight").unwrap_or(defaults.weight),
            opacity: record.non_negative("opacity").unwrap_or(defaults.opacity),
            radius: record.non_negative("radius").unwrap_or(defaults.radius),
        }
    }

    /// `name - description`, or just the name.
    pub fn title(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.description)
        }
    }
}

/// Style fallbacks a marker layer config supplies to converted regions.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub radius: f64,
}

impl LayerStyle {
    pub fn from_config(layer: &MarkerLayerConfig) -> Self {
        let valid = |v: Option<f64>| v.filter(|v| v.is_finite() && *v >= 0.0);
        Self {
            color: layer
                .color
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            weight: valid(layer.weight).unwrap_or(DEFAULT_WEIGHT),
            opacity: valid(layer.opacity).unwrap_or(DEFAULT_OPACITY),
            radius: valid(layer.radius).unwrap_or(DEFAULT_RADIUS),
        }
    }
}

fn non_empty_str(record: &MarkerRecord, key: &str) -> Option<String> {
    record
        .str(key)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn default_tooltip(name: &str, description: &str) -> String {
    if description.is_empty() {
        name.to_string()
    } else {
        format!("{name}<br/><b>{description}</b>")
    }
}

/// Fills every missing or invalid attribute of a marker in place.
///
/// Valid fields are never overwritten, so a second pass is a no-op. A
/// `radius_eval` carried by the marker is folded into the radius and removed.
pub fn fill_defaults(record: &mut MarkerRecord) {
    if non_empty_str(record, "name").is_none() {
        record.insert("name", DEFAULT_NAME);
    }
    if record.str("description").is_none() {
        record.insert("description", "");
    }
    if non_empty_str(record, "shape").is_none() {
        record.insert("shape", DEFAULT_SHAPE);
    }
    if record.non_negative("weight").is_none() {
        record.insert("weight", DEFAULT_WEIGHT);
    }
    if record.non_negative("opacity").is_none() {
        record.insert("opacity", DEFAULT_OPACITY);
    }
    if non_empty_str(record, "color").is_none() {
        record.insert("color", DEFAULT_COLOR);
    }

    let mut radius = record.non_negative("radius").unwrap_or(DEFAULT_RADIUS);
    if let Some(eval) = record.remove("radius_eval") {
        match eval.as_f64().filter(|v| v.is_finite() && *v >= 0.0) {
            Some(operand) => radius = (radius + operand.sqrt()).round(),
            None => warn!(
                marker = record.name().unwrap_or(DEFAULT_NAME),
                "ignoring non-numeric radius_eval {eval}"
            ),
        }
    }
    let radius = radius.min(MAX_RADIUS);
    if record.number("radius") != Some(radius) {
        record.insert("radius", radius);
    }

    if non_empty_str(record, "tooltip").is_none() {
        let name = record.name().unwrap_or(DEFAULT_NAME).to_string();
        let description = record.str("description").unwrap_or_default().to_string();
        record.insert("tooltip", default_tooltip(&name, &description));
    }

    for key in ["latlng", "latlngs"] {
        if !record.contains(key) {
            record.insert(key, Value::Array(Vec::new()));
        }
    }
}
