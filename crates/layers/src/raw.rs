//! Raw region dump conversion into marker records.

use formats::{MarkerLayerConfig, MarkerRecord, RawRegion, RawRegionDocument, SpawnArea};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::symbology::{DEFAULT_COLOR, DEFAULT_OPACITY, DEFAULT_WEIGHT, LayerStyle};

/// Whether a region is worth drawing on the map.
///
/// Child regions, the global region and regions that deny chat notifications
/// are hidden.
pub fn is_visualizable(region: &RawRegion) -> bool {
    if region.has_parent() {
        return false;
    }
    if region.kind.as_deref() == Some("global") {
        return false;
    }
    region.flag("send-chat") != Some("deny")
}

/// Converts every visualizable region of `doc` in document order.
pub fn convert_raw(doc: &RawRegionDocument, layer: &MarkerLayerConfig) -> Vec<MarkerRecord> {
    for rejected in &doc.rejected {
        warn!(layer = %layer.name, region = %rejected.key, "skipping region: {}", rejected.reason);
    }

    let style = LayerStyle::from_config(layer);
    let mut out = Vec::with_capacity(doc.regions.len());
    for (key, region) in &doc.regions {
        if !is_visualizable(region) {
            debug!(layer = %layer.name, region = %key, "region hidden");
            continue;
        }
        out.push(convert_region(key, region, &style));
    }
    out
}

fn convert_region(key: &str, region: &RawRegion, style: &LayerStyle) -> MarkerRecord {
    let mut record = MarkerRecord::new();
    record.insert("name", key);
    record.insert("description", "");
    record.insert("tooltip", key);
    record.insert("color", style.color.clone());
    record.insert("weight", style.weight);
    record.insert("opacity", style.opacity);
    record.insert("radius", style.radius);

    match region.kind.as_deref() {
        Some("poly2d") => {
            let ring: Vec<Value> = region
                .points
                .iter()
                .flatten()
                .map(|p| json!([p.x, p.z]))
                .collect();
            record.insert("shape", "polygon");
            record.insert("latlngs", json!([ring, []]));
        }
        Some("cuboid") => {
            let corners: Vec<Value> = [region.min, region.max]
                .into_iter()
                .flatten()
                .map(|p| json!([p.x, p.z]))
                .collect();
            record.insert("shape", "rectangle");
            record.insert("latlng", Value::Array(corners));
        }
        _ => {
            record.insert("shape", "circle");
            record.insert("latlng", json!([0, 0]));
        }
    }
    record
}

/// The spawn rectangle of a world as a marker record.
pub fn spawn_marker(spawn: &SpawnArea) -> MarkerRecord {
    let valid = |v: Option<f64>| v.filter(|v| v.is_finite() && *v >= 0.0);
    let mut record = MarkerRecord::new();
    record.insert("name", spawn.name.clone());
    record.insert("description", "");
    record.insert("shape", "rectangle");
    record.insert(
        "latlng",
        json!([[spawn.x1, spawn.y1], [spawn.x2, spawn.y2]]),
    );
    record.insert(
        "color",
        spawn
            .color
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
    );
    record.insert("opacity", valid(spawn.opacity).unwrap_or(DEFAULT_OPACITY));
    record.insert("weight", valid(spawn.weight).unwrap_or(DEFAULT_WEIGHT));
    record
}

#[cfg(test)]
mod tests {
    use super::{convert_raw, is_visualizable, spawn_marker};
    use formats::{MarkerLayerConfig, RawRegionDocument, SpawnArea};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn layer() -> MarkerLayerConfig {
        MarkerLayerConfig {
            name: "Regions".to_string(),
            path: "/regions.json".to_string(),
            raw: true,
            color: Some("green".to_string()),
            opacity: Some(-2.0),
            ..Default::default()
        }
    }

    #[test]
    fn skips_children_global_and_silenced_regions() {
        let doc = RawRegionDocument::from_value(json!({"regions": {
            "child": {"type": "cuboid", "parent": "town", "min": {"x": 0, "z": 0}, "max": {"x": 1, "z": 1}},
            "__global__": {"type": "global"},
            "quiet": {"type": "poly2d", "flags": {"send-chat": "deny"}, "points": []},
            "town": {"type": "cuboid", "min": {"x": -5, "z": 2}, "max": {"x": 7, "z": 9}}
        }}))
        .expect("doc");
        let records = convert_raw(&doc, &layer());
        let names: Vec<_> = records.iter().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["town"]);
        assert!(!is_visualizable(&doc.regions[0].1));
    }

    #[test]
    fn cuboid_becomes_rectangle_with_layer_style() {
        let doc = RawRegionDocument::from_value(json!({"regions": {
            "town": {"type": "cuboid", "min": {"x": -5, "y": 0, "z": 2}, "max": {"x": 7, "y": 255, "z": 9}}
        }}))
        .expect("doc");
        let records = convert_raw(&doc, &layer());
        let town = &records[0];
        assert_eq!(town.str("shape"), Some("rectangle"));
        assert_eq!(town.get("latlng"), Some(&json!([[-5.0, 2.0], [7.0, 9.0]])));
        assert_eq!(town.str("tooltip"), Some("town"));
        assert_eq!(town.str("color"), Some("green"));
        assert_eq!(town.number("opacity"), Some(0.5));
        assert_eq!(town.number("weight"), Some(2.0));
    }

    #[test]
    fn poly2d_becomes_polygon_with_empty_cutout() {
        let doc = RawRegionDocument::from_value(json!({"regions": {
            "farm": {"type": "poly2d", "points": [{"x": 0, "z": 0}, {"x": 4, "z": 0}, {"x": 4, "z": 4}]},
            "odd": {"type": "sphere"}
        }}))
        .expect("doc");
        let records = convert_raw(&doc, &layer());
        assert_eq!(records[0].str("shape"), Some("polygon"));
        assert_eq!(
            records[0].get("latlngs"),
            Some(&json!([[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0]], []]))
        );
        assert_eq!(records[1].str("shape"), Some("circle"));
        assert_eq!(records[1].get("latlng"), Some(&json!([0, 0])));
    }

    #[test]
    fn spawn_area_is_a_rectangle() {
        let spawn = SpawnArea {
            name: "Spawn".to_string(),
            x1: -100.0,
            y1: -100.0,
            x2: 100.0,
            y2: 100.0,
            color: None,
            opacity: Some(0.1),
            weight: None,
        };
        let record = spawn_marker(&spawn);
        assert_eq!(record.str("shape"), Some("rectangle"));
        assert_eq!(record.get("latlng"), Some(&json!([[-100.0, -100.0], [100.0, 100.0]])));
        assert_eq!(record.str("color"), Some("red"));
        assert_eq!(record.number("opacity"), Some(0.1));
    }
}
