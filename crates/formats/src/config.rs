//! World and map configuration.
//!
//! JSON field names follow the published map configuration (`path`, `type`,
//! `xsize`, `ysize`, `markers`, `alter`); descriptive names are accepted as
//! aliases.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use foundation::WorldId;
use foundation::math::{CoordScale, MapProjection};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_COORD_COR: f64 = 1.2;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    DuplicateWorld(WorldId),
    UnknownDefaultWorld(WorldId),
    InvalidScale { world: WorldId, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::DuplicateWorld(id) => write!(f, "world id {id} is configured twice"),
            ConfigError::UnknownDefaultWorld(id) => {
                write!(f, "default world id {id} is not configured")
            }
            ConfigError::InvalidScale { world, value } => {
                write!(f, "world {world} has invalid coordCor {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultConfig {
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub map_resolution: f64,
    pub map_extent: [f64; 4],
    #[serde(rename = "defaultWorldID", alias = "defaultWorldId")]
    pub default_world_id: WorldId,
    #[serde(default = "default_coord_cor")]
    pub coord_cor: f64,
}

fn default_coord_cor() -> f64 {
    DEFAULT_COORD_COR
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            min_zoom: 3,
            max_zoom: 6,
            map_resolution: 1.0,
            map_extent: [-5120.0, -5120.0, 5120.0, 5120.0],
            default_world_id: WorldId(0),
            coord_cor: DEFAULT_COORD_COR,
        }
    }
}

impl DefaultConfig {
    pub fn projection(&self) -> MapProjection {
        MapProjection::new(self.max_zoom, self.map_resolution, self.map_extent)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldKind {
    #[default]
    Default,
    Other,
    Archive,
}

/// Where a marker layer's base document comes from and how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// A marker array document.
    Markers { path: String },
    /// A raw region dump that needs conversion first.
    RawRegions { path: String },
}

impl LayerSource {
    pub fn path(&self) -> &str {
        match self {
            LayerSource::Markers { path } | LayerSource::RawRegions { path } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerLayerConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub raw: bool,
    /// Diagnostic layer, only loaded in alter view.
    #[serde(default)]
    pub alter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MarkerLayerConfig {
    pub fn source(&self) -> LayerSource {
        let path = self.path.clone();
        if self.raw {
            LayerSource::RawRegions { path }
        } else {
            LayerSource::Markers { path }
        }
    }
}

/// Spawn rectangle in game units; `y` is the game `z` axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    pub name: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub id: WorldId,
    pub name: String,
    #[serde(rename = "path", alias = "basePath")]
    pub base_path: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: WorldKind,
    #[serde(rename = "xsize", alias = "sizeX")]
    pub size_x: f64,
    #[serde(rename = "ysize", alias = "sizeZ")]
    pub size_z: f64,
    #[serde(rename = "coordCor", default, skip_serializing_if = "Option::is_none")]
    pub coord_cor: Option<f64>,
    #[serde(rename = "markers", alias = "markerLayerConfigs", default)]
    pub marker_layers: Vec<MarkerLayerConfig>,
    #[serde(rename = "alter", alias = "alterations", default)]
    pub alterations: BTreeMap<String, Vec<String>>,
    #[serde(
        default,
        deserialize_with = "deserialize_spawn",
        skip_serializing_if = "Option::is_none"
    )]
    pub spawn: Option<SpawnArea>,
    #[serde(rename = "attr", default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(
        rename = "markers_default",
        alias = "markersDefault",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub markers_default: Option<String>,
}

// Older configurations write `"spawn": ""` for worlds without a spawn area.
fn deserialize_spawn<'de, D>(deserializer: D) -> Result<Option<SpawnArea>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        v @ Value::Object(_) => serde_json::from_value(v)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl WorldConfig {
    /// The world's coordinate scale, falling back to the map-wide default.
    pub fn scale(&self, defaults: &DefaultConfig) -> Result<CoordScale, ConfigError> {
        let value = self.coord_cor.unwrap_or(defaults.coord_cor);
        CoordScale::new(value).ok_or(ConfigError::InvalidScale {
            world: self.id,
            value,
        })
    }

    /// Document location relative to the world's base path.
    pub fn document_path(&self, relative: &str) -> String {
        format!("{}{}", self.base_path, relative)
    }

    pub fn alteration_paths(&self, layer_name: &str) -> &[String] {
        self.alterations
            .get(layer_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn world_surface(&self) -> (f64, f64) {
        (self.size_x, self.size_z)
    }
}

/// Complete map configuration file: `{"defaults": {...}, "worlds": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub defaults: DefaultConfig,
    pub worlds: Vec<WorldConfig>,
}

impl MapConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&payload)
    }

    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for world in &self.worlds {
            if !seen.insert(world.id) {
                return Err(ConfigError::DuplicateWorld(world.id));
            }
            world.scale(&self.defaults)?;
        }
        if !seen.contains(&self.defaults.default_world_id) {
            return Err(ConfigError::UnknownDefaultWorld(
                self.defaults.default_world_id,
            ));
        }
        Ok(())
    }

    pub fn world(&self, id: WorldId) -> Option<&WorldConfig> {
        self.worlds.iter().find(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LayerSource, MapConfig, WorldKind};
    use foundation::WorldId;

    const SAMPLE: &str = r#"{
        "defaults": {
            "minZoom": 3, "maxZoom": 6, "mapResolution": 1.0,
            "mapExtent": [-5120, -5120, 5120, 5120],
            "defaultWorldID": 0, "coordCor": 1.2
        },
        "worlds": [
            {
                "id": 0, "name": "Overworld", "path": "worlds/overworld", "type": "default",
                "xsize": 12000, "ysize": 12000,
                "markers": [
                    {"name": "Homes", "path": "/homes.json", "default": true},
                    {"name": "Warps", "path": "/warps.json", "color": "yellow"},
                    {"name": "Regions", "path": "/regions.json", "raw": true, "weight": 1}
                ],
                "alter": {"Homes": ["/time.json", "/gone.json"]},
                "spawn": ""
            },
            {
                "id": 1, "name": "Nether", "basePath": "worlds/nether", "kind": "other",
                "sizeX": 10000, "sizeZ": 10000, "coordCor": 1.1,
                "markerLayerConfigs": [{"name": "Homes", "path": "/homes.json", "default": true}],
                "spawn": {"name": "Spawn", "x1": -298, "y1": 673, "x2": 702, "y2": -327, "opacity": 0.15}
            }
        ]
    }"#;

    #[test]
    fn parses_published_and_aliased_names() {
        let config = MapConfig::from_json_str(SAMPLE).expect("config");
        let overworld = config.world(WorldId(0)).expect("overworld");
        assert_eq!(overworld.kind, WorldKind::Default);
        assert_eq!(overworld.marker_layers.len(), 3);
        assert!(overworld.spawn.is_none());
        assert_eq!(overworld.alteration_paths("Homes").len(), 2);
        assert!(overworld.alteration_paths("Warps").is_empty());
        assert_eq!(overworld.document_path("/homes.json"), "worlds/overworld/homes.json");

        let nether = config.world(WorldId(1)).expect("nether");
        assert_eq!(nether.kind, WorldKind::Other);
        assert_eq!(nether.base_path, "worlds/nether");
        assert_eq!(nether.world_surface(), (10000.0, 10000.0));
        assert_eq!(nether.spawn.as_ref().map(|s| s.name.as_str()), Some("Spawn"));
    }

    #[test]
    fn world_scale_falls_back_to_defaults() {
        let config = MapConfig::from_json_str(SAMPLE).expect("config");
        let overworld = config.world(WorldId(0)).expect("overworld");
        let nether = config.world(WorldId(1)).expect("nether");
        assert_eq!(overworld.scale(&config.defaults).expect("scale").factor(), 1.2);
        assert_eq!(nether.scale(&config.defaults).expect("scale").factor(), 1.1);
    }

    #[test]
    fn raw_flag_selects_layer_source() {
        let config = MapConfig::from_json_str(SAMPLE).expect("config");
        let layers = &config.world(WorldId(0)).expect("overworld").marker_layers;
        assert_eq!(
            layers[0].source(),
            LayerSource::Markers {
                path: "/homes.json".to_string()
            }
        );
        assert!(matches!(layers[2].source(), LayerSource::RawRegions { .. }));
        assert_eq!(layers[2].source().path(), "/regions.json");
    }

    #[test]
    fn rejects_invalid_configurations() {
        let dup = SAMPLE.replace("\"id\": 1", "\"id\": 0");
        assert!(matches!(
            MapConfig::from_json_str(&dup),
            Err(ConfigError::DuplicateWorld(WorldId(0)))
        ));

        let missing_default = SAMPLE.replace("\"defaultWorldID\": 0", "\"defaultWorldID\": 7");
        assert!(matches!(
            MapConfig::from_json_str(&missing_default),
            Err(ConfigError::UnknownDefaultWorld(WorldId(7)))
        ));

        let bad_scale = SAMPLE.replace("\"coordCor\": 1.1", "\"coordCor\": 0");
        assert!(matches!(
            MapConfig::from_json_str(&bad_scale),
            Err(ConfigError::InvalidScale { world: WorldId(1), .. })
        ));
    }
}
