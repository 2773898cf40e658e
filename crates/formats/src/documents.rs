//! Fetched JSON documents: marker arrays, raw region dumps, alterations.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::record::MarkerRecord;

#[derive(Debug)]
pub enum DocumentError {
    Parse(serde_json::Error),
    NotAnArray,
    NotAnObject,
    MissingRegions,
    InvalidMarker { index: usize },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Parse(e) => write!(f, "JSON parse error: {e}"),
            DocumentError::NotAnArray => write!(f, "expected a JSON array of markers"),
            DocumentError::NotAnObject => write!(f, "expected a JSON object"),
            DocumentError::MissingRegions => write!(f, "expected a `regions` object"),
            DocumentError::InvalidMarker { index } => {
                write!(f, "marker at index {index} is not an object")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

fn parse_value(bytes: &[u8]) -> Result<Value, DocumentError> {
    serde_json::from_slice(bytes).map_err(DocumentError::Parse)
}

/// Marker array document: already-shaped markers in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDocument {
    pub markers: Vec<MarkerRecord>,
}

impl MarkerDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(parse_value(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Array(items) = value else {
            return Err(DocumentError::NotAnArray);
        };

        let mut markers = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let Value::Object(map) = item else {
                return Err(DocumentError::InvalidMarker { index });
            };
            markers.push(MarkerRecord::from_map(map));
        }
        Ok(Self { markers })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
pub struct RegionPoint {
    pub x: f64,
    pub z: f64,
}

/// One region definition of a raw region dump.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRegion {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub parent: Option<Value>,
    #[serde(default)]
    pub points: Option<Vec<RegionPoint>>,
    #[serde(default)]
    pub min: Option<RegionPoint>,
    #[serde(default)]
    pub max: Option<RegionPoint>,
    #[serde(default)]
    pub flags: Map<String, Value>,
}

impl RawRegion {
    pub fn has_parent(&self) -> bool {
        self.parent.as_ref().is_some_and(crate::record::is_truthy)
    }

    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    pub key: String,
    pub reason: String,
}

/// Raw region dump: `{"regions": {name: region}}`, kept in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRegionDocument {
    pub regions: Vec<(String, RawRegion)>,
    /// Entries that did not deserialize as a region.
    pub rejected: Vec<RejectedEntry>,
}

impl RawRegionDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(parse_value(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(mut root) = value else {
            return Err(DocumentError::NotAnObject);
        };
        let Some(Value::Object(regions)) = root.remove("regions") else {
            return Err(DocumentError::MissingRegions);
        };

        let mut doc = Self::default();
        for (key, region) in regions {
            match serde_json::from_value::<RawRegion>(region) {
                Ok(region) => doc.regions.push((key, region)),
                Err(e) => doc.rejected.push(RejectedEntry {
                    key,
                    reason: e.to_string(),
                }),
            }
        }
        Ok(doc)
    }
}

/// Attribute overrides for every marker whose name key matches `key`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterationEntry {
    pub key: String,
    pub attributes: Map<String, Value>,
}

/// Alteration document: `{markerName: {attr: value, ...}}` in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlterationDocument {
    pub entries: Vec<AlterationEntry>,
    pub rejected: Vec<RejectedEntry>,
}

impl AlterationDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(parse_value(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(root) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let mut doc = Self::default();
        for (key, attrs) in root {
            match attrs {
                Value::Object(attributes) => doc.entries.push(AlterationEntry { key, attributes }),
                other => doc.rejected.push(RejectedEntry {
                    key,
                    reason: format!("expected an attribute object, found {other}"),
                }),
            }
        }
        Ok(doc)
    }
}
