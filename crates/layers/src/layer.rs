use foundation::WorldId;
use serde::Serialize;

use crate::shape::ShapeDescriptor;

/// Used when no layer is flagged default and the world names none.
pub const FALLBACK_DEFAULT_LAYER: &str = "Home";

/// Named, ordered collection of shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub name: String,
    pub default: bool,
    pub shapes: Vec<ShapeDescriptor>,
}

impl MarkerLayer {
    pub fn new(name: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            default,
            shapes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Everything the map surface needs to draw one world.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldLayers {
    pub world: WorldId,
    pub default_layer: String,
    pub layers: Vec<MarkerLayer>,
}

impl WorldLayers {
    pub fn layer(&self, name: &str) -> Option<&MarkerLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// The layer shown on activation, if it was assembled.
    pub fn default_layer(&self) -> Option<&MarkerLayer> {
        self.layer(&self.default_layer)
    }

    pub fn shape_count(&self) -> usize {
        self.layers.iter().map(MarkerLayer::len).sum()
    }
}

/// Picks the default layer name: the last layer flagged default, then the
/// world's configured name, then [`FALLBACK_DEFAULT_LAYER`].
pub fn resolve_default_layer<'a>(
    flagged: impl IntoIterator<Item = (&'a str, bool)>,
    configured: Option<&str>,
) -> String {
    flagged
        .into_iter()
        .filter(|(_, default)| *default)
        .last()
        .map(|(name, _)| name)
        .or(configured.filter(|n| !n.is_empty()))
        .unwrap_or(FALLBACK_DEFAULT_LAYER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{MarkerLayer, WorldLayers, resolve_default_layer};
    use foundation::WorldId;

    #[test]
    fn last_flagged_layer_wins() {
        let layers = [("Towns", true), ("Roads", false), ("Farms", true)];
        assert_eq!(resolve_default_layer(layers, Some("Roads")), "Farms");
    }

    #[test]
    fn falls_back_to_configured_then_home() {
        let layers = [("Towns", false)];
        assert_eq!(resolve_default_layer(layers, Some("Towns")), "Towns");
        assert_eq!(resolve_default_layer(layers, Some("")), "Home");
        assert_eq!(resolve_default_layer(layers, None), "Home");
    }

    #[test]
    fn looks_up_layers_by_name() {
        let world = WorldLayers {
            world: WorldId(3),
            default_layer: "Towns".to_string(),
            layers: vec![MarkerLayer::new("Spawn", false), MarkerLayer::new("Towns", true)],
        };
        assert_eq!(world.default_layer().map(|l| l.name.as_str()), Some("Towns"));
        assert!(world.layer("Roads").is_none());
        assert_eq!(world.shape_count(), 0);
    }
}
