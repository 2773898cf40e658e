use foundation::bounds::Aabb2;
use foundation::math::DisplayCoord;
use serde::Serialize;

use crate::layer::WorldLayers;
use crate::shape::{ShapeDescriptor, ShapeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOp {
    /// Case-insensitive equality.
    Eq,
    /// Case-insensitive substring.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFilter {
    pub op: TitleOp,
    pub value: String,
}

impl TitleFilter {
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            op: TitleOp::Contains,
            value: value.into(),
        }
    }

    pub fn eq(value: impl Into<String>) -> Self {
        Self {
            op: TitleOp::Eq,
            value: value.into(),
        }
    }

    fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        let value = self.value.to_lowercase();
        match self.op {
            TitleOp::Eq => title == value,
            TitleOp::Contains => title.contains(&value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkerQuery {
    pub layer: Option<String>,
    pub kind: Option<ShapeKind>,
    /// Display-space box over `[lat, lng]`, tested against each shape's anchor.
    pub bbox: Option<Aabb2>,
    pub title: Option<TitleFilter>,
    pub limit: usize,
}

impl Default for MarkerQuery {
    fn default() -> Self {
        Self {
            layer: None,
            kind: None,
            bbox: None,
            title: None,
            limit: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerQueryHit {
    pub layer: String,
    pub title: String,
    pub anchor: DisplayCoord,
}

fn shape_matches(shape: &ShapeDescriptor, anchor: DisplayCoord, query: &MarkerQuery) -> bool {
    if let Some(kind) = query.kind
        && shape.geometry.kind() != kind
    {
        return false;
    }
    if let Some(bbox) = query.bbox
        && !bbox.contains([anchor.lat, anchor.lng])
    {
        return false;
    }
    query.title.as_ref().is_none_or(|f| f.matches(&shape.title))
}

/// Shapes of `world` matching `query`, in layer then source order.
pub fn query_markers(world: &WorldLayers, query: &MarkerQuery) -> Vec<MarkerQueryHit> {
    let mut out = Vec::new();
    if query.limit == 0 {
        return out;
    }

    for layer in &world.layers {
        if let Some(name) = &query.layer
            && &layer.name != name
        {
            continue;
        }
        for shape in &layer.shapes {
            let Some(anchor) = shape.geometry.anchor() else {
                continue;
            };
            if !shape_matches(shape, anchor, query) {
                continue;
            }
            out.push(MarkerQueryHit {
                layer: layer.name.clone(),
                title: shape.title.clone(),
                anchor,
            });
            if out.len() >= query.limit {
                return out;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{MarkerQuery, TitleFilter, query_markers};
    use crate::layer::{MarkerLayer, WorldLayers};
    use crate::shape::{ShapeContext, ShapeKind, build_shape};
    use crate::symbology::fill_defaults;
    use foundation::WorldId;
    use foundation::bounds::Aabb2;
    use foundation::math::CoordScale;
    use serde_json::json;

    fn world() -> WorldLayers {
        let ctx = ShapeContext {
            scale: CoordScale::new(2.0).expect("scale"),
            world_size_x: 1000.0,
            world_size_z: 1000.0,
        };
        let shape = |v: serde_json::Value| {
            let mut r: formats::MarkerRecord = serde_json::from_value(v).expect("record");
            fill_defaults(&mut r);
            build_shape(&r, ctx).expect("shape")
        };
        let mut towns = MarkerLayer::new("Towns", true);
        towns.shapes.push(shape(json!({"name": "Oakvale", "description": "capital", "latlng": [10, 20]})));
        towns.shapes.push(shape(json!({"name": "Ashford", "shape": "rectangle", "latlng": [[100, 100], [200, 200]]})));
        let mut farms = MarkerLayer::new("Farms", false);
        farms.shapes.push(shape(json!({"name": "Oak farm", "latlng": [-40, 0]})));
        WorldLayers {
            world: WorldId(1),
            default_layer: "Towns".to_string(),
            layers: vec![towns, farms],
        }
    }

    #[test]
    fn title_filters_ignore_case() {
        let w = world();
        let q = MarkerQuery {
            title: Some(TitleFilter::contains("OAK")),
            ..Default::default()
        };
        let titles: Vec<_> = query_markers(&w, &q).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Oakvale - capital", "Oak farm"]);

        let exact = MarkerQuery {
            title: Some(TitleFilter::eq("oak FARM")),
            ..Default::default()
        };
        let hits = query_markers(&w, &exact);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer, "Farms");
        assert_eq!(hits[0].anchor.lng, -20.0);
    }

    #[test]
    fn layer_kind_and_limit_restrict_hits() {
        let w = world();
        let q = MarkerQuery {
            layer: Some("Towns".to_string()),
            kind: Some(ShapeKind::Rectangle),
            ..Default::default()
        };
        let hits = query_markers(&w, &q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Ashford");

        let limited = MarkerQuery {
            limit: 2,
            ..Default::default()
        };
        assert_eq!(query_markers(&w, &limited).len(), 2);
    }

    #[test]
    fn bbox_tests_the_anchor() {
        let w = world();
        // Oakvale sits at lat -10, lng 5.
        let q = MarkerQuery {
            bbox: Some(Aabb2::new([-11.0, 4.0], [-9.0, 6.0])),
            ..Default::default()
        };
        let hits = query_markers(&w, &q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Oakvale - capital");
    }
}
