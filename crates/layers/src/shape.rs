//! Renderable shape descriptors built from filled marker records.

use formats::{MarkerRecord, parse_game_coords};
use foundation::math::{
    CoordScale, Coords, DisplayCoord, GameCoord, area, canonical_f64, percentage, rectangle_area,
};
use serde::Serialize;
use serde_json::Value;

use crate::symbology::{Style, default_tooltip};

/// Circles with a non-positive radius are drawn with this radius instead.
pub const FALLBACK_CIRCLE_RADIUS: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
}

impl ShapeKind {
    /// Unknown shape names fall back to a circle.
    pub fn parse(name: &str) -> Self {
        match name {
            "rectangle" => ShapeKind::Rectangle,
            "polygon" => ShapeKind::Polygon,
            _ => ShapeKind::Circle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Geometry {
    Circle {
        center: DisplayCoord,
        radius: f64,
    },
    Rectangle {
        corners: [DisplayCoord; 2],
    },
    Polygon {
        ring: Vec<DisplayCoord>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cutout: Option<Vec<DisplayCoord>>,
    },
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// A representative point: circle center, first corner or first vertex.
    pub fn anchor(&self) -> Option<DisplayCoord> {
        match self {
            Geometry::Circle { center, .. } => Some(*center),
            Geometry::Rectangle { corners } => Some(corners[0]),
            Geometry::Polygon { ring, .. } => ring.first().copied(),
        }
    }

    /// Vertex rings as drawn: all four rectangle corners, or the polygon's
    /// rings. Circles have none.
    pub fn rings(&self) -> Vec<Vec<DisplayCoord>> {
        match self {
            Geometry::Circle { .. } => Vec::new(),
            Geometry::Rectangle { corners } => {
                let [a, b] = *corners;
                vec![vec![
                    a,
                    DisplayCoord::new(a.lat, b.lng),
                    b,
                    DisplayCoord::new(b.lat, a.lng),
                ]]
            }
            Geometry::Polygon { ring, cutout } => {
                let mut rings = vec![ring.clone()];
                rings.extend(cutout.iter().cloned());
                rings
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AreaInfo {
    /// Absolute area in display units.
    pub size: f64,
    /// Share of the world surface, two decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDescriptor {
    #[serde(flatten)]
    pub geometry: Geometry,
    pub style: Style,
    pub title: String,
    pub tooltip: String,
    pub popup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryError {
    pub marker: String,
    pub reason: String,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker `{}`: {}", self.marker, self.reason)
    }
}

impl std::error::Error for GeometryError {}

/// Per-world inputs of shape building.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeContext {
    pub scale: CoordScale,
    pub world_size_x: f64,
    pub world_size_z: f64,
}

/// Builds the descriptor of a marker whose defaults are already filled.
pub fn build_shape(record: &MarkerRecord, ctx: ShapeContext) -> Result<ShapeDescriptor, GeometryError> {
    let style = Style::from_record(record);
    let fail = |reason: String| GeometryError {
        marker: style.name.clone(),
        reason,
    };

    let kind = ShapeKind::parse(record.str("shape").unwrap_or_default());
    let geometry = match kind {
        ShapeKind::Circle => {
            let center = coords_of(record, "latlng")
                .map_err(fail)?
                .as_point()
                .ok_or_else(|| fail("circle needs a single [x, z] center".to_string()))?;
            let radius = if style.radius > 0.0 {
                style.radius
            } else {
                FALLBACK_CIRCLE_RADIUS
            };
            Geometry::Circle {
                center: foundation::math::to_display(center, ctx.scale),
                radius,
            }
        }
        ShapeKind::Rectangle => {
            let tree = coords_of(record, "latlng").map_err(fail)?;
            let corners: Vec<GameCoord> = tree.children().iter().filter_map(Coords::as_point).collect();
            let [c1, c2, ..] = corners.as_slice() else {
                return Err(fail("rectangle needs two [x, z] corners".to_string()));
            };
            Geometry::Rectangle {
                corners: [
                    foundation::math::to_display(*c1, ctx.scale),
                    foundation::math::to_display(*c2, ctx.scale),
                ],
            }
        }
        ShapeKind::Polygon => {
            let tree = coords_of(record, "latlngs").map_err(fail)?.to_display(ctx.scale);
            let (ring, cutout) = polygon_rings(&tree).ok_or_else(|| {
                fail("polygon needs a ring of [x, z] pairs".to_string())
            })?;
            Geometry::Polygon { ring, cutout }
        }
    };

    let tooltip = record
        .str("tooltip")
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_tooltip(&style.name, &style.description));

    let area = match &geometry {
        Geometry::Circle { .. } => None,
        Geometry::Rectangle { corners } => Some(rectangle_area(corners[0], corners[1])),
        Geometry::Polygon { ring, cutout } => Some(area(ring, cutout.as_deref())),
    }
    .map(|signed| {
        let size = canonical_f64(signed.abs());
        AreaInfo {
            size,
            percentage: percentage(size, ctx.world_size_x, ctx.world_size_z),
        }
    });

    let popup = match area {
        Some(info) => area_popup(&tooltip, info),
        None => tooltip.clone(),
    };

    Ok(ShapeDescriptor {
        geometry,
        title: style.title(),
        style,
        tooltip,
        popup,
        area,
    })
}

fn coords_of(record: &MarkerRecord, key: &str) -> Result<Coords<GameCoord>, String> {
    let value = record.get(key).unwrap_or(&Value::Null);
    parse_game_coords(value).map_err(|e| format!("`{key}`: {}", e.reason))
}

// A flat run of pairs is a single ring; otherwise the first two children are
// the outer ring and the cutout.
fn polygon_rings(tree: &Coords<DisplayCoord>) -> Option<(Vec<DisplayCoord>, Option<Vec<DisplayCoord>>)> {
    let children = tree.children();
    if children.first()?.as_point().is_some() {
        return Some((tree.as_ring()?, None));
    }
    let ring = children[0].as_ring().filter(|r| !r.is_empty())?;
    let cutout = match children.get(1) {
        Some(node) => node.as_ring()?,
        None => Vec::new(),
    };
    Some((ring, (!cutout.is_empty()).then_some(cutout)))
}

fn area_popup(tooltip: &str, info: AreaInfo) -> String {
    format!(
        "{tooltip}<br/><span class=\"info\"><span class=\"label\">Size:</span>~{} /blocks<br/><span class=\"label\">&nbsp;</span>{}%</span>",
        info.size, info.percentage
    )
}
