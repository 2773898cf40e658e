//! Alter-view helpers: vertex readouts and the two-click rectangle probe.

use foundation::bounds::Aabb2;
use foundation::math::{CoordScale, DisplayCoord, GameCoord, to_game};
use serde::Serialize;

use crate::shape::ShapeDescriptor;

/// One clickable vertex of a shape.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ShapePoint {
    pub display: DisplayCoord,
    /// Rounded game position shown in the vertex popup.
    pub game: GameCoord,
}

impl ShapePoint {
    /// Popup text, `z,x` in whole blocks.
    pub fn label(&self) -> String {
        format!("{},{}", self.game.z, self.game.x)
    }
}

/// Every vertex of a shape, grouped per ring.
pub fn shape_points(shape: &ShapeDescriptor, scale: CoordScale) -> Vec<Vec<ShapePoint>> {
    shape
        .geometry
        .rings()
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|display| ShapePoint {
                    display,
                    game: to_game(display, scale),
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeRectangle {
    pub corners: [DisplayCoord; 2],
    /// Game-space bounds over `[x, z]`, rounded to whole blocks.
    pub bounds: Aabb2,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The click repeated the pending first corner.
    Ignored,
    /// First corner recorded.
    Pending,
    Completed(ProbeRectangle),
}

/// Collects two clicked corners and turns them into a region query.
#[derive(Debug, Clone)]
pub struct RectangleProbe {
    scale: CoordScale,
    first: Option<DisplayCoord>,
}

impl RectangleProbe {
    pub fn new(scale: CoordScale) -> Self {
        Self { scale, first: None }
    }

    pub fn pending(&self) -> Option<DisplayCoord> {
        self.first
    }

    pub fn click(&mut self, point: DisplayCoord) -> ProbeOutcome {
        match self.first {
            Some(first) if first == point => ProbeOutcome::Ignored,
            Some(first) => {
                self.first = None;
                ProbeOutcome::Completed(self.rectangle(first, point))
            }
            None => {
                self.first = Some(point);
                ProbeOutcome::Pending
            }
        }
    }

    pub fn clear(&mut self) {
        self.first = None;
    }

    fn rectangle(&self, a: DisplayCoord, b: DisplayCoord) -> ProbeRectangle {
        let ga = to_game(a, self.scale);
        let gb = to_game(b, self.scale);
        let bounds = Aabb2::from_corners([ga.x, ga.z], [gb.x, gb.z]);
        let query = format!(
            "x>={} AND x<={} AND z>={} AND z<={}",
            bounds.min[0], bounds.max[0], bounds.min[1], bounds.max[1]
        );
        ProbeRectangle {
            corners: [a, b],
            bounds,
            query,
        }
    }
}
