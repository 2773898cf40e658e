//! Game space to display space conversion.
//!
//! Game coordinates are `(x, z)` pairs in world blocks. Display coordinates are
//! `(lat, lng)` pairs on the map surface: the axes are swapped, `z` is negated
//! and both are divided by the world's scale factor.

use serde::{Deserialize, Serialize};

use super::canonical_f64;

/// Raw in-world position.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCoord {
    pub x: f64,
    pub z: f64,
}

impl GameCoord {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Position on the map surface.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayCoord {
    pub lat: f64,
    pub lng: f64,
}

impl DisplayCoord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Per-world scale correction between game and display magnitudes.
///
/// Every coordinate of one world must go through the same scale; mixing
/// scales inside a world corrupts its geometry.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CoordScale(f64);

impl CoordScale {
    /// Returns `None` unless `factor` is finite and strictly positive.
    pub fn new(factor: f64) -> Option<Self> {
        (factor.is_finite() && factor > 0.0).then_some(Self(factor))
    }

    pub fn factor(self) -> f64 {
        self.0
    }
}

pub fn to_display(coord: GameCoord, scale: CoordScale) -> DisplayCoord {
    DisplayCoord::new(
        canonical_f64(-coord.z / scale.0),
        canonical_f64(coord.x / scale.0),
    )
}

/// Inverse of [`to_display`], rounded to whole blocks for readouts.
pub fn to_game(coord: DisplayCoord, scale: CoordScale) -> GameCoord {
    let exact = to_game_exact(coord, scale);
    GameCoord::new(canonical_f64(exact.x.round()), canonical_f64(exact.z.round()))
}

pub fn to_game_exact(coord: DisplayCoord, scale: CoordScale) -> GameCoord {
    GameCoord::new(
        canonical_f64(coord.lng * scale.0),
        canonical_f64(-coord.lat * scale.0),
    )
}

/// Nested coordinate structure: a single pair, or an ordered sequence of nodes.
///
/// Rectangles are a sequence of two pairs; polygons are a sequence of rings
/// (outer ring first, optional cutout second).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coords<T> {
    Point(T),
    List(Vec<Coords<T>>),
}

impl<T: Copy> Coords<T> {
    pub fn empty() -> Self {
        Coords::List(Vec::new())
    }

    /// Maps every leaf, preserving order and grouping.
    pub fn map<U, F>(&self, f: F) -> Coords<U>
    where
        F: Fn(T) -> U,
    {
        self.map_ref(&f)
    }

    fn map_ref<U, F>(&self, f: &F) -> Coords<U>
    where
        F: Fn(T) -> U,
    {
        match self {
            Coords::Point(p) => Coords::Point(f(*p)),
            Coords::List(items) => Coords::List(items.iter().map(|c| c.map_ref(f)).collect()),
        }
    }

    pub fn as_point(&self) -> Option<T> {
        match self {
            Coords::Point(p) => Some(*p),
            Coords::List(_) => None,
        }
    }

    /// Child nodes; a leaf has none.
    pub fn children(&self) -> &[Coords<T>] {
        match self {
            Coords::Point(_) => &[],
            Coords::List(items) => items,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Coords::List(items) if items.is_empty())
    }

    /// The node as a flat run of pairs, if every child is a leaf.
    pub fn as_ring(&self) -> Option<Vec<T>> {
        match self {
            Coords::Point(_) => None,
            Coords::List(items) => items.iter().map(Coords::as_point).collect(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Coords::Point(_) => 1,
            Coords::List(items) => items.iter().map(Coords::leaf_count).sum(),
        }
    }
}

impl Coords<GameCoord> {
    pub fn to_display(&self, scale: CoordScale) -> Coords<DisplayCoord> {
        self.map(|c| to_display(c, scale))
    }
}
