use super::DisplayCoord;
use crate::bounds::Aabb2;

/// Flat map projection for the tiled display surface.
///
/// Display coordinates are projected to pixels with the transformation
/// `(1, -extent[0], -1, extent[3])`, scaled by `2^zoom / resolution`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapProjection {
    extent: [f64; 4],
    resolution: f64,
}

impl MapProjection {
    pub fn new(max_zoom: u8, map_resolution: f64, extent: [f64; 4]) -> Self {
        Self {
            extent,
            resolution: 2f64.powi(i32::from(max_zoom)) * map_resolution,
        }
    }

    pub fn extent(&self) -> [f64; 4] {
        self.extent
    }

    /// Map units per pixel at the deepest zoom level.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn scale(&self, zoom: f64) -> f64 {
        2f64.powf(zoom) / self.resolution
    }

    pub fn zoom(&self, scale: f64) -> f64 {
        (scale * self.resolution).ln() / std::f64::consts::LN_2
    }

    /// Display coordinate to pixel position `[x, y]` at `zoom`.
    pub fn project(&self, coord: DisplayCoord, zoom: f64) -> [f64; 2] {
        self.transform(coord, self.scale(zoom))
    }

    pub fn unproject(&self, point: [f64; 2], zoom: f64) -> DisplayCoord {
        self.untransform(point, self.scale(zoom))
    }

    /// Bounds of the tile layers, as `[lat, lng]` corners.
    pub fn tile_bounds(&self) -> Aabb2 {
        Aabb2::from_corners(
            [self.extent[0], self.extent[1]],
            [self.extent[2], self.extent[3]],
        )
    }

    /// Corners the initial view is fitted to.
    pub fn initial_view(&self) -> (DisplayCoord, DisplayCoord) {
        (
            self.untransform([self.extent[2], self.extent[3]], 1.0),
            self.untransform([self.extent[0], self.extent[1]], 1.0),
        )
    }

    fn transform(&self, coord: DisplayCoord, scale: f64) -> [f64; 2] {
        [
            scale * (coord.lng - self.extent[0]),
            scale * (self.extent[3] - coord.lat),
        ]
    }

    fn untransform(&self, point: [f64; 2], scale: f64) -> DisplayCoord {
        DisplayCoord::new(
            self.extent[3] - point[1] / scale,
            point[0] / scale + self.extent[0],
        )
    }
}
