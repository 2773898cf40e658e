pub mod alteration;
pub mod layer;
pub mod probe;
pub mod query;
pub mod raw;
pub mod shape;
pub mod symbology;

pub use alteration::{AlterationReport, AlterationSet, Combinator, marker_key};
pub use layer::*;
pub use probe::{ProbeOutcome, ProbeRectangle, RectangleProbe, ShapePoint, shape_points};
pub use query::{MarkerQuery, MarkerQueryHit, TitleFilter, TitleOp, query_markers};
pub use raw::{convert_raw, is_visualizable, spawn_marker};
pub use shape::*;
pub use symbology::{LayerStyle, Style, fill_defaults};
