//! Document sources: where marker, region and alteration documents come from.

pub mod sources;

pub use sources::*;
