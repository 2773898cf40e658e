pub mod area;
pub mod coords;
pub mod precision;
pub mod projection;

pub use area::*;
pub use coords::*;
pub use precision::*;
pub use projection::*;
