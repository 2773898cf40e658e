pub mod config;
pub mod coords;
pub mod documents;
pub mod record;

pub use config::*;
pub use coords::*;
pub use documents::*;
pub use record::*;
