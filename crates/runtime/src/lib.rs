pub mod context;
pub mod event_bus;
pub mod metrics;
pub mod pipeline;
pub mod stage;
pub mod view;

#[cfg(test)]
mod fixtures;

pub use context::*;
pub use event_bus::*;
pub use metrics::LoadMetrics;
pub use pipeline::*;
pub use stage::*;
pub use view::*;
