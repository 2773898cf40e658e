use serde::Serialize;

/// Per-layer load progress. Stages only move forward; `AlterationsApplied`
/// is skipped outside alter view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Unloaded,
    BaseLoaded,
    AlterationsApplied,
    DefaultsFilled,
    ShapesBuilt,
    Assembled,
}

impl LoadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadStage::Unloaded => "unloaded",
            LoadStage::BaseLoaded => "base_loaded",
            LoadStage::AlterationsApplied => "alterations_applied",
            LoadStage::DefaultsFilled => "defaults_filled",
            LoadStage::ShapesBuilt => "shapes_built",
            LoadStage::Assembled => "assembled",
        }
    }
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
