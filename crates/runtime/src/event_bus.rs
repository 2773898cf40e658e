use foundation::WorldId;
use serde::Serialize;

use crate::stage::LoadStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "stage", rename_all = "snake_case")]
pub enum LoadEventKind {
    FetchStarted,
    FetchFinished,
    FetchFailed,
    Stage(LoadStage),
    LayerSkipped,
    WorldAssembled,
    WorldTornDown,
    LoadFailed,
}

/// One step of a world load, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadEvent {
    pub seq: u64,
    pub world: WorldId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(flatten)]
    pub kind: LoadEventKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<LoadEvent>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(
        &mut self,
        world: WorldId,
        layer: Option<&str>,
        kind: LoadEventKind,
        message: impl Into<String>,
    ) {
        self.events.push(LoadEvent {
            seq: self.next_seq,
            world,
            layer: layer.map(str::to_string),
            kind,
            message: message.into(),
        });
        self.next_seq += 1;
    }

    pub fn events(&self) -> &[LoadEvent] {
        &self.events
    }

    /// Stage transitions of one layer, in order.
    pub fn stages(&self, world: WorldId, layer: &str) -> Vec<LoadStage> {
        self.events
            .iter()
            .filter(|e| e.world == world && e.layer.as_deref() == Some(layer))
            .filter_map(|e| match e.kind {
                LoadEventKind::Stage(stage) => Some(stage),
                _ => None,
            })
            .collect()
    }

    /// Takes the recorded events; sequence numbers keep counting.
    pub fn drain(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventLog, LoadEventKind};
    use crate::stage::LoadStage;
    use foundation::WorldId;

    #[test]
    fn records_events_in_sequence() {
        let mut log = EventLog::new();
        log.emit(WorldId(1), Some("Towns"), LoadEventKind::FetchStarted, "/towns.json");
        log.emit(WorldId(1), Some("Towns"), LoadEventKind::Stage(LoadStage::BaseLoaded), "3 markers");
        assert_eq!(log.events().len(), 2);
        assert_eq!(log.events()[1].seq, 1);
        assert_eq!(log.stages(WorldId(1), "Towns"), vec![LoadStage::BaseLoaded]);
    }

    #[test]
    fn drain_clears_events_but_not_sequence() {
        let mut log = EventLog::new();
        log.emit(WorldId(0), None, LoadEventKind::WorldAssembled, "");
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.events().is_empty());
        log.emit(WorldId(0), None, LoadEventKind::WorldTornDown, "");
        assert_eq!(log.events()[0].seq, 1);
    }
}
