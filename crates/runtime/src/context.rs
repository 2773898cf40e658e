//! The map context: loaded worlds, the current-world cursor and the view mode.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use formats::{ConfigError, MapConfig};
use foundation::WorldId;
use layers::{MarkerQuery, MarkerQueryHit, RectangleProbe, WorldLayers, query_markers};
use streaming::DocumentSource;
use tracing::{error, info};

use crate::event_bus::{EventLog, LoadEventKind};
use crate::metrics::{self, LoadMetrics};
use crate::pipeline::{WorldLoadError, WorldLoader};
use crate::view::ViewMode;

/// Owns every per-world layer set. All mutation goes through `&mut self`, so
/// a world switch cannot interleave with a running load.
pub struct MapContext {
    config: MapConfig,
    source: Arc<dyn DocumentSource>,
    view: ViewMode,
    current: Option<WorldId>,
    loaded: BTreeMap<WorldId, WorldLayers>,
    events: EventLog,
    metrics: LoadMetrics,
    probe: Option<RectangleProbe>,
}

impl MapContext {
    pub fn new(
        config: MapConfig,
        source: Arc<dyn DocumentSource>,
        view: ViewMode,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            view,
            current: None,
            loaded: BTreeMap::new(),
            events: EventLog::new(),
            metrics: LoadMetrics::new(),
            probe: None,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn current_world(&self) -> Option<WorldId> {
        self.current
    }

    /// Activates the configured default world.
    pub async fn start(&mut self) -> Result<&WorldLayers, WorldLoadError> {
        let id = self.config.defaults.default_world_id;
        self.activate(id).await
    }

    /// Tears down the current world and builds `id` from scratch.
    ///
    /// The cursor moves to `id` even when the load fails; the world then has
    /// no layers.
    pub async fn activate(&mut self, id: WorldId) -> Result<&WorldLayers, WorldLoadError> {
        if let Some(previous) = self.current.take() {
            self.teardown(previous);
        }
        let world = self
            .config
            .world(id)
            .ok_or(WorldLoadError::UnknownWorld(id))?
            .clone();
        self.current = Some(id);
        self.probe = None;

        let loader = WorldLoader::new(self.source.as_ref(), &self.config.defaults, self.view);
        match loader.load(&world, &mut self.events, &mut self.metrics).await {
            Ok(layers) => {
                info!(world = %id, layers = layers.layers.len(), "world active");
                if self.view.is_alter() {
                    self.probe = Some(RectangleProbe::new(world.scale(&self.config.defaults)?));
                }
                Ok(match self.loaded.entry(id) {
                    Entry::Occupied(mut slot) => {
                        slot.insert(layers);
                        slot.into_mut()
                    }
                    Entry::Vacant(slot) => slot.insert(layers),
                })
            }
            Err(e) => {
                error!(world = %id, "world load failed: {e}");
                self.metrics.inc_counter(metrics::WORLD_LOAD_FAILURES, 1);
                self.events
                    .emit(id, None, LoadEventKind::LoadFailed, e.to_string());
                Err(e)
            }
        }
    }

    /// Switches view mode; a change rebuilds the current world.
    pub async fn set_view_mode(&mut self, view: ViewMode) -> Result<(), WorldLoadError> {
        if view == self.view {
            return Ok(());
        }
        self.view = view;
        if let Some(id) = self.current {
            self.activate(id).await?;
        }
        Ok(())
    }

    /// Layers of the current world, if it loaded.
    pub fn active(&self) -> Option<&WorldLayers> {
        self.current.and_then(|id| self.loaded.get(&id))
    }

    pub fn query(&self, query: &MarkerQuery) -> Vec<MarkerQueryHit> {
        self.active()
            .map(|world| query_markers(world, query))
            .unwrap_or_default()
    }

    /// The rectangle probe; only available in alter view on a loaded world.
    pub fn probe_mut(&mut self) -> Option<&mut RectangleProbe> {
        self.probe.as_mut()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn metrics(&self) -> &LoadMetrics {
        &self.metrics
    }

    fn teardown(&mut self, id: WorldId) {
        if let Some(world) = self.loaded.remove(&id) {
            self.events.emit(
                id,
                None,
                LoadEventKind::WorldTornDown,
                format!("{} layers removed", world.layers.len()),
            );
        }
        self.probe = None;
    }
}
