//! Per-world marker assembly.
//!
//! Every document of a world is fetched and processed strictly in
//! configuration order: each fetch is awaited before the next one starts, so
//! the resulting layers never depend on document latency.

use formats::{
    AlterationDocument, ConfigError, DefaultConfig, DocumentError, LayerSource, MarkerDocument,
    MarkerLayerConfig, MarkerRecord, RawRegionDocument, WorldConfig,
};
use foundation::WorldId;
use layers::{
    AlterationSet, MarkerLayer, ShapeContext, WorldLayers, build_shape, convert_raw,
    fill_defaults, resolve_default_layer, spawn_marker,
};
use streaming::{DocumentSource, SourceError};
use tracing::{debug, info, warn};

use crate::event_bus::{EventLog, LoadEventKind};
use crate::metrics::{self, LoadMetrics};
use crate::stage::LoadStage;
use crate::view::ViewMode;

#[derive(Debug)]
pub enum WorldLoadError {
    UnknownWorld(WorldId),
    Config(ConfigError),
    Fetch { path: String, source: SourceError },
    Document { path: String, source: DocumentError },
}

impl std::fmt::Display for WorldLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldLoadError::UnknownWorld(id) => write!(f, "unknown world {id}"),
            WorldLoadError::Config(e) => write!(f, "config error: {e}"),
            WorldLoadError::Fetch { path, source } => write!(f, "failed to fetch {path}: {source}"),
            WorldLoadError::Document { path, source } => write!(f, "invalid document {path}: {source}"),
        }
    }
}

impl std::error::Error for WorldLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorldLoadError::UnknownWorld(_) => None,
            WorldLoadError::Config(e) => Some(e),
            WorldLoadError::Fetch { source, .. } => Some(source),
            WorldLoadError::Document { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for WorldLoadError {
    fn from(value: ConfigError) -> Self {
        WorldLoadError::Config(value)
    }
}

/// Assembles the layers of one world from a document source.
pub struct WorldLoader<'a> {
    source: &'a dyn DocumentSource,
    defaults: &'a DefaultConfig,
    view: ViewMode,
}

struct LoadCtx<'a> {
    world: WorldId,
    events: &'a mut EventLog,
    metrics: &'a mut LoadMetrics,
}

impl LoadCtx<'_> {
    fn stage(&mut self, layer: &str, stage: LoadStage, message: impl Into<String>) {
        self.events
            .emit(self.world, Some(layer), LoadEventKind::Stage(stage), message);
    }
}

impl<'a> WorldLoader<'a> {
    pub fn new(source: &'a dyn DocumentSource, defaults: &'a DefaultConfig, view: ViewMode) -> Self {
        Self {
            source,
            defaults,
            view,
        }
    }

    pub async fn load(
        &self,
        world: &WorldConfig,
        events: &mut EventLog,
        metrics: &mut LoadMetrics,
    ) -> Result<WorldLayers, WorldLoadError> {
        let scale = world.scale(self.defaults)?;
        let (world_size_x, world_size_z) = world.world_surface();
        let shapes = ShapeContext {
            scale,
            world_size_x,
            world_size_z,
        };
        let mut ctx = LoadCtx {
            world: world.id,
            events,
            metrics,
        };
        info!(world = %world.id, name = %world.name, view = ?self.view, "loading world");

        let mut layers = Vec::with_capacity(world.marker_layers.len() + 1);
        if let Some(spawn) = &world.spawn {
            let mut marker = spawn_marker(spawn);
            ctx.stage(&spawn.name, LoadStage::BaseLoaded, "spawn area");
            fill_defaults(&mut marker);
            ctx.stage(&spawn.name, LoadStage::DefaultsFilled, "");
            let mut layer = MarkerLayer::new(spawn.name.clone(), false);
            layer.shapes = build_layer_shapes(&mut ctx, &spawn.name, vec![marker], shapes);
            ctx.stage(&spawn.name, LoadStage::Assembled, "1 shape");
            layers.push(layer);
        }

        for config in &world.marker_layers {
            if config.alter && !self.view.is_alter() {
                debug!(world = %world.id, layer = %config.name, "diagnostic layer skipped outside alter view");
                ctx.events.emit(
                    world.id,
                    Some(&config.name),
                    LoadEventKind::LayerSkipped,
                    "alter view only",
                );
                continue;
            }
            layers.push(self.load_layer(&mut ctx, world, config, shapes).await?);
        }

        let default_layer = resolve_default_layer(
            layers.iter().map(|l| (l.name.as_str(), l.default)),
            world.markers_default.as_deref(),
        );
        let assembled = WorldLayers {
            world: world.id,
            default_layer,
            layers,
        };
        ctx.metrics.inc_counter(metrics::WORLD_LOADS, 1);
        ctx.events.emit(
            world.id,
            None,
            LoadEventKind::WorldAssembled,
            format!(
                "{} layers, {} shapes, default `{}`",
                assembled.layers.len(),
                assembled.shape_count(),
                assembled.default_layer
            ),
        );
        Ok(assembled)
    }

    async fn load_layer(
        &self,
        ctx: &mut LoadCtx<'_>,
        world: &WorldConfig,
        config: &MarkerLayerConfig,
        shapes: ShapeContext,
    ) -> Result<MarkerLayer, WorldLoadError> {
        let name = config.name.as_str();
        ctx.stage(name, LoadStage::Unloaded, config.path.clone());

        let mut markers = self.load_base(ctx, world, config).await?;
        ctx.metrics.inc_counter(metrics::MARKERS_LOADED, markers.len() as u64);
        ctx.stage(name, LoadStage::BaseLoaded, format!("{} markers", markers.len()));

        let alteration_paths = world.alteration_paths(name);
        if self.view.is_alter() && !alteration_paths.is_empty() {
            let mut alterations = AlterationSet::new();
            for relative in alteration_paths {
                let path = world.document_path(relative);
                match self.fetch(ctx, Some(name), &path).await {
                    Ok(body) => match AlterationDocument::from_slice(&body) {
                        Ok(doc) => alterations.extend(doc),
                        Err(e) => {
                            warn!(layer = name, %path, "ignoring alteration document: {e}");
                            ctx.metrics.inc_counter(metrics::ALTERATION_DOCUMENTS_FAILED, 1);
                        }
                    },
                    Err(e) => {
                        warn!(layer = name, %path, "ignoring alteration document: {e}");
                        ctx.metrics.inc_counter(metrics::ALTERATION_DOCUMENTS_FAILED, 1);
                    }
                }
            }
            let report = alterations.apply(&mut markers);
            ctx.metrics.inc_counter(metrics::ALTERATIONS_APPLIED, report.applied as u64);
            ctx.stage(
                name,
                LoadStage::AlterationsApplied,
                format!(
                    "{} markers matched, {} applied, {} ignored, {} failed",
                    report.matched, report.applied, report.ignored, report.failed
                ),
            );
        }

        for marker in &mut markers {
            fill_defaults(marker);
        }
        ctx.stage(name, LoadStage::DefaultsFilled, "");

        let mut layer = MarkerLayer::new(name, config.default);
        layer.shapes = build_layer_shapes(ctx, name, markers, shapes);
        ctx.stage(name, LoadStage::Assembled, format!("{} shapes", layer.len()));
        Ok(layer)
    }

    async fn load_base(
        &self,
        ctx: &mut LoadCtx<'_>,
        world: &WorldConfig,
        config: &MarkerLayerConfig,
    ) -> Result<Vec<MarkerRecord>, WorldLoadError> {
        let layer_source = config.source();
        let path = world.document_path(layer_source.path());
        let body = self
            .fetch(ctx, Some(&config.name), &path)
            .await
            .map_err(|source| WorldLoadError::Fetch {
                path: path.clone(),
                source,
            })?;
        let document_error = |source| WorldLoadError::Document {
            path: path.clone(),
            source,
        };
        match layer_source {
            LayerSource::Markers { .. } => Ok(MarkerDocument::from_slice(&body)
                .map_err(document_error)?
                .markers),
            LayerSource::RawRegions { .. } => {
                let doc = RawRegionDocument::from_slice(&body).map_err(document_error)?;
                Ok(convert_raw(&doc, config))
            }
        }
    }

    async fn fetch(
        &self,
        ctx: &mut LoadCtx<'_>,
        layer: Option<&str>,
        path: &str,
    ) -> Result<Vec<u8>, SourceError> {
        ctx.events
            .emit(ctx.world, layer, LoadEventKind::FetchStarted, path);
        match self.source.fetch(path).await {
            Ok(body) => {
                ctx.metrics.inc_counter(metrics::DOCUMENTS_FETCHED, 1);
                ctx.events.emit(
                    ctx.world,
                    layer,
                    LoadEventKind::FetchFinished,
                    format!("{path} ({} bytes)", body.len()),
                );
                Ok(body)
            }
            Err(e) => {
                ctx.events
                    .emit(ctx.world, layer, LoadEventKind::FetchFailed, e.to_string());
                Err(e)
            }
        }
    }
}

fn build_layer_shapes(
    ctx: &mut LoadCtx<'_>,
    layer: &str,
    markers: Vec<MarkerRecord>,
    shapes: ShapeContext,
) -> Vec<layers::ShapeDescriptor> {
    let mut out = Vec::with_capacity(markers.len());
    for marker in markers {
        match build_shape(&marker, shapes) {
            Ok(shape) => out.push(shape),
            Err(e) => {
                warn!(layer, "skipping marker: {e}");
                ctx.metrics.inc_counter(metrics::MARKERS_SKIPPED, 1);
            }
        }
    }
    ctx.metrics.inc_counter(metrics::SHAPES_BUILT, out.len() as u64);
    ctx.stage(layer, LoadStage::ShapesBuilt, format!("{} shapes", out.len()));
    out
}
