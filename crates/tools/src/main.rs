use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use formats::{MapConfig, MarkerLayerConfig, RawRegionDocument, WorldConfig};
use foundation::WorldId;
use foundation::math::{CoordScale, DisplayCoord, GameCoord, to_display, to_game, to_game_exact};
use layers::{MarkerQuery, ProbeOutcome, RectangleProbe, TitleFilter, convert_raw};
use runtime::{MapContext, ViewMode};
use serde::Serialize;
use streaming::{DocumentSource, FilesystemSource, HttpSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Region map geometry pipeline")]
struct Args {
    /// Map configuration file (default: $REGIONMAP_CONFIG, then ./config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory documents are read from (default: $REGIONMAP_ROOT, then .)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Fetch documents over HTTP below this URL instead of from `--root`
    /// (default: $REGIONMAP_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a world's layers and print them as JSON
    Build {
        #[arg(long)]
        world: Option<u32>,

        /// Page URL; `show=alter` turns on alter view
        #[arg(long)]
        url: Option<String>,

        /// Print the load event log instead of the layers
        #[arg(long)]
        events: bool,
    },

    /// Find shapes whose title contains a text
    Query {
        #[arg(long)]
        world: Option<u32>,

        #[arg(long)]
        layer: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: usize,

        text: String,
    },

    /// Game coordinate to display coordinate
    #[command(allow_negative_numbers = true)]
    ToDisplay {
        #[arg(long)]
        world: Option<u32>,
        x: f64,
        z: f64,
    },

    /// Display coordinate to game coordinate
    #[command(allow_negative_numbers = true)]
    ToGame {
        #[arg(long)]
        world: Option<u32>,

        /// Skip rounding to whole blocks
        #[arg(long)]
        exact: bool,
        lat: f64,
        lng: f64,
    },

    /// Region query for the rectangle spanned by two display points
    #[command(allow_negative_numbers = true)]
    Probe {
        #[arg(long)]
        world: Option<u32>,
        lat1: f64,
        lng1: f64,
        lat2: f64,
        lng2: f64,
    },

    /// Pixel position of a display coordinate at a zoom level
    #[command(allow_negative_numbers = true)]
    Project {
        #[arg(long, default_value_t = 0.0)]
        zoom: f64,
        lat: f64,
        lng: f64,
    },

    /// Convert a raw region dump into a marker document
    ConvertRaw {
        /// Raw region document
        input: PathBuf,

        /// Layer name used in log output
        #[arg(long, default_value = "regions")]
        layer: String,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::ConvertRaw {
            ref input,
            ref layer,
            ref color,
            ref out,
        } => cmd_convert_raw(input, layer, color.clone(), out.as_ref()),
        Command::Project { zoom, lat, lng } => {
            let config = load_config(&args)?;
            let projection = config.defaults.projection();
            let [px, py] = projection.project(DisplayCoord::new(lat, lng), zoom);
            print_json(&serde_json::json!({"x": px, "y": py, "zoom": zoom}))
        }
        Command::ToDisplay { world, x, z } => {
            let config = load_config(&args)?;
            let scale = world_scale(&config, world)?;
            print_json(&to_display(GameCoord::new(x, z), scale))
        }
        Command::ToGame {
            world,
            exact,
            lat,
            lng,
        } => {
            let config = load_config(&args)?;
            let scale = world_scale(&config, world)?;
            let coord = DisplayCoord::new(lat, lng);
            let game = if exact {
                to_game_exact(coord, scale)
            } else {
                to_game(coord, scale)
            };
            print_json(&game)
        }
        Command::Probe {
            world,
            lat1,
            lng1,
            lat2,
            lng2,
        } => {
            let config = load_config(&args)?;
            let mut probe = RectangleProbe::new(world_scale(&config, world)?);
            probe.click(DisplayCoord::new(lat1, lng1));
            match probe.click(DisplayCoord::new(lat2, lng2)) {
                ProbeOutcome::Completed(rect) => print_json(&rect),
                _ => Err("probe corners must differ".to_string()),
            }
        }
        Command::Build {
            world,
            ref url,
            events,
        } => {
            let view = url.as_deref().map(ViewMode::from_url).unwrap_or_default();
            let mut ctx = map_context(&args, view)?;
            let id = resolve_world(ctx.config(), world)?.id;
            let loaded = ctx.activate(id).await.map(|_| ()).map_err(|e| e.to_string());
            if events {
                let metrics: serde_json::Map<String, serde_json::Value> = ctx
                    .metrics()
                    .snapshot()
                    .into_iter()
                    .map(|(name, value)| (name, value.into()))
                    .collect();
                return print_json(&serde_json::json!({
                    "events": ctx.events().events(),
                    "metrics": metrics,
                }));
            }
            loaded?;
            let layers = ctx.active().ok_or_else(|| format!("world {id} has no layers"))?;
            info!(world = %id, shapes = layers.shape_count(), "world built");
            print_json(layers)
        }
        Command::Query {
            world,
            ref layer,
            limit,
            ref text,
        } => {
            let mut ctx = map_context(&args, ViewMode::Normal)?;
            let id = resolve_world(ctx.config(), world)?.id;
            ctx.activate(id).await.map_err(|e| e.to_string())?;
            let hits = ctx.query(&MarkerQuery {
                layer: layer.clone(),
                title: Some(TitleFilter::contains(text.clone())),
                limit,
                ..Default::default()
            });
            print_json(&hits)
        }
    }
}

fn cmd_convert_raw(
    input: &PathBuf,
    layer: &str,
    color: Option<String>,
    out: Option<&PathBuf>,
) -> Result<(), String> {
    let bytes = fs::read(input).map_err(|e| format!("read {input:?}: {e}"))?;
    let doc = RawRegionDocument::from_slice(&bytes).map_err(|e| format!("{input:?}: {e}"))?;
    let config = MarkerLayerConfig {
        name: layer.to_string(),
        path: input.display().to_string(),
        raw: true,
        color,
        ..Default::default()
    };
    let markers = convert_raw(&doc, &config);
    let json = serde_json::to_string_pretty(&markers).map_err(|e| e.to_string())?;

    match out {
        Some(path) => {
            fs::write(path, json).map_err(|e| format!("write {path:?}: {e}"))?;
            println!("Wrote {} markers to {}", markers.len(), path.display());
            Ok(())
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn config_path(args: &Args) -> PathBuf {
    args.config.clone().unwrap_or_else(|| {
        env::var("REGIONMAP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.json"))
    })
}

fn load_config(args: &Args) -> Result<MapConfig, String> {
    let path = config_path(args);
    MapConfig::load(&path).map_err(|e| format!("{}: {e}", path.display()))
}

fn document_source(args: &Args) -> Arc<dyn DocumentSource> {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| env::var("REGIONMAP_BASE_URL").ok());
    if let Some(base_url) = base_url {
        return Arc::new(HttpSource::new(base_url));
    }
    let root = args.root.clone().unwrap_or_else(|| {
        env::var("REGIONMAP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    Arc::new(FilesystemSource::new(root))
}

fn map_context(args: &Args, view: ViewMode) -> Result<MapContext, String> {
    let config = load_config(args)?;
    let source = document_source(args);
    info!(source = source.name(), ?view, "map context ready");
    MapContext::new(config, source, view).map_err(|e| e.to_string())
}

fn resolve_world(config: &MapConfig, world: Option<u32>) -> Result<&WorldConfig, String> {
    let id = world.map(WorldId).unwrap_or(config.defaults.default_world_id);
    config.world(id).ok_or_else(|| format!("unknown world {id}"))
}

fn world_scale(config: &MapConfig, world: Option<u32>) -> Result<CoordScale, String> {
    resolve_world(config, world)?
        .scale(&config.defaults)
        .map_err(|e| e.to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
