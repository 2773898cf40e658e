use std::sync::Arc;
use std::time::Duration;

use formats::MapConfig;
use streaming::MemorySource;

pub const CONFIG: &str = r#"{
    "defaults": {
        "minZoom": 3, "maxZoom": 6, "mapResolution": 1.0,
        "mapExtent": [-5120, -5120, 5120, 5120],
        "defaultWorldID": 0, "coordCor": 1.0
    },
    "worlds": [
        {
            "id": 0, "name": "Overworld", "path": "/w0", "type": "default",
            "xsize": 1000, "ysize": 1000,
            "markers": [
                {"name": "Towns", "path": "/towns.json", "default": true},
                {"name": "Regions", "path": "/regions.json", "raw": true, "color": "green"},
                {"name": "Debug", "path": "/debug.json", "alter": true}
            ],
            "alter": {"Towns": ["/alter1.json", "/missing.json"]},
            "spawn": {"name": "Spawn", "x1": -10, "y1": -10, "x2": 10, "y2": 10}
        },
        {
            "id": 1, "name": "Nether", "path": "/w1", "type": "other",
            "xsize": 500, "ysize": 500,
            "markers": [
                {"name": "A", "path": "/a.json"},
                {"name": "B", "path": "/b.json"}
            ],
            "markers_default": "B"
        },
        {
            "id": 2, "name": "Archive", "path": "/w2", "type": "archive",
            "xsize": 500, "ysize": 500,
            "markers": [{"name": "Gone", "path": "/gone.json", "default": true}]
        }
    ]
}"#;

pub fn config() -> MapConfig {
    MapConfig::from_json_str(CONFIG).expect("config")
}

/// Documents for worlds 0 and 1; world 2's document is missing. The first
/// layer of world 1 is the slow one.
pub async fn source() -> Arc<MemorySource> {
    let source = MemorySource::new();
    source
        .insert(
            "/w0/towns.json",
            r#"[
                {"name": "Oakvale - capital", "radius": 10, "latlng": [100, 200]},
                {"name": "Broken", "shape": "rectangle", "latlng": [[1, 1]]}
            ]"#,
        )
        .await;
    source
        .insert(
            "/w0/regions.json",
            r#"{"regions": {
                "farm": {"type": "cuboid", "min": {"x": 0, "z": 0}, "max": {"x": 10, "z": 10}},
                "__global__": {"type": "global"}
            }}"#,
        )
        .await;
    source
        .insert("/w0/debug.json", r#"[{"name": "probe", "latlng": [0, 0]}]"#)
        .await;
    source
        .insert(
            "/w0/alter1.json",
            r#"{"oakvale": {"radius_eval": 16, "color": "blue"}}"#,
        )
        .await;
    source
        .insert_with_latency(
            "/w1/a.json",
            r#"[{"name": "a", "latlng": [1, 1]}]"#,
            Duration::from_millis(40),
        )
        .await;
    source
        .insert_with_latency(
            "/w1/b.json",
            r#"[{"name": "b", "latlng": [2, 2]}]"#,
            Duration::from_millis(1),
        )
        .await;
    Arc::new(source)
}
