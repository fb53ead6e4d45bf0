use std::{
    fs,
    path::{Path, PathBuf},
};

use bevy::{math::DVec2, prelude::*};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MapError, MapResult},
    types::{Coord, MAX_ZOOM},
};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "MAP_MEASURE_CONFIG";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// XYZ template, `{z}`, `{x}` and `{y}` are substituted.
    pub tile_url: String,
    pub user_agent: String,
    pub cache_dir: Option<PathBuf>,
    /// Initial view center in web mercator meters.
    pub center: [f64; 2],
    pub zoom: u32,
    pub min_zoom: u32,
    pub max_zoom: u32,
    pub tile_size: u32,
    /// How close, in pixels, a click must land on a vertex to finish a sketch.
    pub snap_tolerance: f32,
    /// Extra rings of tiles loaded around the visible ones.
    pub tile_margin: i64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            user_agent: concat!("map-measure/", env!("CARGO_PKG_VERSION")).to_string(),
            cache_dir: None,
            center: [-11000000.0, 4600000.0],
            zoom: 4,
            min_zoom: 2,
            max_zoom: 19,
            tile_size: 256,
            snap_tolerance: 12.0,
            tile_margin: 1,
        }
    }
}

impl MapConfig {
    /// Loads the user's config, falling back to defaults when it is missing or broken.
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("Using default map config: {e}");
                return Self::default();
            }
        };
        match Self::from_path(&path) {
            Ok(config) => {
                info!("Loaded map config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring map config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn config_path() -> MapResult<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let dirs = project_dirs().ok_or(MapError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// A missing file is not an error, it just means defaults.
    pub fn from_path(path: &Path) -> MapResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> MapResult<Self> {
        let mut config: MapConfig = serde_json::from_str(text)?;
        if config.min_zoom > config.max_zoom {
            std::mem::swap(&mut config.min_zoom, &mut config.max_zoom);
        }
        config.max_zoom = config.max_zoom.min(MAX_ZOOM);
        config.min_zoom = config.min_zoom.min(config.max_zoom);
        config.zoom = config.zoom.clamp(config.min_zoom, config.max_zoom);
        Ok(config)
    }

    pub fn center_coord(&self) -> Coord {
        Coord::from_mercator(DVec2::new(self.center[0], self.center[1]))
    }

    pub fn tile_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.cache_dir().join("tiles"),
            None => PathBuf::from("cache"),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "map-measure", "map-measure")
}
