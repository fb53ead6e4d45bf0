use std::{fs, path::PathBuf, thread, time::Duration};

use bevy::{
    asset::RenderAssetUsages,
    image::Image,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use image::imageops::FilterType;

use crate::{
    config::MapConfig,
    error::{MapError, MapResult},
    types::TileId,
};

/// How often a rate limited request is tried again before giving up.
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Everything a worker thread needs to fetch one tile.
#[derive(Debug, Clone)]
pub struct TileSource {
    pub url_template: String,
    pub user_agent: String,
    pub cache_dir: PathBuf,
    pub tile_size: u32,
}

impl TileSource {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            url_template: config.tile_url.clone(),
            user_agent: config.user_agent.clone(),
            cache_dir: config.tile_cache_dir(),
            tile_size: config.tile_size,
        }
    }

    pub fn url_for(&self, tile: TileId) -> String {
        self.url_template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }

    pub fn cache_path(&self, tile: TileId) -> PathBuf {
        self.cache_dir
            .join(tile.zoom.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.tile", tile.y))
    }
}

/// Returns the tile as raw RGBA bytes of `tile_size` squared pixels, from the
/// cache when possible.
pub fn fetch_tile(source: &TileSource, tile: TileId) -> MapResult<Vec<u8>> {
    let cache_file = source.cache_path(tile);
    if cache_file.exists() {
        return decode_tile(&fs::read(&cache_file)?, source.tile_size);
    }

    let bytes = request_tile(source, &source.url_for(tile))?;
    let rgba = decode_tile(&bytes, source.tile_size)?;

    // Only tiles that decode are worth caching.
    if let Some(dir) = cache_file.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(&cache_file, &bytes)?;
    Ok(rgba)
}

fn request_tile(source: &TileSource, url: &str) -> MapResult<Vec<u8>> {
    for attempt in 0..=MAX_RETRIES {
        match ureq::get(url).header("User-Agent", &source.user_agent).call() {
            Ok(mut response) => return Ok(response.body_mut().read_to_vec()?),
            Err(ureq::Error::StatusCode(429)) if attempt < MAX_RETRIES => thread::sleep(RETRY_DELAY),
            Err(ureq::Error::StatusCode(429)) => break,
            Err(ureq::Error::StatusCode(status)) => {
                return Err(MapError::Status {
                    status,
                    url: url.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(MapError::RateLimited { url: url.to_string() })
}

/// Decodes any format `image` knows into RGBA, resized to the tile size.
pub fn decode_tile(bytes: &[u8], tile_size: u32) -> MapResult<Vec<u8>> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() != tile_size || img.height() != tile_size {
        img = img.resize_exact(tile_size, tile_size, FilterType::Triangle);
    }
    Ok(img.to_rgba8().into_raw())
}

pub fn buffer_to_bevy_image(data: Vec<u8>, tile_size: u32) -> Image {
    Image::new(
        Extent3d {
            width: tile_size,
            height: tile_size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}
