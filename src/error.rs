/// Errors raised while loading configuration or fetching map tiles.
///
/// The drawing tools themselves never fail, only the map plumbing around them does.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tile request failed: {0}")]
    Request(#[from] ureq::Error),

    #[error("tile server answered {status} for {url}")]
    Status { status: u16, url: String },

    #[error("tile server kept rate limiting {url}")]
    RateLimited { url: String },

    #[error("could not decode tile image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("no configuration directory available on this platform")]
    NoConfigDir,
}

pub type MapResult<T> = Result<T, MapError>;
