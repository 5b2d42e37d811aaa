use thiserror::Error;

/// Terminal failures of a color extraction call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source could not be fetched, read or decoded, or its pixels could
    /// not be read back (cross-origin taint).
    #[error("Unable to load image: {0}")]
    Load(String),
    /// No drawing surface could be created for the sample raster.
    #[error("Unable to render image: {0}")]
    Render(String),
}

impl From<image::ImageError> for ExtractError {
    fn from(err: image::ImageError) -> Self {
        ExtractError::Load(err.to_string())
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Load(err.to_string())
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
