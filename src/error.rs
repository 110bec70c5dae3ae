use thiserror::Error;

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, DottedMapError>;

/// Errors raised while validating settings or building a map.
///
/// All of these indicate caller misuse or bad input data; nothing here is
/// worth retrying.
#[derive(Error, Debug)]
pub enum DottedMapError {
    /// Malformed or out-of-range construction parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A bounding box or polygon that cannot produce a usable projection
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Country dataset could not be read into polygons
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DottedMapError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }
}
