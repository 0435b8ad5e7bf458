/// Convenience result type used across Vesture.
pub type VestureResult<T> = Result<T, VestureError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only hard failures surface here. Recoverable per-item problems (an
/// unresolvable driven link, a missing joint, a missing texture source) are
/// recorded and logged instead, so a partially-broken appearance still bakes.
#[derive(thiserror::Error, Debug)]
pub enum VestureError {
    /// Invalid definition data supplied by the loader.
    #[error("definition error: {0}")]
    Definition(String),

    /// Errors while linking or propagating driven parameters.
    #[error("link error: {0}")]
    Link(String),

    /// Errors when encoding or decoding a persisted wearable record.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Errors from the rasterizer interface (bad surface sizes, unknown textures).
    #[error("raster error: {0}")]
    Raster(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VestureError {
    /// Build a [`VestureError::Definition`] value.
    pub fn definition(msg: impl Into<String>) -> Self {
        Self::Definition(msg.into())
    }

    /// Build a [`VestureError::Link`] value.
    pub fn link(msg: impl Into<String>) -> Self {
        Self::Link(msg.into())
    }

    /// Build a [`VestureError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`VestureError::Raster`] value.
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster(msg.into())
    }
}
