//! Seam to the external editing toolkit.
//!
//! The toolkit renders an image and lets the user crop and transform it. The
//! popup only relies on the operations below. Implementations deliver their
//! callbacks asynchronously (from a later frame), the way DOM toolkits do.

mod crop;
mod raster;

use thiserror::Error;

use crate::geometry::ImageBounds;

pub use crop::{CropRatio, CropZone};
pub use raster::{decode_image_source, encode_png_data_url, RasterSurface, RasterToolkit};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid data url: {reason}")]
    InvalidDataUrl { reason: &'static str },
    #[error("failed to decode base64 image payload")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to decode image {source_name}: {source}")]
    Decode {
        source_name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("no crop zone is focused")]
    NoCropFocus,
}

pub type SurfaceResult<T> = std::result::Result<T, SurfaceError>;

pub type InitializedCallback = Box<dyn FnOnce()>;
pub type CropUpdatedCallback = Box<dyn FnOnce()>;

/// Edit applied to the surface, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    Crop(CropZone),
    RotateLeft,
    RotateRight,
    FlipHorizontal,
    FlipVertical,
}

/// Construction options handed to the toolkit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    pub max_width: f64,
    pub max_height: f64,
    pub crop_ratio: Option<CropRatio>,
    /// The popup exports through its own save button, never the toolkit's.
    pub save_plugin: bool,
}

pub trait EditingToolkit {
    /// Builds a surface on the element `target_id` showing `image_source`.
    ///
    /// `on_initialized` fires once the surface is interactive, after this call returns.
    fn create_surface(
        &self,
        target_id: &str,
        image_source: &str,
        options: SurfaceOptions,
        on_initialized: InitializedCallback,
    ) -> SurfaceResult<Box<dyn EditingSurface>>;
}

pub trait EditingSurface {
    /// Current image size, after the transformations applied so far.
    fn bounds(&self) -> ImageBounds;
    fn transformations(&self) -> &[Transformation];
    fn clear_transformations(&mut self);
    fn apply(&mut self, transformation: Transformation) -> SurfaceResult<()>;

    /// Starts or moves the crop zone. Returns the zone after ratio and bounds constraints.
    fn focus_crop(&mut self, zone: CropZone) -> SurfaceResult<CropZone>;
    fn crop_has_focus(&self) -> bool;

    /// Applies the focused crop zone. `on_updated` fires once the crop is rendered.
    fn crop_current_zone(&mut self, on_updated: CropUpdatedCallback) -> SurfaceResult<()>;

    fn to_data_url(&self) -> SurfaceResult<String>;
}
