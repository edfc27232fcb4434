use std::io::Cursor;
use std::rc::Rc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat};

use super::{
    CropRatio, CropUpdatedCallback, CropZone, EditingSurface, EditingToolkit, InitializedCallback,
    SurfaceError, SurfaceOptions, SurfaceResult, Transformation,
};
use crate::geometry::ImageBounds;
use crate::scheduler::FrameScheduler;

const DATA_URL_PREFIX: &str = "data:";
const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Editing toolkit backed by the `image` crate. Callbacks run on the next frame.
#[derive(Clone)]
pub struct RasterToolkit {
    scheduler: Rc<dyn FrameScheduler>,
}

impl RasterToolkit {
    pub fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self { scheduler }
    }
}

impl EditingToolkit for RasterToolkit {
    fn create_surface(
        &self,
        target_id: &str,
        image_source: &str,
        options: SurfaceOptions,
        on_initialized: InitializedCallback,
    ) -> SurfaceResult<Box<dyn EditingSurface>> {
        let image = decode_image_source(image_source)?;
        let (width, height) = image.dimensions();
        tracing::debug!(target_id, width, height, "raster surface created");

        self.scheduler.request_frame(on_initialized);
        Ok(Box::new(RasterSurface {
            image,
            options,
            transformations: Vec::new(),
            crop_zone: None,
            scheduler: Rc::clone(&self.scheduler),
        }))
    }
}

pub struct RasterSurface {
    image: DynamicImage,
    options: SurfaceOptions,
    transformations: Vec<Transformation>,
    crop_zone: Option<CropZone>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl RasterSurface {
    /// Size the image is drawn at, scaled down to fit the surface limits.
    pub fn display_bounds(&self) -> ImageBounds {
        let bounds = self.bounds();
        if bounds.width == 0 || bounds.height == 0 {
            return bounds;
        }
        let scale_x = self.options.max_width / f64::from(bounds.width);
        let scale_y = self.options.max_height / f64::from(bounds.height);
        let scale = scale_x.min(scale_y).min(1.0).max(0.0);
        ImageBounds::new(
            (f64::from(bounds.width) * scale).round() as u32,
            (f64::from(bounds.height) * scale).round() as u32,
        )
    }

    pub fn crop_zone(&self) -> Option<CropZone> {
        self.crop_zone
    }

    fn crop_ratio(&self) -> Option<CropRatio> {
        self.options.crop_ratio
    }
}

impl EditingSurface for RasterSurface {
    fn bounds(&self) -> ImageBounds {
        let (width, height) = self.image.dimensions();
        ImageBounds::new(width, height)
    }

    fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    fn clear_transformations(&mut self) {
        self.transformations.clear();
    }

    fn apply(&mut self, transformation: Transformation) -> SurfaceResult<()> {
        self.image = match transformation {
            Transformation::Crop(zone) => {
                let zone = zone.constrained(self.bounds(), None);
                self.image.crop_imm(zone.x, zone.y, zone.width, zone.height)
            }
            Transformation::RotateLeft => self.image.rotate270(),
            Transformation::RotateRight => self.image.rotate90(),
            Transformation::FlipHorizontal => self.image.fliph(),
            Transformation::FlipVertical => self.image.flipv(),
        };
        // Zone coordinates no longer match the transformed image.
        self.crop_zone = None;
        self.transformations.push(transformation);
        Ok(())
    }

    fn focus_crop(&mut self, zone: CropZone) -> SurfaceResult<CropZone> {
        let zone = zone.constrained(self.bounds(), self.crop_ratio());
        self.crop_zone = Some(zone);
        Ok(zone)
    }

    fn crop_has_focus(&self) -> bool {
        self.crop_zone.is_some()
    }

    fn crop_current_zone(&mut self, on_updated: CropUpdatedCallback) -> SurfaceResult<()> {
        let zone = self.crop_zone.ok_or(SurfaceError::NoCropFocus)?;
        self.apply(Transformation::Crop(zone))?;
        self.scheduler.request_frame(on_updated);
        Ok(())
    }

    fn to_data_url(&self) -> SurfaceResult<String> {
        encode_png_data_url(&self.image)
    }
}

/// Loads an image from a `data:` URL (base64 payload) or a filesystem path.
pub fn decode_image_source(source: &str) -> SurfaceResult<DynamicImage> {
    let Some(rest) = source.strip_prefix(DATA_URL_PREFIX) else {
        return image::open(source).map_err(|err| SurfaceError::Decode {
            source_name: source.to_string(),
            source: err,
        });
    };

    let (header, payload) = rest
        .split_once(',')
        .ok_or(SurfaceError::InvalidDataUrl {
            reason: "missing ',' separator",
        })?;
    if !header.ends_with(";base64") {
        return Err(SurfaceError::InvalidDataUrl {
            reason: "payload is not base64 encoded",
        });
    }

    let bytes = BASE64.decode(payload.trim())?;
    image::load_from_memory(&bytes).map_err(|err| SurfaceError::Decode {
        source_name: format!("data url ({header})"),
        source: err,
    })
}

pub fn encode_png_data_url(image: &DynamicImage) -> SurfaceResult<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(SurfaceError::Encode)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", BASE64.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    fn sample_data_url(width: u32, height: u32) -> String {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0x40, 0xff])
        });
        encode_png_data_url(&DynamicImage::ImageRgba8(image)).expect("encode sample")
    }

    fn options(ratio: Option<CropRatio>) -> SurfaceOptions {
        SurfaceOptions {
            max_width: 100.0,
            max_height: 50.0,
            crop_ratio: ratio,
            save_plugin: false,
        }
    }

    fn surface_for(
        queue: &FrameQueue,
        width: u32,
        height: u32,
        ratio: Option<CropRatio>,
    ) -> Box<dyn EditingSurface> {
        RasterToolkit::new(Rc::new(queue.clone()))
            .create_surface(
                "editing-image-test",
                &sample_data_url(width, height),
                options(ratio),
                Box::new(|| {}),
            )
            .expect("surface should be created")
    }

    #[test]
    fn decode_image_source_rejects_malformed_data_urls() {
        assert!(matches!(
            decode_image_source("data:image/png;base64"),
            Err(SurfaceError::InvalidDataUrl { .. })
        ));
        assert!(matches!(
            decode_image_source("data:text/plain,hello"),
            Err(SurfaceError::InvalidDataUrl { .. })
        ));
        assert!(matches!(
            decode_image_source("data:image/png;base64,!!!"),
            Err(SurfaceError::Base64(_))
        ));
    }

    #[test]
    fn decode_image_source_reports_missing_files() {
        assert!(matches!(
            decode_image_source("/definitely/not/here.png"),
            Err(SurfaceError::Decode { .. })
        ));
    }

    #[test]
    fn initialized_callback_waits_for_next_frame() {
        let queue = FrameQueue::new();
        let initialized = Rc::new(Cell::new(false));
        let flag = initialized.clone();

        let _surface = RasterToolkit::new(Rc::new(queue.clone()))
            .create_surface(
                "id",
                &sample_data_url(4, 4),
                options(None),
                Box::new(move || flag.set(true)),
            )
            .expect("surface should be created");

        assert!(!initialized.get());
        queue.run_frame();
        assert!(initialized.get());
    }

    #[test]
    fn crop_current_zone_applies_crop_and_confirms_later() {
        let queue = FrameQueue::new();
        let mut surface = surface_for(&queue, 40, 20, None);
        queue.run_until_idle();

        let zone = surface.focus_crop(CropZone::new(5, 5, 10, 8)).expect("focus");
        assert_eq!(zone, CropZone::new(5, 5, 10, 8));
        assert!(surface.crop_has_focus());

        let confirmed = Rc::new(Cell::new(false));
        let flag = confirmed.clone();
        surface
            .crop_current_zone(Box::new(move || flag.set(true)))
            .expect("crop should apply");

        assert!(!surface.crop_has_focus());
        assert_eq!(surface.transformations(), &[Transformation::Crop(zone)]);
        assert!(!confirmed.get());
        queue.run_frame();
        assert!(confirmed.get());

        let exported = decode_image_source(&surface.to_data_url().expect("export")).expect("decode");
        assert_eq!(exported.dimensions(), (10, 8));
    }

    #[test]
    fn crop_current_zone_without_focus_fails() {
        let queue = FrameQueue::new();
        let mut surface = surface_for(&queue, 8, 8, None);
        assert!(matches!(
            surface.crop_current_zone(Box::new(|| {})),
            Err(SurfaceError::NoCropFocus)
        ));
        assert!(surface.transformations().is_empty());
    }

    #[test]
    fn focus_crop_honors_configured_ratio() {
        let queue = FrameQueue::new();
        let mut surface = surface_for(&queue, 40, 20, CropRatio::new(1.0));
        let zone = surface.focus_crop(CropZone::new(0, 0, 30, 10)).expect("focus");
        assert_eq!(zone, CropZone::new(0, 0, 10, 10));
    }

    #[test]
    fn rotation_swaps_dimensions_and_drops_crop_focus() {
        let queue = FrameQueue::new();
        let mut surface = surface_for(&queue, 30, 10, None);
        surface.focus_crop(CropZone::new(0, 0, 5, 5)).expect("focus");

        surface.apply(Transformation::RotateRight).expect("rotate");

        assert!(!surface.crop_has_focus());
        let exported = decode_image_source(&surface.to_data_url().expect("export")).expect("decode");
        assert_eq!(exported.dimensions(), (10, 30));
    }

    #[test]
    fn display_bounds_fit_surface_limits() {
        let raster = RasterSurface {
            image: decode_image_source(&sample_data_url(200, 40)).expect("decode"),
            options: options(None),
            transformations: Vec::new(),
            crop_zone: None,
            scheduler: Rc::new(FrameQueue::new()),
        };
        assert_eq!(raster.bounds(), ImageBounds::new(200, 40));
        assert_eq!(raster.display_bounds(), ImageBounds::new(100, 20));
    }
}
