use crate::geometry::ImageBounds;

/// Fixed width/height ratio the crop zone must keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRatio(f64);

impl CropRatio {
    /// Returns `None` for non-finite or non-positive ratios, which mean "free".
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    pub fn from_pair(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Self::new(f64::from(width) / f64::from(height))
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

/// Crop region in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropZone {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropZone {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest zone with `ratio` centered in `bounds`, or the whole image when free.
    pub fn centered(bounds: ImageBounds, ratio: Option<CropRatio>) -> Self {
        let full = Self::new(0, 0, bounds.width, bounds.height);
        let fitted = full.constrained(bounds, ratio);
        Self {
            x: bounds.width.saturating_sub(fitted.width) / 2,
            y: bounds.height.saturating_sub(fitted.height) / 2,
            ..fitted
        }
    }

    /// Clamps the zone into `bounds` and shrinks it to `ratio` if one is set.
    ///
    /// Returns a zone of at least 1x1 for non-empty bounds.
    pub fn constrained(self, bounds: ImageBounds, ratio: Option<CropRatio>) -> Self {
        let max_x = bounds.width.saturating_sub(1);
        let max_y = bounds.height.saturating_sub(1);
        let x = self.x.min(max_x);
        let y = self.y.min(max_y);
        let mut width = self.width.min(bounds.width - x).max(1);
        let mut height = self.height.min(bounds.height - y).max(1);

        if let Some(ratio) = ratio {
            let current = f64::from(width) / f64::from(height);
            if current > ratio.value() {
                width = ((f64::from(height) * ratio.value()).round() as u32).clamp(1, width);
            } else {
                height = ((f64::from(width) / ratio.value()).round() as u32).clamp(1, height);
            }
        }

        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: ImageBounds = ImageBounds::new(800, 600);

    #[test]
    fn crop_ratio_rejects_free_values() {
        assert_eq!(CropRatio::new(0.0), None);
        assert_eq!(CropRatio::new(-1.5), None);
        assert_eq!(CropRatio::new(f64::NAN), None);
        assert_eq!(CropRatio::from_pair(16, 0), None);
        assert_eq!(CropRatio::from_pair(16, 9).map(CropRatio::value), Some(16.0 / 9.0));
    }

    #[test]
    fn constrained_clamps_zone_into_bounds() {
        let zone = CropZone::new(700, 550, 300, 300).constrained(BOUNDS, None);
        assert_eq!(zone, CropZone::new(700, 550, 100, 50));
    }

    #[test]
    fn constrained_keeps_minimum_size_for_degenerate_zone() {
        let zone = CropZone::new(900, 900, 0, 0).constrained(BOUNDS, None);
        assert_eq!(zone, CropZone::new(799, 599, 1, 1));
    }

    #[test]
    fn constrained_shrinks_to_ratio() {
        let square = CropRatio::new(1.0);
        assert_eq!(
            CropZone::new(0, 0, 400, 200).constrained(BOUNDS, square),
            CropZone::new(0, 0, 200, 200)
        );
        assert_eq!(
            CropZone::new(0, 0, 100, 300).constrained(BOUNDS, square),
            CropZone::new(0, 0, 100, 100)
        );
    }

    #[test]
    fn centered_zone_is_largest_fit() {
        assert_eq!(
            CropZone::centered(BOUNDS, CropRatio::new(1.0)),
            CropZone::new(100, 0, 600, 600)
        );
        assert_eq!(CropZone::centered(BOUNDS, None), CropZone::new(0, 0, 800, 600));
    }
}
