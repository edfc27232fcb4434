use crate::geometry::Viewport;

use super::elements::{HeaderLabels, PopupElements, PopupPart};

/// Rendering layer the popup is mounted into.
///
/// Measurements are read after layout settles, so callers query them from a
/// scheduled frame when elements were just inserted or resized.
pub trait PopupHost {
    /// Creates the popup elements under the body-level mount point, hidden.
    fn mount(&self, elements: &PopupElements, labels: &HeaderLabels);

    /// Size of the body-level mount point.
    fn viewport(&self) -> Viewport;
    fn screen_height(&self) -> f64;
    fn header_height(&self, elements: &PopupElements) -> f64;
    fn popup_height(&self, elements: &PopupElements) -> f64;
    /// Backdrop height minus its vertical padding.
    fn container_height(&self, elements: &PopupElements) -> f64;

    fn set_popup_top(&self, elements: &PopupElements, top: f64);
    fn set_visible(&self, elements: &PopupElements, part: PopupPart, visible: bool);

    /// Removes any previous editing surface and points the editing image at `source`.
    fn load_image(&self, elements: &PopupElements, source: &str);
}
