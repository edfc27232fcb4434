//! Editing-surface sizing and popup placement.

use crate::geometry::{MaxDimensions, Viewport};
use crate::ui::ChromeTokens;

/// Largest surface that fits the viewport minus chrome and the screen-height ceiling.
///
/// The ceiling keeps the popup usable on short screens even when the mount
/// point itself is tall. Both results are floored at 0.
pub fn compute_max_dimensions(
    viewport: Viewport,
    screen_height: f64,
    header_height: f64,
    chrome: ChromeTokens,
) -> MaxDimensions {
    let max_width = viewport.width - chrome.horizontal_chrome();

    let screen_ceiling = screen_height * chrome.screen_height_ratio;
    let editor_height = viewport.height - chrome.vertical_chrome() - header_height.max(0.0);
    let max_height = screen_ceiling.min(editor_height);

    MaxDimensions {
        max_width: non_negative(max_width),
        max_height: non_negative(max_height),
    }
}

/// Top offset that centers the popup on `anchor_top` without leaving the container.
pub fn compute_vertical_offset(anchor_top: f64, popup_height: f64, container_height: f64) -> f64 {
    let popup_height = non_negative(popup_height);
    let centered = non_negative(anchor_top - popup_height / 2.0);

    if centered + popup_height > container_height {
        return non_negative(container_height - popup_height);
    }
    centered
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::CHROME_TOKENS;

    #[test]
    fn max_width_subtracts_horizontal_chrome() {
        let dims = compute_max_dimensions(Viewport::new(1280.0, 2000.0), 1080.0, 50.0, CHROME_TOKENS);
        assert_eq!(dims.max_width, 1280.0 - 96.0);
    }

    #[test]
    fn max_height_uses_screen_ceiling_when_container_is_tall() {
        let dims = compute_max_dimensions(Viewport::new(1280.0, 4000.0), 1000.0, 50.0, CHROME_TOKENS);
        assert_eq!(dims.max_height, 650.0);
    }

    #[test]
    fn max_height_uses_container_when_shorter_than_ceiling() {
        let dims = compute_max_dimensions(Viewport::new(1280.0, 600.0), 1000.0, 50.0, CHROME_TOKENS);
        assert_eq!(dims.max_height, 600.0 - 200.0 - 50.0);
    }

    #[test]
    fn max_dimensions_floor_at_zero_for_tiny_viewports() {
        let dims = compute_max_dimensions(Viewport::new(40.0, 80.0), 1000.0, 50.0, CHROME_TOKENS);
        assert_eq!(dims.max_width, 0.0);
        assert_eq!(dims.max_height, 0.0);
    }

    #[test]
    fn vertical_offset_centers_on_anchor() {
        assert_eq!(compute_vertical_offset(500.0, 200.0, 1000.0), 400.0);
    }

    #[test]
    fn vertical_offset_never_goes_above_container_top() {
        assert_eq!(compute_vertical_offset(100.0, 400.0, 1000.0), 0.0);
    }

    #[test]
    fn vertical_offset_never_overflows_container_bottom() {
        assert_eq!(compute_vertical_offset(950.0, 200.0, 1000.0), 800.0);
    }

    #[test]
    fn vertical_offset_is_zero_when_popup_taller_than_container() {
        assert_eq!(compute_vertical_offset(600.0, 1200.0, 1000.0), 0.0);
    }
}
