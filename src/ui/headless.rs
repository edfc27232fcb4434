use std::cell::RefCell;
use std::collections::HashSet;

use crate::geometry::Viewport;

use super::elements::{HeaderLabels, PopupElements, PopupPart};
use super::host::PopupHost;

/// Metrics reported by [`HeadlessHost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessMetrics {
    pub viewport: Viewport,
    pub screen_height: f64,
    pub header_height: f64,
    pub popup_height: f64,
    pub container_height: f64,
}

impl Default for HeadlessMetrics {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(1280.0, 900.0),
            screen_height: 1080.0,
            header_height: 48.0,
            popup_height: 480.0,
            container_height: 804.0,
        }
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    metrics: HeadlessMetrics,
    labels: Option<HeaderLabels>,
    visible: HashSet<PopupPart>,
    popup_top: Option<f64>,
    image_source: Option<String>,
    image_loads: usize,
}

/// In-memory host that records what the popup asked it to render.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
}

impl HeadlessHost {
    pub fn new(metrics: HeadlessMetrics) -> Self {
        Self {
            state: RefCell::new(HeadlessState {
                metrics,
                ..HeadlessState::default()
            }),
        }
    }

    pub fn set_metrics(&self, metrics: HeadlessMetrics) {
        self.state.borrow_mut().metrics = metrics;
    }

    pub fn is_visible(&self, part: PopupPart) -> bool {
        self.state.borrow().visible.contains(&part)
    }

    pub fn popup_top(&self) -> Option<f64> {
        self.state.borrow().popup_top
    }

    pub fn image_source(&self) -> Option<String> {
        self.state.borrow().image_source.clone()
    }

    pub fn image_loads(&self) -> usize {
        self.state.borrow().image_loads
    }

    pub fn labels(&self) -> Option<HeaderLabels> {
        self.state.borrow().labels.clone()
    }
}

impl PopupHost for HeadlessHost {
    fn mount(&self, _elements: &PopupElements, labels: &HeaderLabels) {
        let mut state = self.state.borrow_mut();
        state.labels = Some(labels.clone());
        state.visible.clear();
        state.visible.insert(PopupPart::Loading);
    }

    fn viewport(&self) -> Viewport {
        self.state.borrow().metrics.viewport
    }

    fn screen_height(&self) -> f64 {
        self.state.borrow().metrics.screen_height
    }

    fn header_height(&self, _elements: &PopupElements) -> f64 {
        self.state.borrow().metrics.header_height
    }

    fn popup_height(&self, _elements: &PopupElements) -> f64 {
        self.state.borrow().metrics.popup_height
    }

    fn container_height(&self, _elements: &PopupElements) -> f64 {
        self.state.borrow().metrics.container_height
    }

    fn set_popup_top(&self, _elements: &PopupElements, top: f64) {
        self.state.borrow_mut().popup_top = Some(top);
    }

    fn set_visible(&self, _elements: &PopupElements, part: PopupPart, visible: bool) {
        let mut state = self.state.borrow_mut();
        if visible {
            state.visible.insert(part);
        } else {
            state.visible.remove(&part);
        }
    }

    fn load_image(&self, _elements: &PopupElements, source: &str) {
        let mut state = self.state.borrow_mut();
        state.image_source = Some(source.to_string());
        state.image_loads += 1;
    }
}
