//! Popup controller: lifecycle, layout and event emission around one editing session.
//!
//! All entry points run on the host's single-threaded event loop. Internal
//! borrows are released before events are emitted, so subscribers may call
//! back into the popup (a `resetImage` handler typically calls `show` again).

mod interaction;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::PopupConfig;
use crate::error::PopupResult;
use crate::events::{EventHub, PopupEvent, PopupEventKind, SubscriptionId};
use crate::geometry::{Anchor, LayoutMetrics};
use crate::i18n::{Translator, CORE_NAMESPACE, LOADING_KEY, TITLE_KEY};
use crate::layout::{compute_max_dimensions, compute_vertical_offset};
use crate::loader::{LoaderResult, ToolkitLoader};
use crate::scheduler::FrameScheduler;
use crate::session::{BindingId, EditingSession};
use crate::state::{PopupState, PopupTrigger, StateMachine};
use crate::toolkit::{CropRatio, EditingSurface, EditingToolkit, SurfaceOptions};
use crate::ui::{
    ChromeTokens, HeaderButton, HeaderLabels, PopupElements, PopupHost, PopupId, PopupPart,
    CHROME_TOKENS,
};

pub use interaction::{ClickPropagation, ClickTarget};

/// Collaborators the popup drives. Share `loader` between popups to load the toolkit once.
#[derive(Clone)]
pub struct PopupServices {
    pub host: Rc<dyn PopupHost>,
    pub toolkit: Rc<dyn EditingToolkit>,
    pub loader: Rc<ToolkitLoader>,
    pub scheduler: Rc<dyn FrameScheduler>,
    pub translator: Rc<dyn Translator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupOptions {
    pub popup_id: PopupId,
    pub crop_ratio: Option<CropRatio>,
    pub chrome: ChromeTokens,
}

impl PopupOptions {
    pub fn from_config(config: &PopupConfig) -> Self {
        Self {
            popup_id: PopupId::generate(),
            crop_ratio: config.crop_ratio(),
            chrome: config.chrome_tokens(),
        }
    }
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            popup_id: PopupId::generate(),
            crop_ratio: None,
            chrome: CHROME_TOKENS,
        }
    }
}

/// Where the bound image is on its way to an interactive surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LoadProgress {
    #[default]
    Idle,
    AwaitingToolkit(BindingId),
    ToolkitFailed(BindingId),
    BuildingSurface(BindingId),
    SurfaceFailed(BindingId),
}

#[derive(Debug, Default)]
struct PopupInner {
    machine: StateMachine,
    session: EditingSession,
    showing: bool,
    anchor_top: f64,
    layout: LayoutMetrics,
    progress: LoadProgress,
}

struct PopupShared {
    elements: PopupElements,
    options: PopupOptions,
    services: PopupServices,
    events: EventHub,
    inner: RefCell<PopupInner>,
}

/// Modal popup that crops and transforms one image and hands the result back.
///
/// Cloning yields another handle to the same popup.
#[derive(Clone)]
pub struct ImageEditingPopup {
    shared: Rc<PopupShared>,
}

#[derive(Clone)]
struct WeakPopup(Weak<PopupShared>);

impl WeakPopup {
    fn upgrade(&self) -> Option<ImageEditingPopup> {
        self.0.upgrade().map(|shared| ImageEditingPopup { shared })
    }
}

impl ImageEditingPopup {
    /// Mounts the hidden popup into the host.
    pub fn new(services: PopupServices, options: PopupOptions) -> Self {
        let elements = PopupElements::new(options.popup_id.clone());
        let labels = header_labels(services.translator.as_ref());
        services.host.mount(&elements, &labels);
        tracing::debug!(popup = %elements.popup_id, "image editing popup mounted");

        Self {
            shared: Rc::new(PopupShared {
                elements,
                options,
                services,
                events: EventHub::new(),
                inner: RefCell::new(PopupInner::default()),
            }),
        }
    }

    pub fn id(&self) -> &PopupId {
        &self.shared.elements.popup_id
    }

    pub fn elements(&self) -> &PopupElements {
        &self.shared.elements
    }

    pub fn state(&self) -> PopupState {
        self.shared.inner.borrow().machine.state()
    }

    pub fn is_showing(&self) -> bool {
        self.shared.inner.borrow().showing
    }

    pub fn layout(&self) -> LayoutMetrics {
        self.shared.inner.borrow().layout
    }

    pub fn has_changes(&self) -> bool {
        self.shared.inner.borrow().session.has_changes()
    }

    pub fn image_source(&self) -> Option<String> {
        self.shared
            .inner
            .borrow()
            .session
            .image_source()
            .map(str::to_string)
    }

    pub fn subscribe(
        &self,
        kind: PopupEventKind,
        handler: impl Fn(&PopupEvent) + 'static,
    ) -> SubscriptionId {
        self.shared.events.subscribe(kind, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Runs `f` against the initialized editing surface, if any.
    ///
    /// `f` must not call back into the popup.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut dyn EditingSurface) -> R) -> Option<R> {
        let mut inner = self.shared.inner.borrow_mut();
        let result = inner.session.surface_mut().map(|surface| f(surface));
        result
    }

    /// Shows the popup centered on `offset`, binding `image_source` when given.
    ///
    /// Without an image (or with an empty source) the existing session is revealed as-is.
    pub fn show(&self, offset: Option<Anchor>, image_source: Option<&str>) -> PopupResult<()> {
        self.shared.inner.borrow_mut().showing = true;
        match image_source {
            Some(source) if !source.is_empty() => self.set_image(source)?,
            _ => self.reveal()?,
        }
        self.adjust_popup_offset(offset);
        Ok(())
    }

    /// Hides the popup without touching the session. No event is emitted.
    pub fn hide(&self) -> PopupResult<()> {
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.showing = false;
            inner.machine.transition(PopupTrigger::Hide)?;
        }
        self.host()
            .set_visible(&self.shared.elements, PopupPart::Background, false);
        Ok(())
    }

    pub fn toggle(&self) -> PopupResult<()> {
        if self.is_showing() {
            self.hide()
        } else {
            self.show(None, None)
        }
    }

    /// Replaces the edited image. The previous surface and its edits are dropped.
    pub fn set_image(&self, image_source: &str) -> PopupResult<()> {
        let binding = {
            let mut inner = self.shared.inner.borrow_mut();
            let binding = inner.session.bind(image_source);
            if inner.showing {
                inner.machine.transition(PopupTrigger::BeginLoad)?;
            }
            binding
        };
        tracing::debug!(?binding, image_source, "binding image to editing session");

        let elements = &self.shared.elements;
        let host = self.host();
        host.load_image(elements, image_source);
        host.set_visible(elements, PopupPart::Loading, true);
        host.set_visible(elements, PopupPart::EditingImage, false);

        self.await_toolkit(binding);
        Ok(())
    }

    /// Re-centers the popup on `offset`, or on the last anchor when `None`.
    pub fn adjust_popup_offset(&self, offset: Option<Anchor>) {
        let elements = &self.shared.elements;
        let host = self.host();
        let anchor_top = {
            let mut inner = self.shared.inner.borrow_mut();
            if let Some(anchor) = offset {
                inner.anchor_top = anchor.sanitized().top;
            }
            inner.anchor_top
        };

        let top = compute_vertical_offset(
            anchor_top,
            host.popup_height(elements),
            host.container_height(elements),
        );
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.layout = inner.layout.with_offset(top);
        }
        host.set_popup_top(elements, top);
    }

    /// Restarts a failed toolkit load or surface construction for the bound image.
    ///
    /// Returns `false` when the bound image has nothing to retry. A loader that
    /// another popup already restarted is joined rather than restarted again.
    pub fn retry_load(&self) -> bool {
        let progress = {
            let inner = self.shared.inner.borrow();
            if !inner.session.is_pending() {
                return false;
            }
            inner.progress
        };

        match progress {
            LoadProgress::ToolkitFailed(binding) => {
                if !self.shared.services.loader.retry() {
                    tracing::debug!("toolkit load already restarted; waiting on it");
                }
                self.await_toolkit(binding);
                true
            }
            LoadProgress::SurfaceFailed(binding) => {
                self.schedule_surface(binding);
                true
            }
            _ => false,
        }
    }

    fn await_toolkit(&self, binding: BindingId) {
        self.shared.inner.borrow_mut().progress = LoadProgress::AwaitingToolkit(binding);
        let weak = self.downgrade();
        self.shared.services.loader.ensure_loaded(move |result| {
            if let Some(popup) = weak.upgrade() {
                popup.on_toolkit_ready(binding, result);
            }
        });
    }

    fn reveal(&self) -> PopupResult<()> {
        let (stale_source, pending) = {
            let inner = self.shared.inner.borrow();
            let stale = inner
                .session
                .is_stale()
                .then(|| inner.session.image_source().map(str::to_string))
                .flatten();
            (stale, inner.session.is_pending())
        };

        if let Some(source) = stale_source {
            tracing::debug!("rebinding discarded session before reveal");
            self.set_image(&source)?;
        } else {
            let trigger = if pending {
                PopupTrigger::ResumeLoading
            } else {
                PopupTrigger::Reveal
            };
            self.shared.inner.borrow_mut().machine.transition(trigger)?;
        }

        self.host()
            .set_visible(&self.shared.elements, PopupPart::Background, true);
        self.emit(PopupEvent::ShowedPopup);
        Ok(())
    }

    fn on_toolkit_ready(&self, binding: BindingId, result: LoaderResult<()>) {
        if !self.shared.inner.borrow().session.is_current(binding) {
            tracing::debug!(?binding, "ignoring toolkit result for superseded binding");
            return;
        }
        match result {
            Ok(()) => self.schedule_surface(binding),
            Err(err) => {
                self.shared.inner.borrow_mut().progress = LoadProgress::ToolkitFailed(binding);
                tracing::warn!(error = %err, "editing toolkit unavailable; popup stays loading");
                self.emit(PopupEvent::LoadFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Builds the surface on the next frame, once the popup elements have been laid out.
    fn schedule_surface(&self, binding: BindingId) {
        self.shared.inner.borrow_mut().progress = LoadProgress::BuildingSurface(binding);
        let weak = self.downgrade();
        self.shared.services.scheduler.request_frame(Box::new(move || {
            if let Some(popup) = weak.upgrade() {
                popup.create_surface(binding);
            }
        }));
    }

    fn create_surface(&self, binding: BindingId) {
        let elements = &self.shared.elements;
        let host = self.host();
        let Some(image_source) = ({
            let inner = self.shared.inner.borrow();
            inner
                .session
                .is_current(binding)
                .then(|| inner.session.image_source().map(str::to_string))
                .flatten()
        }) else {
            tracing::debug!(?binding, "skipping surface for superseded binding");
            return;
        };

        let dimensions = compute_max_dimensions(
            host.viewport(),
            host.screen_height(),
            host.header_height(elements),
            self.shared.options.chrome,
        );
        {
            let mut inner = self.shared.inner.borrow_mut();
            inner.layout = inner.layout.with_dimensions(dimensions);
        }

        let options = SurfaceOptions {
            max_width: dimensions.max_width,
            max_height: dimensions.max_height,
            crop_ratio: self.shared.options.crop_ratio,
            save_plugin: false,
        };
        let weak = self.downgrade();
        let created = self.shared.services.toolkit.create_surface(
            elements.editing_image.as_str(),
            &image_source,
            options,
            Box::new(move || {
                if let Some(popup) = weak.upgrade() {
                    popup.on_surface_initialized(binding);
                }
            }),
        );

        match created {
            Ok(surface) => {
                let ready = self
                    .shared
                    .inner
                    .borrow_mut()
                    .session
                    .attach_surface(binding, surface);
                if ready {
                    self.finish_initialization();
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, %image_source, "failed to build editing surface");
                self.shared.inner.borrow_mut().progress = LoadProgress::SurfaceFailed(binding);
                self.emit(PopupEvent::LoadFailed {
                    reason: err.to_string(),
                });
            }
        }
    }

    fn on_surface_initialized(&self, binding: BindingId) {
        let ready = self
            .shared
            .inner
            .borrow_mut()
            .session
            .mark_initialized(binding);
        if ready {
            self.finish_initialization();
        }
    }

    fn finish_initialization(&self) {
        let showing = {
            let mut inner = self.shared.inner.borrow_mut();
            inner.progress = LoadProgress::Idle;
            if inner.showing {
                if let Err(err) = inner.machine.transition(PopupTrigger::SurfaceReady) {
                    tracing::warn!(error = %err, "surface ready outside of loading");
                }
            }
            inner.showing
        };

        let elements = &self.shared.elements;
        let host = self.host();
        host.set_visible(elements, PopupPart::Loading, false);
        host.set_visible(elements, PopupPart::EditingImage, true);
        if showing {
            self.adjust_popup_offset(None);
            host.set_visible(elements, PopupPart::Background, true);
        }
        tracing::debug!(showing, "editing surface initialized");
        self.emit(PopupEvent::Initialized);
    }

    fn emit(&self, event: PopupEvent) {
        self.shared.events.emit(&event);
    }

    fn host(&self) -> &dyn PopupHost {
        self.shared.services.host.as_ref()
    }

    fn downgrade(&self) -> WeakPopup {
        WeakPopup(Rc::downgrade(&self.shared))
    }
}

impl std::fmt::Debug for ImageEditingPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("ImageEditingPopup")
            .field("id", &self.shared.elements.popup_id)
            .field("state", &inner.machine.state())
            .field("showing", &inner.showing)
            .field("session", &inner.session)
            .finish()
    }
}

fn header_labels(translator: &dyn Translator) -> HeaderLabels {
    HeaderLabels {
        title: translator.translate(CORE_NAMESPACE, TITLE_KEY),
        loading: translator.translate(CORE_NAMESPACE, LOADING_KEY),
        buttons: HeaderButton::ALL
            .iter()
            .map(|button| {
                (
                    *button,
                    translator.translate(CORE_NAMESPACE, button.label_key()),
                )
            })
            .collect(),
    }
}
