//! Lifecycle events and the subscriber registry the popup emits them through.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupEventKind {
    Initialized,
    ShowedPopup,
    ResetImage,
    Canceled,
    SavedImage,
    LoadFailed,
}

impl PopupEventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::ShowedPopup => "showedPopup",
            Self::ResetImage => "resetImage",
            Self::Canceled => "canceled",
            Self::SavedImage => "savedImage",
            Self::LoadFailed => "loadFailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupEvent {
    /// Editing surface is ready.
    Initialized,
    /// Popup became visible without binding a new image.
    ShowedPopup,
    /// User asked for the original image back.
    ResetImage,
    /// User discarded the edits.
    Canceled,
    SavedImage { data_url: String },
    LoadFailed { reason: String },
}

impl PopupEvent {
    pub const fn kind(&self) -> PopupEventKind {
        match self {
            Self::Initialized => PopupEventKind::Initialized,
            Self::ShowedPopup => PopupEventKind::ShowedPopup,
            Self::ResetImage => PopupEventKind::ResetImage,
            Self::Canceled => PopupEventKind::Canceled,
            Self::SavedImage { .. } => PopupEventKind::SavedImage,
            Self::LoadFailed { .. } => PopupEventKind::LoadFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&PopupEvent)>;

/// Per-event subscriber lists.
///
/// Handlers may subscribe, unsubscribe or emit while being notified; changes
/// apply to the next emission.
#[derive(Default)]
pub struct EventHub {
    next_id: Cell<u64>,
    subscribers: RefCell<HashMap<PopupEventKind, Vec<(SubscriptionId, Handler)>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        kind: PopupEventKind,
        handler: impl Fn(&PopupEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    }

    /// Returns whether a subscription was removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        for handlers in subscribers.values_mut() {
            if let Some(index) = handlers.iter().position(|(existing, _)| *existing == id) {
                handlers.remove(index);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: PopupEventKind) -> usize {
        self.subscribers.borrow().get(&kind).map_or(0, Vec::len)
    }

    pub fn emit(&self, event: &PopupEvent) {
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .get(&event.kind())
            .map(|handlers| handlers.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default();

        tracing::debug!(event = event.kind().name(), handlers = handlers.len(), "emit popup event");
        for handler in handlers {
            handler(event);
        }
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(kind, handlers)| (kind.name(), handlers.len()))
            .collect();
        f.debug_struct("EventHub").field("subscribers", &counts).finish()
    }
}
