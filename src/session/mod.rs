//! The single editing surface bound to the image being edited.

use thiserror::Error;

use crate::toolkit::{CropUpdatedCallback, EditingSurface, SurfaceError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no initialized editing surface is bound")]
    NoSurface,
    #[error("binding {0:?} was superseded by a newer image")]
    Superseded(BindingId),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Identifies one `bind` call. Work for an older binding is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing changed since binding or the last save; nothing to export.
    Unchanged,
    Exported(String),
    /// The focused crop is being applied; export once the surface confirms.
    PendingCrop,
}

#[derive(Default)]
pub struct EditingSession {
    image_source: Option<String>,
    binding: u64,
    surface: Option<Box<dyn EditingSurface>>,
    initialized: bool,
    reset_requested: bool,
    stale: bool,
}

impl EditingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous surface and all edit state, and starts a new binding.
    pub fn bind(&mut self, image_source: impl Into<String>) -> BindingId {
        self.binding += 1;
        self.image_source = Some(image_source.into());
        self.surface = None;
        self.initialized = false;
        self.reset_requested = false;
        self.stale = false;
        BindingId(self.binding)
    }

    pub fn binding(&self) -> BindingId {
        BindingId(self.binding)
    }

    pub fn is_current(&self, binding: BindingId) -> bool {
        binding.0 == self.binding && self.image_source.is_some()
    }

    pub fn image_source(&self) -> Option<&str> {
        self.image_source.as_deref()
    }

    /// Stores the surface built for `binding`. Returns whether the session became ready.
    pub fn attach_surface(&mut self, binding: BindingId, surface: Box<dyn EditingSurface>) -> bool {
        if !self.is_current(binding) {
            tracing::debug!(?binding, current = self.binding, "dropping surface for superseded binding");
            return false;
        }
        self.surface = Some(surface);
        self.settle()
    }

    /// Records the surface's initialized signal. Returns whether the session became ready.
    pub fn mark_initialized(&mut self, binding: BindingId) -> bool {
        if !self.is_current(binding) || self.initialized {
            return false;
        }
        self.initialized = true;
        self.settle()
    }

    fn settle(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        // Start from a clean edit list; loading the image is not an edit.
        if let Some(surface) = self.surface.as_mut() {
            surface.clear_transformations();
        }
        true
    }

    pub fn is_ready(&self) -> bool {
        self.initialized && self.surface.is_some()
    }

    /// An image is bound but its surface is not interactive yet.
    pub fn is_pending(&self) -> bool {
        self.image_source.is_some() && !self.is_ready()
    }

    /// Edits were discarded; the next reveal must rebind the source.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn surface_mut(&mut self) -> Option<&mut (dyn EditingSurface + 'static)> {
        if !self.is_ready() {
            return None;
        }
        self.surface.as_deref_mut()
    }

    pub fn transformation_count(&self) -> usize {
        self.ready_surface()
            .map_or(0, |surface| surface.transformations().len())
    }

    pub fn crop_has_focus(&self) -> bool {
        self.ready_surface()
            .is_some_and(|surface| surface.crop_has_focus())
    }

    pub fn has_changes(&self) -> bool {
        if self.stale {
            return false;
        }
        self.reset_requested || self.transformation_count() > 0 || self.crop_has_focus()
    }

    /// Marks that the caller should receive a fresh image on the next save.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Forgets uncommitted edits. The surface is rebuilt on the next reveal.
    pub fn discard(&mut self) {
        if self.has_changes() {
            self.stale = true;
        }
        self.reset_requested = false;
    }

    /// Exports the edited image if anything changed.
    ///
    /// A focused crop is applied first; `on_crop_finalized` fires when the
    /// surface confirms it, and the caller then finishes with [`Self::export`].
    pub fn commit(&mut self, on_crop_finalized: CropUpdatedCallback) -> SessionResult<CommitOutcome> {
        if !self.has_changes() {
            tracing::debug!("save requested without changes; nothing to export");
            self.reset_requested = false;
            return Ok(CommitOutcome::Unchanged);
        }

        // The reset request is consumed only by a successful commit.
        let surface = self.surface_mut().ok_or(SessionError::NoSurface)?;
        let outcome = if surface.crop_has_focus() {
            surface.crop_current_zone(on_crop_finalized)?;
            CommitOutcome::PendingCrop
        } else {
            CommitOutcome::Exported(surface.to_data_url()?)
        };
        self.reset_requested = false;
        Ok(outcome)
    }

    pub fn export(&self, binding: BindingId) -> SessionResult<String> {
        if !self.is_current(binding) {
            return Err(SessionError::Superseded(binding));
        }
        let surface = self.ready_surface().ok_or(SessionError::NoSurface)?;
        Ok(surface.to_data_url()?)
    }

    fn ready_surface(&self) -> Option<&dyn EditingSurface> {
        if !self.is_ready() {
            return None;
        }
        self.surface.as_deref()
    }
}

impl std::fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingSession")
            .field("image_source", &self.image_source)
            .field("binding", &self.binding)
            .field("ready", &self.is_ready())
            .field("reset_requested", &self.reset_requested)
            .field("stale", &self.stale)
            .finish()
    }
}
