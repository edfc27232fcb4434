use crate::error::PopupResult;
use crate::events::PopupEvent;
use crate::session::{BindingId, CommitOutcome};
use crate::ui::HeaderButton;

use super::ImageEditingPopup;

/// Where a pointer click landed, as routed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed area around the popup.
    Backdrop,
    /// Anywhere inside the popup that is not a header button.
    PopupBody,
    Header(HeaderButton),
}

/// Whether the host should keep dispatching the click to enclosing elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickPropagation {
    Continue,
    Stop,
}

impl ImageEditingPopup {
    /// Routes a click. Clicks inside the popup never reach the backdrop.
    pub fn click(&self, target: ClickTarget) -> PopupResult<ClickPropagation> {
        match target {
            ClickTarget::Backdrop => {
                self.hide()?;
                Ok(ClickPropagation::Continue)
            }
            ClickTarget::PopupBody => Ok(ClickPropagation::Stop),
            ClickTarget::Header(button) => {
                self.press(button)?;
                Ok(ClickPropagation::Stop)
            }
        }
    }

    pub fn press(&self, button: HeaderButton) -> PopupResult<()> {
        tracing::debug!(?button, "header button pressed");
        match button {
            HeaderButton::Reset => {
                self.reset();
                Ok(())
            }
            HeaderButton::Cancel => self.cancel(),
            HeaderButton::Save => self.save(),
        }
    }

    fn reset(&self) {
        self.emit(PopupEvent::ResetImage);
        // After emitting: handlers usually rebind the original, which clears the flag.
        self.shared.inner.borrow_mut().session.request_reset();
    }

    fn cancel(&self) -> PopupResult<()> {
        self.emit(PopupEvent::Canceled);
        self.shared.inner.borrow_mut().session.discard();
        self.hide()
    }

    fn save(&self) -> PopupResult<()> {
        let weak = self.downgrade();
        let outcome = {
            let mut inner = self.shared.inner.borrow_mut();
            let binding = inner.session.binding();
            inner.session.commit(Box::new(move || {
                if let Some(popup) = weak.upgrade() {
                    popup.finish_pending_commit(binding);
                }
            }))
        };

        match outcome {
            Ok(CommitOutcome::Exported(data_url)) => {
                self.emit(PopupEvent::SavedImage { data_url });
            }
            Ok(CommitOutcome::PendingCrop) => {
                tracing::debug!("waiting for crop to settle before export");
            }
            Ok(CommitOutcome::Unchanged) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to export edited image");
            }
        }
        self.hide()
    }

    fn finish_pending_commit(&self, binding: BindingId) {
        let exported = self.shared.inner.borrow().session.export(binding);
        match exported {
            Ok(data_url) => self.emit(PopupEvent::SavedImage { data_url }),
            Err(err) => tracing::warn!(error = %err, "failed to export cropped image"),
        }
    }
}
