use super::PopupState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupTrigger {
    /// A new image source was bound and is being prepared.
    BeginLoad,
    /// Shown again while an earlier binding is still in flight.
    ResumeLoading,
    /// Shown again with the existing, initialized session.
    Reveal,
    /// Editing surface reported it is initialized.
    SurfaceReady,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<PopupState>,
    pub trigger: PopupTrigger,
    pub to: PopupState,
}

impl StateTransition {
    pub const fn new(from: Option<PopupState>, trigger: PopupTrigger, to: PopupState) -> Self {
        Self { from, trigger, to }
    }
}
