/// Visibility and readiness of the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    /// Toolkit or image is being prepared; the loading message is shown.
    Loading,
    /// Editing surface is interactive and visible.
    Ready,
}

impl PopupState {
    pub const fn is_showing(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}
