use std::fmt;

/// Opaque identifier for one popup instance. Element ids derive from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PopupId(String);

impl PopupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    fn scoped(popup: &PopupId, part: &str) -> Self {
        Self(format!("editing-image-popup-{part}-{popup}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parts of the popup the controller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupPart {
    /// Dimmed backdrop containing the popup; hiding it hides everything.
    Background,
    Loading,
    EditingImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderButton {
    Reset,
    Cancel,
    Save,
}

impl HeaderButton {
    pub const ALL: [HeaderButton; 3] = [Self::Reset, Self::Cancel, Self::Save];

    /// Key in the `core` translation namespace.
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Reset => "resetToOriginalLabel",
            Self::Cancel => "cancelLabel",
            Self::Save => "saveLabel",
        }
    }

    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Reset => "editing-image-reset-button",
            Self::Cancel => "editing-image-cancel-button",
            Self::Save => "editing-image-save-button",
        }
    }
}

/// Translated, user-facing strings mounted with the popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    pub title: String,
    pub loading: String,
    pub buttons: Vec<(HeaderButton, String)>,
}

/// Owned handles to every element the popup is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupElements {
    pub popup_id: PopupId,
    pub background: ElementId,
    pub popup: ElementId,
    pub header: ElementId,
    pub header_title: ElementId,
    pub header_buttons: ElementId,
    pub editing_container: ElementId,
    pub loading: ElementId,
    pub editing_image: ElementId,
}

impl PopupElements {
    pub fn new(popup_id: PopupId) -> Self {
        Self {
            background: ElementId::scoped(&popup_id, "background"),
            popup: ElementId::scoped(&popup_id, "body"),
            header: ElementId::scoped(&popup_id, "header"),
            header_title: ElementId::scoped(&popup_id, "header-title"),
            header_buttons: ElementId::scoped(&popup_id, "header-buttons"),
            editing_container: ElementId::scoped(&popup_id, "editing-container"),
            loading: ElementId::scoped(&popup_id, "loading"),
            editing_image: ElementId::scoped(&popup_id, "image"),
            popup_id,
        }
    }

    pub fn part(&self, part: PopupPart) -> &ElementId {
        match part {
            PopupPart::Background => &self.background,
            PopupPart::Loading => &self.loading,
            PopupPart::EditingImage => &self.editing_image,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_are_scoped_to_popup_id() {
        let elements = PopupElements::new(PopupId::new("a1"));
        assert_eq!(elements.editing_image.as_str(), "editing-image-popup-image-a1");
        assert_eq!(elements.part(PopupPart::Background), &elements.background);

        let other = PopupElements::new(PopupId::new("b2"));
        assert_ne!(elements.editing_image, other.editing_image);
    }

    #[test]
    fn generated_popup_ids_are_unique() {
        assert_ne!(PopupId::generate(), PopupId::generate());
    }

    #[test]
    fn header_buttons_use_core_translation_keys() {
        let keys: Vec<_> = HeaderButton::ALL.iter().map(|b| b.label_key()).collect();
        assert_eq!(keys, vec!["resetToOriginalLabel", "cancelLabel", "saveLabel"]);
    }
}
