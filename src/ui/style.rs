use serde::Deserialize;

/// Fixed chrome surrounding the editing surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeTokens {
    pub background_padding_x: f64,
    pub background_padding_y: f64,
    pub editor_padding: f64,
    pub toolbar_height: f64,
    pub screen_height_ratio: f64,
}

impl ChromeTokens {
    /// Padding on both horizontal sides of the backdrop plus the editor.
    pub fn horizontal_chrome(self) -> f64 {
        self.background_padding_x * 2.0 + self.editor_padding * 2.0
    }

    /// Vertical chrome excluding the header, whose height is measured.
    pub fn vertical_chrome(self) -> f64 {
        self.background_padding_y * 2.0 + self.toolbar_height + self.editor_padding * 2.0
    }

    pub fn merged_with(self, overrides: &ChromeOverrides) -> Self {
        Self {
            background_padding_x: overrides
                .background_padding_x
                .unwrap_or(self.background_padding_x),
            background_padding_y: overrides
                .background_padding_y
                .unwrap_or(self.background_padding_y),
            editor_padding: overrides.editor_padding.unwrap_or(self.editor_padding),
            toolbar_height: overrides.toolbar_height.unwrap_or(self.toolbar_height),
            screen_height_ratio: self.screen_height_ratio,
        }
    }
}

pub const CHROME_TOKENS: ChromeTokens = ChromeTokens {
    background_padding_x: 16.0,
    background_padding_y: 48.0,
    editor_padding: 32.0,
    toolbar_height: 40.0,
    screen_height_ratio: 0.65,
};

/// Partial chrome override read from `config.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ChromeOverrides {
    #[serde(default)]
    pub background_padding_x: Option<f64>,
    #[serde(default)]
    pub background_padding_y: Option<f64>,
    #[serde(default)]
    pub editor_padding: Option<f64>,
    #[serde(default)]
    pub toolbar_height: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_tokens_match_popup_dimensions() {
        let tokens = CHROME_TOKENS;
        assert_eq!(tokens.horizontal_chrome(), 96.0);
        assert_eq!(tokens.vertical_chrome(), 200.0);
        assert_eq!(tokens.screen_height_ratio, 0.65);
    }

    #[test]
    fn merged_with_only_replaces_present_fields() {
        let merged = CHROME_TOKENS.merged_with(&ChromeOverrides {
            editor_padding: Some(8.0),
            ..ChromeOverrides::default()
        });
        assert_eq!(merged.editor_padding, 8.0);
        assert_eq!(merged.background_padding_x, 16.0);
        assert_eq!(merged.toolbar_height, 40.0);
    }
}
