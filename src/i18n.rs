//! Translation lookup for user-facing popup strings.

use std::collections::HashMap;

pub const CORE_NAMESPACE: &str = "core";
pub const LOADING_KEY: &str = "loadingImageEditor";
pub const TITLE_KEY: &str = "editImageTitle";

/// `translate(namespace, key)` supplied by the host application.
pub trait Translator {
    fn translate(&self, namespace: &str, key: &str) -> String;
}

impl<F> Translator for F
where
    F: Fn(&str, &str) -> String,
{
    fn translate(&self, namespace: &str, key: &str) -> String {
        self(namespace, key)
    }
}

/// Built-in English strings. Unknown keys come back as `[namespace:key]`.
#[derive(Debug, Clone)]
pub struct DefaultTranslator {
    strings: HashMap<(String, String), String>,
}

impl DefaultTranslator {
    pub fn english() -> Self {
        let entries = [
            (TITLE_KEY, "Edit Image"),
            (LOADING_KEY, "Loading image editing tool..."),
            ("resetToOriginalLabel", "Reset to original"),
            ("cancelLabel", "Cancel"),
            ("saveLabel", "Save"),
        ];
        Self {
            strings: entries
                .into_iter()
                .map(|(key, value)| {
                    (
                        (CORE_NAMESPACE.to_string(), key.to_string()),
                        value.to_string(),
                    )
                })
                .collect(),
        }
    }

    pub fn with_override(mut self, namespace: &str, key: &str, value: impl Into<String>) -> Self {
        self.strings
            .insert((namespace.to_string(), key.to_string()), value.into());
        self
    }
}

impl Default for DefaultTranslator {
    fn default() -> Self {
        Self::english()
    }
}

impl Translator for DefaultTranslator {
    fn translate(&self, namespace: &str, key: &str) -> String {
        self.strings
            .get(&(namespace.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_else(|| format!("[{namespace}:{key}]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_translator_covers_popup_strings() {
        let translator = DefaultTranslator::english();
        assert_eq!(translator.translate(CORE_NAMESPACE, "saveLabel"), "Save");
        assert_eq!(
            translator.translate(CORE_NAMESPACE, LOADING_KEY),
            "Loading image editing tool..."
        );
    }

    #[test]
    fn unknown_keys_are_marked() {
        let translator = DefaultTranslator::english();
        assert_eq!(translator.translate("core", "missing"), "[core:missing]");
    }

    #[test]
    fn closures_act_as_translators() {
        let upper = |namespace: &str, key: &str| format!("{namespace}.{key}").to_uppercase();
        assert_eq!(upper.translate("core", "cancelLabel"), "CORE.CANCELLABEL");
    }

    #[test]
    fn overrides_replace_defaults() {
        let translator = DefaultTranslator::english().with_override("core", "saveLabel", "Done");
        assert_eq!(translator.translate("core", "saveLabel"), "Done");
    }
}
