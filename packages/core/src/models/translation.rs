//! Translation options
//!
//! Transient values computed by the language gateway describing, per
//! configured language, whether a translation of an item exists.

use crate::models::ContentNode;
use serde::Serialize;

/// One language's translation status for an item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOption {
    /// Language root the option refers to
    pub language: ContentNode,

    pub language_code: Option<String>,

    /// Existing translation under `language`, `None` when one must be created
    pub translation: Option<ContentNode>,

    pub is_new: bool,
}

impl TranslationOption {
    /// Option pointing at an existing translation
    pub fn existing(language: ContentNode, translation: ContentNode) -> Self {
        Self {
            language_code: language.language_code().map(str::to_string),
            language,
            translation: Some(translation),
            is_new: false,
        }
    }

    /// Option for a language that has no translation yet
    pub fn missing(language: ContentNode) -> Self {
        Self {
            language_code: language.language_code().map(str::to_string),
            language,
            translation: None,
            is_new: true,
        }
    }

    /// Node an editor should open: the translation, or the language root under
    /// which a new translation is created.
    pub fn target(&self) -> &ContentNode {
        self.translation.as_ref().unwrap_or(&self.language)
    }
}
