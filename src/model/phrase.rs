use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::language::Language;

/// One variant of one frame, merged across every language that has it.
///
/// A language without data for the frame has no key in any of the maps; a
/// missing key means "untranslated", never an empty string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub id: String,
    pub category_id: String,
    pub translation: String,

    #[serde(default)]
    pub translations: BTreeMap<Language, String>,

    #[serde(default)]
    pub tokens_map: BTreeMap<Language, Vec<String>>,

    #[serde(default)]
    pub tokens_slash_map: BTreeMap<Language, String>,
}

impl Phrase {
    pub fn text_for(&self, lang: Language) -> Option<&str> {
        self.translations.get(&lang).map(String::as_str)
    }

    pub fn tokens_for(&self, lang: Language) -> &[String] {
        self.tokens_map.get(&lang).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.translations.keys().copied()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
}
