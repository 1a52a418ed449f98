use serde::{Deserialize, Serialize};

/// Every language a pack can be authored in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ja,
    Ko,
    Zh,
    Fr,
    Es,
    De,
    Ru,
    Vi,
    Fi,
}

impl Language {
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Ja,
        Language::Ko,
        Language::Zh,
        Language::Fr,
        Language::Es,
        Language::De,
        Language::Ru,
        Language::Vi,
        Language::Fi,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
            Language::Ko => "ko",
            Language::Zh => "zh",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::De => "de",
            Language::Ru => "ru",
            Language::Vi => "vi",
            Language::Fi => "fi",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "ja" => Some(Language::Ja),
            "ko" => Some(Language::Ko),
            "zh" => Some(Language::Zh),
            "fr" => Some(Language::Fr),
            "es" => Some(Language::Es),
            "de" => Some(Language::De),
            "ru" => Some(Language::Ru),
            "vi" => Some(Language::Vi),
            "fi" => Some(Language::Fi),
            _ => None,
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "Japanese",
            Language::Ko => "Korean",
            Language::Zh => "Chinese (Simplified)",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::De => "German",
            Language::Ru => "Russian",
            Language::Vi => "Vietnamese",
            Language::Fi => "Finnish",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ja => "日本語",
            Language::Ko => "한국어",
            Language::Zh => "中文 (简体)",
            Language::Fr => "Français",
            Language::Es => "Español",
            Language::De => "Deutsch",
            Language::Ru => "Русский",
            Language::Vi => "Tiếng Việt",
            Language::Fi => "Suomi",
        }
    }

    pub fn locale(self) -> &'static str {
        match self {
            Language::En => "en-US",
            Language::Ja => "ja-JP",
            Language::Ko => "ko-KR",
            Language::Zh => "zh-CN",
            Language::Fr => "fr-FR",
            Language::Es => "es-ES",
            Language::De => "de-DE",
            Language::Ru => "ru-RU",
            Language::Vi => "vi-VN",
            Language::Fi => "fi-FI",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Display row for `languages.list`.
#[derive(Debug, Serialize, Clone)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub locale: &'static str,
}

impl From<Language> for LanguageInfo {
    fn from(lang: Language) -> Self {
        LanguageInfo {
            code: lang.code(),
            name: lang.english_name(),
            native_name: lang.native_name(),
            locale: lang.locale(),
        }
    }
}
