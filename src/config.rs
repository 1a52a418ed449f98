use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::model::language::Language;
use crate::services::variants::VariantAnchors;

pub const CONFIG_ENV: &str = "PHRASE_CORE_CONFIG";
pub const PACK_ROOT_ENV: &str = "PHRASE_PACK_ROOT";
const CONFIG_FILE: &str = "phrase-core.json";

fn default_pack_root() -> String {
    if let Ok(root) = std::env::var(PACK_ROOT_ENV) {
        if !root.trim().is_empty() {
            return root;
        }
    }
    "./langpack".to_string()
}

fn default_chunks() -> Vec<String> {
    vec!["phase2_L1_v9".to_string()]
}

fn default_languages() -> Vec<String> {
    Language::ALL.iter().map(|l| l.code().to_string()).collect()
}

fn default_authoritative_language() -> String {
    "ko".to_string()
}

fn default_gloss_language() -> String {
    "en".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_http_max_attempts() -> usize {
    3
}

fn anchor_language(role: &str, code: &str, fallback: Language) -> Language {
    Language::from_code(code).unwrap_or_else(|| {
        warn!("unknown {role} language: {code}, using {fallback}");
        fallback
    })
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoreConfig {
    /// Directory or `http(s)://` base URL holding the pack chunks.
    #[serde(default = "default_pack_root")]
    pub pack_root: String,

    /// Chunk stems, concatenated per language in this order.
    #[serde(default = "default_chunks")]
    pub chunks: Vec<String>,

    /// Requested languages in scan order.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    #[serde(default = "default_authoritative_language")]
    pub authoritative_language: String,

    #[serde(default = "default_gloss_language")]
    pub gloss_language: String,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Requests per chunk, the first one included.
    #[serde(default = "default_http_max_attempts", alias = "http_max_retries")]
    pub http_max_attempts: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            pack_root: default_pack_root(),
            chunks: default_chunks(),
            languages: default_languages(),
            authoritative_language: default_authoritative_language(),
            gloss_language: default_gloss_language(),
            log_filter: default_log_filter(),
            http_timeout_secs: default_http_timeout_secs(),
            http_max_attempts: default_http_max_attempts(),
        }
    }
}

impl CoreConfig {
    /// Path named by `PHRASE_CORE_CONFIG`, else `phrase-core.json` in the
    /// working directory.
    pub fn default_path() -> PathBuf {
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            if !p.trim().is_empty() {
                return PathBuf::from(p);
            }
        }
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    /// Missing file means defaults; a present but broken file is an error.
    pub fn load(path: &Path) -> Result<CoreConfig, ConfigError> {
        if !path.exists() {
            warn!("config {} not found, using defaults", path.display());
            return Ok(CoreConfig::default());
        }

        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str::<CoreConfig>(&data).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn is_remote(&self) -> bool {
        let root = self.pack_root.trim();
        root.starts_with("http://") || root.starts_with("https://")
    }

    /// Unknown codes fall back to the default anchors with a warning.
    pub fn anchors(&self) -> VariantAnchors {
        let defaults = VariantAnchors::default();
        VariantAnchors {
            authoritative: anchor_language(
                "authoritative",
                &self.authoritative_language,
                defaults.authoritative,
            ),
            gloss: anchor_language("gloss", &self.gloss_language, defaults.gloss),
        }
    }
}
