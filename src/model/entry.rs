use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token data of one pack entry.
///
/// Flat packs concatenate all variants into one sequence and mark every
/// variant after the first with a leading `/` on its first token. Nested packs
/// ship one inner sequence per variant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum TokenShape {
    Flat(Vec<String>),
    Nested(Vec<Vec<String>>),
}

impl Default for TokenShape {
    fn default() -> Self {
        TokenShape::Flat(Vec::new())
    }
}

impl TokenShape {
    /// Outer length of a non-empty nested shape.
    pub fn nested_len(&self) -> Option<usize> {
        match self {
            TokenShape::Nested(parts) if !parts.is_empty() => Some(parts.len()),
            _ => None,
        }
    }

    /// Reads whatever a pack put under `tokens`.
    ///
    /// The first element decides the shape; elements that do not fit it are
    /// dropped. Anything that is not an array reads as an empty flat list.
    pub fn from_loose(value: &Value) -> TokenShape {
        let Value::Array(items) = value else {
            return TokenShape::default();
        };

        match items.first() {
            Some(Value::Array(_)) => TokenShape::Nested(
                items
                    .iter()
                    .filter_map(Value::as_array)
                    .map(|inner| strings(inner))
                    .collect(),
            ),
            _ => TokenShape::Flat(strings(items)),
        }
    }
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn loose_tokens<'de, D>(deserializer: D) -> Result<TokenShape, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(TokenShape::from_loose(&value))
}

/// Inner `item` object of a pack record.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct PackItem {
    #[serde(default)]
    target_text: String,

    #[serde(default, deserialize_with = "loose_tokens")]
    tokens: TokenShape,

    #[serde(default)]
    tokens_slash: String,
}

/// Record as authored in a pack chunk file.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PackRecord {
    frame_id: String,

    #[serde(default)]
    category_id: String,

    #[serde(default, rename = "gloss_en")]
    gloss_en: String,

    #[serde(default)]
    level: String,

    #[serde(default)]
    study_type: String,

    #[serde(default)]
    deck_id: String,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    item: PackItem,
}

/// One language's entry for one frame.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct RawEntry {
    pub frame_id: String,

    #[serde(default)]
    pub category_id: String,

    #[serde(default)]
    pub gloss_en: String,

    #[serde(default)]
    pub target_text: String,

    #[serde(default)]
    pub tokens: TokenShape,

    #[serde(default)]
    pub tokens_slash: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub level: String,

    #[serde(default)]
    pub study_type: String,

    #[serde(default)]
    pub deck_id: String,
}

impl From<PackRecord> for RawEntry {
    fn from(r: PackRecord) -> Self {
        RawEntry {
            frame_id: r.frame_id,
            category_id: r.category_id,
            gloss_en: r.gloss_en,
            target_text: r.item.target_text,
            tokens: r.item.tokens,
            tokens_slash: r.item.tokens_slash,
            tags: r.tags,
            level: r.level,
            study_type: r.study_type,
            deck_id: r.deck_id,
        }
    }
}
