//! Variant inference and splitting.
//!
//! A frame may pack several alternative sentences into one entry. Nested
//! tokens in the authoritative language are the strongest signal; slashes in
//! the gloss language's text are the fallback.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::entry::{RawEntry, TokenShape};
use crate::model::language::Language;
use crate::model::phrase::Phrase;

use super::aggregate::FrameSet;

/// The two languages variant inference looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantAnchors {
    /// Pack that ships pre-segmented nested tokens.
    pub authoritative: Language,
    /// Pack whose text uses slash notation and whose `gloss_en` seeds
    /// `Phrase::translation`.
    pub gloss: Language,
}

impl Default for VariantAnchors {
    fn default() -> Self {
        VariantAnchors {
            authoritative: Language::Ko,
            gloss: Language::En,
        }
    }
}

pub fn infer_variant_count(frames: &FrameSet<'_>, frame_id: &str, anchors: &VariantAnchors) -> usize {
    if let Some(n) = frames
        .get(frame_id, anchors.authoritative)
        .and_then(|e| e.tokens.nested_len())
    {
        return n;
    }

    if let Some(e) = frames.get(frame_id, anchors.gloss) {
        if e.target_text.contains('/') {
            return e.target_text.split('/').count();
        }
    }

    1
}

/// Segment `i` of `text` split on `sep`, or segment 0 when `i` is missing or
/// empty; trimmed.
pub fn pick_segment(text: &str, sep: &str, i: usize) -> String {
    let parts: Vec<&str> = text.split(sep).collect();
    let part = parts
        .get(i)
        .filter(|p| !p.is_empty())
        .or_else(|| parts.first())
        .copied()
        .unwrap_or("");
    part.trim().to_string()
}

/// Start index of every variant in a flat token sequence: 0 plus every later
/// token beginning with `/`.
pub fn boundaries(tokens: &[String]) -> Vec<usize> {
    let mut out = vec![0];
    out.extend(
        tokens
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, t)| t.starts_with('/'))
            .map(|(idx, _)| idx),
    );
    out
}

/// Token slice of variant `i` out of `n`.
pub fn split_tokens(shape: &TokenShape, n: usize, i: usize) -> Vec<String> {
    match shape {
        TokenShape::Nested(parts) => parts.get(i).cloned().unwrap_or_default(),
        TokenShape::Flat(tokens) if n <= 1 => tokens.clone(),
        TokenShape::Flat(tokens) => {
            let starts = boundaries(tokens);
            if starts.len() != n {
                debug!(
                    "expected {n} variants, found {} boundaries; keeping tokens unsplit",
                    starts.len()
                );
                return tokens.clone();
            }

            let start = starts[i];
            let end = starts.get(i + 1).copied().unwrap_or(tokens.len());
            let mut slice = tokens[start..end].to_vec();
            if let Some(first) = slice.first_mut() {
                if let Some(rest) = first.strip_prefix('/') {
                    *first = rest.to_string();
                }
            }
            slice
        }
    }
}

/// Splits one frame into its `Phrase` records.
///
/// `category_id` is the frame's canonical category; ids are the bare frame
/// id for single-variant frames and `{frame}-{i}` otherwise.
pub fn split_frame(
    frames: &FrameSet<'_>,
    frame_id: &str,
    category_id: &str,
    anchors: &VariantAnchors,
) -> Vec<Phrase> {
    let n = infer_variant_count(frames, frame_id, anchors);
    let entries: Vec<(Language, &RawEntry)> = frames.entries_for(frame_id).collect();

    (0..n)
        .map(|i| {
            let id = if n > 1 {
                format!("{frame_id}-{i}")
            } else {
                frame_id.to_string()
            };

            let mut translation = String::new();
            let mut translations = BTreeMap::new();
            let mut tokens_map = BTreeMap::new();
            let mut tokens_slash_map = BTreeMap::new();

            for &(lang, e) in &entries {
                translations.insert(lang, pick_segment(&e.target_text, "/", i));

                if lang == anchors.gloss && !e.gloss_en.is_empty() {
                    translation = pick_segment(&e.gloss_en, "/", i);
                }

                tokens_map.insert(lang, split_tokens(&e.tokens, n, i));
                tokens_slash_map.insert(lang, pick_segment(&e.tokens_slash, "//", i));
            }

            if translation.is_empty() {
                translation = translations
                    .get(&anchors.gloss)
                    .cloned()
                    .or_else(|| entries.first().and_then(|(l, _)| translations.get(l).cloned()))
                    .unwrap_or_default();
            }

            Phrase {
                id,
                category_id: category_id.to_string(),
                translation,
                translations,
                tokens_map,
                tokens_slash_map,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn flat(tokens: &[&str]) -> TokenShape {
        TokenShape::Flat(tokens.iter().map(|s| s.to_string()).collect())
    }

    fn nested(parts: &[&[&str]]) -> TokenShape {
        TokenShape::Nested(
            parts
                .iter()
                .map(|p| p.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn entry(frame: &str, text: &str, tokens: TokenShape, slash: &str) -> RawEntry {
        RawEntry {
            frame_id: frame.into(),
            category_id: "lvl1_status".into(),
            target_text: text.into(),
            tokens,
            tokens_slash: slash.into(),
            ..RawEntry::default()
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nested_authoritative_tokens_set_the_count() {
        let packs = vec![
            (
                Language::Ko,
                Arc::new(vec![entry("greet_01", "안녕 / 안녕하세요", nested(&[&["안녕"], &["안녕하세요"]]), "")]),
            ),
            (Language::En, Arc::new(vec![entry("greet_01", "Hi", flat(&["Hi"]), "Hi")])),
        ];
        let frames = FrameSet::build(&packs);
        let anchors = VariantAnchors::default();

        assert_eq!(infer_variant_count(&frames, "greet_01", &anchors), 2);

        let phrases = split_frame(&frames, "greet_01", "lvl1_greetings", &anchors);
        let ids: Vec<&str> = phrases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["greet_01-0", "greet_01-1"]);
    }

    #[test]
    fn nested_tokens_outrank_gloss_slashes() {
        let packs = vec![
            (Language::En, Arc::new(vec![entry("f", "a/b/c", flat(&["a", "/b", "/c"]), "")])),
            (Language::Ko, Arc::new(vec![entry("f", "x", nested(&[&["x"], &["y"]]), "")])),
        ];
        let frames = FrameSet::build(&packs);
        assert_eq!(infer_variant_count(&frames, "f", &VariantAnchors::default()), 2);
    }

    #[test]
    fn gloss_slashes_set_the_count_without_nested_tokens() {
        let packs = vec![(
            Language::En,
            Arc::new(vec![entry("f", "busy/free", flat(&["busy", "/free"]), "")]),
        )];
        let frames = FrameSet::build(&packs);
        assert_eq!(infer_variant_count(&frames, "f", &VariantAnchors::default()), 2);
    }

    #[test]
    fn slashes_outside_the_gloss_language_are_ignored() {
        let packs = vec![(
            Language::Fr,
            Arc::new(vec![entry("f", "occupé/occupée", flat(&["occupé", "/occupée"]), "")]),
        )];
        let frames = FrameSet::build(&packs);
        assert_eq!(infer_variant_count(&frames, "f", &VariantAnchors::default()), 1);
    }

    #[test]
    fn empty_nested_tokens_do_not_count() {
        let packs = vec![(Language::Ko, Arc::new(vec![entry("f", "x", TokenShape::Nested(vec![]), "")]))];
        let frames = FrameSet::build(&packs);
        assert_eq!(infer_variant_count(&frames, "f", &VariantAnchors::default()), 1);
    }

    #[test]
    fn flat_tokens_split_on_slash_markers() {
        let shape = flat(&["busy", "/free"]);
        assert_eq!(split_tokens(&shape, 2, 0), strings(&["busy"]));
        assert_eq!(split_tokens(&shape, 2, 1), strings(&["free"]));
    }

    #[test]
    fn only_the_leading_slash_is_stripped() {
        let shape = flat(&["I'm", "busy", "//not", "free"]);
        assert_eq!(split_tokens(&shape, 2, 1), strings(&["/not", "free"]));
    }

    #[test]
    fn boundary_mismatch_keeps_tokens_unsplit() {
        let shape = flat(&["a", "b", "/c", "/d"]);
        assert_eq!(split_tokens(&shape, 2, 0), strings(&["a", "b", "/c", "/d"]));
        assert_eq!(split_tokens(&shape, 2, 1), strings(&["a", "b", "/c", "/d"]));
    }

    #[test]
    fn single_variant_flat_tokens_are_untouched() {
        let shape = flat(&["a", "/b"]);
        assert_eq!(split_tokens(&shape, 1, 0), strings(&["a", "/b"]));
    }

    #[test]
    fn missing_nested_variant_is_empty() {
        let shape = nested(&[&["a"]]);
        assert!(split_tokens(&shape, 3, 2).is_empty());
    }

    #[test]
    fn flat_split_partitions_the_sequence() {
        let original = strings(&["I'm", "busy", "/I'm", "not", "free", "/Leave", "me"]);
        let shape = TokenShape::Flat(original.clone());
        let n = boundaries(&original).len();
        assert_eq!(n, 3);

        let rejoined: Vec<String> = (0..n)
            .flat_map(|i| {
                let mut part = split_tokens(&shape, n, i);
                if i > 0 {
                    part[0] = format!("/{}", part[0]);
                }
                part
            })
            .collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn segments_fall_back_to_the_first() {
        assert_eq!(pick_segment("a / b", "/", 1), "b");
        assert_eq!(pick_segment("solo", "/", 1), "solo");
        assert_eq!(pick_segment("a//", "/", 1), "a");
        assert_eq!(pick_segment("x y // z", "//", 1), "z");
        assert_eq!(pick_segment("a/b // c", "//", 0), "a/b");
        assert_eq!(pick_segment("", "/", 0), "");
    }

    #[test]
    fn gloss_seeds_translation() {
        let mut en = entry("f", "busy/free", flat(&["busy", "/free"]), "busy // free");
        en.gloss_en = "I'm busy / I'm free".into();
        let packs = vec![(Language::En, Arc::new(vec![en]))];
        let frames = FrameSet::build(&packs);

        let phrases = split_frame(&frames, "f", "lvl1_status", &VariantAnchors::default());
        assert_eq!(phrases[0].translation, "I'm busy");
        assert_eq!(phrases[1].translation, "I'm free");
        assert_eq!(phrases[1].tokens_slash_map[&Language::En], "free");
        assert_eq!(phrases[1].translations[&Language::En], "free");
    }

    #[test]
    fn translation_falls_back_to_first_contributor() {
        let packs = vec![
            (Language::Es, Arc::new(vec![entry("f", "Hola", flat(&["Hola"]), "Hola")])),
            (Language::Fr, Arc::new(vec![entry("f", "Salut", flat(&["Salut"]), "Salut")])),
        ];
        let frames = FrameSet::build(&packs);

        let phrases = split_frame(&frames, "f", "lvl1_greetings", &VariantAnchors::default());
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases[0].id, "f");
        assert_eq!(phrases[0].translation, "Hola");
    }

    #[test]
    fn empty_gloss_uses_gloss_language_text() {
        let packs = vec![
            (Language::Es, Arc::new(vec![entry("f", "Hola", flat(&["Hola"]), "")])),
            (Language::En, Arc::new(vec![entry("f", "Hello", flat(&["Hello"]), "")])),
        ];
        let frames = FrameSet::build(&packs);

        let phrases = split_frame(&frames, "f", "c", &VariantAnchors::default());
        assert_eq!(phrases[0].translation, "Hello");
    }

    #[test]
    fn per_language_maps_share_keys() {
        let packs = vec![
            (Language::Ko, Arc::new(vec![entry("f", "가/나", nested(&[&["가"], &["나"]]), "가 // 나")])),
            (Language::Ja, Arc::new(vec![entry("f", "あ", flat(&["あ"]), "あ")])),
        ];
        let frames = FrameSet::build(&packs);

        for p in split_frame(&frames, "f", "c", &VariantAnchors::default()) {
            let keys: Vec<Language> = p.translations.keys().copied().collect();
            assert_eq!(keys, p.tokens_map.keys().copied().collect::<Vec<_>>());
            assert_eq!(keys, p.tokens_slash_map.keys().copied().collect::<Vec<_>>());
            assert!(!p.translations.contains_key(&Language::En));
        }
    }
}
