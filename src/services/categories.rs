use std::collections::HashSet;

use crate::model::entry::RawEntry;
use crate::model::phrase::Category;

use super::aggregate::FrameSet;
use super::variants::VariantAnchors;

/// Entry whose metadata stands for the frame: gloss language, then the
/// authoritative language, then the first language in scan order.
pub fn canonical_entry<'a>(
    frames: &FrameSet<'a>,
    frame_id: &str,
    anchors: &VariantAnchors,
) -> Option<&'a RawEntry> {
    frames
        .get(frame_id, anchors.gloss)
        .or_else(|| frames.get(frame_id, anchors.authoritative))
        .or_else(|| frames.entries_for(frame_id).next().map(|(_, e)| e))
}

/// `"cb_negation_basic"` → `"negation"`; ids without `_` are their own parent.
pub fn parent_category_id(category_id: &str) -> &str {
    category_id.split('_').nth(1).unwrap_or(category_id)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"cb_negation_basic"` → `"Negation Basic"`.
pub fn category_display_name(category_id: &str) -> String {
    let parts: Vec<&str> = category_id.split('_').collect();
    if parts.len() > 1 {
        parts[1..]
            .iter()
            .map(|p| capitalize(p))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        category_id.to_string()
    }
}

pub fn parent_display_name(parent_id: &str) -> String {
    capitalize(parent_id)
}

/// Distinct categories and parent categories, in first-seen order.
#[derive(Debug, Default)]
pub struct CategoryCollector {
    seen: HashSet<String>,
    seen_parents: HashSet<String>,
    categories: Vec<Category>,
    parents: Vec<Category>,
}

impl CategoryCollector {
    pub fn add(&mut self, category_id: &str) {
        if self.seen.insert(category_id.to_string()) {
            self.categories.push(Category {
                id: category_id.to_string(),
                name: category_display_name(category_id),
            });
        }

        let parent = parent_category_id(category_id);
        if self.seen_parents.insert(parent.to_string()) {
            self.parents.push(Category {
                id: parent.to_string(),
                name: parent_display_name(parent),
            });
        }
    }

    pub fn finish(self) -> (Vec<Category>, Vec<Category>) {
        (self.categories, self.parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::language::Language;
    use std::sync::Arc;

    #[test]
    fn parent_is_second_underscore_part() {
        assert_eq!(parent_category_id("cb_negation_basic"), "negation");
        assert_eq!(parent_category_id("lvl1_greetings"), "greetings");
        assert_eq!(parent_category_id("greetings"), "greetings");
        assert_eq!(parent_category_id(""), "");
        assert_eq!(parent_category_id("lvl1_"), "");
    }

    #[test]
    fn display_names_title_case_the_tail() {
        assert_eq!(category_display_name("cb_negation_basic"), "Negation Basic");
        assert_eq!(category_display_name("custom"), "custom");
        assert_eq!(parent_display_name("negation"), "Negation");
        assert_eq!(parent_display_name("élan"), "Élan");
    }

    #[test]
    fn collector_keeps_first_seen_order() {
        let mut c = CategoryCollector::default();
        c.add("lvl1_greetings");
        c.add("cb_negation_basic");
        c.add("lvl1_greetings");
        c.add("lvl2_greetings_formal");

        let (cats, parents) = c.finish();
        let ids: Vec<&str> = cats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["lvl1_greetings", "cb_negation_basic", "lvl2_greetings_formal"]);
        let pids: Vec<&str> = parents.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(pids, vec!["greetings", "negation"]);
    }

    #[test]
    fn canonical_entry_prefers_gloss_then_authoritative() {
        let e = |lang_cat: &str| RawEntry {
            frame_id: "f".into(),
            category_id: lang_cat.into(),
            ..RawEntry::default()
        };
        let anchors = VariantAnchors::default();

        let packs = vec![
            (Language::Es, Arc::new(vec![e("from_es")])),
            (Language::Ko, Arc::new(vec![e("from_ko")])),
            (Language::En, Arc::new(vec![e("from_en")])),
        ];
        let frames = FrameSet::build(&packs);
        assert_eq!(canonical_entry(&frames, "f", &anchors).unwrap().category_id, "from_en");

        let packs = vec![
            (Language::Es, Arc::new(vec![e("from_es")])),
            (Language::Ko, Arc::new(vec![e("from_ko")])),
        ];
        let frames = FrameSet::build(&packs);
        assert_eq!(canonical_entry(&frames, "f", &anchors).unwrap().category_id, "from_ko");

        let packs = vec![
            (Language::Es, Arc::new(vec![e("from_es")])),
            (Language::Fr, Arc::new(vec![e("from_fr")])),
        ];
        let frames = FrameSet::build(&packs);
        assert_eq!(canonical_entry(&frames, "f", &anchors).unwrap().category_id, "from_es");
        assert!(canonical_entry(&frames, "g", &anchors).is_none());
    }
}
