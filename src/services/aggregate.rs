use std::collections::HashMap;
use std::sync::Arc;

use crate::model::entry::RawEntry;
use crate::model::language::Language;

/// Raw entries of every requested language, grouped by frame.
pub struct FrameSet<'a> {
    languages: Vec<Language>,
    frame_ids: Vec<&'a str>,
    entries: HashMap<&'a str, HashMap<Language, &'a RawEntry>>,
}

impl<'a> FrameSet<'a> {
    /// Scans languages in the given order, and each pack front to back.
    /// Frame order is first-seen order; a repeated frame within one
    /// language keeps its first entry.
    pub fn build(packs: &'a [(Language, Arc<Vec<RawEntry>>)]) -> Self {
        let mut languages: Vec<Language> = Vec::with_capacity(packs.len());
        let mut frame_ids: Vec<&'a str> = Vec::new();
        let mut entries: HashMap<&'a str, HashMap<Language, &'a RawEntry>> = HashMap::new();

        for (lang, pack) in packs {
            if !languages.contains(lang) {
                languages.push(*lang);
            }

            for e in pack.iter() {
                let id = e.frame_id.as_str();
                if !entries.contains_key(id) {
                    frame_ids.push(id);
                }
                entries.entry(id).or_default().entry(*lang).or_insert(e);
            }
        }

        FrameSet {
            languages,
            frame_ids,
            entries,
        }
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn frame_ids(&self) -> &[&'a str] {
        &self.frame_ids
    }

    pub fn get(&self, frame_id: &str, lang: Language) -> Option<&'a RawEntry> {
        self.entries
            .get(frame_id)
            .and_then(|by_lang| by_lang.get(&lang))
            .copied()
    }

    /// Entries for one frame, in scan order.
    pub fn entries_for<'s>(
        &'s self,
        frame_id: &'s str,
    ) -> impl Iterator<Item = (Language, &'a RawEntry)> + 's {
        self.languages
            .iter()
            .filter_map(move |&lang| self.get(frame_id, lang).map(|e| (lang, e)))
    }

    pub fn len(&self) -> usize {
        self.frame_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_ids.is_empty()
    }
}
