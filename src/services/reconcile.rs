use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::entry::RawEntry;
use crate::model::language::Language;
use crate::model::phrase::{Category, Phrase};

use super::aggregate::FrameSet;
use super::categories::{canonical_entry, CategoryCollector};
use super::variants::{split_frame, VariantAnchors};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub languages: usize,
    pub frames: usize,
    pub phrases: usize,
    pub multi_variant_frames: usize,
    pub dropped_duplicate_ids: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub phrases: Vec<Phrase>,
    pub categories: Vec<Category>,
    pub parent_categories: Vec<Category>,
    pub report: ReconcileReport,
}

/// Merges per-language packs into variant-resolved phrases.
///
/// Pure and deterministic: phrases come out in frame discovery order, then
/// variant order.
pub fn reconcile(packs: &[(Language, Arc<Vec<RawEntry>>)], anchors: &VariantAnchors) -> Reconciliation {
    let frames = FrameSet::build(packs);

    let mut phrases: Vec<Phrase> = Vec::with_capacity(frames.len());
    let mut ids: HashSet<String> = HashSet::with_capacity(frames.len());
    let mut collector = CategoryCollector::default();
    let mut report = ReconcileReport {
        languages: frames.languages().len(),
        frames: frames.len(),
        ..ReconcileReport::default()
    };

    for &frame_id in frames.frame_ids() {
        let Some(base) = canonical_entry(&frames, frame_id, anchors) else {
            continue;
        };

        let split = split_frame(&frames, frame_id, &base.category_id, anchors);
        if split.len() > 1 {
            report.multi_variant_frames += 1;
        }

        let mut kept = false;
        for phrase in split {
            if !ids.insert(phrase.id.clone()) {
                warn!("duplicate phrase id {} from frame {frame_id}, keeping the first", phrase.id);
                report.dropped_duplicate_ids += 1;
                continue;
            }
            phrases.push(phrase);
            kept = true;
        }

        if kept {
            collector.add(&base.category_id);
        }
    }

    report.phrases = phrases.len();
    let (categories, parent_categories) = collector.finish();

    info!(
        "reconciled {} frames from {} languages into {} phrases ({} multi-variant)",
        report.frames, report.languages, report.phrases, report.multi_variant_frames
    );

    Reconciliation {
        phrases,
        categories,
        parent_categories,
        report,
    }
}
