use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tracing::info;

use crate::config::CoreConfig;
use crate::error::Result;
use crate::model::phrase::{Category, Phrase};

use super::categories::parent_category_id;
use super::fingerprint::fingerprint;
use super::http_source::HttpPackSource;
use super::reconcile::{reconcile, ReconcileReport, Reconciliation};
use super::registry::{FsPackSource, PackRegistry, PackSource};
use super::variants::VariantAnchors;

/// Category filter that matches everything.
pub const ALL: &str = "all";

/// The reconciled data set with its lookup tables. Immutable once built.
#[derive(Debug)]
pub struct PhraseCatalog {
    phrases: Vec<Phrase>,
    categories: Vec<Category>,
    parent_categories: Vec<Category>,
    by_id: HashMap<String, usize>,
    by_category: HashMap<String, Vec<usize>>,
    by_parent: HashMap<String, Vec<usize>>,
    report: ReconcileReport,
    fingerprint: String,
}

impl PhraseCatalog {
    pub fn build(r: Reconciliation) -> Self {
        let mut by_id = HashMap::with_capacity(r.phrases.len());
        let mut by_category: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_parent: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, p) in r.phrases.iter().enumerate() {
            by_id.entry(p.id.clone()).or_insert(i);
            by_category.entry(p.category_id.clone()).or_default().push(i);
            by_parent
                .entry(parent_category_id(&p.category_id).to_string())
                .or_default()
                .push(i);
        }

        let fingerprint = fingerprint(&r.phrases);

        PhraseCatalog {
            phrases: r.phrases,
            categories: r.categories,
            parent_categories: r.parent_categories,
            by_id,
            by_category,
            by_parent,
            report: r.report,
            fingerprint,
        }
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn parent_categories(&self) -> &[Category] {
        &self.parent_categories
    }

    pub fn by_id(&self, id: &str) -> Option<&Phrase> {
        self.by_id.get(id).map(|&i| &self.phrases[i])
    }

    pub fn by_category(&self, category_id: &str) -> Vec<&Phrase> {
        Self::select(&self.phrases, &self.by_category, category_id)
    }

    pub fn by_parent_category(&self, parent_id: &str) -> Vec<&Phrase> {
        Self::select(&self.phrases, &self.by_parent, parent_id)
    }

    fn select<'a>(
        phrases: &'a [Phrase],
        table: &HashMap<String, Vec<usize>>,
        key: &str,
    ) -> Vec<&'a Phrase> {
        if key == ALL {
            return phrases.iter().collect();
        }
        table
            .get(key)
            .map(|idx| idx.iter().map(|&i| &phrases[i]).collect())
            .unwrap_or_default()
    }

    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

type LoadFuture = Shared<BoxFuture<'static, Arc<PhraseCatalog>>>;

enum LoadState {
    NotStarted,
    Loading(LoadFuture),
    Ready(Arc<PhraseCatalog>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    NotStarted,
    Loading,
    Ready,
}

/// Process-wide entry point: loads and reconciles the packs once, then serves
/// lookups from the cached catalog.
pub struct PhraseIndex {
    registry: Arc<PackRegistry>,
    languages: Vec<String>,
    anchors: VariantAnchors,
    state: Mutex<LoadState>,
    pipeline_runs: Arc<AtomicUsize>,
}

impl PhraseIndex {
    pub fn new(registry: Arc<PackRegistry>, languages: Vec<String>, anchors: VariantAnchors) -> Self {
        PhraseIndex {
            registry,
            languages,
            anchors,
            state: Mutex::new(LoadState::NotStarted),
            pipeline_runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Picks the HTTP source for `http(s)://` roots and the filesystem
    /// otherwise.
    pub fn from_config(cfg: &CoreConfig) -> Result<Self> {
        let source: Arc<dyn PackSource> = if cfg.is_remote() {
            Arc::new(HttpPackSource::new(
                &cfg.pack_root,
                cfg.http_timeout_secs,
                cfg.http_max_attempts,
            )?)
        } else {
            Arc::new(FsPackSource::new(&cfg.pack_root))
        };

        let registry = Arc::new(PackRegistry::new(source, cfg.chunks.clone()));
        Ok(PhraseIndex::new(registry, cfg.languages.clone(), cfg.anchors()))
    }

    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn pipeline(&self) -> impl Future<Output = Arc<PhraseCatalog>> + Send + 'static {
        let registry = self.registry.clone();
        let languages = self.languages.clone();
        let anchors = self.anchors;
        let runs = self.pipeline_runs.clone();

        async move {
            runs.fetch_add(1, Ordering::SeqCst);
            let packs = registry.load_requested(&languages).await;
            let catalog = PhraseCatalog::build(reconcile(&packs, &anchors));
            info!("phrase catalog ready: {} phrases, fingerprint {}", catalog.len(), catalog.fingerprint());
            Arc::new(catalog)
        }
    }

    /// Runs the pipeline on first call; every other call, concurrent or
    /// later, gets the same catalog.
    pub async fn ensure_loaded(&self) -> Arc<PhraseCatalog> {
        let pending = {
            let mut state = self.lock_state();
            let fut = match &*state {
                LoadState::Ready(catalog) => return catalog.clone(),
                LoadState::Loading(fut) => fut.clone(),
                LoadState::NotStarted => {
                    let fut = self.pipeline().boxed().shared();
                    *state = LoadState::Loading(fut.clone());
                    fut
                }
            };
            fut
        };

        let catalog = pending.await;

        let mut state = self.lock_state();
        if matches!(*state, LoadState::Loading(_)) {
            *state = LoadState::Ready(catalog.clone());
        }
        catalog
    }

    pub fn status(&self) -> LoadStatus {
        match &*self.lock_state() {
            LoadState::NotStarted => LoadStatus::NotStarted,
            LoadState::Loading(_) => LoadStatus::Loading,
            LoadState::Ready(_) => LoadStatus::Ready,
        }
    }

    /// Non-blocking view: `None` while not yet loaded, even if the load
    /// would come back empty.
    pub fn try_catalog(&self) -> Option<Arc<PhraseCatalog>> {
        match &*self.lock_state() {
            LoadState::Ready(catalog) => Some(catalog.clone()),
            _ => None,
        }
    }

    pub fn pipeline_runs(&self) -> usize {
        self.pipeline_runs.load(Ordering::SeqCst)
    }

    // The lookups below hand out owned copies, so every call clones what it
    // returns. Callers on a hot path should hold the `Arc<PhraseCatalog>` from
    // `ensure_loaded` and borrow from it instead.

    /// Clones the whole phrase set.
    pub async fn all_phrases(&self) -> Vec<Phrase> {
        self.ensure_loaded().await.phrases().to_vec()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.ensure_loaded().await.categories().to_vec()
    }

    pub async fn parent_categories(&self) -> Vec<Category> {
        self.ensure_loaded().await.parent_categories().to_vec()
    }

    pub async fn phrase_by_id(&self, id: &str) -> Option<Phrase> {
        self.ensure_loaded().await.by_id(id).cloned()
    }

    /// Clones the matches; `PhraseCatalog::by_category` borrows them.
    pub async fn phrases_by_category(&self, category_id: &str) -> Vec<Phrase> {
        let catalog = self.ensure_loaded().await;
        catalog.by_category(category_id).into_iter().cloned().collect()
    }

    pub async fn phrases_by_parent_category(&self, parent_id: &str) -> Vec<Phrase> {
        let catalog = self.ensure_loaded().await;
        catalog.by_parent_category(parent_id).into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::{RawEntry, TokenShape};
    use crate::model::language::Language;
    use crate::services::registry::{MemoryPackSource, PackChunk};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn entry(frame: &str, cat: &str, text: &str) -> RawEntry {
        RawEntry {
            frame_id: frame.into(),
            category_id: cat.into(),
            target_text: text.into(),
            tokens: TokenShape::Flat(text.split('/').map(|s| s.to_string()).collect()),
            ..RawEntry::default()
        }
    }

    fn index(source: Arc<MemoryPackSource>, langs: &[&str]) -> PhraseIndex {
        let registry = Arc::new(PackRegistry::new(source, vec!["v1".into()]));
        PhraseIndex::new(
            registry,
            langs.iter().map(|s| s.to_string()).collect(),
            VariantAnchors::default(),
        )
    }

    fn source() -> Arc<MemoryPackSource> {
        Arc::new(
            MemoryPackSource::new()
                .with_chunk(
                    PackChunk::new("v1", Language::En),
                    vec![
                        entry("greet", "lvl1_greetings", "Hello"),
                        entry("bye", "lvl1_greetings_farewell", "Bye"),
                        entry("no", "cb_negation_basic", "No"),
                    ],
                )
                .with_chunk(
                    PackChunk::new("v1", Language::Es),
                    vec![entry("greet", "lvl1_greetings", "Hola")],
                ),
        )
    }

    #[tokio::test]
    async fn ensure_loaded_runs_once() {
        let src = source();
        let idx = index(src.clone(), &["en", "es"]);
        assert_eq!(idx.status(), LoadStatus::NotStarted);
        assert!(idx.try_catalog().is_none());

        let (a, b) = tokio::join!(idx.ensure_loaded(), idx.ensure_loaded());
        let c = idx.ensure_loaded().await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(idx.pipeline_runs(), 1);
        assert_eq!(src.fetch_count(), 2);
        assert_eq!(idx.status(), LoadStatus::Ready);
    }

    #[tokio::test]
    async fn lookups_use_the_catalog() {
        let idx = index(source(), &["en", "es"]);

        let greet = idx.phrase_by_id("greet").await.unwrap();
        assert_eq!(greet.translations[&Language::Es], "Hola");
        assert!(idx.phrase_by_id("missing").await.is_none());

        assert_eq!(idx.phrases_by_category("lvl1_greetings").await.len(), 1);
        assert_eq!(idx.phrases_by_parent_category("greetings").await.len(), 2);
        assert_eq!(idx.phrases_by_parent_category("negation").await.len(), 1);
        assert!(idx.phrases_by_category("nope").await.is_empty());
    }

    #[tokio::test]
    async fn catalog_views_borrow_one_shared_set() {
        let idx = index(source(), &["en", "es"]);
        let a = idx.ensure_loaded().await;
        let b = idx.ensure_loaded().await;

        assert_eq!(a.phrases().as_ptr(), b.phrases().as_ptr());
        let greet = a.by_id("greet").unwrap();
        assert!(std::ptr::eq(greet, &b.phrases()[0]));
        assert!(std::ptr::eq(a.by_category("lvl1_greetings")[0], greet));

        let owned = idx.all_phrases().await;
        assert_eq!(owned.as_slice(), a.phrases());
        assert_ne!(owned.as_ptr(), a.phrases().as_ptr());
    }

    #[tokio::test]
    async fn all_is_a_wildcard() {
        let idx = index(source(), &["en", "es"]);
        let all = idx.all_phrases().await;
        assert_eq!(idx.phrases_by_category(ALL).await.len(), all.len());
        assert_eq!(idx.phrases_by_parent_category(ALL).await.len(), all.len());
    }

    #[tokio::test]
    async fn empty_load_is_distinguishable_from_loading() {
        let idx = index(Arc::new(MemoryPackSource::new()), &["fi"]);
        assert!(idx.try_catalog().is_none());

        idx.ensure_loaded().await;
        let catalog = idx.try_catalog().unwrap();
        assert!(catalog.is_empty());
        assert!(idx.categories().await.is_empty());
    }

    struct GatedSource {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl PackSource for GatedSource {
        async fn fetch(&self, _chunk: &PackChunk) -> crate::error::Result<Vec<RawEntry>> {
            self.gate.notified().await;
            Ok(vec![entry("late", "lvl1_x", "Late")])
        }
    }

    #[tokio::test]
    async fn status_reports_loading_while_pending() {
        let gate = Arc::new(Notify::new());
        let registry = Arc::new(PackRegistry::new(
            Arc::new(GatedSource { gate: gate.clone() }),
            vec!["v1".into()],
        ));
        let idx = Arc::new(PhraseIndex::new(
            registry,
            vec!["en".into()],
            VariantAnchors::default(),
        ));

        let handle = tokio::spawn({
            let idx = idx.clone();
            async move { idx.ensure_loaded().await }
        });

        for _ in 0..10 {
            if idx.status() == LoadStatus::Loading {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(idx.status(), LoadStatus::Loading);
        assert!(idx.try_catalog().is_none());

        gate.notify_one();
        let catalog = handle.await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(idx.status(), LoadStatus::Ready);
        assert_eq!(idx.phrase_by_id("late").await.unwrap().translation, "Late");
        assert_eq!(idx.pipeline_runs(), 1);
    }
}
