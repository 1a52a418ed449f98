use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::error::{PackError, Result};
use crate::model::entry::RawEntry;
use crate::model::language::Language;
use crate::parsers::langpack;

/// One file of one language's pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackChunk {
    pub stem: String,
    pub lang: Language,
}

impl PackChunk {
    pub fn new(stem: impl Into<String>, lang: Language) -> Self {
        PackChunk {
            stem: stem.into(),
            lang,
        }
    }

    /// `{stem}_langpack/{stem}_{code}.json`
    pub fn relative_path(&self) -> String {
        format!(
            "{stem}_langpack/{stem}_{code}.json",
            stem = self.stem,
            code = self.lang.code()
        )
    }
}

/// Where chunk bytes come from.
#[async_trait]
pub trait PackSource: Send + Sync {
    async fn fetch(&self, chunk: &PackChunk) -> Result<Vec<RawEntry>>;
}

pub struct FsPackSource {
    root: PathBuf,
}

impl FsPackSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsPackSource { root: root.into() }
    }
}

#[async_trait]
impl PackSource for FsPackSource {
    async fn fetch(&self, chunk: &PackChunk) -> Result<Vec<RawEntry>> {
        let path = self.root.join(chunk.relative_path());
        let name = path.display().to_string();

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PackError::NotFound(name));
            }
            Err(source) => return Err(PackError::Io { path: name, source }),
        };

        langpack::decode_and_parse(&name, &bytes)
    }
}

/// Chunks held in memory. Counts fetches so callers can check memoization.
#[derive(Default)]
pub struct MemoryPackSource {
    chunks: HashMap<PackChunk, Vec<RawEntry>>,
    fetches: AtomicUsize,
}

impl MemoryPackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chunk: PackChunk, entries: Vec<RawEntry>) {
        self.chunks.insert(chunk, entries);
    }

    pub fn with_chunk(mut self, chunk: PackChunk, entries: Vec<RawEntry>) -> Self {
        self.insert(chunk, entries);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackSource for MemoryPackSource {
    async fn fetch(&self, chunk: &PackChunk) -> Result<Vec<RawEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.chunks
            .get(chunk)
            .cloned()
            .ok_or_else(|| PackError::NotFound(chunk.relative_path()))
    }
}

/// Language packs in scan order, each the concatenation of its chunks.
pub type LoadedPacks = Vec<(Language, Arc<Vec<RawEntry>>)>;

/// Maps languages to their chunks and memoizes each language's load.
pub struct PackRegistry {
    source: Arc<dyn PackSource>,
    chunk_stems: Vec<String>,
    cache: Mutex<HashMap<Language, Arc<OnceCell<Arc<Vec<RawEntry>>>>>>,
}

impl PackRegistry {
    pub fn new(source: Arc<dyn PackSource>, chunk_stems: Vec<String>) -> Self {
        PackRegistry {
            source,
            chunk_stems,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn chunks_for(&self, lang: Language) -> Vec<PackChunk> {
        self.chunk_stems
            .iter()
            .map(|stem| PackChunk::new(stem.clone(), lang))
            .collect()
    }

    fn cell_for(&self, lang: Language) -> Arc<OnceCell<Arc<Vec<RawEntry>>>> {
        let mut cache = match self.cache.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.entry(lang).or_default().clone()
    }

    /// Loads one language, once. Chunks are fetched concurrently and joined
    /// in configured order; a failing chunk counts as empty.
    pub async fn load(&self, lang: Language) -> Arc<Vec<RawEntry>> {
        let cell = self.cell_for(lang);
        cell.get_or_init(|| self.fetch_language(lang)).await.clone()
    }

    async fn fetch_language(&self, lang: Language) -> Arc<Vec<RawEntry>> {
        let chunks = self.chunks_for(lang);
        let results = join_all(chunks.iter().map(|c| self.source.fetch(c))).await;

        let mut entries: Vec<RawEntry> = Vec::new();
        for (chunk, result) in chunks.iter().zip(results) {
            match result {
                Ok(mut part) => {
                    debug!("{}: {} entries", chunk.relative_path(), part.len());
                    entries.append(&mut part);
                }
                Err(e) => warn!("pack chunk {} skipped: {e}", chunk.relative_path()),
            }
        }

        info!("loaded {} entries for {lang}", entries.len());
        Arc::new(entries)
    }

    /// Resolves codes, dropping unknown ones with a warning and repeated ones
    /// silently, and loads every language concurrently.
    pub async fn load_requested(&self, codes: &[String]) -> LoadedPacks {
        let mut langs: Vec<Language> = Vec::with_capacity(codes.len());
        for code in codes {
            match Language::from_code(code) {
                Some(lang) if !langs.contains(&lang) => langs.push(lang),
                Some(_) => {}
                None => warn!("no language pack for: {code}"),
            }
        }

        let packs = join_all(langs.iter().map(|&lang| self.load(lang))).await;
        langs.into_iter().zip(packs).collect()
    }
}
