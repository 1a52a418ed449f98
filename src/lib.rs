//! Reconciles per-language phrase packs into one multilingual phrase set.
//!
//! Packs are loaded through a [`services::registry::PackRegistry`], merged
//! frame by frame, split into variants and indexed by
//! [`services::index::PhraseIndex`].

pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use model::entry::{RawEntry, TokenShape};
pub use model::language::Language;
pub use model::phrase::{Category, Phrase};
pub use services::index::{LoadStatus, PhraseCatalog, PhraseIndex};
