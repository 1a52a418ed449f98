pub mod entry;
pub mod language;
pub mod phrase;
