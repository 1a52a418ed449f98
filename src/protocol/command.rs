#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Status,
    LanguagesList,
    PhrasesAll,
    PhrasesGet,
    PhrasesByCategory,
    PhrasesByParentCategory,
    CategoriesList,
    CategoriesParents,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "status" => Command::Status,
            "languages.list" => Command::LanguagesList,
            "phrases.all" => Command::PhrasesAll,
            "phrases.get" => Command::PhrasesGet,
            "phrases.by_category" => Command::PhrasesByCategory,
            "phrases.by_parent_category" => Command::PhrasesByParentCategory,
            "categories.list" => Command::CategoriesList,
            "categories.parents" => Command::CategoriesParents,
            _ => Command::Unknown,
        }
    }
}
