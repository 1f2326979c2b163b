use crate::data::{self, LanguageInfo};

use super::Language;
use std::collections::BTreeSet;
use tree_sitter_language::LanguageFn;

impl Language {
    pub const ALL: [Self; 7] = [
        Self::C,
        Self::CPlusPlus,
        Self::JavaScript,
        Self::Ruby,
        Self::Rust,
        Self::Toml,
        Self::Solidity,
    ];

    pub const fn info(&self) -> &'static LanguageInfo {
        match self {
            Self::C => &data::C,
            Self::CPlusPlus => &data::CPP,
            Self::JavaScript => &data::JAVASCRIPT,
            Self::Ruby => &data::RUBY,
            Self::Rust => &data::RUST,
            Self::Toml => &data::TOML,
            Self::Solidity => &data::SOLIDITY,
        }
    }

    pub const fn grammar_name<'a>(&self) -> &'a str {
        self.info().grammar_name
    }

    pub fn from_grammar_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.grammar_name() == name)
    }

    pub fn file_extensions<'a>(&self) -> BTreeSet<&'a str> {
        self.info().extensions.iter().copied().collect()
    }

    /// Looks up the grammar for a file extension, given without the leading dot.
    pub fn from_file_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.info().extensions.contains(&extension))
    }

    /// The raw entry point of the statically linked grammar.
    pub const fn language_fn(&self) -> LanguageFn {
        self.info().ts_language_fn
    }

    pub fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter::Language::new(self.language_fn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_names_round_trip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_grammar_name(lang.grammar_name()), Some(lang));
            assert_eq!(lang.to_string(), lang.grammar_name());
        }
        assert_eq!(Language::from_grammar_name("virgil"), None);
    }

    #[test]
    fn extensions_are_unique() {
        let mut seen = BTreeSet::new();
        for lang in Language::ALL {
            for ext in lang.file_extensions() {
                assert!(seen.insert(ext), "Extension {ext} is claimed twice");
            }
        }
        assert_eq!(Language::from_file_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_file_extension("hpp"), Some(Language::CPlusPlus));
        assert_eq!(Language::from_file_extension("v3"), None);
    }

    #[test]
    fn builtin_languages_define_node_kinds() {
        for lang in Language::ALL {
            let ts_lang = lang.ts_language();
            assert!(ts_lang.node_kind_count() > 0, "No node kinds in {lang}");
        }
    }
}
