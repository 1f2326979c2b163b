use tree_sitter_language::LanguageFn;

/// Static description of a built-in grammar.
#[derive(Clone, Copy)]
pub struct LanguageInfo {
    /// Name the grammar is registered under, also the suffix of its entry point.
    pub grammar_name: &'static str,
    pub extensions: &'static [&'static str],
    pub ts_language_fn: LanguageFn,
}

/// The C language information
pub const C: LanguageInfo = LanguageInfo {
    grammar_name: "c",
    extensions: &["c", "h"],
    ts_language_fn: tree_sitter_c::LANGUAGE,
};

/// The C++ language information
pub const CPP: LanguageInfo = LanguageInfo {
    grammar_name: "cpp",
    extensions: &["cc", "cpp", "cxx", "hpp"],
    ts_language_fn: tree_sitter_cpp::LANGUAGE,
};

/// The JavaScript language information
pub const JAVASCRIPT: LanguageInfo = LanguageInfo {
    grammar_name: "javascript",
    extensions: &["js", "mjs", "cjs"],
    ts_language_fn: tree_sitter_javascript::LANGUAGE,
};

/// The Ruby language information
pub const RUBY: LanguageInfo = LanguageInfo {
    grammar_name: "ruby",
    extensions: &["rb"],
    ts_language_fn: tree_sitter_ruby::LANGUAGE,
};

/// The Rust language information
pub const RUST: LanguageInfo = LanguageInfo {
    grammar_name: "rust",
    extensions: &["rs"],
    ts_language_fn: tree_sitter_rust::LANGUAGE,
};

/// The Toml language information
pub const TOML: LanguageInfo = LanguageInfo {
    grammar_name: "toml",
    extensions: &["toml"],
    ts_language_fn: tree_sitter_toml_ng::LANGUAGE,
};

/// The Solidity language information
pub const SOLIDITY: LanguageInfo = LanguageInfo {
    grammar_name: "solidity",
    extensions: &["sol"],
    ts_language_fn: tree_sitter_solidity::LANGUAGE,
};
