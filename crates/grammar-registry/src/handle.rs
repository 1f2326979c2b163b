use std::{fmt, ops::RangeInclusive, time::SystemTime};

use crate::{registry::RegistryError, source::Artifact};

/// Structural defects of a loaded grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformation {
    #[error(
        "ABI version {version} is outside the supported range {}..={}",
        .supported.start(),
        .supported.end()
    )]
    IncompatibleVersion {
        version: usize,
        supported: RangeInclusive<usize>,
    },
    #[error("the grammar defines no node kinds")]
    NoNodeKinds,
}

impl Malformation {
    /// ABI versions the linked tree-sitter runtime can parse with.
    pub const SUPPORTED_VERSIONS: RangeInclusive<usize> =
        tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION..=tree_sitter::LANGUAGE_VERSION;

    /// Checks the shape of a grammar given its ABI version and node kind count.
    pub fn detect(version: usize, node_kind_count: usize) -> Option<Self> {
        if !Self::SUPPORTED_VERSIONS.contains(&version) {
            return Some(Self::IncompatibleVersion {
                version,
                supported: Self::SUPPORTED_VERSIONS,
            });
        }
        if node_kind_count == 0 {
            return Some(Self::NoNodeKinds);
        }
        None
    }
}

/// A loaded grammar, handed out by the registry as `Arc<GrammarHandle>`.
///
/// The handle is immutable. The compiled language inside it is never exposed;
/// callers build parsers from it with [`GrammarHandle::new_parser`].
pub struct GrammarHandle {
    name: String,
    loaded_at: SystemTime,
    artifact: Artifact,
}

impl GrammarHandle {
    pub(crate) fn new(name: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            name: name.into(),
            loaded_at: SystemTime::now(),
            artifact,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ABI version the grammar was generated with.
    pub fn version(&self) -> usize {
        self.artifact.language().abi_version()
    }

    pub const fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    pub fn node_kind_count(&self) -> usize {
        self.artifact.language().node_kind_count()
    }

    /// Numeric id of a node kind, if the grammar defines it.
    pub fn node_kind_id(&self, kind: &str, named: bool) -> Option<u16> {
        match self.artifact.language().id_for_node_kind(kind, named) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn check(&self) -> Result<(), Malformation> {
        match Malformation::detect(self.version(), self.node_kind_count()) {
            Some(malformation) => Err(malformation),
            None => Ok(()),
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.check().is_ok()
    }

    /// Whether both handles wrap the same compiled grammar.
    pub fn same_artifact(&self, other: &Self) -> bool {
        self.artifact.language() == other.artifact.language()
    }

    pub fn new_parser(&self) -> Result<tree_sitter::Parser, RegistryError> {
        self.check()
            .map_err(|reason| RegistryError::invalid_handle(&self.name, reason))?;
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(self.artifact.language())
            .map_err(|e| RegistryError::InvalidHandle(format!("grammar `{}`: {e}", self.name)))?;
        Ok(parser)
    }
}

impl fmt::Debug for GrammarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarHandle")
            .field("name", &self.name)
            .field("version", &self.version())
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactSource, BuiltinSource, Language};

    fn builtin_handle(lang: Language) -> GrammarHandle {
        let artifact = BuiltinSource.load_artifact(lang.grammar_name()).unwrap();
        GrammarHandle::new(lang.grammar_name(), artifact)
    }

    #[test]
    fn detect_malformations() {
        let current = tree_sitter::LANGUAGE_VERSION;
        assert_eq!(Malformation::detect(current, 10), None);
        assert_eq!(Malformation::detect(current, 0), Some(Malformation::NoNodeKinds));
        assert!(matches!(
            Malformation::detect(current + 1, 10),
            Some(Malformation::IncompatibleVersion { version, .. }) if version == current + 1
        ));
        assert!(matches!(
            Malformation::detect(0, 10),
            Some(Malformation::IncompatibleVersion { .. })
        ));
    }

    #[test]
    fn builtin_handles_are_well_formed() {
        for lang in Language::ALL {
            let handle = builtin_handle(lang);
            assert_eq!(handle.name(), lang.grammar_name());
            assert!(handle.is_well_formed(), "Grammar {lang} is malformed");
            assert!(Malformation::SUPPORTED_VERSIONS.contains(&handle.version()));
        }
    }

    #[test]
    fn parse_with_handle() {
        const RUST_CODE: &str = r#"
            // Hello
            fn main() {
                println!("Hello, world!");
            }
        "#;
        let handle = builtin_handle(Language::Rust);
        let mut parser = handle.new_parser().unwrap();
        let tree = parser.parse(RUST_CODE, None).expect("Parser has a language");
        let root = tree.root_node();
        assert_eq!(root.kind(), "source_file");
        assert!(!root.has_error());
        assert!(handle.node_kind_id("function_item", true).is_some());
        assert!(handle.node_kind_id("no_such_node", true).is_none());
    }

    #[test]
    fn same_artifact_compares_grammars() {
        let rust = builtin_handle(Language::Rust);
        let rust_again = builtin_handle(Language::Rust);
        let toml = builtin_handle(Language::Toml);
        assert!(rust.same_artifact(&rust_again));
        assert!(!rust.same_artifact(&toml));
    }
}
