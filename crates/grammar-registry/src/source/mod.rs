//! Artifact sources turn a grammar name into a compiled tree-sitter language.
//!
//! The registry never builds grammars itself. It asks an [`ArtifactSource`],
//! which may look the name up among the statically linked grammars
//! ([`BuiltinSource`]), open a shared library from a search path
//! ([`LibrarySource`]), or try several of those in order ([`ChainedSource`]).
//! Any `Fn(&str) -> Result<Artifact, ArtifactError>` is a source too.

use std::{fmt, path::PathBuf, sync::Arc};

use libloading::Library;
use tree_sitter_language::LanguageFn;

mod builtin;
mod chain;
mod library;

pub use builtin::BuiltinSource;
pub use chain::ChainedSource;
pub use library::{LibrarySource, entry_symbol_name, library_file_name};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("no grammar named `{0}`")]
    NotFound(String),

    /// The grammar entry point returned a null language pointer.
    #[error("grammar `{0}` produced a null language")]
    NullLanguage(String),

    #[error("failed to open grammar library {}", path.display())]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("grammar library {} does not export `{symbol}`", path.display())]
    MissingSymbol {
        symbol: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
}

/// A compiled grammar together with whatever keeps it alive.
///
/// Languages loaded from a shared library point into that library's data, so
/// the artifact holds on to the library for as long as the language is used.
pub struct Artifact {
    language: tree_sitter::Language,
    library: Option<Arc<Library>>,
}

impl Artifact {
    pub fn new(language: tree_sitter::Language) -> Self {
        Self {
            language,
            library: None,
        }
    }

    pub(crate) fn from_library(language: tree_sitter::Language, library: Arc<Library>) -> Self {
        Self {
            language,
            library: Some(library),
        }
    }

    pub(crate) const fn language(&self) -> &tree_sitter::Language {
        &self.language
    }
}

impl From<tree_sitter::Language> for Artifact {
    fn from(language: tree_sitter::Language) -> Self {
        Self::new(language)
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("node_kinds", &self.language.node_kind_count())
            .field("from_library", &self.library.is_some())
            .finish()
    }
}

/// Produces grammar artifacts by name.
pub trait ArtifactSource: Send + Sync {
    fn load_artifact(&self, name: &str) -> Result<Artifact, ArtifactError>;
}

impl<F> ArtifactSource for F
where
    F: Fn(&str) -> Result<Artifact, ArtifactError> + Send + Sync,
{
    fn load_artifact(&self, name: &str) -> Result<Artifact, ArtifactError> {
        self(name)
    }
}

/// Builds a language from a grammar entry point, rejecting null results.
///
/// The entry point is called once up front so a null pointer is reported as
/// [`ArtifactError::NullLanguage`] instead of reaching the tree-sitter runtime.
pub fn language_from_fn(
    name: &str,
    language_fn: LanguageFn,
) -> Result<tree_sitter::Language, ArtifactError> {
    let entry = language_fn.into_raw();
    // SAFETY: grammar entry points take no arguments and return a pointer to
    // static data or null.
    let raw = unsafe { entry() };
    if raw.is_null() {
        return Err(ArtifactError::NullLanguage(name.to_owned()));
    }
    Ok(tree_sitter::Language::new(language_fn))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Language;

    pub(crate) unsafe extern "C" fn null_language() -> *const () {
        std::ptr::null()
    }

    #[test]
    fn null_entry_point_is_rejected() {
        // SAFETY: `null_language` has the grammar entry point signature.
        let language_fn = unsafe { LanguageFn::from_raw(null_language) };
        let err = language_from_fn("virgil", language_fn).unwrap_err();
        assert!(matches!(err, ArtifactError::NullLanguage(name) if name == "virgil"));
    }

    #[test]
    fn builtin_entry_point_is_accepted() {
        let language = language_from_fn("rust", Language::Rust.language_fn()).unwrap();
        assert!(language.node_kind_count() > 0);
    }

    #[test]
    fn closures_are_sources() {
        let source = |name: &str| -> Result<Artifact, ArtifactError> {
            match name {
                "example-language" => language_from_fn(name, Language::Toml.language_fn())
                    .map(Artifact::from),
                _ => Err(ArtifactError::NotFound(name.to_owned())),
            }
        };
        assert!(source.load_artifact("example-language").is_ok());
        assert!(matches!(
            source.load_artifact("missing"),
            Err(ArtifactError::NotFound(_))
        ));
    }
}
