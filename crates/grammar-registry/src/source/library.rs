use std::{
    collections::hash_map::Entry,
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use libloading::Library;
use tracing::{debug, info};
use tree_sitter_language::LanguageFn;

use super::{Artifact, ArtifactError, ArtifactSource, language_from_fn};

type LanguageEntry = unsafe extern "C" fn() -> *const ();

/// Loads grammars from compiled shared libraries on a search path.
///
/// Directories are searched in order and the first one containing the
/// platform library file for a grammar wins. Opened libraries are shared by
/// every artifact created from them and stay mapped while any of those
/// artifacts is alive.
#[derive(Debug, Default)]
pub struct LibrarySource {
    search_paths: Vec<PathBuf>,
    libraries: Mutex<ahash::HashMap<PathBuf, Arc<Library>>>,
}

impl LibrarySource {
    pub fn new<P>(search_paths: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            libraries: Mutex::default(),
        }
    }

    /// Reads the search path from a platform path list in the environment.
    ///
    /// A missing variable yields a source with no search paths.
    pub fn from_env(var: impl AsRef<OsStr>) -> Self {
        let paths = std::env::var_os(var)
            .map(|value| std::env::split_paths(&value).collect::<Vec<_>>())
            .unwrap_or_default();
        Self::new(paths)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Returns the first library file for `name` found on the search path.
    pub fn find_library(&self, name: &str) -> Option<PathBuf> {
        let file_name = library_file_name(name);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    fn open(&self, path: &Path) -> Result<Arc<Library>, ArtifactError> {
        let mut libraries = self
            .libraries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match libraries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                // SAFETY: grammar libraries are plain C objects without
                // initialisation routines that could violate Rust invariants.
                let library = unsafe { Library::new(path) }.map_err(|source| {
                    ArtifactError::Library {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
                info!(path = %path.display(), "Opened grammar library");
                Ok(Arc::clone(entry.insert(Arc::new(library))))
            }
        }
    }
}

impl ArtifactSource for LibrarySource {
    fn load_artifact(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let path = self
            .find_library(name)
            .ok_or_else(|| ArtifactError::NotFound(name.to_owned()))?;
        debug!(grammar = name, path = %path.display(), "Found grammar library");

        let library = self.open(&path)?;
        let symbol = entry_symbol_name(name);
        // SAFETY: tree-sitter grammar entry points have the `LanguageEntry` signature.
        let entry: LanguageEntry = unsafe { library.get::<LanguageEntry>(symbol.as_bytes()) }
            .map(|entry| *entry)
            .map_err(|source| ArtifactError::MissingSymbol {
                symbol,
                path,
                source,
            })?;
        // SAFETY: same as above, the symbol is a grammar entry point.
        let language_fn = unsafe { LanguageFn::from_raw(entry) };
        let language = language_from_fn(name, language_fn)?;
        Ok(Artifact::from_library(language, library))
    }
}

/// Returns the platform-specific library filename for a grammar.
pub fn library_file_name(name: &str) -> String {
    let safe_name = name.replace('-', "_");
    if cfg!(target_os = "macos") {
        format!("lib{safe_name}.dylib")
    } else if cfg!(target_os = "windows") {
        format!("{safe_name}.dll")
    } else {
        format!("lib{safe_name}.so")
    }
}

/// Returns the exported function name of a grammar, e.g. `tree_sitter_rust`.
pub fn entry_symbol_name(name: &str) -> String {
    format!("tree_sitter_{}", name.replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn names_map_to_platform_files() {
        let file_name = library_file_name("example-language");
        assert!(file_name.contains("example_language"));
        #[cfg(target_os = "linux")]
        assert_eq!(file_name, "libexample_language.so");
        assert_eq!(entry_symbol_name("example-language"), "tree_sitter_example_language");
    }

    #[test]
    fn missing_library_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = LibrarySource::new([dir.path()]);
        let err = source.load_artifact("nonexistent-language").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(name) if name == "nonexistent-language"));
    }

    #[test]
    fn first_matching_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let file_name = library_file_name("virgil");
        fs::write(second.path().join(&file_name), b"").unwrap();
        let source = LibrarySource::new([first.path(), second.path()]);
        assert_eq!(source.find_library("virgil"), Some(second.path().join(&file_name)));

        fs::write(first.path().join(&file_name), b"").unwrap();
        assert_eq!(source.find_library("virgil"), Some(first.path().join(&file_name)));
    }

    #[test]
    fn corrupt_library_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(library_file_name("virgil")), b"not a shared object").unwrap();
        let source = LibrarySource::new([dir.path()]);
        let err = source.load_artifact("virgil").unwrap_err();
        assert!(matches!(err, ArtifactError::Library { .. }), "Unexpected error: {err}");
    }

    /// A system shared object that exports no grammar entry point.
    #[cfg(target_os = "linux")]
    fn system_library() -> Option<PathBuf> {
        [
            "/lib/x86_64-linux-gnu",
            "/lib/aarch64-linux-gnu",
            "/usr/lib/x86_64-linux-gnu",
            "/usr/lib/aarch64-linux-gnu",
            "/lib64",
            "/usr/lib64",
            "/lib",
            "/usr/lib",
        ]
        .into_iter()
        .map(|dir| Path::new(dir).join("libm.so.6"))
        .find(|path| path.is_file())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn library_without_entry_point_misses_symbol() {
        let Some(libm) = system_library() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&libm, dir.path().join(library_file_name("virgil"))).unwrap();
        let source = LibrarySource::new([dir.path()]);

        for _ in 0..2 {
            let err = source.load_artifact("virgil").unwrap_err();
            assert!(
                matches!(&err, ArtifactError::MissingSymbol { symbol, .. } if symbol == "tree_sitter_virgil"),
                "Unexpected error: {err}"
            );
        }
        assert_eq!(source.libraries.lock().unwrap().len(), 1);
    }

    #[test]
    fn search_path_from_env() {
        let source = LibrarySource::from_env("GRAMMAR_REGISTRY_TEST_UNSET_VARIABLE");
        assert!(source.search_paths().is_empty());
    }
}
