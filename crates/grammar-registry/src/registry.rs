//! The name keyed cache of loaded grammars.
//!
//! A [`GrammarRegistry`] owns at most one [`GrammarHandle`] per grammar name.
//! The first [`GrammarRegistry::load`] of a name asks the registry's
//! [`ArtifactSource`] for the grammar, validates it and caches it; later loads
//! return the cached handle. Handles are shared as `Arc`s and stay usable after
//! they are unloaded, but the registry stops handing them out.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{
    handle::{GrammarHandle, Malformation},
    source::{ArtifactError, ArtifactSource, BuiltinSource},
};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("grammar name must not be empty")]
    EmptyName,

    /// The source could not produce the grammar: missing, null or unreadable.
    #[error("failed to load grammar `{name}`")]
    Load {
        name: String,
        #[source]
        source: ArtifactError,
    },

    /// The source produced a grammar that fails structural validation.
    #[error("grammar `{name}` is malformed")]
    Malformed {
        name: String,
        #[source]
        source: Malformation,
    },

    #[error("invalid grammar handle: {0}")]
    InvalidHandle(String),
}

impl RegistryError {
    pub(crate) fn invalid_handle(name: &str, reason: Malformation) -> Self {
        Self::InvalidHandle(format!("grammar `{name}`: {reason}"))
    }

    /// Whether the error came out of [`GrammarRegistry::load`].
    pub const fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyName | Self::Load { .. } | Self::Malformed { .. }
        )
    }
}

pub struct GrammarRegistry {
    source: Box<dyn ArtifactSource>,
    grammars: Mutex<ahash::HashMap<String, Arc<GrammarHandle>>>,
}

impl GrammarRegistry {
    pub fn new(source: impl ArtifactSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            grammars: Mutex::default(),
        }
    }

    /// A registry serving the grammars compiled into this crate.
    pub fn with_builtins() -> Self {
        Self::new(BuiltinSource)
    }

    pub fn source(&self) -> &dyn ArtifactSource {
        self.source.as_ref()
    }

    fn grammars(&self) -> MutexGuard<'_, ahash::HashMap<String, Arc<GrammarHandle>>> {
        // Entries are only inserted once fully built, so a poisoned map is consistent.
        self.grammars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the handle for `name`, loading the grammar on first use.
    ///
    /// The lock is held while the source loads, so concurrent first loads of
    /// one name load the grammar once and share the resulting handle. Failed
    /// loads leave the registry untouched.
    ///
    /// A source must not call back into the registry that owns it: the map lock
    /// is not reentrant and such a call deadlocks.
    pub fn load(&self, name: &str) -> Result<Arc<GrammarHandle>, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut grammars = self.grammars();
        if let Some(handle) = grammars.get(name) {
            debug!(grammar = name, "Grammar already loaded");
            return Ok(Arc::clone(handle));
        }

        let artifact = self.source.load_artifact(name).map_err(|source| {
            warn!(grammar = name, error = %source, "Failed to load grammar");
            RegistryError::Load {
                name: name.to_owned(),
                source,
            }
        })?;
        let handle = GrammarHandle::new(name, artifact);
        if let Err(source) = handle.check() {
            warn!(grammar = name, error = %source, "Rejected malformed grammar");
            return Err(RegistryError::Malformed {
                name: name.to_owned(),
                source,
            });
        }

        let handle = Arc::new(handle);
        grammars.insert(name.to_owned(), Arc::clone(&handle));
        info!(
            grammar = name,
            abi_version = handle.version(),
            node_kinds = handle.node_kind_count(),
            "Loaded grammar"
        );
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<Arc<GrammarHandle>> {
        self.grammars().get(name).cloned()
    }

    /// Drops the registry's handle for `name`, returning whether there was one.
    pub fn unload(&self, name: &str) -> bool {
        let removed = self.grammars().remove(name).is_some();
        if removed {
            info!(grammar = name, "Unloaded grammar");
        }
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.grammars().contains_key(name)
    }

    /// Names of the loaded grammars, sorted.
    pub fn names(&self) -> Vec<String> {
        self.grammars().keys().cloned().sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.grammars().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars().is_empty()
    }

    /// Releases every handle, returning how many there were.
    pub fn clear(&self) -> usize {
        let released = self.grammars().drain().count();
        debug!(released, "Cleared grammar registry");
        released
    }

    /// Whether `handle` is present and wraps a well-formed grammar.
    pub fn is_valid(handle: Option<&GrammarHandle>) -> bool {
        handle.is_some_and(GrammarHandle::is_well_formed)
    }

    /// Like [`Self::is_valid`], but reports what is wrong.
    pub fn ensure_valid(handle: Option<&GrammarHandle>) -> Result<(), RegistryError> {
        let handle =
            handle.ok_or_else(|| RegistryError::InvalidHandle("no grammar handle".to_owned()))?;
        handle
            .check()
            .map_err(|reason| RegistryError::invalid_handle(handle.name(), reason))
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for GrammarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarRegistry")
            .field("grammars", &self.names())
            .finish_non_exhaustive()
    }
}
