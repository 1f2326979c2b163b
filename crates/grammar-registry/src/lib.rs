//! Loading, validating and caching compiled tree-sitter grammars.
//!
//! * [`source`]: where grammar artifacts come from (built-in crates, shared libraries)
//! * [`handle`]: the immutable wrapper around one loaded grammar
//! * [`registry`]: the name keyed cache handing out shared handles

use derive_more::Display;

pub mod data;
pub mod handle;
mod language;
pub mod registry;
pub mod source;

pub use handle::{GrammarHandle, Malformation};
pub use registry::{GrammarRegistry, RegistryError};
pub use source::{
    Artifact, ArtifactError, ArtifactSource, BuiltinSource, ChainedSource, LibrarySource,
    language_from_fn,
};

/// Grammars statically linked into this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[non_exhaustive]
pub enum Language {
    #[display("c")]
    C,
    #[display("cpp")]
    CPlusPlus,
    #[display("javascript")]
    JavaScript,
    #[display("ruby")]
    Ruby,
    #[display("rust")]
    Rust,
    #[display("toml")]
    Toml,
    #[display("solidity")]
    Solidity,
}
