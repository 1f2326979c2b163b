use super::{Artifact, ArtifactError, ArtifactSource, language_from_fn};
use crate::Language;

/// Serves the grammars compiled into this crate, see [`Language`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSource;

impl ArtifactSource for BuiltinSource {
    fn load_artifact(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let lang = Language::from_grammar_name(name)
            .ok_or_else(|| ArtifactError::NotFound(name.to_owned()))?;
        language_from_fn(name, lang.language_fn()).map(Artifact::from)
    }
}
