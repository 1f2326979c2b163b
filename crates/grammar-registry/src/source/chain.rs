use std::fmt;

use tracing::debug;

use super::{Artifact, ArtifactError, ArtifactSource};

/// Tries several sources in order.
///
/// A source reporting [`ArtifactError::NotFound`] passes the name on to the
/// next one. Any other error means the grammar exists but is broken, and ends
/// the search.
#[derive(Default)]
pub struct ChainedSource {
    sources: Vec<Box<dyn ArtifactSource>>,
}

impl ChainedSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, source: impl ArtifactSource + 'static) -> Self {
        self.push(source);
        self
    }

    pub fn push(&mut self, source: impl ArtifactSource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for ChainedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedSource")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl ArtifactSource for ChainedSource {
    fn load_artifact(&self, name: &str) -> Result<Artifact, ArtifactError> {
        for (idx, source) in self.sources.iter().enumerate() {
            match source.load_artifact(name) {
                Err(ArtifactError::NotFound(_)) => {
                    debug!(grammar = name, source = idx, "Grammar not in source, trying next");
                }
                result => return result,
            }
        }
        Err(ArtifactError::NotFound(name.to_owned()))
    }
}
