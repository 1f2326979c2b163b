use std::path::PathBuf;

use anyhow::ensure;
use grammar_registry::{BuiltinSource, ChainedSource, GrammarRegistry, Language, LibrarySource};
use tracing::info;

#[cfg(windows)]
const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const PATH_LIST_SEPARATOR: char = ':';

#[derive(Debug, clap::Parser)]
pub(super) struct Cli {
    /// Grammar names to load. Defaults to every built-in grammar.
    names: Vec<String>,

    /// Directory searched for grammar shared libraries, in order.
    #[clap(
        long = "grammar-dir",
        env = "GRAMMAR_PATH",
        value_delimiter = PATH_LIST_SEPARATOR
    )]
    grammar_dirs: Vec<PathBuf>,

    /// Only consider grammars compiled into this binary.
    #[clap(long, default_value_t = false)]
    builtin_only: bool,
}

impl Cli {
    pub(super) fn run(self) -> anyhow::Result<()> {
        let registry = GrammarRegistry::new(self.source());
        let names = self.grammar_names();

        let mut failures = 0_usize;
        for name in &names {
            match registry.load(name) {
                Ok(handle) => println!(
                    "ok {name} (abi {}, {} node kinds)",
                    handle.version(),
                    handle.node_kind_count()
                ),
                Err(error) => {
                    failures += 1;
                    println!("error {name}: {:#}", anyhow::Error::from(error));
                }
            }
        }

        info!(loaded = registry.len(), failed = failures, "Finished checking grammars");
        ensure!(
            failures == 0,
            "{failures} of {} grammars failed to load",
            names.len()
        );
        Ok(())
    }

    fn source(&self) -> ChainedSource {
        let chain = ChainedSource::new().with(BuiltinSource);
        if self.builtin_only || self.grammar_dirs.is_empty() {
            chain
        } else {
            chain.with(LibrarySource::new(self.grammar_dirs.iter().cloned()))
        }
    }

    fn grammar_names(&self) -> Vec<String> {
        if self.names.is_empty() {
            Language::ALL
                .iter()
                .map(|lang| lang.grammar_name().to_owned())
                .collect()
        } else {
            self.names.clone()
        }
    }
}
