use grammar_registry::Language;
use itertools::Itertools;

#[derive(Debug, clap::Parser)]
pub(super) struct Cli {
    /// Print only grammar names.
    #[clap(long, short, default_value_t = false)]
    quiet: bool,
}

impl Cli {
    pub(super) fn run(self) -> anyhow::Result<()> {
        for line in self.lines() {
            println!("{line}");
        }
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        Language::ALL
            .iter()
            .map(|lang| {
                if self.quiet {
                    lang.grammar_name().to_owned()
                } else {
                    format!(
                        "{:<12} {}",
                        lang.grammar_name(),
                        lang.file_extensions().iter().map(|ext| format!(".{ext}")).join(" ")
                    )
                }
            })
            .collect()
    }
}
