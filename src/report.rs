use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::collector::CommitGroups;
use crate::llm::prompt_builder;
use crate::llm::TextGenerator;

const HEAVY_RULE: &str = "============================================================";
const LIGHT_RULE: &str = "------------------------------------------------------------";

/// Generated output for one repository group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub key: String,
    pub summary: String,
    pub translation: String,
}

/// Turns collected commit groups into summaries and their translations.
pub struct Reporter<'a> {
    generator: &'a dyn TextGenerator,
    show_progress: bool,
}

impl<'a> Reporter<'a> {
    pub fn new(generator: &'a dyn TextGenerator, show_progress: bool) -> Self {
        Self {
            generator,
            show_progress,
        }
    }

    /// Summarize then translate every group in order, writing each block to
    /// `out` as soon as it is ready.
    pub fn run<W: Write>(&self, groups: &CommitGroups, out: &mut W) -> Result<Vec<RepoReport>> {
        if groups.is_empty() {
            writeln!(out, "\nNo commits found for the specified user and period. Exiting.")
                .context("failed to write report")?;
            return Ok(Vec::new());
        }

        let mut reports = Vec::with_capacity(groups.len());

        for group in groups.iter() {
            log::info!(
                "Reporting on {} ({} commit message(s))",
                group.key,
                group.messages.len()
            );

            writeln!(out, "{HEAVY_RULE}\n{}\n{LIGHT_RULE}", group.key)
                .context("failed to write report")?;

            let summary = self.with_spinner("Generating summary...", || {
                self.generator
                    .generate(&prompt_builder::summary_messages(&group.messages))
            });
            writeln!(out, "Summary: {summary}\n{LIGHT_RULE}").context("failed to write report")?;

            // Error strings from the summary step are translated like any other text.
            let translation = self.with_spinner("Translating summary to Ukrainian...", || {
                self.generator
                    .generate(&prompt_builder::translation_messages(&summary))
            });
            writeln!(out, "Переклад: {translation}\n{HEAVY_RULE}")
                .context("failed to write report")?;

            out.flush().context("failed to flush report")?;

            reports.push(RepoReport {
                key: group.key.clone(),
                summary,
                translation,
            });
        }

        Ok(reports)
    }

    fn with_spinner<T>(&self, message: &'static str, call: impl FnOnce() -> T) -> T {
        if !self.show_progress {
            return call();
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]") {
            spinner.set_style(style);
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = call();
        spinner.finish_and_clear();
        result
    }
}
