/*!
 * One generation run: walk the build directory and write the document
 */

use std::fs::{self, File};
use std::io::BufWriter;
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::path::NormalizedPath;
use crate::reconciler::{MarkupSink, NestingReconciler};
use crate::registry::IdentityRegistry;
use crate::report::{ComponentSummary, GenerationReport, LISTED_COMPONENTS};
use crate::types::{ContainerFrame, LeafRecord};
use crate::walker::{TreeWalker, WalkOptions};
use crate::writer::{manifest_entries, WixWriter};

/// Forwards markup to the document while tracking progress
///
/// Only the first `LISTED_COMPONENTS` components are kept for the report.
struct TrackingSink<'a, S> {
    inner: &'a mut S,
    progress: &'a ProgressBar,
    components: Vec<ComponentSummary>,
    component_count: usize,
}

impl<S: MarkupSink> MarkupSink for TrackingSink<'_, S> {
    fn open_container(&mut self, frame: &ContainerFrame) -> Result<()> {
        self.inner.open_container(frame)
    }

    fn close_container(&mut self, frame: &ContainerFrame) -> Result<()> {
        self.inner.close_container(frame)
    }

    fn leaf(&mut self, record: &LeafRecord) -> Result<()> {
        self.inner.leaf(record)?;
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", record.source));
        self.component_count += 1;
        if self.components.len() < LISTED_COMPONENTS {
            self.components.push(ComponentSummary {
                id: record.component_id.clone(),
                source: record.source.clone(),
            });
        }
        Ok(())
    }
}

/// Generator for a WiX installer source
pub struct Generator {
    /// Generator configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self { config, progress }
    }

    /// Walk options used for this run, the output file excluded
    pub fn walk_options(&self) -> WalkOptions {
        let mut options = WalkOptions::from_config(&self.config);
        if let Ok(output) = fs::canonicalize(&self.config.output_file) {
            options.skip_files.push(output);
        }
        options
    }

    /// Write the document, replacing any existing output file
    ///
    /// On failure the partially written file is left in place.
    pub fn run(&self) -> Result<GenerationReport> {
        let start_time = Instant::now();
        let output_file = &self.config.output_file;

        let file = File::create(output_file)
            .with_context(|| format!("Failed to create {}", output_file.display()))?;
        let options = self.walk_options();

        let mut writer = WixWriter::new(BufWriter::new(file), self.config.product.clone());
        writer.write_preamble()?;

        let mut registry = IdentityRegistry::new();
        let root_frame = writer.root_frame();
        let root = NormalizedPath::try_from(self.config.build_dir.as_path())?;

        let mut sink = TrackingSink {
            inner: &mut writer,
            progress: &self.progress,
            components: Vec::new(),
            component_count: 0,
        };
        let summary = {
            let mut reconciler = NestingReconciler::new(&mut registry, root, root_frame);
            for visit in TreeWalker::new(&self.config.build_dir, options) {
                reconciler.visit(&visit?, &mut sink)?;
            }
            reconciler.finish(&mut sink)?
        };
        let (components, component_count) = (sink.components, sink.component_count);

        writer.write_postamble(registry.ledger())?;
        writer.finish()?;

        let manifest = manifest_entries(registry.ledger());
        info!(
            output = %output_file.display(),
            containers = summary.containers_opened,
            components = summary.components,
            "installer source written"
        );

        Ok(GenerationReport {
            output_file: output_file.display().to_string(),
            duration: start_time.elapsed(),
            containers: summary.containers_opened,
            component_count,
            components,
            manifest,
        })
    }
}
