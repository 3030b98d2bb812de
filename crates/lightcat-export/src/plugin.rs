//! Export plugins and batch export

use lightcat_core::{ExportSettings, Fixture};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::dmxcontrol3::DmxControl3Plugin;
use crate::error::{ExportError, Result};
use crate::file::{write_files, ExportFile, ExportOptions};

/// Keys of all available export plugins
pub const PLUGIN_KEYS: &[&str] = &[DmxControl3Plugin::KEY];

/// Converts fixtures into files for a target application
pub trait ExportPlugin: Send + Sync {
    /// Stable identifier, also used as output folder name
    fn key(&self) -> &'static str;

    /// Human readable name
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Export fixtures, failing on the first error
    fn export(&self, fixtures: &[Fixture], options: &ExportOptions) -> Result<Vec<ExportFile>>;

    /// Export one fixture, one result per independently generated file.
    ///
    /// The default treats the whole fixture as a single item.
    fn export_fixture(&self, fixture: &Fixture, options: &ExportOptions) -> Vec<Result<ExportFile>> {
        match self.export(std::slice::from_ref(fixture), options) {
            Ok(files) => files.into_iter().map(Ok).collect(),
            Err(err) => vec![Err(err)],
        }
    }
}

/// Look up an export plugin by its key
pub fn plugin_by_key(key: &str) -> Result<Box<dyn ExportPlugin>> {
    match key {
        DmxControl3Plugin::KEY => Ok(Box::new(DmxControl3Plugin)),
        other => Err(ExportError::UnknownPlugin(other.to_string())),
    }
}

/// Outcome of a batch export
#[derive(Debug, Default)]
pub struct BatchExport {
    /// Generated files, in fixture order
    pub files: Vec<ExportFile>,
    /// Items that failed; the rest of the batch is unaffected
    pub failures: Vec<ExportError>,
}

impl BatchExport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Export every fixture independently.
///
/// With `parallel` the fixtures are spread over the rayon thread pool. The
/// output order is the input order either way.
pub fn export_batch(
    plugin: &dyn ExportPlugin,
    fixtures: &[Fixture],
    options: &ExportOptions,
    parallel: bool,
) -> BatchExport {
    let results: Vec<Vec<Result<ExportFile>>> = if parallel {
        fixtures
            .par_iter()
            .map(|fixture| plugin.export_fixture(fixture, options))
            .collect()
    } else {
        fixtures
            .iter()
            .map(|fixture| plugin.export_fixture(fixture, options))
            .collect()
    };

    let mut batch = BatchExport::default();
    for result in results.into_iter().flatten() {
        match result {
            Ok(file) => batch.files.push(file),
            Err(err) => {
                warn!(plugin = plugin.key(), "export failed: {}", err);
                batch.failures.push(err);
            }
        }
    }

    info!(
        plugin = plugin.key(),
        date = %options.date,
        fixtures = fixtures.len(),
        files = batch.files.len(),
        failures = batch.failures.len(),
        "batch export finished"
    );
    batch
}

/// Files written by [`export_to_dir`]
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<ExportError>,
}

/// Run every configured plugin and write its files to
/// `<output_dir>/<plugin key>/`
pub fn export_to_dir(
    settings: &ExportSettings,
    fixtures: &[Fixture],
    options: &ExportOptions,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    for key in &settings.plugins {
        let plugin = plugin_by_key(key)?;
        let batch = export_batch(plugin.as_ref(), fixtures, options, settings.parallel);

        let dir = settings.output_dir.join(plugin.key());
        report.written.extend(write_files(&dir, &batch.files)?);
        report.failures.extend(batch.failures);
    }

    Ok(report)
}
