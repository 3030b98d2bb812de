//! DMXControl 3 device definitions (DDF3)
//!
//! One XML device definition is generated per fixture mode.

mod document;

pub use document::device_document;

use lightcat_core::{Fixture, Mode};
use tracing::debug;

use crate::error::Result;
use crate::file::{sanitize_file_name, ExportFile, ExportOptions};
use crate::grouping::group_mode;
use crate::plugin::ExportPlugin;

pub const MIMETYPE: &str = "application/xml";

/// Exports DMXControl 3 device definition files
#[derive(Debug, Clone, Copy, Default)]
pub struct DmxControl3Plugin;

impl DmxControl3Plugin {
    pub const KEY: &'static str = "dmxcontrol3";

    /// Generate the device definition of one mode
    pub fn export_mode(&self, fixture: &Fixture, mode: &Mode) -> Result<ExportFile> {
        let grouping = group_mode(fixture, mode)?;
        let document = device_document(fixture, mode, &grouping)?;
        let content = document.to_document_bytes()?;

        let name = file_name(fixture, mode);
        debug!(file = %name, bytes = content.len(), "generated DDF");

        Ok(ExportFile {
            name,
            content,
            mimetype: MIMETYPE.to_string(),
            fixtures: vec![fixture.id()],
            mode: Some(mode.short_name.clone()),
        })
    }
}

impl ExportPlugin for DmxControl3Plugin {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn name(&self) -> &'static str {
        "DMXControl 3 (DDF3)"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn export(&self, fixtures: &[Fixture], options: &ExportOptions) -> Result<Vec<ExportFile>> {
        fixtures
            .iter()
            .flat_map(|fixture| self.export_fixture(fixture, options))
            .collect()
    }

    fn export_fixture(&self, fixture: &Fixture, _options: &ExportOptions) -> Vec<Result<ExportFile>> {
        fixture
            .modes
            .iter()
            .map(|mode| {
                self.export_mode(fixture, mode)
                    .map_err(|err| err.for_item(fixture.id().to_string(), mode.short_name.as_str()))
            })
            .collect()
    }
}

/// `<manufacturer>-<fixture>-<mode>.xml`, safe for file systems
pub fn file_name(fixture: &Fixture, mode: &Mode) -> String {
    sanitize_file_name(&format!(
        "{}-{}-{}.xml",
        fixture.manufacturer.key, fixture.key, mode.short_name
    ))
}
