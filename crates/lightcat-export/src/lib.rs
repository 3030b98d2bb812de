//! Lightcat Export - Device Definitions for Lighting Control Software
//!
//! This crate turns fixtures into files for third-party software:
//! - Channel grouping (matrix, colour mixing, dimmer, position, procedures)
//! - XML document tree and emission
//! - Export plugins (DMXControl 3)
//! - Data-parallel batch export and file delivery

pub mod dmxcontrol3;
pub mod error;
pub mod file;
pub mod grouping;
pub mod plugin;
pub mod xml;

pub use dmxcontrol3::DmxControl3Plugin;
pub use error::{ExportError, Result};
pub use file::{sanitize_file_name, write_files, ExportFile, ExportOptions};
pub use grouping::{group_mode, ChannelAttributes, ModeGrouping, Procedure};
pub use plugin::{
    export_batch, export_to_dir, plugin_by_key, BatchExport, ExportPlugin, ExportReport,
    PLUGIN_KEYS,
};
pub use xml::{XmlElement, XmlNode};
