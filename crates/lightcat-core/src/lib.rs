//! Lightcat Core - Fixture Model and DMX Arithmetic
//!
//! This crate contains the core of the lighting fixture catalogue:
//! - Fixture model (fixtures, modes, channels, capabilities, matrices)
//! - DMX resolution scaling engine
//! - Capability feature classifier
//! - Fixture JSON loader
//! - Configuration and logging setup

pub mod config;
pub mod error;
pub mod features;
pub mod loader;
pub mod logging;
pub mod model;
pub mod scale;

// --- Re-exports grouped by category ---

// Errors
pub use error::{CoreError, Result};

// Model
pub use model::{
    Axis, Capability, Category, Channel, ChannelType, CoarseChannel, ColorName, DmxRange,
    FineChannel, Fixture, FixtureId, HoldTime, ImportPlugin, Manufacturer, ManufacturerRegistry,
    Matrix, Meta, Mode, NullChannel, Physical, SwitchingChannel, TimeUnit, MAINTENANCE,
    MAX_FINE_CHANNELS,
};

// Scaling
pub use scale::{max_value, scale_dmx_range, scale_dmx_value, MAX_RESOLUTION};

// Features
pub use features::{
    capability_type_features, fixture_feature_ids, CapabilityTaxonomy, FeatureDescriptor,
};

// Loading
pub use loader::{fixture_from_json, fixture_from_repository, FixtureRepository};

// Configuration & Logging
pub use config::{ExportSettings, LightcatConfig, TaxonomyConfig};
pub use logging::LogConfig;
