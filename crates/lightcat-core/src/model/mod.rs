//! In-memory fixture model
//!
//! Fixtures exclusively own their channels, capabilities, matrix and physical
//! defaults. Modes, capabilities and fine channels refer to channels by key.

pub mod capability;
pub mod channel;
pub mod fixture;
pub mod matrix;
pub mod mode;
pub mod physical;

pub use capability::{Capability, ColorName, DmxRange, HoldTime, TimeUnit, MAINTENANCE};
pub use channel::{
    Channel, ChannelType, CoarseChannel, FineChannel, NullChannel, SwitchingChannel,
    MAX_FINE_CHANNELS,
};
pub use fixture::{
    Category, Fixture, FixtureId, ImportPlugin, Manufacturer, ManufacturerRegistry, Meta,
};
pub use matrix::{Axis, Matrix};
pub use mode::Mode;
pub use physical::Physical;
