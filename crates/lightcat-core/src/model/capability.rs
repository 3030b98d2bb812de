//! Capabilities: behaviours bound to a sub-range of a channel's values

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::scale::scale_dmx_range;

/// Capability kind of maintenance functions (reset, lamp on/off, ...)
pub const MAINTENANCE: &str = "Maintenance";

/// Closed DMX value interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DmxRange {
    pub start: u64,
    pub end: u64,
}

impl DmxRange {
    /// Create a new range
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Check if the range includes the given value
    pub fn contains(&self, value: u64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Re-express this range at another resolution
    pub fn scaled(&self, from_resolution: u32, to_resolution: u32) -> Result<DmxRange> {
        let (start, end) = scale_dmx_range(self.start, self.end, from_resolution, to_resolution)?;
        Ok(DmxRange { start, end })
    }
}

impl fmt::Display for DmxRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Colors a single-color channel can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorName {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    Amber,
    White,
    #[serde(rename = "Warm White")]
    WarmWhite,
    #[serde(rename = "Cold White")]
    ColdWhite,
    #[serde(rename = "UV")]
    Uv,
    Lime,
    Indigo,
}

impl ColorName {
    /// Display name as used in fixture definitions
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::Red => "Red",
            ColorName::Green => "Green",
            ColorName::Blue => "Blue",
            ColorName::Cyan => "Cyan",
            ColorName::Magenta => "Magenta",
            ColorName::Yellow => "Yellow",
            ColorName::Amber => "Amber",
            ColorName::White => "White",
            ColorName::WarmWhite => "Warm White",
            ColorName::ColdWhite => "Cold White",
            ColorName::Uv => "UV",
            ColorName::Lime => "Lime",
            ColorName::Indigo => "Indigo",
        }
    }

    /// Whether this is one of the subtractive primaries
    pub fn is_cmy(&self) -> bool {
        matches!(self, ColorName::Cyan | ColorName::Magenta | ColorName::Yellow)
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time unit of a hold duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
}

/// How long a capability must be held to take effect, e.g. `"2s"` or `"500ms"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTime {
    pub number: f64,
    pub unit: TimeUnit,
}

impl HoldTime {
    /// Create a hold time in seconds
    pub fn seconds(number: f64) -> Self {
        Self {
            number,
            unit: TimeUnit::Seconds,
        }
    }

    /// Parse entity strings like `"2s"`, `"1.5s"` or `"500ms"`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (number, unit) = if let Some(number) = text.strip_suffix("ms") {
            (number, TimeUnit::Milliseconds)
        } else if let Some(number) = text.strip_suffix('s') {
            (number, TimeUnit::Seconds)
        } else {
            return None;
        };

        let number: f64 = number.trim().parse().ok()?;
        if !number.is_finite() || number < 0.0 {
            return None;
        }
        Some(Self { number, unit })
    }

    /// Duration in whole milliseconds
    pub fn as_millis(&self) -> u64 {
        let millis = match self.unit {
            TimeUnit::Seconds => self.number * 1000.0,
            TimeUnit::Milliseconds => self.number,
        };
        millis.round() as u64
    }
}

/// A behaviour of a channel within a DMX range
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    /// Range at the owning channel's `dmx_value_resolution`
    pub dmx_range: DmxRange,
    /// Capability kind, one of the taxonomy's identifiers
    pub kind: String,
    pub color: Option<ColorName>,
    pub comment: Option<String>,
    pub hold: Option<HoldTime>,
    /// Discrete capability that can not be faded
    pub is_step: bool,
    /// Switching channel key -> channel key activated in this range
    pub switch_channels: IndexMap<String, String>,
    pub(crate) resolution: u32,
    pub(crate) channel_key: String,
}

impl Capability {
    /// Create a capability belonging to the given channel
    pub fn new(
        channel_key: impl Into<String>,
        resolution: u32,
        dmx_range: DmxRange,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            dmx_range,
            kind: kind.into(),
            color: None,
            comment: None,
            hold: None,
            is_step: true,
            switch_channels: IndexMap::new(),
            resolution,
            channel_key: channel_key.into(),
        }
    }

    /// Key of the channel this capability belongs to
    pub fn channel_key(&self) -> &str {
        &self.channel_key
    }

    /// Resolution `dmx_range` is expressed at
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// The capability's range re-expressed at the desired resolution
    pub fn dmx_range_at(&self, resolution: u32) -> Result<DmxRange> {
        self.dmx_range.scaled(self.resolution, resolution)
    }

    /// Comment, or the kind if there is none
    pub fn display_name(&self) -> &str {
        self.comment.as_deref().unwrap_or(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_time_parse() {
        assert_eq!(HoldTime::parse("2s").unwrap().as_millis(), 2000);
        assert_eq!(HoldTime::parse("1.5s").unwrap().as_millis(), 1500);
        assert_eq!(HoldTime::parse("500ms").unwrap().as_millis(), 500);
        assert!(HoldTime::parse("2min").is_none());
        assert!(HoldTime::parse("-1s").is_none());
        assert!(HoldTime::parse("fast").is_none());
    }

    #[test]
    fn test_dmx_range_at_other_resolution() {
        let cap = Capability::new("Reset", 2, DmxRange::new(2560, 2815), MAINTENANCE);
        assert_eq!(cap.dmx_range_at(1).unwrap(), DmxRange::new(10, 10));
        assert_eq!(cap.dmx_range_at(2).unwrap(), cap.dmx_range);
        assert_eq!(cap.channel_key(), "Reset");
    }

    #[test]
    fn test_color_names() {
        assert!(ColorName::Magenta.is_cmy());
        assert!(!ColorName::Amber.is_cmy());
        assert_eq!(ColorName::Uv.to_string(), "UV");
        let parsed: ColorName = serde_json::from_str("\"Warm White\"").unwrap();
        assert_eq!(parsed, ColorName::WarmWhite);
    }
}
