//! Fixture channels
//!
//! A fixture's channel table holds four kinds of channels:
//!
//! - [`CoarseChannel`]: a regular channel owning capabilities and fine refinements
//! - [`FineChannel`]: an extra DMX slot raising its coarse channel's precision
//! - [`SwitchingChannel`]: one slot whose meaning depends on a trigger channel
//! - [`NullChannel`]: an unused slot
//!
//! Cross references between channels are stored as channel keys and resolved
//! through the owning [`Fixture`](super::Fixture).

use serde::{Deserialize, Serialize};

use super::capability::{Capability, ColorName, DmxRange};
use super::mode::Mode;

/// Maximum number of fine channels per coarse channel (fine, ultra, ultra-fine)
pub const MAX_FINE_CHANNELS: usize = 3;

/// Functional kind of a coarse channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    Intensity,
    #[serde(rename = "Single Color")]
    SingleColor,
    #[serde(rename = "Multi-Color")]
    MultiColor,
    Pan,
    Tilt,
    Focus,
    Zoom,
    Iris,
    Gobo,
    Prism,
    #[serde(rename = "Color Temperature")]
    ColorTemperature,
    Effect,
    Speed,
    Strobe,
    Shutter,
    Fog,
    Maintenance,
    Nothing,
    Generic,
}

impl ChannelType {
    /// Channel type implied by a capability kind
    pub fn from_capability_kind(kind: &str) -> Self {
        match kind {
            "Intensity" => ChannelType::Intensity,
            "ColorIntensity" => ChannelType::SingleColor,
            "ColorPreset" => ChannelType::MultiColor,
            "ColorTemperature" => ChannelType::ColorTemperature,
            "Pan" | "PanContinuous" => ChannelType::Pan,
            "Tilt" | "TiltContinuous" => ChannelType::Tilt,
            "ShutterStrobe" => ChannelType::Strobe,
            "Focus" => ChannelType::Focus,
            "Zoom" => ChannelType::Zoom,
            "Iris" | "IrisEffect" => ChannelType::Iris,
            "Prism" | "PrismRotation" => ChannelType::Prism,
            "Fog" | "FogOutput" | "FogType" => ChannelType::Fog,
            "Maintenance" => ChannelType::Maintenance,
            "NoFunction" => ChannelType::Nothing,
            _ => ChannelType::Generic,
        }
    }
}

/// A regular channel
#[derive(Debug, Clone, PartialEq)]
pub struct CoarseChannel {
    pub key: String,
    pub name: String,
    pub pixel_key: Option<String>,
    pub channel_type: ChannelType,
    /// Only meaningful for [`ChannelType::SingleColor`]
    pub color: Option<ColorName>,
    /// Keys of the fine, ultra and ultra-fine channels, in that order
    pub fine_channel_keys: Vec<String>,
    /// Resolution the capability ranges are declared at
    pub dmx_value_resolution: u32,
    pub capabilities: Vec<Capability>,
}

impl CoarseChannel {
    /// Resolution this channel reaches in the given mode.
    ///
    /// Fine channels only count while every coarser refinement is present too.
    pub fn resolution_in_mode(&self, mode: &Mode) -> u32 {
        let used_fine_channels = self
            .fine_channel_keys
            .iter()
            .take_while(|key| mode.channel_index(key).is_some())
            .count();
        1 + used_fine_channels as u32
    }

    /// Check if any capability has the given kind
    pub fn has_capability_kind(&self, kind: &str) -> bool {
        self.capabilities.iter().any(|cap| cap.kind == kind)
    }
}

/// A channel refining its coarse channel
#[derive(Debug, Clone, PartialEq)]
pub struct FineChannel {
    pub key: String,
    pub pixel_key: Option<String>,
    pub coarse_channel_key: String,
    /// 1 = fine, 2 = ultra, 3 = ultra-fine
    pub fineness: u8,
}

/// A channel whose function is picked by a trigger channel's value
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchingChannel {
    pub key: String,
    pub pixel_key: Option<String>,
    pub trigger_channel_key: String,
    /// Trigger range -> key of the channel active in that range
    pub switch_to: Vec<(DmxRange, String)>,
    /// Channel active at trigger value 0
    pub default_channel_key: String,
}

impl SwitchingChannel {
    /// Keys of all alternatives, without duplicates, in trigger order
    pub fn switch_to_channel_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (_, key) in &self.switch_to {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }
}

/// An unused DMX slot
#[derive(Debug, Clone, PartialEq)]
pub struct NullChannel {
    pub key: String,
}

/// Any entry of a fixture's channel table
#[derive(Debug, Clone, PartialEq)]
pub enum Channel {
    Coarse(CoarseChannel),
    Fine(FineChannel),
    Switching(SwitchingChannel),
    Null(NullChannel),
}

impl Channel {
    /// Unique key within the fixture
    pub fn key(&self) -> &str {
        match self {
            Channel::Coarse(ch) => &ch.key,
            Channel::Fine(ch) => &ch.key,
            Channel::Switching(ch) => &ch.key,
            Channel::Null(ch) => &ch.key,
        }
    }

    /// Display name. Only coarse channels carry an explicit name.
    pub fn name(&self) -> &str {
        match self {
            Channel::Coarse(ch) => &ch.name,
            Channel::Fine(ch) => &ch.key,
            Channel::Switching(ch) => &ch.key,
            Channel::Null(_) => "Unused",
        }
    }

    /// Matrix pixel (or pixel group) this channel belongs to
    pub fn pixel_key(&self) -> Option<&str> {
        match self {
            Channel::Coarse(ch) => ch.pixel_key.as_deref(),
            Channel::Fine(ch) => ch.pixel_key.as_deref(),
            Channel::Switching(ch) => ch.pixel_key.as_deref(),
            Channel::Null(_) => None,
        }
    }

    pub fn as_coarse(&self) -> Option<&CoarseChannel> {
        match self {
            Channel::Coarse(ch) => Some(ch),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_type_from_capability_kind() {
        assert_eq!(
            ChannelType::from_capability_kind("ColorIntensity"),
            ChannelType::SingleColor
        );
        assert_eq!(
            ChannelType::from_capability_kind("PanContinuous"),
            ChannelType::Pan
        );
        assert_eq!(
            ChannelType::from_capability_kind("WheelSlot"),
            ChannelType::Generic
        );
    }

    #[test]
    fn test_switch_to_channel_keys_dedup() {
        let channel = SwitchingChannel {
            key: "Dimmer / Strobe".to_string(),
            pixel_key: None,
            trigger_channel_key: "Mode".to_string(),
            switch_to: vec![
                (DmxRange::new(0, 9), "Dimmer".to_string()),
                (DmxRange::new(10, 19), "Strobe".to_string()),
                (DmxRange::new(20, 255), "Dimmer".to_string()),
            ],
            default_channel_key: "Dimmer".to_string(),
        };
        assert_eq!(channel.switch_to_channel_keys(), vec!["Dimmer", "Strobe"]);
    }
}
