//! Fixture modes: ordered DMX channel layouts

use indexmap::IndexMap;
use std::collections::HashMap;

use super::channel::Channel;
use super::physical::Physical;

/// One selectable channel layout of a fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Mode {
    pub name: String,
    pub short_name: String,
    /// Overrides the fixture's physical data attribute by attribute
    pub physical: Option<Physical>,
    channel_keys: Vec<String>,
    /// Channel key -> zero-based DMX index. Switching channels also register
    /// every channel they can switch to.
    channel_indices: HashMap<String, usize>,
}

impl Mode {
    /// Create a mode. `channels` is the fixture's channel table, used to map
    /// switching channel alternatives to their slot.
    pub fn new(
        name: impl Into<String>,
        short_name: impl Into<String>,
        physical: Option<Physical>,
        channel_keys: Vec<String>,
        channels: &IndexMap<String, Channel>,
    ) -> Self {
        let mut channel_indices = HashMap::new();

        for (index, key) in channel_keys.iter().enumerate() {
            channel_indices.entry(key.clone()).or_insert(index);

            if let Some(Channel::Switching(switching)) = channels.get(key) {
                for target in switching.switch_to_channel_keys() {
                    channel_indices.entry(target.to_string()).or_insert(index);
                }
            }
        }

        Self {
            name: name.into(),
            short_name: short_name.into(),
            physical,
            channel_keys,
            channel_indices,
        }
    }

    /// Channel keys in DMX order
    pub fn channel_keys(&self) -> &[String] {
        &self.channel_keys
    }

    /// Number of DMX channels this mode occupies
    pub fn channel_count(&self) -> usize {
        self.channel_keys.len()
    }

    /// Zero-based DMX index of a channel, `None` if the mode does not use it
    pub fn channel_index(&self, channel_key: &str) -> Option<usize> {
        self.channel_indices.get(channel_key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::capability::DmxRange;
    use crate::model::channel::{NullChannel, SwitchingChannel};

    #[test]
    fn test_channel_index() {
        let channels = IndexMap::new();
        let mode = Mode::new(
            "Standard",
            "std",
            None,
            vec!["Red".to_string(), "Green".to_string(), "Red".to_string()],
            &channels,
        );
        assert_eq!(mode.channel_index("Red"), Some(0));
        assert_eq!(mode.channel_index("Green"), Some(1));
        assert_eq!(mode.channel_index("Blue"), None);
        assert_eq!(mode.channel_count(), 3);
    }

    #[test]
    fn test_switching_targets_share_the_slot() {
        let mut channels = IndexMap::new();
        channels.insert(
            "Null 1".to_string(),
            Channel::Null(NullChannel {
                key: "Null 1".to_string(),
            }),
        );
        channels.insert(
            "Dimmer / Strobe".to_string(),
            Channel::Switching(SwitchingChannel {
                key: "Dimmer / Strobe".to_string(),
                pixel_key: None,
                trigger_channel_key: "Mode".to_string(),
                switch_to: vec![
                    (DmxRange::new(0, 127), "Dimmer".to_string()),
                    (DmxRange::new(128, 255), "Strobe".to_string()),
                ],
                default_channel_key: "Dimmer".to_string(),
            }),
        );

        let mode = Mode::new(
            "Switching",
            "sw",
            None,
            vec!["Null 1".to_string(), "Dimmer / Strobe".to_string()],
            &channels,
        );
        assert_eq!(mode.channel_index("Dimmer"), Some(1));
        assert_eq!(mode.channel_index("Strobe"), Some(1));
    }
}
