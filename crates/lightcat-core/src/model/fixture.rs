//! Fixtures and manufacturers

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::channel::{Channel, CoarseChannel};
use super::matrix::Matrix;
use super::mode::Mode;
use super::physical::Physical;
use crate::error::{CoreError, Result};

/// A fixture manufacturer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// All known manufacturers, shared by their fixtures
#[derive(Debug, Clone, Default)]
pub struct ManufacturerRegistry {
    manufacturers: IndexMap<String, Arc<Manufacturer>>,
}

#[derive(Deserialize)]
struct ManufacturerEntry {
    name: String,
    #[serde(default)]
    website: Option<String>,
}

impl ManufacturerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `manufacturers.json` document (`{ "<key>": { "name": ... } }`).
    /// Keys starting with `$` (like `$schema`) are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: IndexMap<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut registry = Self::new();
        for (key, value) in entries {
            if key.starts_with('$') {
                continue;
            }
            let entry: ManufacturerEntry = serde_json::from_value(value)?;
            registry.insert(Manufacturer {
                key,
                name: entry.name,
                website: entry.website,
            });
        }
        Ok(registry)
    }

    /// Register a manufacturer, replacing one with the same key
    pub fn insert(&mut self, manufacturer: Manufacturer) -> Arc<Manufacturer> {
        let manufacturer = Arc::new(manufacturer);
        self.manufacturers
            .insert(manufacturer.key.clone(), Arc::clone(&manufacturer));
        manufacturer
    }

    /// Look up a manufacturer by key
    pub fn get(&self, key: &str) -> Result<Arc<Manufacturer>> {
        self.manufacturers
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::UnknownManufacturer(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.manufacturers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manufacturers.is_empty()
    }
}

/// Provenance of an imported fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlugin {
    pub plugin: String,
    pub date: NaiveDate,
    pub comment: Option<String>,
}

/// Authoring metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub authors: Vec<String>,
    pub create_date: NaiveDate,
    pub last_modify_date: NaiveDate,
    pub import_plugin: Option<ImportPlugin>,
}

/// Fixture category tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Matrix,
    #[serde(rename = "Color Changer")]
    ColorChanger,
    #[serde(rename = "Moving Head")]
    MovingHead,
    Scanner,
    Dimmer,
    #[serde(rename = "Pixel Bar")]
    PixelBar,
    Strobe,
    Smoke,
    Hazer,
    Fan,
    Laser,
    #[serde(rename = "Barrel Scanner")]
    BarrelScanner,
    Flower,
    Effect,
    Blinder,
    Stand,
    Other,
}

/// Stable identifier of a fixture: manufacturer key plus fixture key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureId {
    pub manufacturer: String,
    pub key: String,
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.manufacturer, self.key)
    }
}

/// A catalogued lighting device
#[derive(Debug, Clone)]
pub struct Fixture {
    pub key: String,
    pub manufacturer: Arc<Manufacturer>,
    pub name: String,
    pub meta: Meta,
    pub comment: Option<String>,
    pub categories: Vec<Category>,
    pub physical: Physical,
    pub matrix: Option<Matrix>,
    /// Every channel of the fixture, including instantiated template channels
    pub channels: IndexMap<String, Channel>,
    pub modes: Vec<Mode>,
}

impl Fixture {
    /// Identifier of this fixture
    pub fn id(&self) -> FixtureId {
        FixtureId {
            manufacturer: self.manufacturer.key.clone(),
            key: self.key.clone(),
        }
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Look up a channel by key
    pub fn channel(&self, key: &str) -> Option<&Channel> {
        self.channels.get(key)
    }

    /// All coarse channels in definition order
    pub fn coarse_channels(&self) -> impl Iterator<Item = &CoarseChannel> {
        self.channels.values().filter_map(Channel::as_coarse)
    }

    /// Find a mode by its short name
    pub fn mode(&self, short_name: &str) -> Option<&Mode> {
        self.modes.iter().find(|mode| mode.short_name == short_name)
    }

    /// Resolve every channel of a mode, in DMX order
    pub fn mode_channels<'a>(&'a self, mode: &Mode) -> Result<Vec<&'a Channel>> {
        mode.channel_keys()
            .iter()
            .map(|key| {
                self.channel(key)
                    .ok_or_else(|| self.unresolved(mode, key))
            })
            .collect()
    }

    /// Replace a switching channel by its default channel; other channels are
    /// returned unchanged.
    pub fn resolve_default<'a>(&'a self, mode: &Mode, channel: &'a Channel) -> Result<&'a Channel> {
        match channel {
            Channel::Switching(switching) => self
                .channel(&switching.default_channel_key)
                .ok_or_else(|| self.unresolved(mode, &switching.default_channel_key)),
            other => Ok(other),
        }
    }

    /// Physical data of a mode, falling back to the fixture's per attribute
    pub fn effective_physical(&self, mode: &Mode) -> Physical {
        match &mode.physical {
            Some(physical) => physical.merged_over(&self.physical),
            None => self.physical.clone(),
        }
    }

    fn unresolved(&self, mode: &Mode, channel_key: &str) -> CoreError {
        CoreError::UnresolvedReference {
            fixture: self.id().to_string(),
            mode: mode.short_name.clone(),
            channel: channel_key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manufacturer_registry_from_json() {
        let registry = ManufacturerRegistry::from_json(
            r#"{
                "$schema": "https://example.org/manufacturers.json",
                "cameo": { "name": "Cameo", "website": "https://www.cameolight.com/" },
                "generic": { "name": "Generic" }
            }"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("cameo").unwrap().name, "Cameo");
        assert!(matches!(
            registry.get("nope"),
            Err(CoreError::UnknownManufacturer(_))
        ));
    }

    #[test]
    fn test_fixture_id_display() {
        let id = FixtureId {
            manufacturer: "cameo".to_string(),
            key: "flash-matrix-250".to_string(),
        };
        assert_eq!(id.to_string(), "cameo/flash-matrix-250");
    }
}
