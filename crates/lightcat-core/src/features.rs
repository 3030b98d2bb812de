//! Capability feature classifier
//!
//! Features are derived from a [`CapabilityTaxonomy`], an ordered list of
//! capability kinds. The taxonomy is passed in explicitly so tests can use a
//! synthetic one; [`CapabilityTaxonomy::builtin`] covers the standard kinds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::Fixture;

const BUILTIN_KINDS: &[&str] = &[
    "NoFunction",
    "ShutterStrobe",
    "StrobeSpeed",
    "StrobeDuration",
    "Intensity",
    "ColorIntensity",
    "ColorPreset",
    "ColorTemperature",
    "Pan",
    "PanContinuous",
    "Tilt",
    "TiltContinuous",
    "PanTiltSpeed",
    "WheelSlot",
    "WheelShake",
    "WheelSlotRotation",
    "WheelRotation",
    "Effect",
    "EffectSpeed",
    "EffectDuration",
    "EffectParameter",
    "SoundSensitivity",
    "BeamAngle",
    "BeamPosition",
    "Focus",
    "Zoom",
    "Iris",
    "IrisEffect",
    "Frost",
    "FrostEffect",
    "Prism",
    "PrismRotation",
    "BladeInsertion",
    "BladeRotation",
    "BladeSystemRotation",
    "Fog",
    "FogOutput",
    "FogType",
    "Rotation",
    "Speed",
    "Time",
    "Maintenance",
    "Generic",
];

/// Ordered list of known capability kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTaxonomy {
    kinds: Vec<String>,
}

impl CapabilityTaxonomy {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// The standard capability kinds
    pub fn builtin() -> Self {
        Self::new(BUILTIN_KINDS.iter().copied())
    }

    /// Read the kinds from a schema properties document.
    ///
    /// The kinds are the keys of its `capabilityTypes` object, in document
    /// order.
    pub fn from_schema_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SchemaProperties {
            capability_types: Option<IndexMap<String, serde_json::Value>>,
        }

        let properties: SchemaProperties = serde_json::from_str(json)?;
        let capability_types = properties.capability_types.ok_or_else(|| {
            CoreError::Config("schema document has no capabilityTypes".to_string())
        })?;
        Ok(Self::new(capability_types.into_keys()))
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for CapabilityTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A searchable boolean fixture feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Capability kind this feature tests for
    #[serde(skip)]
    pub kind: String,
}

impl FeatureDescriptor {
    /// Whether any capability of any channel has this feature's kind
    pub fn has_feature(&self, fixture: &Fixture) -> bool {
        fixture
            .coarse_channels()
            .any(|channel| channel.has_capability_kind(&self.kind))
    }
}

/// One feature per capability kind of the taxonomy, in taxonomy order
pub fn capability_type_features(taxonomy: &CapabilityTaxonomy) -> Vec<FeatureDescriptor> {
    taxonomy
        .kinds()
        .iter()
        .map(|kind| FeatureDescriptor {
            id: format!("capability-type-{kind}"),
            name: format!("Capability type {kind}"),
            description: format!("Whether the fixture has at least one capability of type '{kind}'"),
            kind: kind.clone(),
        })
        .collect()
}

/// Ids of all features the fixture has
pub fn fixture_feature_ids(fixture: &Fixture, features: &[FeatureDescriptor]) -> Vec<String> {
    features
        .iter()
        .filter(|feature| feature.has_feature(fixture))
        .map(|feature| feature.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_taxonomy() {
        let taxonomy = CapabilityTaxonomy::builtin();
        assert!(taxonomy.contains("Intensity"));
        assert!(taxonomy.contains("Maintenance"));
        assert!(!taxonomy.contains("Teleport"));
        assert_eq!(taxonomy.kinds()[0], "NoFunction");
    }

    #[test]
    fn test_schema_key_order_is_kept() {
        let taxonomy = CapabilityTaxonomy::from_schema_json(
            r#"{ "capabilityTypes": { "Zoom": {}, "Intensity": {}, "Fog": { "properties": {} } } }"#,
        )
        .unwrap();
        assert_eq!(taxonomy.kinds(), &["Zoom", "Intensity", "Fog"]);
    }

    #[test]
    fn test_schema_without_capability_types() {
        let err = CapabilityTaxonomy::from_schema_json(r#"{ "units": {} }"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_descriptor_texts() {
        let features = capability_type_features(&CapabilityTaxonomy::new(["Intensity"]));
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "capability-type-Intensity");
        assert_eq!(features[0].name, "Capability type Intensity");
        assert_eq!(
            features[0].description,
            "Whether the fixture has at least one capability of type 'Intensity'"
        );
    }
}
