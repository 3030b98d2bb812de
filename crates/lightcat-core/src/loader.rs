//! Fixture loading from JSON fixture definitions
//!
//! A fixture repository is a directory holding a `manufacturers.json` and one
//! sub-directory per manufacturer with a `<fixture-key>.json` per fixture.
//!
//! The loader resolves everything the export engine relies on: template
//! channels are instantiated once per pixel and pixel group, fine channel
//! aliases and switching channels get their own channel table entries, unused
//! slots (`null`) become null channels, and matrix insert blocks in modes are
//! expanded into concrete channel keys.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::error::{CoreError, Result};
use crate::model::{
    Axis, Capability, Category, Channel, ChannelType, CoarseChannel, ColorName, DmxRange,
    FineChannel, Fixture, HoldTime, ImportPlugin, Manufacturer, ManufacturerRegistry, Matrix,
    Meta, Mode, NullChannel, Physical, SwitchingChannel, MAX_FINE_CHANNELS,
};
use crate::scale::max_value;

/// Placeholder replaced by the pixel key when instantiating template channels
pub const PIXEL_KEY_PLACEHOLDER: &str = "$pixelKey";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureDef {
    name: String,
    #[serde(default)]
    categories: Vec<Category>,
    meta: MetaDef,
    comment: Option<String>,
    physical: Option<PhysicalDef>,
    matrix: Option<MatrixDef>,
    #[serde(default)]
    available_channels: IndexMap<String, ChannelDef>,
    #[serde(default)]
    template_channels: IndexMap<String, ChannelDef>,
    modes: Vec<ModeDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaDef {
    authors: Vec<String>,
    create_date: NaiveDate,
    last_modify_date: NaiveDate,
    import_plugin: Option<ImportPluginDef>,
}

#[derive(Deserialize)]
struct ImportPluginDef {
    plugin: String,
    date: NaiveDate,
    comment: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PhysicalDef {
    dimensions: Option<[f64; 3]>,
    weight: Option<f64>,
    power: Option<f64>,
    #[serde(rename = "DMXconnector")]
    dmx_connector: Option<String>,
    bulb: Option<BulbDef>,
    lens: Option<LensDef>,
    focus: Option<FocusDef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulbDef {
    #[serde(rename = "type")]
    bulb_type: Option<String>,
    color_temperature: Option<f64>,
    lumens: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LensDef {
    name: Option<String>,
    degrees_min_max: Option<[f64; 2]>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FocusDef {
    #[serde(rename = "type")]
    focus_type: Option<String>,
    pan_max: Option<AngleDef>,
    tilt_max: Option<AngleDef>,
}

/// Degrees, or a keyword like `"infinite"`
#[derive(Deserialize)]
#[serde(untagged)]
enum AngleDef {
    Degrees(f64),
    Keyword(String),
}

impl AngleDef {
    fn degrees(self) -> Option<f64> {
        match self {
            AngleDef::Degrees(degrees) => Some(degrees),
            AngleDef::Keyword(_) => None,
        }
    }
}

impl From<PhysicalDef> for Physical {
    fn from(def: PhysicalDef) -> Self {
        let (bulb_type, bulb_color_temperature, bulb_lumens) = match def.bulb {
            Some(bulb) => (bulb.bulb_type, bulb.color_temperature, bulb.lumens),
            None => (None, None, None),
        };
        let (lens_name, lens_degrees_min_max) = match def.lens {
            Some(lens) => (lens.name, lens.degrees_min_max),
            None => (None, None),
        };
        let (focus_type, focus_pan_max, focus_tilt_max) = match def.focus {
            Some(focus) => (
                focus.focus_type,
                focus.pan_max.and_then(AngleDef::degrees),
                focus.tilt_max.and_then(AngleDef::degrees),
            ),
            None => (None, None, None),
        };

        Physical {
            dimensions: def.dimensions,
            weight: def.weight,
            power: def.power,
            dmx_connector: def.dmx_connector,
            bulb_type,
            bulb_color_temperature,
            bulb_lumens,
            lens_name,
            lens_degrees_min_max,
            focus_type,
            focus_pan_max,
            focus_tilt_max,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixDef {
    pixel_count: Option<[usize; 3]>,
    pixel_keys: Option<Vec<Vec<Vec<Option<String>>>>>,
    #[serde(default)]
    pixel_groups: IndexMap<String, PixelGroupDef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PixelGroupDef {
    Keys(Vec<String>),
    Keyword(String),
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ChannelDef {
    name: Option<String>,
    #[serde(rename = "type")]
    channel_type: Option<ChannelType>,
    color: Option<ColorName>,
    #[serde(default)]
    fine_channel_aliases: Vec<String>,
    dmx_value_resolution: Option<String>,
    capability: Option<CapabilityDef>,
    capabilities: Option<Vec<CapabilityDef>>,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CapabilityDef {
    dmx_range: Option<[u64; 2]>,
    #[serde(rename = "type")]
    kind: String,
    color: Option<ColorName>,
    comment: Option<String>,
    hold: Option<String>,
    is_step: Option<bool>,
    #[serde(default)]
    switch_channels: IndexMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeDef {
    name: String,
    short_name: Option<String>,
    physical: Option<PhysicalDef>,
    channels: Vec<Option<ModeChannelDef>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModeChannelDef {
    Key(String),
    Insert(MatrixInsertDef),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatrixInsertDef {
    insert: String,
    repeat_for: RepeatForDef,
    channel_order: ChannelOrder,
    template_channels: Vec<Option<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepeatForDef {
    Keys(Vec<String>),
    Keyword(String),
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
enum ChannelOrder {
    PerPixel,
    PerChannel,
}

/// Build a fixture from its JSON definition
pub fn fixture_from_json(manufacturer: Arc<Manufacturer>, key: &str, json: &str) -> Result<Fixture> {
    let def: FixtureDef = serde_json::from_str(json)?;
    let fixture_id = format!("{}/{}", manufacturer.key, key);

    let matrix = def
        .matrix
        .map(|matrix_def| build_matrix(&fixture_id, matrix_def))
        .transpose()?;

    let mut builder = ChannelTableBuilder::new(&fixture_id);

    for (channel_key, channel_def) in &def.available_channels {
        builder.add_coarse(channel_key, None, channel_def)?;
    }

    if !def.template_channels.is_empty() {
        let matrix = matrix.as_ref().ok_or_else(|| {
            CoreError::invalid_fixture(&fixture_id, "template channels require a matrix")
        })?;
        let mut pixel_keys = matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z);
        pixel_keys.extend(matrix.pixel_group_keys().map(str::to_string));

        for (template_key, template_def) in &def.template_channels {
            for pixel_key in &pixel_keys {
                let (channel_key, channel_def) =
                    instantiate_template(template_key, template_def, pixel_key);
                builder.add_coarse(&channel_key, Some(pixel_key), &channel_def)?;
            }
        }
    }

    builder.add_switching_channels()?;

    let mut modes = Vec::with_capacity(def.modes.len());
    for mode_def in def.modes {
        let channel_keys = builder.expand_mode_channels(
            &mode_def,
            matrix.as_ref(),
            &def.template_channels,
        )?;
        let short_name = mode_def.short_name.unwrap_or_else(|| mode_def.name.clone());
        trace!(
            fixture = %fixture_id,
            mode = %short_name,
            channels = channel_keys.len(),
            "built mode"
        );
        modes.push(Mode::new(
            mode_def.name,
            short_name,
            mode_def.physical.map(Physical::from),
            channel_keys,
            &builder.channels,
        ));
    }

    debug!(
        fixture = %fixture_id,
        channels = builder.channels.len(),
        modes = modes.len(),
        "loaded fixture"
    );

    Ok(Fixture {
        key: key.to_string(),
        manufacturer,
        name: def.name,
        meta: Meta {
            authors: def.meta.authors,
            create_date: def.meta.create_date,
            last_modify_date: def.meta.last_modify_date,
            import_plugin: def.meta.import_plugin.map(|import| ImportPlugin {
                plugin: import.plugin,
                date: import.date,
                comment: import.comment,
            }),
        },
        comment: def.comment,
        categories: def.categories,
        physical: def.physical.map(Physical::from).unwrap_or_default(),
        matrix,
        channels: builder.channels,
        modes,
    })
}

fn build_matrix(fixture_id: &str, def: MatrixDef) -> Result<Matrix> {
    let mut matrix = match (def.pixel_count, def.pixel_keys) {
        (Some([x, y, z]), None) => Matrix::from_pixel_count(x, y, z),
        (None, Some(pixel_keys)) => Matrix::from_pixel_keys(pixel_keys),
        _ => {
            return Err(CoreError::invalid_fixture(
                fixture_id,
                "matrix needs exactly one of pixelCount and pixelKeys",
            ))
        }
    };

    let all_pixels = matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z);
    for (group_key, group_def) in def.pixel_groups {
        let pixels = match group_def {
            PixelGroupDef::Keyword(keyword) if keyword == "all" => all_pixels.clone(),
            PixelGroupDef::Keyword(keyword) => {
                return Err(CoreError::invalid_fixture(
                    fixture_id,
                    format!("unknown pixel group keyword '{keyword}'"),
                ))
            }
            PixelGroupDef::Keys(keys) => {
                if let Some(unknown) = keys.iter().find(|key| !matrix.has_pixel_key(key)) {
                    return Err(CoreError::invalid_fixture(
                        fixture_id,
                        format!("pixel group '{group_key}' references unknown pixel '{unknown}'"),
                    ));
                }
                keys
            }
        };
        matrix.add_pixel_group(group_key, pixels);
    }

    Ok(matrix)
}

fn instantiate_template(
    template_key: &str,
    def: &ChannelDef,
    pixel_key: &str,
) -> (String, ChannelDef) {
    let replace = |text: &str| text.replace(PIXEL_KEY_PLACEHOLDER, pixel_key);

    let mut instance = def.clone();
    instance.name = def.name.as_deref().map(replace);
    instance.fine_channel_aliases = def.fine_channel_aliases.iter().map(|a| replace(a)).collect();

    let replace_switches = |cap: &mut CapabilityDef| {
        cap.switch_channels = cap
            .switch_channels
            .iter()
            .map(|(alias, target)| (replace(alias), replace(target)))
            .collect();
    };
    if let Some(cap) = instance.capability.as_mut() {
        replace_switches(cap);
    }
    if let Some(caps) = instance.capabilities.as_mut() {
        caps.iter_mut().for_each(replace_switches);
    }

    (replace(template_key), instance)
}

fn parse_resolution(text: &str) -> Option<u32> {
    match text {
        "8bit" => Some(1),
        "16bit" => Some(2),
        "24bit" => Some(3),
        _ => None,
    }
}

/// Capability ranges must tile the channel's whole value space
fn check_capability_tiling(
    fixture_id: &str,
    channel_key: &str,
    resolution: u32,
    capabilities: &[Capability],
) -> Result<()> {
    let max = max_value(resolution)?;
    let mut expected_start = 0u64;

    for cap in capabilities {
        let range = cap.dmx_range;
        if range.start != expected_start || range.end < range.start || range.end > max {
            return Err(CoreError::invalid_fixture(
                fixture_id,
                format!(
                    "capability {range} of channel '{channel_key}' does not continue at {expected_start}"
                ),
            ));
        }
        expected_start = range.end + 1;
    }

    if expected_start != max + 1 {
        return Err(CoreError::invalid_fixture(
            fixture_id,
            format!("capabilities of channel '{channel_key}' end before {max}"),
        ));
    }
    Ok(())
}

struct ChannelTableBuilder<'a> {
    fixture_id: &'a str,
    channels: IndexMap<String, Channel>,
    null_channel_count: usize,
}

impl<'a> ChannelTableBuilder<'a> {
    fn new(fixture_id: &'a str) -> Self {
        Self {
            fixture_id,
            channels: IndexMap::new(),
            null_channel_count: 0,
        }
    }

    fn insert(&mut self, channel: Channel) -> Result<()> {
        let key = channel.key().to_string();
        if self.channels.contains_key(&key) {
            return Err(CoreError::invalid_fixture(
                self.fixture_id,
                format!("duplicate channel key '{key}'"),
            ));
        }
        self.channels.insert(key, channel);
        Ok(())
    }

    fn add_coarse(&mut self, key: &str, pixel_key: Option<&str>, def: &ChannelDef) -> Result<()> {
        let fine_count = def.fine_channel_aliases.len();
        if fine_count > MAX_FINE_CHANNELS {
            return Err(CoreError::invalid_fixture(
                self.fixture_id,
                format!("channel '{key}' has more than {MAX_FINE_CHANNELS} fine channels"),
            ));
        }

        let resolution = match def.dmx_value_resolution.as_deref() {
            Some(text) => parse_resolution(text).ok_or_else(|| {
                CoreError::invalid_fixture(
                    self.fixture_id,
                    format!("channel '{key}' has invalid dmxValueResolution '{text}'"),
                )
            })?,
            None => 1 + fine_count as u32,
        };

        let capability_defs: Vec<(DmxRange, &CapabilityDef)> = match (&def.capability, &def.capabilities) {
            (Some(cap), None) => vec![(DmxRange::new(0, max_value(resolution)?), cap)],
            (None, Some(caps)) => {
                let mut ranged = Vec::with_capacity(caps.len());
                for cap in caps {
                    let [start, end] = cap.dmx_range.ok_or_else(|| {
                        CoreError::invalid_fixture(
                            self.fixture_id,
                            format!("capability of channel '{key}' lacks a dmxRange"),
                        )
                    })?;
                    ranged.push((DmxRange::new(start, end), cap));
                }
                ranged
            }
            _ => {
                return Err(CoreError::invalid_fixture(
                    self.fixture_id,
                    format!("channel '{key}' needs either capability or capabilities"),
                ))
            }
        };

        let mut capabilities = Vec::with_capacity(capability_defs.len());
        for (dmx_range, cap_def) in capability_defs {
            let mut cap = Capability::new(key, resolution, dmx_range, cap_def.kind.clone());
            cap.color = cap_def.color;
            cap.comment = cap_def.comment.clone();
            cap.is_step = cap_def.is_step.unwrap_or(true);
            cap.switch_channels = cap_def.switch_channels.clone();
            if let Some(hold) = &cap_def.hold {
                cap.hold = Some(HoldTime::parse(hold).ok_or_else(|| {
                    CoreError::invalid_fixture(
                        self.fixture_id,
                        format!("channel '{key}' has invalid hold time '{hold}'"),
                    )
                })?);
            }
            capabilities.push(cap);
        }
        check_capability_tiling(self.fixture_id, key, resolution, &capabilities)?;

        let channel_type = def.channel_type.unwrap_or_else(|| {
            capabilities
                .first()
                .map(|cap| ChannelType::from_capability_kind(&cap.kind))
                .unwrap_or(ChannelType::Generic)
        });
        let color = def
            .color
            .or_else(|| capabilities.iter().find_map(|cap| cap.color));

        self.insert(Channel::Coarse(CoarseChannel {
            key: key.to_string(),
            name: def.name.clone().unwrap_or_else(|| key.to_string()),
            pixel_key: pixel_key.map(str::to_string),
            channel_type,
            color,
            fine_channel_keys: def.fine_channel_aliases.clone(),
            dmx_value_resolution: resolution,
            capabilities,
        }))?;

        for (index, alias) in def.fine_channel_aliases.iter().enumerate() {
            self.insert(Channel::Fine(FineChannel {
                key: alias.clone(),
                pixel_key: pixel_key.map(str::to_string),
                coarse_channel_key: key.to_string(),
                fineness: index as u8 + 1,
            }))?;
        }
        Ok(())
    }

    /// Create switching channels from the trigger capabilities' `switchChannels`
    fn add_switching_channels(&mut self) -> Result<()> {
        let mut switching: IndexMap<String, SwitchingChannel> = IndexMap::new();

        for coarse in self.channels.values().filter_map(Channel::as_coarse) {
            for cap in &coarse.capabilities {
                for (alias, target) in &cap.switch_channels {
                    let entry = switching.entry(alias.clone()).or_insert_with(|| SwitchingChannel {
                        key: alias.clone(),
                        pixel_key: None,
                        trigger_channel_key: coarse.key.clone(),
                        switch_to: Vec::new(),
                        default_channel_key: String::new(),
                    });
                    if entry.trigger_channel_key != coarse.key {
                        return Err(CoreError::invalid_fixture(
                            self.fixture_id,
                            format!("switching channel '{alias}' is triggered by more than one channel"),
                        ));
                    }
                    entry.switch_to.push((cap.dmx_range, target.clone()));
                }
            }
        }

        for (_, mut channel) in switching {
            if let Some((_, target)) = channel
                .switch_to
                .iter()
                .find(|(_, target)| !self.channels.contains_key(target))
            {
                return Err(CoreError::invalid_fixture(
                    self.fixture_id,
                    format!("switching channel '{}' switches to unknown channel '{target}'", channel.key),
                ));
            }

            let default_key = channel
                .switch_to
                .iter()
                .find(|(range, _)| range.contains(0))
                .or_else(|| channel.switch_to.first())
                .map(|(_, target)| target.clone())
                .unwrap_or_default();
            channel.pixel_key = self
                .channels
                .get(&default_key)
                .and_then(|ch| ch.pixel_key())
                .map(str::to_string);
            channel.default_channel_key = default_key;

            self.insert(Channel::Switching(channel))?;
        }
        Ok(())
    }

    fn add_null_channel(&mut self) -> Result<String> {
        let mut key;
        loop {
            self.null_channel_count += 1;
            key = format!("null-{}", self.null_channel_count);
            if !self.channels.contains_key(&key) {
                break;
            }
        }
        self.insert(Channel::Null(NullChannel { key: key.clone() }))?;
        Ok(key)
    }

    fn expand_mode_channels(
        &mut self,
        def: &ModeDef,
        matrix: Option<&Matrix>,
        templates: &IndexMap<String, ChannelDef>,
    ) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for entry in &def.channels {
            match entry {
                None => keys.push(self.add_null_channel()?),
                Some(ModeChannelDef::Key(key)) => keys.push(key.clone()),
                Some(ModeChannelDef::Insert(insert)) => {
                    let inserted = self.expand_matrix_insert(&def.name, insert, matrix, templates)?;
                    keys.extend(inserted);
                }
            }
        }

        for (index, key) in keys.iter().enumerate() {
            if !self.channels.contains_key(key) {
                return Err(CoreError::invalid_fixture(
                    self.fixture_id,
                    format!("mode '{}' references unknown channel '{key}'", def.name),
                ));
            }
            if keys[..index].contains(key) {
                return Err(CoreError::invalid_fixture(
                    self.fixture_id,
                    format!("mode '{}' uses channel '{key}' twice", def.name),
                ));
            }
        }

        Ok(keys)
    }

    fn expand_matrix_insert(
        &mut self,
        mode_name: &str,
        insert: &MatrixInsertDef,
        matrix: Option<&Matrix>,
        templates: &IndexMap<String, ChannelDef>,
    ) -> Result<Vec<String>> {
        if insert.insert != "matrixChannels" {
            return Err(CoreError::invalid_fixture(
                self.fixture_id,
                format!("mode '{mode_name}' has unknown insert block '{}'", insert.insert),
            ));
        }
        let matrix = matrix.ok_or_else(|| {
            CoreError::invalid_fixture(
                self.fixture_id,
                format!("mode '{mode_name}' inserts matrix channels but there is no matrix"),
            )
        })?;

        let pixel_keys = match &insert.repeat_for {
            RepeatForDef::Keys(keys) => keys.clone(),
            RepeatForDef::Keyword(keyword) => {
                repeat_for_keyword(matrix, keyword).ok_or_else(|| {
                    CoreError::invalid_fixture(
                        self.fixture_id,
                        format!("mode '{mode_name}' has unknown repeatFor '{keyword}'"),
                    )
                })?
            }
        };

        if let Some(template) = insert
            .template_channels
            .iter()
            .flatten()
            .find(|template| !templates.contains_key(*template))
        {
            return Err(CoreError::invalid_fixture(
                self.fixture_id,
                format!("mode '{mode_name}' inserts unknown template channel '{template}'"),
            ));
        }

        let slots: Vec<(&Option<String>, &String)> = match insert.channel_order {
            ChannelOrder::PerPixel => pixel_keys
                .iter()
                .flat_map(|pixel_key| {
                    insert
                        .template_channels
                        .iter()
                        .map(move |template| (template, pixel_key))
                })
                .collect(),
            ChannelOrder::PerChannel => insert
                .template_channels
                .iter()
                .flat_map(|template| pixel_keys.iter().map(move |pixel_key| (template, pixel_key)))
                .collect(),
        };

        let mut keys = Vec::with_capacity(slots.len());
        for (template, pixel_key) in slots {
            match template {
                Some(template) => keys.push(template.replace(PIXEL_KEY_PLACEHOLDER, pixel_key)),
                None => keys.push(self.add_null_channel()?),
            }
        }

        Ok(keys)
    }
}

fn repeat_for_keyword(matrix: &Matrix, keyword: &str) -> Option<Vec<String>> {
    let axes = match keyword {
        "eachPixelGroup" => return Some(matrix.pixel_group_keys().map(str::to_string).collect()),
        "eachPixelXYZ" => (Axis::X, Axis::Y, Axis::Z),
        "eachPixelXZY" => (Axis::X, Axis::Z, Axis::Y),
        "eachPixelYXZ" => (Axis::Y, Axis::X, Axis::Z),
        "eachPixelYZX" => (Axis::Y, Axis::Z, Axis::X),
        "eachPixelZXY" => (Axis::Z, Axis::X, Axis::Y),
        "eachPixelZYX" => (Axis::Z, Axis::Y, Axis::X),
        _ => return None,
    };
    Some(matrix.pixel_keys_by_order(axes.0, axes.1, axes.2))
}

/// A directory of fixture definitions
#[derive(Debug, Clone)]
pub struct FixtureRepository {
    root: PathBuf,
    manufacturers: ManufacturerRegistry,
}

impl FixtureRepository {
    /// Open a repository, reading its `manufacturers.json`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let json = std::fs::read_to_string(root.join("manufacturers.json"))?;
        let manufacturers = ManufacturerRegistry::from_json(&json)?;
        debug!(
            root = %root.display(),
            manufacturers = manufacturers.len(),
            "opened fixture repository"
        );
        Ok(Self {
            root,
            manufacturers,
        })
    }

    pub fn manufacturers(&self) -> &ManufacturerRegistry {
        &self.manufacturers
    }

    /// Load a single fixture
    pub fn load(&self, manufacturer_key: &str, fixture_key: &str) -> Result<Fixture> {
        let manufacturer = self.manufacturers.get(manufacturer_key)?;
        let path = self
            .root
            .join(manufacturer_key)
            .join(format!("{fixture_key}.json"));
        let json = std::fs::read_to_string(&path)?;
        fixture_from_json(manufacturer, fixture_key, &json)
    }

    /// `(manufacturer key, fixture key)` of every fixture file, sorted
    pub fn fixture_keys(&self) -> Vec<(String, String)> {
        WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    return None;
                }
                let fixture_key = path.file_stem()?.to_str()?.to_string();
                let manufacturer_key = path.parent()?.file_name()?.to_str()?.to_string();
                Some((manufacturer_key, fixture_key))
            })
            .collect()
    }

    /// Load every fixture of the repository
    pub fn load_all(&self) -> Result<Vec<Fixture>> {
        self.fixture_keys()
            .iter()
            .map(|(manufacturer_key, fixture_key)| self.load(manufacturer_key, fixture_key))
            .collect()
    }
}

/// Load one fixture from a repository directory
pub fn fixture_from_repository(
    root: &Path,
    manufacturer_key: &str,
    fixture_key: &str,
) -> Result<Fixture> {
    FixtureRepository::open(root)?.load(manufacturer_key, fixture_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manufacturer() -> Arc<Manufacturer> {
        Arc::new(Manufacturer {
            key: "generic".to_string(),
            name: "Generic".to_string(),
            website: None,
        })
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("16bit"), Some(2));
        assert_eq!(parse_resolution("12bit"), None);
    }

    #[test]
    fn test_tiling_gap_is_rejected() {
        let json = r#"{
            "name": "Gap",
            "meta": { "authors": ["a"], "createDate": "2020-01-01", "lastModifyDate": "2020-01-01" },
            "availableChannels": {
                "Dimmer": { "capabilities": [
                    { "dmxRange": [0, 100], "type": "Intensity" },
                    { "dmxRange": [102, 255], "type": "Intensity" }
                ] }
            },
            "modes": [{ "name": "1ch", "channels": ["Dimmer"] }]
        }"#;
        let err = fixture_from_json(manufacturer(), "gap", json).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFixture { .. }));
    }

    #[test]
    fn test_unknown_mode_channel_is_rejected() {
        let json = r#"{
            "name": "Broken",
            "meta": { "authors": ["a"], "createDate": "2020-01-01", "lastModifyDate": "2020-01-01" },
            "availableChannels": {
                "Dimmer": { "capability": { "type": "Intensity" } }
            },
            "modes": [{ "name": "2ch", "channels": ["Dimmer", "Strobe"] }]
        }"#;
        let err = fixture_from_json(manufacturer(), "broken", json).unwrap_err();
        assert!(err.to_string().contains("Strobe"));
    }

    #[test]
    fn test_template_instantiation_replaces_pixel_key() {
        let def = ChannelDef {
            name: Some("Red $pixelKey".to_string()),
            channel_type: None,
            color: None,
            fine_channel_aliases: vec!["Red $pixelKey fine".to_string()],
            dmx_value_resolution: None,
            capability: None,
            capabilities: None,
        };
        let (key, instance) = instantiate_template("Red $pixelKey", &def, "3");
        assert_eq!(key, "Red 3");
        assert_eq!(instance.name.as_deref(), Some("Red 3"));
        assert_eq!(instance.fine_channel_aliases, vec!["Red 3 fine"]);
    }
}
