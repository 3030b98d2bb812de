//! Channel grouping
//!
//! Turns the flat channel list of a mode into functional groups: matrix
//! colour mixing, colour mixing, dimmers, pan/tilt position and maintenance
//! procedures. Nothing in here knows about a concrete output format; export
//! plugins render the resulting [`ModeGrouping`].
//!
//! Channels are partitioned by pixel key into buckets (the non-matrix bucket
//! first, then pixel groups, then pixels in X, Y, Z order). Within a bucket
//! every extraction step removes the channels it claims, so a channel ends up
//! in exactly one group.

use indexmap::IndexMap;
use lightcat_core::{
    Axis, Category, Channel, ChannelType, CoarseChannel, ColorName, CoreError, Fixture, Mode,
    MAINTENANCE,
};
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::error::Result;

/// Name keywords marking an Intensity channel as a dimmer
const DIMMER_KEYWORDS: [&str; 3] = ["dimmer", "intensity", "brightness"];

/// Coarse channels of a mode, keyed by pixel key (`None` = not part of the matrix)
pub type ChannelsPerPixel<'a> = IndexMap<Option<String>, Vec<&'a CoarseChannel>>;

/// Kind of additive or subtractive colour mixing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMixing {
    Rgb,
    Cmy,
}

impl ColorMixing {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMixing::Rgb => "rgb",
            ColorMixing::Cmy => "cmy",
        }
    }

    /// Mixing a colour set supports, RGB taking precedence
    pub fn for_colors(colors: &BTreeSet<ColorName>) -> Option<Self> {
        if is_rgb(colors) {
            Some(ColorMixing::Rgb)
        } else if is_cmy(colors) {
            Some(ColorMixing::Cmy)
        } else {
            None
        }
    }
}

/// Colours of the Single Color channels in a list
pub fn channel_colors(channels: &[&CoarseChannel]) -> BTreeSet<ColorName> {
    channels
        .iter()
        .filter(|ch| ch.channel_type == ChannelType::SingleColor)
        .filter_map(|ch| ch.color)
        .collect()
}

/// Whether the set contains red, green and blue
pub fn is_rgb(colors: &BTreeSet<ColorName>) -> bool {
    [ColorName::Red, ColorName::Green, ColorName::Blue]
        .iter()
        .all(|color| colors.contains(color))
}

/// Whether the set contains cyan, magenta and yellow
pub fn is_cmy(colors: &BTreeSet<ColorName>) -> bool {
    [ColorName::Cyan, ColorName::Magenta, ColorName::Yellow]
        .iter()
        .all(|color| colors.contains(color))
}

/// DMX addressing of a channel within a mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAttributes {
    pub name: String,
    /// Zero-based DMX index of the coarse channel
    pub dmx_channel: usize,
    pub fine_dmx_channel: Option<usize>,
    pub ultra_dmx_channel: Option<usize>,
    pub ultra_fine_dmx_channel: Option<usize>,
}

impl ChannelAttributes {
    /// Resolve a coarse channel's indices in the mode.
    ///
    /// Fine levels are only set while every shallower level is present too.
    pub fn resolve(fixture: &Fixture, mode: &Mode, channel: &CoarseChannel) -> Result<Self> {
        let dmx_channel = mode
            .channel_index(&channel.key)
            .ok_or_else(|| CoreError::UnresolvedReference {
                fixture: fixture.id().to_string(),
                mode: mode.short_name.clone(),
                channel: channel.key.clone(),
            })?;

        let fine_indices: Vec<usize> = channel
            .fine_channel_keys
            .iter()
            .map_while(|key| mode.channel_index(key))
            .collect();

        Ok(Self {
            name: channel.name.clone(),
            dmx_channel,
            fine_dmx_channel: fine_indices.first().copied(),
            ultra_dmx_channel: fine_indices.get(1).copied(),
            ultra_fine_dmx_channel: fine_indices.get(2).copied(),
        })
    }
}

/// A colour channel group
#[derive(Debug, Clone, PartialEq)]
pub enum ColorFunction<'a> {
    /// Channels combined into one RGB or CMY mixer
    Mixing {
        mixing: ColorMixing,
        channels: Vec<&'a CoarseChannel>,
    },
    /// A colour channel on its own
    Single(&'a CoarseChannel),
}

/// Pan and tilt
#[derive(Debug, Clone, PartialEq)]
pub enum PositionFunction<'a> {
    PanTilt {
        pan: &'a CoarseChannel,
        tilt: &'a CoarseChannel,
    },
    /// Only one of pan and tilt exists
    Single(&'a CoarseChannel),
}

/// Function spanning the whole matrix
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixFunction<'a> {
    /// Every pixel mixes the same complete RGB or CMY set
    ColorMixing {
        mixing: ColorMixing,
        /// Pixel key and its colour channels, pixels in X, Y, Z order
        pixels: Vec<(String, Vec<&'a CoarseChannel>)>,
    },
    /// Every pixel has a single intensity channel; one function drives all
    Monochrome { channel: &'a CoarseChannel },
}

/// Pixel dimensions of the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSize {
    pub x: usize,
    pub y: usize,
}

/// Grouped functions of one pixel bucket
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBucket<'a> {
    /// `None` for the non-matrix channels
    pub pixel_key: Option<String>,
    /// Only set on the non-matrix bucket
    pub matrix: Option<(MatrixSize, MatrixFunction<'a>)>,
    pub colors: Vec<ColorFunction<'a>>,
    pub dimmers: Vec<&'a CoarseChannel>,
    pub position: Option<PositionFunction<'a>>,
    /// Channels no group claimed
    pub other: Vec<&'a CoarseChannel>,
}

impl<'a> FunctionBucket<'a> {
    pub fn is_empty(&self) -> bool {
        self.matrix.is_none()
            && self.colors.is_empty()
            && self.dimmers.is_empty()
            && self.position.is_none()
            && self.other.is_empty()
    }
}

/// A maintenance action triggered by setting a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: String,
    pub dmx_channel: usize,
    /// Capability start at the resolution the channel reaches in the mode
    pub value: u64,
    /// Time to hold the value before restoring the channel
    pub hold_millis: Option<u64>,
}

/// Everything an export plugin needs to describe one mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeGrouping<'a> {
    pub buckets: Vec<FunctionBucket<'a>>,
    pub procedures: Vec<Procedure>,
}

/// Group all channels of a mode
pub fn group_mode<'a>(fixture: &'a Fixture, mode: &Mode) -> Result<ModeGrouping<'a>> {
    let mut channels_per_pixel = channels_per_pixel(fixture, mode)?;

    let mut matrix = if fixture.has_category(Category::Matrix) {
        detect_matrix(fixture, mode, &mut channels_per_pixel)
    } else {
        None
    };

    let mut buckets = Vec::with_capacity(channels_per_pixel.len());
    for (pixel_key, channels) in channels_per_pixel {
        if pixel_key.is_some() && channels.is_empty() {
            continue;
        }
        let matrix = if pixel_key.is_none() { matrix.take() } else { None };
        buckets.push(group_bucket(fixture, pixel_key, matrix, channels));
    }

    let procedures = maintenance_procedures(fixture, mode)?;
    debug!(
        fixture = %fixture.id(),
        mode = %mode.short_name,
        buckets = buckets.len(),
        procedures = procedures.len(),
        "grouped mode"
    );

    Ok(ModeGrouping {
        buckets,
        procedures,
    })
}

/// Partition the mode's channels by pixel key.
///
/// Switching channels are replaced by their default channel; fine and null
/// channels are dropped. Buckets exist for the non-matrix channels, every
/// pixel group and every pixel, even if empty.
pub fn channels_per_pixel<'a>(fixture: &'a Fixture, mode: &Mode) -> Result<ChannelsPerPixel<'a>> {
    let mut buckets: ChannelsPerPixel<'a> = IndexMap::new();
    buckets.insert(None, Vec::new());

    if let Some(matrix) = &fixture.matrix {
        for key in matrix.pixel_group_keys() {
            buckets.insert(Some(key.to_string()), Vec::new());
        }
        for key in matrix.pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z) {
            buckets.insert(Some(key), Vec::new());
        }
    }

    for channel in fixture.mode_channels(mode)? {
        let channel = fixture.resolve_default(mode, channel)?;
        let coarse = match channel {
            Channel::Coarse(coarse) => coarse,
            Channel::Fine(_) | Channel::Null(_) | Channel::Switching(_) => continue,
        };
        buckets
            .entry(coarse.pixel_key.clone())
            .or_default()
            .push(coarse);
    }

    Ok(buckets)
}

/// Look for a function covering all used pixels and remove the channels it
/// claims from their pixel buckets
pub fn detect_matrix<'a>(
    fixture: &Fixture,
    mode: &Mode,
    channels_per_pixel: &mut ChannelsPerPixel<'a>,
) -> Option<(MatrixSize, MatrixFunction<'a>)> {
    let matrix = fixture.matrix.as_ref()?;

    let used_pixel_keys: Vec<String> = matrix
        .pixel_keys_by_order(Axis::X, Axis::Y, Axis::Z)
        .into_iter()
        .filter(|key| {
            channels_per_pixel
                .get(&Some(key.clone()))
                .is_some_and(|channels| !channels.is_empty())
        })
        .collect();
    if used_pixel_keys.is_empty() {
        trace!(fixture = %fixture.id(), mode = %mode.short_name, "mode uses no matrix pixels");
        return None;
    }

    let size = MatrixSize {
        x: matrix.pixel_count_x(),
        y: matrix.pixel_count_y(),
    };

    let pixel_channels = |key: &String| {
        channels_per_pixel
            .get(&Some(key.clone()))
            .cloned()
            .unwrap_or_default()
    };

    let reference_colors = channel_colors(&pixel_channels(&used_pixel_keys[0]));
    let same_colors = used_pixel_keys
        .iter()
        .all(|key| channel_colors(&pixel_channels(key)) == reference_colors);

    if same_colors {
        if let Some(mixing) = ColorMixing::for_colors(&reference_colors) {
            let mut pixels = Vec::with_capacity(used_pixel_keys.len());
            for key in used_pixel_keys {
                let bucket = channels_per_pixel.entry(Some(key.clone())).or_default();
                let (colors, rest): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                    .into_iter()
                    .partition(|ch| ch.channel_type == ChannelType::SingleColor);
                *bucket = rest;
                pixels.push((key, colors));
            }
            trace!(fixture = %fixture.id(), mode = %mode.short_name, mixing = mixing.as_str(), "matrix colour mixing");
            return Some((size, MatrixFunction::ColorMixing { mixing, pixels }));
        }
    }

    let monochrome = used_pixel_keys.iter().all(|key| {
        let channels = pixel_channels(key);
        channels.len() == 1 && channels[0].channel_type == ChannelType::Intensity
    });
    if monochrome {
        let first = used_pixel_keys
            .iter()
            .filter_map(|key| pixel_channels(key).first().copied())
            .min_by_key(|ch| mode.channel_index(&ch.key).unwrap_or(usize::MAX))?;

        for key in &used_pixel_keys {
            if let Some(bucket) = channels_per_pixel.get_mut(&Some(key.clone())) {
                bucket.clear();
            }
        }
        trace!(fixture = %fixture.id(), mode = %mode.short_name, "monochrome matrix");
        return Some((size, MatrixFunction::Monochrome { channel: first }));
    }

    debug!(
        fixture = %fixture.id(),
        mode = %mode.short_name,
        "{}",
        CoreError::UnsupportedStructure("matrix pixels neither share a colour mixing nor are monochrome".to_string())
    );
    None
}

fn group_bucket<'a>(
    fixture: &Fixture,
    pixel_key: Option<String>,
    matrix: Option<(MatrixSize, MatrixFunction<'a>)>,
    mut remaining: Vec<&'a CoarseChannel>,
) -> FunctionBucket<'a> {
    let colors = take_colors(fixture, &mut remaining);
    let dimmers = take_dimmers(&mut remaining);
    let position = take_position(&mut remaining);

    FunctionBucket {
        pixel_key,
        matrix,
        colors,
        dimmers,
        position,
        other: remaining,
    }
}

/// Remove all Single Color channels and group them into colour functions
pub fn take_colors<'a>(fixture: &Fixture, remaining: &mut Vec<&'a CoarseChannel>) -> Vec<ColorFunction<'a>> {
    let (color_channels, rest): (Vec<_>, Vec<_>) = std::mem::take(remaining)
        .into_iter()
        .partition(|ch| ch.channel_type == ChannelType::SingleColor);
    *remaining = rest;

    if color_channels.is_empty() {
        return Vec::new();
    }

    let colors = channel_colors(&color_channels);
    match (is_cmy(&colors), is_rgb(&colors)) {
        (true, true) => {
            let (cmy, rgb): (Vec<_>, Vec<_>) = color_channels
                .into_iter()
                .partition(|ch| ch.color.is_some_and(|color| color.is_cmy()));
            vec![
                ColorFunction::Mixing {
                    mixing: ColorMixing::Cmy,
                    channels: cmy,
                },
                ColorFunction::Mixing {
                    mixing: ColorMixing::Rgb,
                    channels: rgb,
                },
            ]
        }
        (true, false) => vec![ColorFunction::Mixing {
            mixing: ColorMixing::Cmy,
            channels: color_channels,
        }],
        (false, true) => vec![ColorFunction::Mixing {
            mixing: ColorMixing::Rgb,
            channels: color_channels,
        }],
        (false, false) => {
            if color_channels.len() > 1 {
                debug!(
                    fixture = %fixture.id(),
                    "{}",
                    CoreError::UnsupportedStructure(format!(
                        "colours {colors:?} form neither RGB nor CMY, exporting them one by one"
                    ))
                );
            }
            color_channels.into_iter().map(ColorFunction::Single).collect()
        }
    }
}

/// Remove Intensity channels named like a dimmer
pub fn take_dimmers<'a>(remaining: &mut Vec<&'a CoarseChannel>) -> Vec<&'a CoarseChannel> {
    let (dimmers, rest): (Vec<_>, Vec<_>) = std::mem::take(remaining).into_iter().partition(|ch| {
        ch.channel_type == ChannelType::Intensity && {
            let name = ch.name.to_lowercase();
            DIMMER_KEYWORDS.iter().any(|keyword| name.contains(keyword))
        }
    });
    *remaining = rest;
    dimmers
}

/// Remove the first Pan and the first Tilt channel
pub fn take_position<'a>(remaining: &mut Vec<&'a CoarseChannel>) -> Option<PositionFunction<'a>> {
    let take_first = |remaining: &mut Vec<&'a CoarseChannel>, channel_type: ChannelType| {
        remaining
            .iter()
            .position(|ch| ch.channel_type == channel_type)
            .map(|index| remaining.remove(index))
    };

    let pan = take_first(remaining, ChannelType::Pan);
    let tilt = take_first(remaining, ChannelType::Tilt);

    match (pan, tilt) {
        (Some(pan), Some(tilt)) => Some(PositionFunction::PanTilt { pan, tilt }),
        (Some(single), None) | (None, Some(single)) => Some(PositionFunction::Single(single)),
        (None, None) => None,
    }
}

/// Procedures for every step Maintenance capability of the mode's channels
pub fn maintenance_procedures(fixture: &Fixture, mode: &Mode) -> Result<Vec<Procedure>> {
    let mut procedures = Vec::new();

    for channel in fixture.mode_channels(mode)? {
        let coarse = match fixture.resolve_default(mode, channel)? {
            Channel::Coarse(coarse) => coarse,
            Channel::Fine(_) | Channel::Null(_) | Channel::Switching(_) => continue,
        };

        let maintenance = coarse
            .capabilities
            .iter()
            .filter(|cap| cap.kind == MAINTENANCE && cap.is_step);
        for cap in maintenance {
            let attributes = ChannelAttributes::resolve(fixture, mode, coarse)?;
            procedures.push(Procedure {
                name: cap.display_name().to_string(),
                dmx_channel: attributes.dmx_channel,
                value: cap.dmx_range_at(coarse.resolution_in_mode(mode))?.start,
                hold_millis: cap.hold.map(|hold| hold.as_millis()),
            });
        }
    }

    Ok(procedures)
}
