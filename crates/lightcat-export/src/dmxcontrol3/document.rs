use lightcat_core::{ChannelType, CoarseChannel, Fixture, Mode, Physical};

use crate::error::Result;
use crate::grouping::{
    ChannelAttributes, ColorFunction, ColorMixing, FunctionBucket, MatrixFunction, MatrixSize,
    ModeGrouping, PositionFunction, Procedure,
};
use crate::xml::XmlElement;

const DMXC_VERSION: u32 = 3;

/// Build the `<device>` tree of one mode
pub fn device_document(fixture: &Fixture, mode: &Mode, grouping: &ModeGrouping<'_>) -> Result<XmlElement> {
    let mut device = XmlElement::new("device")
        .with_attr("type", "DMXDevice")
        .with_attr("dmxaddresscount", mode.channel_count())
        .with_attr("dmxcversion", DMXC_VERSION)
        .with_attr("ddfversion", fixture.meta.last_modify_date.format("%Y-%m-%d"));

    device.push(information(fixture, mode));

    let physical = fixture.effective_physical(mode);
    for bucket in &grouping.buckets {
        device.push(functions(fixture, mode, &physical, bucket)?);
    }

    if !grouping.procedures.is_empty() {
        device.push(procedures(&grouping.procedures));
    }

    Ok(device)
}

fn information(fixture: &Fixture, mode: &Mode) -> XmlElement {
    let mut information = XmlElement::new("information");
    information.push(XmlElement::new("model").with_text(fixture.name.as_str()));
    information.push(XmlElement::new("vendor").with_text(fixture.manufacturer.name.as_str()));
    information.push(XmlElement::new("author").with_text(fixture.meta.authors.join(", ")));
    information.push(XmlElement::new("mode").with_text(mode.name.as_str()));

    if let Some(comment) = fixture.comment.as_deref().filter(|c| !c.is_empty()) {
        information.push(XmlElement::new("comment").with_text(comment));
    }
    information
}

fn functions(
    fixture: &Fixture,
    mode: &Mode,
    physical: &Physical,
    bucket: &FunctionBucket<'_>,
) -> Result<XmlElement> {
    let mut functions = XmlElement::new("functions");

    if let Some((size, matrix)) = &bucket.matrix {
        functions.push(matrix_element(fixture, mode, *size, matrix)?);
    }

    if let Some(pixel_key) = &bucket.pixel_key {
        functions.push_comment(pixel_key.as_str());
    }

    for color_function in &bucket.colors {
        match color_function {
            ColorFunction::Mixing { mixing, channels } => {
                functions.push(color_mixing(fixture, mode, *mixing, channels)?)
            }
            ColorFunction::Single(channel) => functions.push(color(fixture, mode, channel)?),
        }
    }

    for dimmer in &bucket.dimmers {
        functions.push(channel_function("dimmer", fixture, mode, dimmer)?);
    }

    match &bucket.position {
        Some(PositionFunction::PanTilt { pan, tilt }) => {
            let mut position = XmlElement::new("position");
            position.push(pan_tilt(fixture, mode, physical, pan)?);
            position.push(pan_tilt(fixture, mode, physical, tilt)?);
            functions.push(position);
        }
        Some(PositionFunction::Single(channel)) => {
            functions.push(pan_tilt(fixture, mode, physical, channel)?);
        }
        None => {}
    }

    for channel in &bucket.other {
        functions.push(channel_function("raw", fixture, mode, channel)?);
    }

    Ok(functions)
}

fn matrix_element(
    fixture: &Fixture,
    mode: &Mode,
    size: MatrixSize,
    matrix: &MatrixFunction<'_>,
) -> Result<XmlElement> {
    let mut element = XmlElement::new("matrix")
        .with_attr("rows", size.x)
        .with_attr("column", size.y);

    match matrix {
        MatrixFunction::ColorMixing { mixing, pixels } => {
            for (_, channels) in pixels {
                element.push(color_mixing(fixture, mode, *mixing, channels)?);
            }
        }
        MatrixFunction::Monochrome { channel } => {
            element.set_attr("monochrome", "true");
            add_channel_attributes(&mut element, fixture, mode, channel)?;
        }
    }

    Ok(element)
}

fn color_mixing(
    fixture: &Fixture,
    mode: &Mode,
    mixing: ColorMixing,
    channels: &[&CoarseChannel],
) -> Result<XmlElement> {
    let mut element = XmlElement::new(mixing.as_str());
    for channel in channels {
        element.push(color(fixture, mode, channel)?);
    }
    Ok(element)
}

fn color(fixture: &Fixture, mode: &Mode, channel: &CoarseChannel) -> Result<XmlElement> {
    // "Warm White" -> "warmwhite"
    let tag = match channel.color {
        Some(color) => color.as_str().to_lowercase().replace(' ', ""),
        None => "raw".to_string(),
    };
    channel_function(&tag, fixture, mode, channel)
}

fn pan_tilt(
    fixture: &Fixture,
    mode: &Mode,
    physical: &Physical,
    channel: &CoarseChannel,
) -> Result<XmlElement> {
    let (tag, max_angle) = if channel.channel_type == ChannelType::Pan {
        ("pan", physical.focus_pan_max)
    } else {
        ("tilt", physical.focus_tilt_max)
    };

    let mut element = channel_function(tag, fixture, mode, channel)?;
    if let Some(max_angle) = max_angle {
        element.push(XmlElement::new("range").with_attr("range", max_angle));
    }
    Ok(element)
}

fn channel_function(
    tag: &str,
    fixture: &Fixture,
    mode: &Mode,
    channel: &CoarseChannel,
) -> Result<XmlElement> {
    let mut element = XmlElement::new(tag);
    add_channel_attributes(&mut element, fixture, mode, channel)?;
    Ok(element)
}

fn add_channel_attributes(
    element: &mut XmlElement,
    fixture: &Fixture,
    mode: &Mode,
    channel: &CoarseChannel,
) -> Result<()> {
    let attributes = ChannelAttributes::resolve(fixture, mode, channel)?;

    element.set_attr("name", attributes.name);
    element.set_attr("dmxchannel", attributes.dmx_channel);
    if let Some(fine) = attributes.fine_dmx_channel {
        element.set_attr("finedmxchannel", fine);
    }
    if let Some(ultra) = attributes.ultra_dmx_channel {
        element.set_attr("ultradmxchannel", ultra);
    }
    if let Some(ultra_fine) = attributes.ultra_fine_dmx_channel {
        element.set_attr("ultrafinedmxchannel", ultra_fine);
    }
    Ok(())
}

fn procedures(procedures: &[Procedure]) -> XmlElement {
    let mut element = XmlElement::new("procedures");

    for procedure in procedures {
        let mut xml_procedure = XmlElement::new("procedure").with_attr("name", &procedure.name);
        xml_procedure.push(
            XmlElement::new("set")
                .with_attr("dmxchannel", procedure.dmx_channel)
                .with_attr("value", procedure.value),
        );

        if let Some(hold) = procedure.hold_millis {
            xml_procedure.push(XmlElement::new("hold").with_attr("value", hold));
            xml_procedure.push(XmlElement::new("restore").with_attr("dmxchannel", procedure.dmx_channel));
        }
        element.push(xml_procedure);
    }
    element
}
