//! Physical device attributes

/// Physical attributes of a fixture or mode. Every attribute is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Physical {
    /// Width, height, depth in mm
    pub dimensions: Option<[f64; 3]>,
    /// Weight in kg
    pub weight: Option<f64>,
    /// Power consumption in W
    pub power: Option<f64>,
    pub dmx_connector: Option<String>,
    pub bulb_type: Option<String>,
    pub bulb_color_temperature: Option<f64>,
    pub bulb_lumens: Option<f64>,
    pub lens_name: Option<String>,
    /// Beam angle range in degrees
    pub lens_degrees_min_max: Option<[f64; 2]>,
    pub focus_type: Option<String>,
    /// Maximum pan angle in degrees
    pub focus_pan_max: Option<f64>,
    /// Maximum tilt angle in degrees
    pub focus_tilt_max: Option<f64>,
}

impl Physical {
    /// Merges `self` over `base`, attribute by attribute.
    ///
    /// Attributes set in `self` win; unset ones fall back to `base`.
    pub fn merged_over(&self, base: &Physical) -> Physical {
        Physical {
            dimensions: self.dimensions.or(base.dimensions),
            weight: self.weight.or(base.weight),
            power: self.power.or(base.power),
            dmx_connector: self
                .dmx_connector
                .clone()
                .or_else(|| base.dmx_connector.clone()),
            bulb_type: self.bulb_type.clone().or_else(|| base.bulb_type.clone()),
            bulb_color_temperature: self
                .bulb_color_temperature
                .or(base.bulb_color_temperature),
            bulb_lumens: self.bulb_lumens.or(base.bulb_lumens),
            lens_name: self.lens_name.clone().or_else(|| base.lens_name.clone()),
            lens_degrees_min_max: self.lens_degrees_min_max.or(base.lens_degrees_min_max),
            focus_type: self.focus_type.clone().or_else(|| base.focus_type.clone()),
            focus_pan_max: self.focus_pan_max.or(base.focus_pan_max),
            focus_tilt_max: self.focus_tilt_max.or(base.focus_tilt_max),
        }
    }
}
