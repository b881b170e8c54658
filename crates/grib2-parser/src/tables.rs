//! Code tables 4.2 (parameters) and 4.5 (fixed surfaces) for the products
//! the National Blend of Models publishes in its `core` files.

/// One row of code table 4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterEntry {
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
    pub short_name: &'static str,
    pub name: &'static str,
}

const fn param(
    category: u8,
    number: u8,
    short_name: &'static str,
    name: &'static str,
) -> ParameterEntry {
    ParameterEntry {
        discipline: 0,
        category,
        number,
        short_name,
        name,
    }
}

const NBM_PARAMETERS: &[ParameterEntry] = &[
    param(0, 0, "TMP", "Temperature"),
    param(0, 6, "DPT", "Dew Point Temperature"),
    param(1, 1, "RH", "Relative Humidity"),
    param(1, 8, "APCP", "Total Precipitation"),
    param(2, 0, "WDIR", "Wind Direction"),
    param(2, 1, "WIND", "Wind Speed"),
    param(2, 22, "GUST", "Wind Speed (Gust)"),
    param(6, 1, "TCDC", "Total Cloud Cover"),
    param(6, 13, "CEIL", "Ceiling"),
    param(19, 0, "VIS", "Visibility"),
];

/// How a fixed surface type is described.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Named(&'static str),
    /// Height in metres above ground
    AboveGround,
}

const NBM_SURFACES: &[(u8, Surface)] = &[
    (1, Surface::Named("surface")),
    (10, Surface::Named("entire atmosphere")),
    (103, Surface::AboveGround),
    (200, Surface::Named("entire atmosphere")),
];

/// Lookup tables handed to the reader so messages can be matched by name.
#[derive(Debug, Clone, Copy)]
pub struct Grib2Tables {
    parameters: &'static [ParameterEntry],
    surfaces: &'static [(u8, Surface)],
}

impl Grib2Tables {
    /// Tables covering the NBM `core` product.
    pub fn nbm() -> Self {
        Self {
            parameters: NBM_PARAMETERS,
            surfaces: NBM_SURFACES,
        }
    }

    /// Table row for a parameter, if known.
    pub fn parameter(&self, discipline: u8, category: u8, number: u8) -> Option<&ParameterEntry> {
        self.parameters
            .iter()
            .find(|p| p.discipline == discipline && p.category == category && p.number == number)
    }

    /// Short name such as `TCDC`, or `P{discipline}_{category}_{number}`.
    pub fn get_parameter_name(&self, discipline: u8, category: u8, number: u8) -> String {
        match self.parameter(discipline, category, number) {
            Some(entry) => entry.short_name.to_string(),
            None => format!("P{}_{}_{}", discipline, category, number),
        }
    }

    /// Entry whose short or long name is `name`.
    pub fn by_name(&self, name: &str) -> Option<&ParameterEntry> {
        self.parameters
            .iter()
            .find(|p| p.short_name == name || p.name.eq_ignore_ascii_case(name))
    }

    pub fn get_level_description(&self, level_type: u8, level_value: u32) -> String {
        let surface = self
            .surfaces
            .iter()
            .find(|(code, _)| *code == level_type)
            .map(|(_, s)| *s);
        match surface {
            Some(Surface::Named(name)) => name.to_string(),
            Some(Surface::AboveGround) => format!("{} m above ground", level_value),
            None => format!("Level type {} value {}", level_type, level_value),
        }
    }
}
