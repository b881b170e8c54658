//! Synthetic GRIB2 messages for the loader and renderer tests.
//!
//! The builder writes structurally valid messages with simple packing
//! (template 5.0), an optional bitmap, and either a regular lat/lon grid
//! (template 3.0) or a Lambert conformal grid (template 3.30).

/// Grid section variants the builder can write.
#[derive(Debug, Clone)]
pub enum GridSpec {
    LatLon {
        la1: f64,
        lo1: f64,
        di: f64,
        dj: f64,
    },
    Lambert {
        la1: f64,
        lo1: f64,
        lov: f64,
        latin: f64,
        dx_m: f64,
        earth_radius_m: u32,
    },
}

/// Build a minimal GRIB2 message with the specified parameters
pub struct Grib2Builder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    ni: u32,
    nj: u32,
    grid: GridSpec,
    scanning_mode: u8,
    param_category: u8,
    param_number: u8,
    level_type: u8,
    level_value: u32,
    forecast_hour: u32,
    /// Template number written to section 5; the body is always 5.0 layout
    packing_template: u16,
    /// NaN values are written as bitmap holes
    data_values: Vec<f32>,
}

impl Grib2Builder {
    /// Total cloud cover on a small 1-degree lat/lon grid over Texas,
    /// rows running south to north.
    pub fn new_tcdc(ni: u32, nj: u32) -> Self {
        Self {
            discipline: 0,
            center: 7, // NCEP
            year: 2024,
            month: 4,
            day: 3,
            hour: 2,
            ni,
            nj,
            grid: GridSpec::LatLon {
                la1: 29.0,
                lo1: 260.0, // -100 E
                di: 1.0,
                dj: 1.0,
            },
            scanning_mode: 0b0100_0000, // +i, +j, i consecutive
            param_category: 6,
            param_number: 1, // TCDC
            level_type: 10,  // entire atmosphere
            level_value: 0,
            forecast_hour: 136,
            packing_template: 0,
            data_values: vec![50.0; (ni * nj) as usize],
        }
    }

    /// NBM-like Lambert conformal grid (2.5 km, LoV 265E, Latin 25N).
    pub fn new_nbm_lambert(ni: u32, nj: u32) -> Self {
        Self::new_tcdc(ni, nj).with_grid(GridSpec::Lambert {
            la1: 19.228976,
            lo1: 233.723448,
            lov: 265.0,
            latin: 25.0,
            dx_m: 2539.703,
            earth_radius_m: 6_371_200,
        })
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_scanning_mode(mut self, mode: u8) -> Self {
        self.scanning_mode = mode;
        self
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    pub fn with_level(mut self, level_type: u8, level_value: u32) -> Self {
        self.level_type = level_type;
        self.level_value = level_value;
        self
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Label the simply packed body with another template, e.g. 41 (PNG).
    pub fn with_packing_template(mut self, template: u16) -> Self {
        self.packing_template = template;
        self
    }

    pub fn with_data(mut self, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), (self.ni * self.nj) as usize);
        self.data_values = data;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let sections = [
            self.build_section1(),
            self.build_section3(),
            self.build_section4(),
            self.build_section5(),
            self.build_section6(),
            self.build_section7(),
        ];

        let message_length = 16 + sections.iter().map(Vec::len).sum::<usize>() + 4;

        let mut message = Vec::with_capacity(message_length);
        // Section 0: Indicator
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]); // Reserved
        message.push(self.discipline);
        message.push(2); // Edition 2
        message.extend_from_slice(&(message_length as u64).to_be_bytes());

        for section in &sections {
            message.extend_from_slice(section);
        }

        // Section 8: End
        message.extend_from_slice(b"7777");
        message
    }

    fn present_values(&self) -> Vec<f32> {
        self.data_values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect()
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::new();
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1);

        section.extend_from_slice(&self.center.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // Sub-center
        section.push(2); // Master table version
        section.push(1); // Local table version
        section.push(1); // Significance of reference time (start of forecast)

        section.extend_from_slice(&self.year.to_be_bytes());
        section.push(self.month);
        section.push(self.day);
        section.push(self.hour);
        section.push(0); // Minute
        section.push(0); // Second

        section.push(0); // Production status (operational)
        section.push(1); // Type of data (forecast)
        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut body = Vec::new();

        body.push(0); // Source of grid definition
        body.extend_from_slice(&(self.ni * self.nj).to_be_bytes());
        body.push(0); // Number of octets for optional list
        body.push(0); // Interpretation of optional list

        match &self.grid {
            GridSpec::LatLon { la1, lo1, di, dj } => {
                body.extend_from_slice(&0u16.to_be_bytes());
                earth_shape(&mut body, 6, 0);
                body.extend_from_slice(&self.ni.to_be_bytes());
                body.extend_from_slice(&self.nj.to_be_bytes());
                body.extend_from_slice(&0u32.to_be_bytes()); // Basic angle
                body.extend_from_slice(&0xFFFF_FFFFu32.to_be_bytes()); // Subdivisions
                body.extend_from_slice(&signed(*la1));
                body.extend_from_slice(&signed(*lo1));
                body.push(48); // Resolution and component flags
                let la2 = la1 + dj * (self.nj as f64 - 1.0);
                let lo2 = lo1 + di * (self.ni as f64 - 1.0);
                body.extend_from_slice(&signed(la2));
                body.extend_from_slice(&signed(lo2));
                body.extend_from_slice(&micro(*di).to_be_bytes());
                body.extend_from_slice(&micro(*dj).to_be_bytes());
                body.push(self.scanning_mode);
            }
            GridSpec::Lambert {
                la1,
                lo1,
                lov,
                latin,
                dx_m,
                earth_radius_m,
            } => {
                body.extend_from_slice(&30u16.to_be_bytes());
                earth_shape(&mut body, 1, *earth_radius_m);
                body.extend_from_slice(&self.ni.to_be_bytes());
                body.extend_from_slice(&self.nj.to_be_bytes());
                body.extend_from_slice(&signed(*la1));
                body.extend_from_slice(&signed(*lo1));
                body.push(0); // Resolution and component flags
                body.extend_from_slice(&signed(*latin)); // LaD
                body.extend_from_slice(&signed(*lov));
                let dx_mm = (dx_m * 1000.0).round() as u32;
                body.extend_from_slice(&dx_mm.to_be_bytes());
                body.extend_from_slice(&dx_mm.to_be_bytes());
                body.push(0); // Projection centre flag
                body.push(self.scanning_mode);
                body.extend_from_slice(&signed(*latin));
                body.extend_from_slice(&signed(*latin));
                body.extend_from_slice(&signed(-90.0)); // Southern pole lat
                body.extend_from_slice(&signed(0.0)); // Southern pole lon
            }
        }

        with_header(3, body)
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut body = Vec::new();

        body.extend_from_slice(&0u16.to_be_bytes()); // Number of coordinate values
        body.extend_from_slice(&0u16.to_be_bytes()); // Product definition template (0)

        body.push(self.param_category);
        body.push(self.param_number);
        body.push(2); // Type of generating process (forecast)
        body.push(0); // Background generating process
        body.push(0); // Analysis or forecast process
        body.extend_from_slice(&0u16.to_be_bytes()); // Hours of cutoff
        body.push(0); // Minutes of cutoff
        body.push(1); // Time range unit (hours)
        body.extend_from_slice(&self.forecast_hour.to_be_bytes());

        body.push(self.level_type);
        body.push(0); // Scale factor
        body.extend_from_slice(&self.level_value.to_be_bytes());

        body.push(255); // Type of second fixed surface (none)
        body.push(0);
        body.extend_from_slice(&0u32.to_be_bytes());

        with_header(4, body)
    }

    fn build_section5(&self) -> Vec<u8> {
        let values = self.present_values();
        let (reference_value, binary_scale_factor, bits_per_value) = packing_params(&values);

        let mut body = Vec::new();
        body.extend_from_slice(&(values.len() as u32).to_be_bytes());
        body.extend_from_slice(&self.packing_template.to_be_bytes());

        body.extend_from_slice(&reference_value.to_be_bytes());
        body.extend_from_slice(&signed16(binary_scale_factor));
        body.extend_from_slice(&signed16(0)); // Decimal scale factor
        body.push(bits_per_value);
        body.push(0); // Original field type (floating point)

        with_header(5, body)
    }

    fn build_section6(&self) -> Vec<u8> {
        if !self.data_values.iter().any(|v| v.is_nan()) {
            return with_header(6, vec![255]);
        }

        let mut body = vec![0]; // Bitmap applies
        let mut bitmap = vec![0u8; self.data_values.len().div_ceil(8)];
        for (i, v) in self.data_values.iter().enumerate() {
            if !v.is_nan() {
                bitmap[i / 8] |= 0x80 >> (i % 8);
            }
        }
        body.extend_from_slice(&bitmap);
        with_header(6, body)
    }

    fn build_section7(&self) -> Vec<u8> {
        let values = self.present_values();
        let (reference_value, binary_scale_factor, bits_per_value) = packing_params(&values);

        let mut packed = Vec::new();
        if bits_per_value > 0 {
            let scale = 2.0_f64.powi(binary_scale_factor as i32);
            for &v in &values {
                let x = ((v as f64 - reference_value as f64) / scale).round() as u16;
                packed.extend_from_slice(&x.to_be_bytes());
            }
        }
        with_header(7, packed)
    }
}

/// 16-bit packing with E = ceil(log2(range / 65535)).
fn packing_params(values: &[f32]) -> (f32, i16, u8) {
    let (min_val, max_val) = values.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY),
        |(min, max), &v| (min.min(v), max.max(v)),
    );
    if values.is_empty() {
        return (0.0, 0, 0);
    }
    let range = (max_val - min_val) as f64;
    if range == 0.0 {
        return (min_val, 0, 0);
    }
    let e = (range / 65535.0).log2().ceil() as i16;
    (min_val, e, 16)
}

fn earth_shape(body: &mut Vec<u8>, shape: u8, radius_m: u32) {
    body.push(shape);
    body.push(0); // Scale factor of radius
    body.extend_from_slice(&radius_m.to_be_bytes());
    body.push(0); // Scale factor of major axis
    body.extend_from_slice(&0u32.to_be_bytes());
    body.push(0); // Scale factor of minor axis
    body.extend_from_slice(&0u32.to_be_bytes());
}

fn with_header(number: u8, body: Vec<u8>) -> Vec<u8> {
    let mut section = Vec::with_capacity(body.len() + 5);
    section.extend_from_slice(&(body.len() as u32 + 5).to_be_bytes());
    section.push(number);
    section.extend_from_slice(&body);
    section
}

fn micro(degrees: f64) -> u32 {
    (degrees.abs() * 1_000_000.0).round() as u32
}

/// Sign-magnitude microdegrees.
fn signed(degrees: f64) -> [u8; 4] {
    let mut raw = micro(degrees);
    if degrees < 0.0 {
        raw |= 0x8000_0000;
    }
    raw.to_be_bytes()
}

fn signed16(value: i16) -> [u8; 2] {
    let mut raw = value.unsigned_abs();
    if value < 0 {
        raw |= 0x8000;
    }
    raw.to_be_bytes()
}
