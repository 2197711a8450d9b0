use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::Error;

/// Load used by the open circuit preset.
pub const OPEN_LOAD_OHMS: f64 = 1e9;

/// Validated line description. Built from a `ParameterRecord`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineParameters {
    /// Series resistance per unit length [Ω / m].
    pub r: f64,
    /// Series inductance per unit length [H / m].
    pub l: f64,
    /// Shunt conductance per unit length [S / m].
    pub g: f64,
    /// Shunt capacitance per unit length [F / m].
    pub c: f64,
    pub frequency_hz: f64,
    pub length_m: f64,
    /// Reference impedance [Ω].
    pub z0: f64,
    pub load: Complex,
    /// Forward wave amplitude [V].
    pub source_voltage: f64,
    /// Ignore `r` and `g` when set.
    pub lossless: bool,
}

impl LineParameters {
    #[inline]
    pub fn omega(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.frequency_hz
    }

    #[inline]
    pub fn resistance(&self) -> f64 {
        if self.lossless { 0.0 } else { self.r }
    }

    #[inline]
    pub fn conductance(&self) -> f64 {
        if self.lossless { 0.0 } else { self.g }
    }
}

/// The user editable parameter record.
///
/// Every field can be edited from text with [`ParameterRecord::set_field`]. Nothing is
/// coerced: text that is not a finite number is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRecord {
    pub r: f64,
    pub l: f64,
    pub g: f64,
    pub c: f64,
    pub frequency_hz: f64,
    pub length_m: f64,
    pub z0: f64,
    pub load_re: f64,
    pub load_im: f64,
    pub source_voltage: f64,
    pub speed_multiplier: f64,
    pub lossless: bool,
}

impl Default for ParameterRecord {
    /// A 0.1 m lossless 50 Ω line at 1 GHz into a matched load.
    fn default() -> Self {
        Self {
            r: 0.0,
            l: 250e-9,
            g: 0.0,
            c: 100e-12,
            frequency_hz: 1e9,
            length_m: 0.1,
            z0: 50.0,
            load_re: 50.0,
            load_im: 0.0,
            source_voltage: 1.0,
            speed_multiplier: 1.0,
            lossless: false,
        }
    }
}

impl ParameterRecord {
    /// Names accepted by [`ParameterRecord::set_field`].
    pub const FIELDS: [&'static str; 12] = [
        "r",
        "l",
        "g",
        "c",
        "frequency_hz",
        "length_m",
        "z0",
        "load_re",
        "load_im",
        "source_voltage",
        "speed_multiplier",
        "lossless",
    ];

    #[inline]
    pub fn load(&self) -> Complex {
        Complex::new(self.load_re, self.load_im)
    }

    /// Replaces one field from user text. Field names are matched case-insensitively.
    pub fn set_field(&mut self, name: &str, text: &str) -> Result<(), Error> {
        let key = name.trim().to_ascii_lowercase();
        if key == "lossless" {
            self.lossless = match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => return Err(Error::invalid(name, format!("'{}' is not a boolean", text))),
            };
            return Ok(());
        }

        let slot = match key.as_str() {
            "r" => &mut self.r,
            "l" => &mut self.l,
            "g" => &mut self.g,
            "c" => &mut self.c,
            "frequency_hz" | "freq" => &mut self.frequency_hz,
            "length_m" | "length" => &mut self.length_m,
            "z0" => &mut self.z0,
            "load_re" | "zl_re" => &mut self.load_re,
            "load_im" | "zl_im" => &mut self.load_im,
            "source_voltage" | "v0" => &mut self.source_voltage,
            "speed_multiplier" | "speed" => &mut self.speed_multiplier,
            _ => {
                return Err(Error::invalid(
                    name,
                    format!("unknown parameter, expected one of {}", Self::FIELDS.join(", ")),
                ))
            }
        };
        *slot = parse_number(name, text)?;
        Ok(())
    }

    /// Rewrites the load for one of the named scenarios.
    pub fn apply_preset(&mut self, preset: Preset) {
        let load = preset.load(self.z0);
        self.load_re = load.re;
        self.load_im = load.im;
    }

    /// Checks every field and produces the line description used by the engine.
    pub fn validate(&self) -> Result<LineParameters, Error> {
        let r = non_negative("r", self.r)?;
        let l = non_negative("l", self.l)?;
        let g = non_negative("g", self.g)?;
        let c = non_negative("c", self.c)?;
        let frequency_hz = positive("frequency_hz", self.frequency_hz)?;
        let length_m = non_negative("length_m", self.length_m)?;
        let z0 = positive("z0", self.z0)?;
        let load_re = finite("load_re", self.load_re)?;
        let load_im = finite("load_im", self.load_im)?;
        let source_voltage = finite("source_voltage", self.source_voltage)?;
        non_negative("speed_multiplier", self.speed_multiplier)?;

        Ok(LineParameters {
            r,
            l,
            g,
            c,
            frequency_hz,
            length_m,
            z0,
            load: Complex::new(load_re, load_im),
            source_voltage,
            lossless: self.lossless,
        })
    }
}

/// Named load scenarios.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Load equal to the reference impedance.
    Matched,
    /// Short circuit.
    Short,
    /// Open circuit, approximated by a very large resistance.
    Open,
    /// 25 Ω resistive load.
    Mismatch25,
    /// 100 Ω resistive load.
    Mismatch100,
}

impl Preset {
    pub fn load(self, z0: f64) -> Complex {
        match self {
            Preset::Matched => Complex::real(z0),
            Preset::Short => Complex::ZERO,
            Preset::Open => Complex::real(OPEN_LOAD_OHMS),
            Preset::Mismatch25 => Complex::real(25.0),
            Preset::Mismatch100 => Complex::real(100.0),
        }
    }
}

/// Parses user text into a finite number.
pub fn parse_number(name: &str, text: &str) -> Result<f64, Error> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::invalid(name, format!("'{}' is not a number", text)))?;
    finite(name, value)
}

fn finite(name: &str, value: f64) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("{} is not a finite number", value)))
    }
}

fn positive(name: &str, value: f64) -> Result<f64, Error> {
    let value = finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must be greater than 0, got {}", value)))
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, Error> {
    let value = finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(name, format!("must not be negative, got {}", value)))
    }
}
