use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::params::LineParameters;
use crate::Error;

/// Decibels per neper.
pub const NEPER_TO_DB: f64 = 8.686;
/// Phase constants below this [rad / m] leave wavelength and phase velocity undefined.
pub const BETA_EPSILON: f64 = 1e-12;

/// A line quantity that may not exist for the given parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineQuantity {
    Defined(f64),
    Undefined,
}

impl LineQuantity {
    #[inline]
    fn from_ratio(numerator: f64, denominator: f64, epsilon: f64) -> Self {
        if denominator.abs() < epsilon {
            LineQuantity::Undefined
        } else {
            LineQuantity::Defined(numerator / denominator)
        }
    }

    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            LineQuantity::Defined(v) => Some(v),
            LineQuantity::Undefined => None,
        }
    }

    #[inline]
    pub fn is_defined(self) -> bool {
        matches!(self, LineQuantity::Defined(_))
    }

    /// Converts an undefined quantity into `Error::UndefinedLineQuantity`.
    pub fn try_value(self, quantity: &'static str) -> Result<f64, Error> {
        self.value()
            .ok_or(Error::UndefinedLineQuantity { quantity })
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            LineQuantity::Defined(v) => LineQuantity::Defined(f(v)),
            LineQuantity::Undefined => LineQuantity::Undefined,
        }
    }
}

impl fmt::Display for LineQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineQuantity::Defined(v) => match f.precision() {
                Some(p) => write!(f, "{:.*e}", p, v),
                None => write!(f, "{:e}", v),
            },
            LineQuantity::Undefined => write!(f, "undefined"),
        }
    }
}

/// Quantities that depend only on the per-unit-length parameters and the frequency.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedLineState {
    /// Angular frequency [rad / s].
    pub omega: f64,
    /// Z = R + jωL [Ω / m].
    pub series_impedance: Complex,
    /// Y = G + jωC [S / m].
    pub shunt_admittance: Complex,
    /// γ = √(ZY) [1 / m].
    pub gamma: Complex,
    /// Attenuation constant [Np / m].
    pub alpha: f64,
    /// Phase constant [rad / m].
    pub beta: f64,
    /// Zc = √(Z/Y) [Ω].
    pub characteristic_impedance: Complex,
    /// λ = 2π/β [m].
    pub wavelength: LineQuantity,
    /// vp = ω/β [m / s].
    pub phase_velocity: LineQuantity,
}

impl DerivedLineState {
    pub fn new(params: &LineParameters) -> Result<Self, Error> {
        let omega = params.omega();
        let series_impedance = Complex::new(params.resistance(), omega * params.l);
        let shunt_admittance = Complex::new(params.conductance(), omega * params.c);

        let gamma = series_impedance.mul(shunt_admittance).sqrt();
        let characteristic_impedance = series_impedance.div(shunt_admittance)?.sqrt();
        let alpha = gamma.re;
        let beta = gamma.im;

        let wavelength = LineQuantity::from_ratio(2.0 * PI, beta, BETA_EPSILON);
        let phase_velocity = LineQuantity::from_ratio(omega, beta, BETA_EPSILON);
        if !wavelength.is_defined() {
            tracing::warn!(beta, "phase constant vanishes, wavelength and phase velocity are undefined");
        }

        tracing::debug!(
            alpha,
            beta,
            zc = %characteristic_impedance,
            "derived line state"
        );

        Ok(Self {
            omega,
            series_impedance,
            shunt_admittance,
            gamma,
            alpha,
            beta,
            characteristic_impedance,
            wavelength,
            phase_velocity,
        })
    }

    pub fn try_wavelength(&self) -> Result<f64, Error> {
        self.wavelength.try_value("wavelength")
    }

    pub fn try_phase_velocity(&self) -> Result<f64, Error> {
        self.phase_velocity.try_value("phase velocity")
    }

    /// Figures that additionally depend on the physical line length.
    pub fn figures(&self, length: f64) -> LineFigures {
        let z = self.series_impedance;
        let y = self.shunt_admittance;
        LineFigures {
            attenuation_db: self.alpha * length * NEPER_TO_DB,
            electrical_length_deg: (self.beta * length).to_degrees(),
            electrical_length_wavelengths: self.wavelength.map(|lambda| length / lambda),
            time_delay: self.phase_velocity.map(|vp| length / vp),
            q_series: LineQuantity::from_ratio(z.im, z.re, f64::MIN_POSITIVE),
            q_shunt: LineQuantity::from_ratio(y.im, y.re, f64::MIN_POSITIVE),
        }
    }
}

/// Length dependent line figures.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineFigures {
    /// Total attenuation over the line [dB].
    pub attenuation_db: f64,
    /// βl [deg].
    pub electrical_length_deg: f64,
    /// l/λ.
    pub electrical_length_wavelengths: LineQuantity,
    /// l/vp [s].
    pub time_delay: LineQuantity,
    /// ωL/R.
    pub q_series: LineQuantity,
    /// ωC/G.
    pub q_shunt: LineQuantity,
}
