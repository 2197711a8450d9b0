use std::fmt;

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::line::{DerivedLineState, LineQuantity};
use crate::Error;

/// Reflection magnitudes at or above this saturate VSWR.
pub const DEFAULT_SATURATION_THRESHOLD: f64 = 0.9999;
/// Display value for a saturated VSWR.
pub const VSWR_SENTINEL: f64 = 999.0;
/// Reflection magnitudes below this give an infinite return loss.
pub const MIN_REFLECTION: f64 = 1e-15;

/// A value that is either finite or has run off to infinity.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Saturable<T> {
    Finite(T),
    Saturated,
}

impl<T: Copy> Saturable<T> {
    #[inline]
    pub fn finite(self) -> Option<T> {
        match self {
            Saturable::Finite(v) => Some(v),
            Saturable::Saturated => None,
        }
    }

    #[inline]
    pub fn is_saturated(self) -> bool {
        matches!(self, Saturable::Saturated)
    }

    /// The finite value, or `sentinel` when saturated.
    #[inline]
    pub fn or_sentinel(self, sentinel: T) -> T {
        self.finite().unwrap_or(sentinel)
    }

    /// The finite value, or `Error::SaturatedReflection` describing what saturated it.
    pub fn try_finite(self, magnitude: f64, threshold: f64) -> Result<T, Error> {
        self.finite()
            .ok_or(Error::SaturatedReflection { magnitude, threshold })
    }
}

impl<T: fmt::Display> fmt::Display for Saturable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Saturable::Finite(v) => match f.precision() {
                Some(p) => write!(f, "{:.*}", p, v),
                None => write!(f, "{}", v),
            },
            Saturable::Saturated => write!(f, "∞"),
        }
    }
}

/// Reflection and impedance at both ends of the line.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReflectionState {
    /// ΓL, referenced to Z0.
    pub gamma_load: Complex,
    /// Γ seen at the generator end.
    pub gamma_input: Complex,
    /// Zin, saturated when the input looks like an open circuit.
    pub input_impedance: Saturable<Complex>,
}

/// Figures of merit derived from a `ReflectionState`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReflectionMetrics {
    /// |Γ| at the input.
    pub magnitude: f64,
    pub saturation_threshold: f64,
    pub vswr: Saturable<f64>,
    pub return_loss_db: Saturable<f64>,
    /// V0²/(2|Zc|) [W].
    pub incident_power: LineQuantity,
    pub reflected_power: LineQuantity,
    pub transmitted_power: LineQuantity,
    pub input_admittance: Saturable<Complex>,
    pub load_admittance: Saturable<Complex>,
    /// |Im Zin| / Re Zin.
    pub input_q: LineQuantity,
}

impl ReflectionMetrics {
    /// VSWR, or `Error::SaturatedReflection` if the reflection saturated it.
    pub fn try_vswr(&self) -> Result<f64, Error> {
        self.vswr.try_finite(self.magnitude, self.saturation_threshold)
    }
}

/// Moves impedance and reflection coefficient along the line.
///
/// The canonical path rotates the load reflection coefficient toward the generator,
/// Γ(l) = ΓL·e^(−j2βl), and maps it back with Zin = Z0·(1+Γ)/(1−Γ).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImpedanceTransformer {
    z0: f64,
    saturation_threshold: f64,
}

impl ImpedanceTransformer {
    pub fn new(z0: f64) -> Result<Self, Error> {
        if !(z0.is_finite() && z0 > 0.0) {
            return Err(Error::invalid("z0", format!("must be greater than 0, got {}", z0)));
        }
        Ok(Self {
            z0,
            saturation_threshold: DEFAULT_SATURATION_THRESHOLD,
        })
    }

    pub fn with_saturation_threshold(mut self, threshold: f64) -> Result<Self, Error> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Error::invalid(
                "saturation_threshold",
                format!("must lie in (0, 1), got {}", threshold),
            ));
        }
        self.saturation_threshold = threshold;
        Ok(self)
    }

    #[inline]
    pub fn z0(&self) -> f64 {
        self.z0
    }

    #[inline]
    pub fn saturation_threshold(&self) -> f64 {
        self.saturation_threshold
    }

    /// Γ = (Z − Z0)/(Z + Z0).
    #[inline]
    pub fn reflection_coefficient(&self, impedance: Complex) -> Result<Complex, Error> {
        let z0 = Complex::real(self.z0);
        impedance.sub(z0).div(impedance.add(z0))
    }

    /// Z = Z0·(1+Γ)/(1−Γ), saturated at Γ = 1.
    pub fn impedance(&self, gamma: Complex) -> Saturable<Complex> {
        match Complex::ONE.add(gamma).div(Complex::ONE.sub(gamma)) {
            Ok(zn) => Saturable::Finite(zn.scale(self.z0)),
            Err(_) => Saturable::Saturated,
        }
    }

    /// Rotates `gamma` clockwise by 2βl.
    #[inline]
    pub fn rotate(gamma: Complex, beta: f64, length: f64) -> Complex {
        gamma.mul(Complex::from_polar(1.0, -2.0 * beta * length))
    }

    pub fn transform(
        &self,
        line: &DerivedLineState,
        load: Complex,
        length: f64,
    ) -> Result<ReflectionState, Error> {
        let gamma_load = self.reflection_coefficient(load)?;
        let gamma_input = Self::rotate(gamma_load, line.beta, length);
        let input_impedance = self.impedance(gamma_input);
        if input_impedance.is_saturated() {
            tracing::warn!(gamma = %gamma_input, "input impedance saturated");
        }

        Ok(ReflectionState {
            gamma_load,
            gamma_input,
            input_impedance,
        })
    }

    /// (1+|Γ|)/(1−|Γ|), saturated at the configured threshold.
    pub fn vswr(&self, gamma: Complex) -> Saturable<f64> {
        let rho = gamma.mag();
        if rho >= self.saturation_threshold || rho.is_nan() {
            Saturable::Saturated
        } else {
            Saturable::Finite((1.0 + rho) / (1.0 - rho))
        }
    }

    /// −20·log10|Γ| [dB], saturated for a vanishing reflection.
    pub fn return_loss(gamma: Complex) -> Saturable<f64> {
        let rho = gamma.mag();
        if rho < MIN_REFLECTION || rho.is_nan() {
            Saturable::Saturated
        } else {
            Saturable::Finite(-20.0 * rho.log10())
        }
    }

    pub fn metrics(
        &self,
        line: &DerivedLineState,
        reflection: &ReflectionState,
        load: Complex,
        source_voltage: f64,
    ) -> ReflectionMetrics {
        let gamma = reflection.gamma_input;
        let magnitude = gamma.mag();
        let vswr = self.vswr(gamma);
        if vswr.is_saturated() {
            tracing::warn!(
                magnitude,
                threshold = self.saturation_threshold,
                "reflection saturated"
            );
        }

        let incident_power = match line.characteristic_impedance.mag() {
            zc if zc > 0.0 => LineQuantity::Defined(source_voltage * source_voltage / (2.0 * zc)),
            _ => LineQuantity::Undefined,
        };
        let reflected_power = incident_power.map(|p| p * magnitude * magnitude);
        let transmitted_power = incident_power.map(|p| p * (1.0 - magnitude * magnitude));

        let input_admittance = match reflection.input_impedance {
            Saturable::Finite(z) => z.recip().map_or(Saturable::Saturated, Saturable::Finite),
            Saturable::Saturated => Saturable::Finite(Complex::ZERO),
        };
        let load_admittance = load.recip().map_or(Saturable::Saturated, Saturable::Finite);
        let input_q = match reflection.input_impedance {
            Saturable::Finite(z) if z.re != 0.0 => LineQuantity::Defined(z.im.abs() / z.re),
            _ => LineQuantity::Undefined,
        };

        ReflectionMetrics {
            magnitude,
            saturation_threshold: self.saturation_threshold,
            vswr,
            return_loss_db: Self::return_loss(gamma),
            incident_power,
            reflected_power,
            transmitted_power,
            input_admittance,
            load_admittance,
            input_q,
        }
    }
}

/// Zin = Zc·(ZL + Zc·tanh γl)/(Zc + ZL·tanh γl).
///
/// Independent of the reference impedance. For a lossless line whose Zc equals Z0
/// this agrees with [`ImpedanceTransformer::transform`].
pub fn input_impedance_hyperbolic(
    line: &DerivedLineState,
    load: Complex,
    length: f64,
) -> Result<Complex, Error> {
    let zc = line.characteristic_impedance;
    let gl = line.gamma.scale(length);
    match gl.tanh() {
        Ok(t) => {
            let num = load.add(zc.mul(t));
            let den = zc.add(load.mul(t));
            Ok(zc.mul(num.div(den)?))
        }
        // tanh γl diverges: quarter-wave inverter
        Err(Error::SingularDivision { .. }) => zc.mul(zc).div(load),
        Err(err) => Err(err),
    }
}
