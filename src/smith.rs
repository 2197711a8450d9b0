//! Smith chart projection.
//!
//! The chart is the unit disk of reflection coefficients, Γ = (zn − 1)/(zn + 1) with
//! zn = Z/Z0, scaled to a circle of `radius` pixels around (`center_x`, `center_y`).
//! Plot y grows downward, so positive reactance lands in the upper half.

pub mod grid;

pub use grid::{AngleMarker, ReactanceArc, ReflectionCircle, ResistanceCircle, SmithGrid};

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::transform::ReflectionState;
use crate::Error;

/// A point in plot space, together with the value that was projected.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    /// The impedance or reflection coefficient this point was projected from.
    pub origin: Complex,
}

/// Plot space placement of the chart.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmithChart {
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of the |Γ| = 1 circle [px].
    pub radius: f64,
}

impl Default for SmithChart {
    fn default() -> Self {
        Self {
            center_x: 400.0,
            center_y: 300.0,
            radius: 200.0,
        }
    }
}

impl SmithChart {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Result<Self, Error> {
        Self { center_x, center_y, radius }.validated()
    }

    /// Checks a chart that was deserialized or built field by field.
    pub fn validated(self) -> Result<Self, Error> {
        if !(self.center_x.is_finite() && self.center_y.is_finite()) {
            return Err(Error::invalid("chart center", "must be finite"));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(Error::invalid(
                "chart radius",
                format!("must be greater than 0, got {}", self.radius),
            ));
        }
        Ok(self)
    }

    /// Plot coordinates of a reflection coefficient.
    #[inline]
    pub fn to_plot(&self, gamma: Complex) -> (f64, f64) {
        (
            gamma.re * self.radius + self.center_x,
            -gamma.im * self.radius + self.center_y,
        )
    }

    /// Reflection coefficient under a plot position.
    #[inline]
    pub fn from_plot(&self, x: f64, y: f64) -> Complex {
        Complex::new(
            (x - self.center_x) / self.radius,
            -(y - self.center_y) / self.radius,
        )
    }

    pub fn project_reflection(&self, gamma: Complex) -> PlotPoint {
        let (x, y) = self.to_plot(gamma);
        PlotPoint { x, y, origin: gamma }
    }

    pub fn project_impedance(&self, impedance: Complex, z0: f64) -> Result<PlotPoint, Error> {
        let (x, y) = self.to_plot(smith_forward(impedance, z0)?);
        Ok(PlotPoint { x, y, origin: impedance })
    }

    /// Impedance under a plot position.
    pub fn unproject(&self, x: f64, y: f64, z0: f64) -> Result<Complex, Error> {
        smith_inverse(self.from_plot(x, y), z0)
    }

    /// Whether a point lies on or inside the |Γ| = 1 circle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.from_plot(x, y).mag() <= 1.0 + 1e-12
    }
}

/// Γ = (zn − 1)/(zn + 1), zn = Z/Z0.
pub fn smith_forward(impedance: Complex, z0: f64) -> Result<Complex, Error> {
    let zn = impedance / z0;
    zn.sub(Complex::ONE).div(zn.add(Complex::ONE))
}

/// Z = Z0·(1 + Γ)/(1 − Γ).
pub fn smith_inverse(gamma: Complex, z0: f64) -> Result<Complex, Error> {
    let zn = Complex::ONE.add(gamma).div(Complex::ONE.sub(gamma))?;
    Ok(zn.scale(z0))
}

/// The plotted markers of one evaluation.
///
/// Admittance markers sit on the admittance chart, diametrically opposite their
/// impedance markers (Γy = −Γ), and carry Γy as their origin.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoints {
    pub load: PlotPoint,
    pub input: PlotPoint,
    pub load_admittance: PlotPoint,
    pub input_admittance: PlotPoint,
}

impl ChartPoints {
    pub fn new(chart: &SmithChart, reflection: &ReflectionState, load: Complex) -> Self {
        let (x, y) = chart.to_plot(reflection.gamma_load);
        Self {
            load: PlotPoint { x, y, origin: load },
            input: chart.project_reflection(reflection.gamma_input),
            load_admittance: chart.project_reflection(-reflection.gamma_load),
            input_admittance: chart.project_reflection(-reflection.gamma_input),
        }
    }
}
