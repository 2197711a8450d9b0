use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::smith::SmithChart;
use crate::Error;

/// Normalized resistances drawn by [`SmithGrid::standard`].
pub const STANDARD_RESISTANCES: [f64; 6] = [0.0, 0.2, 0.5, 1.0, 2.0, 5.0];
/// Normalized reactances drawn by [`SmithGrid::standard`].
pub const STANDARD_REACTANCES: [f64; 10] = [-5.0, -2.0, -1.0, -0.5, -0.2, 0.2, 0.5, 1.0, 2.0, 5.0];
/// Reflection magnitudes drawn by [`SmithGrid::standard`].
pub const STANDARD_REFLECTIONS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];
/// Spacing of the radial angle markers [deg].
pub const ANGLE_MARKER_STEP: f64 = 30.0;
/// Finest accepted marker spacing [deg].
pub const MIN_ANGLE_MARKER_STEP: f64 = 0.1;

/// Locus of constant normalized resistance.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResistanceCircle {
    pub r: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

/// The part of a constant normalized reactance circle inside the chart.
///
/// The arc starts at the open circuit point and ends where the circle meets the rim
/// a second time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactanceArc {
    pub x: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Direction from `start` to `end` in plot space (y down). Always the minor arc.
    pub clockwise: bool,
}

/// Locus of constant |Γ|, i.e. of constant VSWR.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReflectionCircle {
    pub rho: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

/// Radial line from the chart center to the rim at a reflection angle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleMarker {
    pub degrees: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl SmithChart {
    pub fn resistance_circle(&self, r: f64) -> Result<ResistanceCircle, Error> {
        if !(r.is_finite() && r >= 0.0) {
            return Err(Error::invalid("r", format!("must not be negative, got {}", r)));
        }
        Ok(ResistanceCircle {
            r,
            center_x: self.center_x + self.radius * r / (1.0 + r),
            center_y: self.center_y,
            radius: self.radius / (1.0 + r),
        })
    }

    pub fn reactance_arc(&self, x: f64) -> Result<ReactanceArc, Error> {
        if !(x.is_finite() && x != 0.0) {
            return Err(Error::invalid("x", format!("must be finite and non-zero, got {}", x)));
        }
        let x2 = x * x;
        let rim = Complex::new((x2 - 1.0) / (x2 + 1.0), 2.0 * x / (x2 + 1.0));
        Ok(ReactanceArc {
            x,
            center_x: self.center_x + self.radius,
            center_y: self.center_y - self.radius / x,
            radius: self.radius / x.abs(),
            start: self.to_plot(Complex::ONE),
            end: self.to_plot(rim),
            clockwise: x > 0.0,
        })
    }

    pub fn reflection_circle(&self, rho: f64) -> Result<ReflectionCircle, Error> {
        if !(0.0..=1.0).contains(&rho) {
            return Err(Error::invalid("rho", format!("must lie in [0, 1], got {}", rho)));
        }
        Ok(ReflectionCircle {
            rho,
            center_x: self.center_x,
            center_y: self.center_y,
            radius: rho * self.radius,
        })
    }

    /// Markers every `step` degrees, starting at the positive real axis.
    pub fn angle_markers(&self, step: f64) -> Result<Vec<AngleMarker>, Error> {
        if !(step.is_finite() && (MIN_ANGLE_MARKER_STEP..=360.0).contains(&step)) {
            return Err(Error::invalid(
                "angle step",
                format!("must lie in [{}, 360], got {}", MIN_ANGLE_MARKER_STEP, step),
            ));
        }
        let count = (360.0 / step).round() as usize;
        Ok((0..count)
            .map(|n| {
                let degrees = n as f64 * step;
                AngleMarker {
                    degrees,
                    start: (self.center_x, self.center_y),
                    end: self.to_plot(Complex::from_polar(1.0, degrees.to_radians())),
                }
            })
            .collect())
    }
}

/// Grid geometry for a chart, computed from the conformal map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmithGrid {
    pub resistance: Vec<ResistanceCircle>,
    pub reactance: Vec<ReactanceArc>,
    pub reflection: Vec<ReflectionCircle>,
    pub angles: Vec<AngleMarker>,
}

impl SmithGrid {
    pub fn new(
        chart: &SmithChart,
        resistances: &[f64],
        reactances: &[f64],
        reflections: &[f64],
        angle_step: f64,
    ) -> Result<Self, Error> {
        Ok(Self {
            resistance: resistances
                .iter()
                .map(|&r| chart.resistance_circle(r))
                .collect::<Result<_, _>>()?,
            reactance: reactances
                .iter()
                .map(|&x| chart.reactance_arc(x))
                .collect::<Result<_, _>>()?,
            reflection: reflections
                .iter()
                .map(|&rho| chart.reflection_circle(rho))
                .collect::<Result<_, _>>()?,
            angles: chart.angle_markers(angle_step)?,
        })
    }

    pub fn standard(chart: &SmithChart) -> Result<Self, Error> {
        Self::new(
            chart,
            &STANDARD_RESISTANCES,
            &STANDARD_REACTANCES,
            &STANDARD_REFLECTIONS,
            ANGLE_MARKER_STEP,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
        (a.0 - b.0).hypot(a.1 - b.1)
    }

    #[test]
    fn zero_resistance_is_the_rim() {
        let chart = SmithChart::default();
        let circle = chart.resistance_circle(0.0).unwrap();
        assert_eq!((circle.center_x, circle.center_y), (400.0, 300.0));
        assert_eq!(circle.radius, 200.0);
    }

    #[test]
    fn projected_points_lie_on_their_grid_curves() {
        let chart = SmithChart::default();
        for &r in &[0.0, 0.2, 1.0, 3.7] {
            for &x in &[-4.0, -0.5, 0.3, 1.0, 2.0] {
                let p = chart.project_impedance(Complex::new(50.0 * r, 50.0 * x), 50.0).unwrap();

                let circle = chart.resistance_circle(r).unwrap();
                let d = distance((p.x, p.y), (circle.center_x, circle.center_y));
                assert_relative_eq!(d, circle.radius, max_relative = 1e-9);

                let arc = chart.reactance_arc(x).unwrap();
                let d = distance((p.x, p.y), (arc.center_x, arc.center_y));
                assert_relative_eq!(d, arc.radius, max_relative = 1e-9);
                assert!(chart.contains(p.x, p.y));
            }
        }
    }

    #[test]
    fn reactance_arc_ends_on_the_rim() {
        let chart = SmithChart::default();
        let arc = chart.reactance_arc(1.0).unwrap();
        assert_eq!(arc.start, (600.0, 300.0));
        assert_relative_eq!(arc.end.0, 400.0, epsilon = 1e-9);
        assert_relative_eq!(arc.end.1, 100.0, epsilon = 1e-9);
        assert!(arc.clockwise);
        assert!(!chart.reactance_arc(-1.0).unwrap().clockwise);

        let arc = chart.reactance_arc(-0.5).unwrap();
        let rim = distance(arc.end, (chart.center_x, chart.center_y));
        assert_relative_eq!(rim, chart.radius, max_relative = 1e-12);
        assert!(arc.end.1 > chart.center_y);
    }

    #[test]
    fn invalid_grid_values_are_rejected() {
        let chart = SmithChart::default();
        assert!(chart.resistance_circle(-0.1).is_err());
        assert!(chart.reactance_arc(0.0).is_err());
        assert!(chart.reflection_circle(1.5).is_err());
        assert!(chart.angle_markers(0.0).is_err());
    }

    #[test]
    fn tiny_angle_steps_are_rejected() {
        let chart = SmithChart::default();
        for step in [1e-300, 1e-9, 0.05] {
            assert!(matches!(
                chart.angle_markers(step),
                Err(Error::InvalidParameter { .. })
            ));
        }
        assert_eq!(chart.angle_markers(MIN_ANGLE_MARKER_STEP).unwrap().len(), 3600);
        assert_eq!(chart.angle_markers(360.0).unwrap().len(), 1);
    }

    #[test]
    fn standard_grid() {
        let grid = SmithGrid::standard(&SmithChart::default()).unwrap();
        assert_eq!(grid.resistance.len(), 6);
        assert_eq!(grid.reactance.len(), 10);
        assert_eq!(grid.reflection.len(), 5);
        assert_eq!(grid.angles.len(), 12);

        let quarter = grid.angles[3];
        assert_eq!(quarter.degrees, 90.0);
        assert_relative_eq!(quarter.end.0, 400.0, epsilon = 1e-9);
        assert_relative_eq!(quarter.end.1, 100.0, epsilon = 1e-9);
    }
}
