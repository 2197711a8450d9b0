use std::f64::consts::FRAC_PI_2;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::complex::SINGULAR_EPSILON;
use crate::line::DerivedLineState;
use crate::transform::ReflectionState;
use crate::Error;

/// Default number of positions sampled along the line.
pub const DEFAULT_SAMPLES: usize = 201;

/// Line voltages and currents at one position.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveformSample {
    pub position: f64,
    pub forward_v: f64,
    pub reflected_v: f64,
    pub total_v: f64,
    pub forward_i: f64,
    pub reflected_i: f64,
    pub total_i: f64,
}

/// Describes the voltages and currents along the line at `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// The simulated time the samples were taken at.
    pub time: f64,
    /// Distance from the generator end of each sample.
    pub positions: Array1<f64>,
    pub forward_v: Array1<f64>,
    pub reflected_v: Array1<f64>,
    pub total_v: Array1<f64>,
    pub forward_i: Array1<f64>,
    pub reflected_i: Array1<f64>,
    pub total_i: Array1<f64>,
    /// Standing wave bound, V0·(1 + |Γ|). The envelope spans ±`envelope`.
    pub envelope: f64,
}

impl Waveform {
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn sample_at(&self, index: usize) -> Option<WaveformSample> {
        Some(WaveformSample {
            position: *self.positions.get(index)?,
            forward_v: *self.forward_v.get(index)?,
            reflected_v: *self.reflected_v.get(index)?,
            total_v: *self.total_v.get(index)?,
            forward_i: *self.forward_i.get(index)?,
            reflected_i: *self.reflected_i.get(index)?,
            total_i: *self.total_i.get(index)?,
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = WaveformSample> + '_ {
        (0..self.len()).filter_map(move |i| self.sample_at(i))
    }
}

/// Samples forward, reflected and total waves along the line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WaveformSynthesizer {
    npoints: usize,
}

impl WaveformSynthesizer {
    pub fn new(npoints: usize) -> Result<Self, Error> {
        if npoints < 2 {
            return Err(Error::invalid(
                "samples",
                format!("need at least 2 positions, got {}", npoints),
            ));
        }
        Ok(Self { npoints })
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.npoints
    }

    pub fn synthesize(
        &self,
        line: &DerivedLineState,
        reflection: &ReflectionState,
        source_voltage: f64,
        length: f64,
        time: f64,
    ) -> Result<Waveform, Error> {
        let zc = line.characteristic_impedance;
        if zc.norm_sqr() < SINGULAR_EPSILON {
            return Err(Error::SingularDivision { norm_sqr: zc.norm_sqr() });
        }

        let v0 = source_voltage;
        let i0 = v0 / zc.mag();
        let rho = reflection.gamma_load.mag();
        let phi = reflection.gamma_load.phase();
        let beta = line.beta;
        let wt = line.omega * time;

        let positions = Array1::linspace(0.0, length, self.npoints);
        let forward_v = positions.mapv(|z| v0 * (wt - beta * z).cos());
        let reflected_v = positions.mapv(|z| v0 * rho * (wt + beta * z + phi).cos());
        let total_v = &forward_v + &reflected_v;

        // currents lag their voltages by a quarter period
        let forward_i = positions.mapv(|z| i0 * (wt - beta * z - FRAC_PI_2).cos());
        let reflected_i = positions.mapv(|z| -i0 * rho * (wt + beta * z + phi - FRAC_PI_2).cos());
        let total_i = &forward_i + &reflected_i;

        tracing::trace!(time, npoints = self.npoints, "synthesized waveform");

        Ok(Waveform {
            time,
            positions,
            forward_v,
            reflected_v,
            total_v,
            forward_i,
            reflected_i,
            total_i,
            envelope: v0.abs() * (1.0 + rho),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterRecord;
    use crate::transform::ImpedanceTransformer;
    use approx::assert_relative_eq;

    fn setup(record: &ParameterRecord) -> (DerivedLineState, ReflectionState) {
        let params = record.validate().unwrap();
        let line = DerivedLineState::new(&params).unwrap();
        let reflection = ImpedanceTransformer::new(params.z0)
            .unwrap()
            .transform(&line, params.load, params.length_m)
            .unwrap();
        (line, reflection)
    }

    #[test]
    fn matched_line_carries_only_the_forward_wave() {
        let record = ParameterRecord::default();
        let (line, reflection) = setup(&record);
        let wave = WaveformSynthesizer::new(11)
            .unwrap()
            .synthesize(&line, &reflection, 1.0, record.length_m, 0.0)
            .unwrap();

        assert_eq!(wave.total_v[0], 1.0);
        assert!(wave.reflected_v.iter().all(|&v| v == 0.0));
        assert_eq!(wave.envelope, 1.0);
        assert_relative_eq!(wave.positions[10], record.length_m, max_relative = 1e-12);
        // forward current is in quadrature at t = 0, z = 0
        assert_relative_eq!(wave.forward_i[0], 0.0, epsilon = 1e-15);
    }

    #[test]
    fn short_circuit_forms_a_standing_wave() {
        let record = ParameterRecord { load_re: 0.0, ..Default::default() };
        let (line, reflection) = setup(&record);
        let synth = WaveformSynthesizer::new(101).unwrap();

        for time in [0.0, 0.13e-9, 0.4e-9, 0.77e-9] {
            let wave = synth.synthesize(&line, &reflection, 2.0, record.length_m, time).unwrap();
            assert_eq!(wave.envelope, 4.0);
            assert_relative_eq!(wave.total_v[0], 0.0, epsilon = 1e-12);
            for sample in wave.samples() {
                assert!(sample.total_v.abs() <= wave.envelope + 1e-12);
                assert_relative_eq!(
                    sample.total_v,
                    sample.forward_v + sample.reflected_v,
                    epsilon = 1e-15
                );
            }
        }
    }

    #[test]
    fn current_amplitude_scales_with_characteristic_impedance() {
        let record = ParameterRecord { load_re: 100.0, ..Default::default() };
        let (line, reflection) = setup(&record);
        let wave = WaveformSynthesizer::new(201)
            .unwrap()
            .synthesize(&line, &reflection, 1.0, record.length_m, 0.0)
            .unwrap();
        let peak = wave.forward_i.iter().fold(0.0f64, |m, &i| m.max(i.abs()));
        assert_relative_eq!(peak, 1.0 / 50.0, max_relative = 1e-3);
        // at t = 0 the reflected current is −(ρV0/|Zc|)·sin βz
        let s = wave.sample_at(25).unwrap();
        let expected = -(1.0 / 3.0) / 50.0 * (line.beta * s.position).sin();
        assert_relative_eq!(s.reflected_i, expected, max_relative = 1e-9);
        assert_relative_eq!(s.reflected_v, (1.0 / 3.0) * (line.beta * s.position).cos(), max_relative = 1e-9);
        assert!(wave.sample_at(201).is_none());
    }

    #[test]
    fn ragged_columns_do_not_panic() {
        let record = ParameterRecord::default();
        let (line, reflection) = setup(&record);
        let mut wave = WaveformSynthesizer::new(5)
            .unwrap()
            .synthesize(&line, &reflection, 1.0, record.length_m, 0.0)
            .unwrap();
        wave.total_i = Array1::zeros(3);

        assert!(wave.sample_at(2).is_some());
        assert!(wave.sample_at(3).is_none());
        assert_eq!(wave.samples().count(), 3);
    }

    #[test]
    fn needs_two_positions() {
        assert!(WaveformSynthesizer::new(1).is_err());
    }
}
