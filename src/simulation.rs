use std::fmt;

use serde::Serialize;

use crate::clock::{AnimationClock, TickSource};
use crate::line::{DerivedLineState, LineFigures};
use crate::params::{LineParameters, ParameterRecord};
use crate::smith::{ChartPoints, SmithChart, SmithGrid};
use crate::transform::{
    ImpedanceTransformer, ReflectionMetrics, ReflectionState, DEFAULT_SATURATION_THRESHOLD,
    VSWR_SENTINEL,
};
use crate::waveform::{Waveform, WaveformSynthesizer, DEFAULT_SAMPLES};
use crate::Error;

/// Evaluation specific parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvaluationOptions {
    /// The number of positions sampled along the line.
    pub samples: usize,
    /// Where the Smith chart is drawn.
    pub chart: SmithChart,
    /// Reflection magnitude at which VSWR saturates.
    pub saturation_threshold: f64,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            chart: SmithChart::default(),
            saturation_threshold: DEFAULT_SATURATION_THRESHOLD,
        }
    }
}

/// Everything the engine knows about the line at one instant.
#[derive(Clone, Debug, Serialize)]
pub struct Evaluation {
    pub time: f64,
    pub params: LineParameters,
    pub line: DerivedLineState,
    pub figures: LineFigures,
    pub reflection: ReflectionState,
    pub metrics: ReflectionMetrics,
    pub points: ChartPoints,
    pub grid: SmithGrid,
    pub waveform: Waveform,
}

/// Computes every output from scratch for `params` at `time`.
pub fn evaluate(
    params: &LineParameters,
    options: &EvaluationOptions,
    time: f64,
) -> Result<Evaluation, Error> {
    let chart = options.chart.validated()?;
    let transformer =
        ImpedanceTransformer::new(params.z0)?.with_saturation_threshold(options.saturation_threshold)?;
    let synthesizer = WaveformSynthesizer::new(options.samples)?;

    let line = DerivedLineState::new(params)?;
    let reflection = transformer.transform(&line, params.load, params.length_m)?;
    let metrics = transformer.metrics(&line, &reflection, params.load, params.source_voltage);
    let waveform =
        synthesizer.synthesize(&line, &reflection, params.source_voltage, params.length_m, time)?;

    Ok(Evaluation {
        time,
        params: *params,
        figures: line.figures(params.length_m),
        points: ChartPoints::new(&chart, &reflection, params.load),
        grid: SmithGrid::standard(&chart)?,
        line,
        reflection,
        metrics,
        waveform,
    })
}

/// Describes a simulation.
pub struct SimulationDescriptor<T: TickSource> {
    /// The parameters the simulation starts with.
    pub record: ParameterRecord,
    /// Drives the simulation clock.
    pub tick_source: T,
    pub options: EvaluationOptions,
}

/// Describes a simulation run.
pub struct RunDescriptor {
    /// How many ticks to advance.
    pub ticks: usize,
    /// Whether or not to show progress on the console.
    pub verbose: bool,
}

/// An animated evaluation: a parameter snapshot plus the clock that animates it.
pub struct Simulation<T: TickSource> {
    params: LineParameters,
    clock: AnimationClock<T>,
    options: EvaluationOptions,
}

impl<T: TickSource> Simulation<T> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<T>) -> Result<Self, Error> {
        let params = desc.record.validate()?;
        let clock = AnimationClock::new(desc.tick_source, desc.record.speed_multiplier)?;

        // fail early rather than on the first tick
        evaluate(&params, &desc.options, 0.0)?;

        Ok(Self {
            params,
            clock,
            options: desc.options,
        })
    }

    #[inline]
    pub fn params(&self) -> &LineParameters {
        &self.params
    }

    #[inline]
    pub fn clock(&self) -> &AnimationClock<T> {
        &self.clock
    }

    #[inline]
    pub fn clock_mut(&mut self) -> &mut AnimationClock<T> {
        &mut self.clock
    }

    /// Replaces the parameter snapshot. On error the previous snapshot stays in place.
    pub fn set_record(&mut self, record: &ParameterRecord) -> Result<(), Error> {
        let params = record.validate()?;
        evaluate(&params, &self.options, self.clock.time())?;
        self.clock.set_speed(record.speed_multiplier)?;
        self.params = params;
        Ok(())
    }

    /// Evaluates the current snapshot at the current clock time.
    pub fn evaluate(&self) -> Result<Evaluation, Error> {
        evaluate(&self.params, &self.options, self.clock.time())
    }

    /// Advances one tick and evaluates.
    pub fn step(&mut self) -> Result<Evaluation, Error> {
        self.clock.tick();
        self.evaluate()
    }

    /// Does a run of `desc.ticks` ticks and returns the last evaluation.
    pub fn run(&mut self, desc: RunDescriptor) -> Result<Evaluation, Error> {
        self.run_each(desc, |_| ())
    }

    /// Like [`Simulation::run`], handing every intermediate evaluation to `on_frame`.
    ///
    /// Only the latest evaluation is kept alive, whatever the number of ticks.
    pub fn run_each<F>(&mut self, desc: RunDescriptor, mut on_frame: F) -> Result<Evaluation, Error>
    where
        F: FnMut(&Evaluation),
    {
        // setup output if verbose
        let bar = if desc.verbose {
            println!("# of ticks: {}", desc.ticks);
            Some(indicatif::ProgressBar::new(desc.ticks as u64))
        } else {
            None
        };

        let mut latest = None;
        for _ in 0..desc.ticks {
            let frame = self.step()?;
            on_frame(&frame);
            latest = Some(frame);
            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        if let Some(ref bar) = bar {
            bar.finish();
        }

        match latest {
            Some(frame) => Ok(frame),
            None => self.evaluate(),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = &self.line;
        let metrics = &self.metrics;
        let zin = match self.reflection.input_impedance.finite() {
            Some(z) => format!("{:.3} Ω", z),
            None => "open".to_string(),
        };
        let return_loss = match metrics.return_loss_db.finite() {
            Some(rl) => format!("{:.3} dB", rl),
            None => "∞".to_string(),
        };
        let vswr = match metrics.vswr.finite() {
            Some(v) => format!("{:.3}", v),
            None => format!("saturated (>{})", VSWR_SENTINEL),
        };
        write!(
            f,
            "Line:
  - Z: {:.4} Ω/m
  - Y: {:.4} S/m
  - γ: {:.6} 1/m (α = {:.6} Np/m, β = {:.6} rad/m)
  - Zc: {:.3} Ω
  - Wavelength: {:.4} m
  - Phase Velocity: {:.4} m/s
  - Attenuation: {:.4} dB
  - Electrical Length: {:.2}°
  - Time Delay: {:.4} s
Reflection:
  - ΓL: {:.4} (|ΓL| = {:.4})
  - Γin: {:.4}
  - Zin: {}
  - VSWR: {}
  - Return Loss: {}
  - Reflected Power: {:.4} W
Chart:
  - Load: ({:.1}, {:.1})
  - Input: ({:.1}, {:.1})
Waveform at t = {:e} s:
  - Samples: {}
  - Envelope: ±{:.4} V
",
            ScientificComplex(line.series_impedance),
            ScientificComplex(line.shunt_admittance),
            line.gamma,
            line.alpha,
            line.beta,
            line.characteristic_impedance,
            line.wavelength,
            line.phase_velocity,
            self.figures.attenuation_db,
            self.figures.electrical_length_deg,
            self.figures.time_delay,
            self.reflection.gamma_load,
            self.reflection.gamma_load.mag(),
            self.reflection.gamma_input,
            zin,
            vswr,
            return_loss,
            metrics.reflected_power,
            self.points.load.x,
            self.points.load.y,
            self.points.input.x,
            self.points.input.y,
            self.time,
            self.waveform.len(),
            self.waveform.envelope,
        )
    }
}

struct ScientificComplex(crate::complex::Complex);

impl fmt::Display for ScientificComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(3);
        write!(f, "{:.*e} {:+.*e}j", p, self.0.re, p, self.0.im)
    }
}
