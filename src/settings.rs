//! Layered runtime configuration.
//!
//! Sources, lowest priority first: the defaults compiled into the binary, an optional
//! user TOML file, then `TLINE_*` environment variables (`TLINE_LINE__Z0=75`).

use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::clock::{FixedTicks, DEFAULT_TICKS_PER_PERIOD};
use crate::params::{ParameterRecord, Preset};
use crate::simulation::EvaluationOptions;
use crate::smith::SmithChart;
use crate::waveform::DEFAULT_SAMPLES;
use crate::Error;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "TLINE";

/// How the clock and the waveform sampler are driven.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    /// Clock ticks per signal period.
    #[serde(default = "default_ticks_per_period")]
    pub ticks_per_period: usize,
    /// Ticks advanced by a batch run.
    pub ticks: usize,
    /// Positions sampled along the line.
    #[serde(default = "default_samples")]
    pub samples: usize,
}

fn default_ticks_per_period() -> usize {
    DEFAULT_TICKS_PER_PERIOD
}

fn default_samples() -> usize {
    DEFAULT_SAMPLES
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReflectionSettings {
    pub saturation_threshold: f64,
}

/// Runtime configuration for the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub line: ParameterRecord,
    pub animation: AnimationSettings,
    pub chart: SmithChart,
    pub reflection: ReflectionSettings,
}

impl Settings {
    /// Loads the defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut builder = defaults();
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        Self::build(builder)
    }

    /// Loads the defaults overlaid with a TOML document. The environment is not read.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Self::build(defaults().add_source(File::from_str(text, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self, Error> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), Error> {
        self.line.validate()?;
        self.chart.validated()?;
        if self.animation.ticks_per_period == 0 {
            return Err(Error::invalid("animation.ticks_per_period", "must be at least 1"));
        }
        if self.animation.samples < 2 {
            return Err(Error::invalid(
                "animation.samples",
                format!("need at least 2 positions, got {}", self.animation.samples),
            ));
        }
        let threshold = self.reflection.saturation_threshold;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(Error::invalid(
                "reflection.saturation_threshold",
                format!("must lie in (0, 1), got {}", threshold),
            ));
        }
        Ok(())
    }

    /// Applies `name=value` edits to the line, then the preset. Validates the result.
    pub fn apply_overrides(
        &mut self,
        assignments: &[(String, String)],
        preset: Option<Preset>,
    ) -> Result<(), Error> {
        let mut line = self.line.clone();
        for (name, value) in assignments {
            line.set_field(name, value)?;
        }
        if let Some(preset) = preset {
            line.apply_preset(preset);
        }
        line.validate()?;
        self.line = line;
        Ok(())
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            samples: self.animation.samples,
            chart: self.chart,
            saturation_threshold: self.reflection.saturation_threshold,
        }
    }

    /// A tick source splitting each signal period into `ticks_per_period` ticks.
    pub fn tick_source(&self) -> Result<FixedTicks, Error> {
        FixedTicks::per_period(self.line.frequency_hz, self.animation.ticks_per_period)
    }
}

fn defaults() -> ConfigBuilder<config::builder::DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

/// Splits `name=value`.
pub fn parse_assignment(text: &str) -> Result<(String, String), Error> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::invalid(text, "expected name=value")),
    }
}
