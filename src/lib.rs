//! A parameter engine for uniform transmission lines.
//!
//! From the per-unit-length constants of a line, its length, a load and a frequency,
//! the engine derives the propagation constant and characteristic impedance,
//! transforms the load to the generator end, projects both onto a Smith chart and
//! samples the forward, reflected and standing waves along the line.
//!
//! To get started, build a `ParameterRecord`, then either call [`evaluate`] once or
//! drive a [`Simulation`] with a tick source.

mod simulation;

pub mod clock;
pub mod complex;
pub mod line;
pub mod params;
pub mod prelude;
pub mod settings;
pub mod smith;
pub mod transform;
pub mod waveform;

pub use simulation::{
    evaluate, Evaluation, EvaluationOptions, RunDescriptor, Simulation, SimulationDescriptor,
};

/// Represents an error in the engine.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Division by a complex number with vanishing magnitude (|z|² = {norm_sqr:e})")]
    SingularDivision { norm_sqr: f64 },
    #[error("The {quantity} of this line is undefined, its phase constant vanishes")]
    UndefinedLineQuantity { quantity: &'static str },
    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Reflection magnitude {magnitude} reached the saturation threshold {threshold}")]
    SaturatedReflection { magnitude: f64, threshold: f64 },
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Shorthand for `Error::InvalidParameter`.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
