//! Includes commonly used library components.

pub use crate::{
    clock::{AnimationClock, FixedTicks, TickSource},
    complex::Complex,
    line::{DerivedLineState, LineQuantity},
    params::{ParameterRecord, Preset},
    settings::Settings,
    smith::SmithChart,
    transform::{ImpedanceTransformer, Saturable},
    waveform::WaveformSynthesizer,
    Error,
    evaluate,
    Evaluation,
    EvaluationOptions,
    RunDescriptor,
    Simulation,
    SimulationDescriptor,
};
