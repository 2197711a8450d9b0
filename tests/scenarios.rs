use approx::assert_relative_eq;
use physical_constants::SPEED_OF_LIGHT_IN_VACUUM;

use tline_engine::prelude::*;
use tline_engine::transform::{input_impedance_hyperbolic, VSWR_SENTINEL};

fn evaluate_record(record: &ParameterRecord) -> Evaluation {
    let params = record.validate().unwrap();
    evaluate(&params, &EvaluationOptions::default(), 0.0).unwrap()
}

#[test]
fn matched_line() {
    let eval = evaluate_record(&ParameterRecord::default());

    assert_eq!(eval.reflection.gamma_load, Complex::ZERO);
    assert!(eval.reflection.gamma_input.approx_eq(Complex::ZERO, 1e-15));
    let zin = eval.reflection.input_impedance.finite().unwrap();
    assert!(zin.approx_eq(Complex::real(50.0), 1e-9));
    assert_eq!(eval.metrics.vswr, Saturable::Finite(1.0));
    assert!(eval.metrics.return_loss_db.is_saturated());
    assert_eq!(eval.metrics.reflected_power.value(), Some(0.0));

    // both markers sit at the chart center
    assert_relative_eq!(eval.points.load.x, 400.0);
    assert_relative_eq!(eval.points.input.y, 300.0);
    assert_eq!(eval.points.load.origin, Complex::real(50.0));
}

#[test]
fn quarter_wave_short_looks_open() {
    let mut record = ParameterRecord { length_m: 0.05, ..Default::default() };
    record.apply_preset(Preset::Short);
    let eval = evaluate_record(&record);

    assert_relative_eq!(eval.figures.electrical_length_deg, 90.0, max_relative = 1e-9);
    assert!(eval.metrics.vswr.is_saturated());
    assert_eq!(eval.metrics.vswr.or_sentinel(VSWR_SENTINEL), 999.0);
    match eval.reflection.input_impedance {
        Saturable::Finite(zin) => assert!(zin.mag() > 1e6),
        Saturable::Saturated => {}
    }
    // the input marker lands on the open circuit point
    assert_relative_eq!(eval.points.input.x, 600.0, max_relative = 1e-9);
}

#[test]
fn quarter_wave_open_looks_shorted() {
    let mut record = ParameterRecord { length_m: 0.05, ..Default::default() };
    record.apply_preset(Preset::Open);
    let eval = evaluate_record(&record);

    let zin = eval.reflection.input_impedance.finite().unwrap();
    assert!(zin.mag() < 1e-3);
    assert!(eval.metrics.try_vswr().is_err());
    assert!(eval.metrics.input_admittance.is_saturated() || eval.metrics.input_admittance.finite().unwrap().mag() > 1e3);
}

#[test]
fn mismatched_load_waveform() {
    let mut record = ParameterRecord { source_voltage: 3.0, ..Default::default() };
    record.apply_preset(Preset::Mismatch100);
    let eval = evaluate_record(&record);

    assert_relative_eq!(eval.metrics.magnitude, 1.0 / 3.0, max_relative = 1e-9);
    assert_relative_eq!(eval.metrics.try_vswr().unwrap(), 2.0, max_relative = 1e-9);
    assert_relative_eq!(eval.waveform.envelope, 4.0, max_relative = 1e-9);
    assert_eq!(eval.waveform.len(), 201);
    for sample in eval.waveform.samples() {
        assert!(sample.total_v.abs() <= eval.waveform.envelope + 1e-9);
    }
    // 25 Ω seen through half a wavelength is 25 Ω again
    let mut record = ParameterRecord::default();
    record.apply_preset(Preset::Mismatch25);
    let zin = evaluate_record(&record).reflection.input_impedance.finite().unwrap();
    assert!(zin.approx_eq(Complex::real(25.0), 1e-6));
}

#[test]
fn air_line_propagates_at_the_speed_of_light() {
    let z0 = 50.0;
    let record = ParameterRecord {
        l: z0 / SPEED_OF_LIGHT_IN_VACUUM,
        c: 1.0 / (z0 * SPEED_OF_LIGHT_IN_VACUUM),
        ..Default::default()
    };
    let eval = evaluate_record(&record);

    assert_relative_eq!(
        eval.line.try_phase_velocity().unwrap(),
        SPEED_OF_LIGHT_IN_VACUUM,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        eval.line.try_wavelength().unwrap(),
        SPEED_OF_LIGHT_IN_VACUUM / 1e9,
        max_relative = 1e-12
    );
    assert_relative_eq!(eval.line.characteristic_impedance.re, z0, max_relative = 1e-12);
}

#[test]
fn hyperbolic_and_rotated_input_impedance_agree() {
    let record = ParameterRecord { load_re: 30.0, load_im: 20.0, length_m: 0.037, ..Default::default() };
    let eval = evaluate_record(&record);
    let rotated = eval.reflection.input_impedance.finite().unwrap();
    let hyperbolic = input_impedance_hyperbolic(&eval.line, record.load(), record.length_m).unwrap();
    assert!(rotated.approx_eq(hyperbolic, 1e-9));
}

#[test]
fn simulation_returns_to_its_start_after_one_period() {
    let settings = Settings::from_toml("[animation]\nticks = 50\nticks_per_period = 50\n").unwrap();
    let mut record = settings.line.clone();
    record.apply_preset(Preset::Mismatch100);

    let mut sim = Simulation::new(SimulationDescriptor {
        tick_source: settings.tick_source().unwrap(),
        record,
        options: settings.evaluation_options(),
    })
    .unwrap();
    let start = sim.evaluate().unwrap();
    let mut quarter = None;
    let last = sim
        .run_each(
            RunDescriptor { ticks: settings.animation.ticks, verbose: false },
            |frame| {
                if quarter.is_none() && frame.time >= 2.4e-10 * (1.0 - 1e-9) {
                    quarter = Some(frame.waveform.total_v[0]);
                }
            },
        )
        .unwrap();

    assert_relative_eq!(last.time, 1e-9, max_relative = 1e-9);
    for (a, b) in start.waveform.total_v.iter().zip(last.waveform.total_v.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
    // a quarter period in, the waves have moved
    assert!((quarter.unwrap() - start.waveform.total_v[0]).abs() > 0.1);
}

#[test]
fn paused_clock_freezes_the_waveform() {
    let record = ParameterRecord::default();
    let mut sim = Simulation::new(SimulationDescriptor {
        tick_source: FixedTicks::per_period(record.frequency_hz, 50).unwrap(),
        record,
        options: EvaluationOptions::default(),
    })
    .unwrap();
    sim.step().unwrap();
    sim.clock_mut().pause();
    let a = sim.step().unwrap();
    let b = sim.step().unwrap();
    assert_eq!(a.time, b.time);
    assert_eq!(a.waveform, b.waveform);
}

#[test]
fn evaluation_serializes_to_json() {
    let mut record = ParameterRecord::default();
    record.apply_preset(Preset::Short);
    let eval = evaluate_record(&record);
    let json = serde_json::to_value(&eval).unwrap();
    assert_eq!(json["metrics"]["vswr"], serde_json::json!("saturated"));
    assert_eq!(json["grid"]["angles"].as_array().unwrap().len(), 12);
}
