use tline_engine::clock::{DEFAULT_TICKS_PER_PERIOD, TICK_INTERVAL};
use tline_engine::prelude::*;

fn main() {
    let capacitance = 100e-12; // [F / m]
    let inductance = 250e-9; // [H / m]

    // a quarter wave 50 Ω line at 1 GHz into a 100 Ω load
    let record = ParameterRecord {
        l: inductance,
        c: capacitance,
        length_m: 0.05, // [m]
        load_re: 100.0, // [Ω]
        ..Default::default()
    };

    let mut simulation = Simulation::new(SimulationDescriptor {
        tick_source: FixedTicks::per_period(record.frequency_hz, DEFAULT_TICKS_PER_PERIOD).unwrap(),
        record,
        options: EvaluationOptions::default(),
    })
    .unwrap();

    let eval = simulation.evaluate().unwrap();
    println!(
        "\n-- General Line Info --\n\
        Zc:           {:.3} Ω\n\
        λ:            {:.2} m\n\
        βl:           {:.1}°\n",
        eval.line.characteristic_impedance,
        eval.line.wavelength,
        eval.figures.electrical_length_deg,
    );

    println!("-- Run --");
    // animate one full period at display pace
    let last = simulation
        .run_each(
            RunDescriptor {
                ticks: DEFAULT_TICKS_PER_PERIOD,
                verbose: true,
            },
            |_| std::thread::sleep(TICK_INTERVAL),
        )
        .unwrap();

    print!("{}", last);
}
