use std::time::Duration;

use crate::Error;

/// Nominal wall-clock spacing of ticks for a presentation layer driving the clock.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);
/// Default ticks per signal period.
pub const DEFAULT_TICKS_PER_PERIOD: usize = 50;

/// Produces the simulated time that passes per tick.
pub trait TickSource {
    /// Simulated time for the next tick, before speed scaling.
    fn next_increment(&mut self) -> f64;
}

/// Advances by the same increment on every tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedTicks {
    increment: f64,
}

impl FixedTicks {
    pub fn new(increment: f64) -> Result<Self, Error> {
        if !(increment.is_finite() && increment >= 0.0) {
            return Err(Error::invalid(
                "tick increment",
                format!("must be a non-negative number, got {}", increment),
            ));
        }
        Ok(Self { increment })
    }

    /// Splits one period of a signal at `frequency_hz` into `ticks_per_period` ticks.
    pub fn per_period(frequency_hz: f64, ticks_per_period: usize) -> Result<Self, Error> {
        if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
            return Err(Error::invalid(
                "frequency_hz",
                format!("must be greater than 0, got {}", frequency_hz),
            ));
        }
        if ticks_per_period == 0 {
            return Err(Error::invalid("ticks_per_period", "must be at least 1"));
        }
        Self::new(1.0 / (frequency_hz * ticks_per_period as f64))
    }

    #[inline]
    pub fn increment(&self) -> f64 {
        self.increment
    }
}

impl TickSource for FixedTicks {
    #[inline]
    fn next_increment(&mut self) -> f64 {
        self.increment
    }
}

/// The simulation clock: the only mutable state of an animated evaluation.
///
/// Time only moves forward, by the tick source's increment times the speed
/// multiplier, and only while the clock is running.
#[derive(Clone, Debug)]
pub struct AnimationClock<T: TickSource> {
    source: T,
    time: f64,
    speed: f64,
    paused: bool,
}

impl<T: TickSource> AnimationClock<T> {
    pub fn new(source: T, speed: f64) -> Result<Self, Error> {
        Ok(Self {
            source,
            time: 0.0,
            speed: check_speed(speed)?,
            paused: false,
        })
    }

    /// Advances the clock by one tick and returns the new time.
    pub fn tick(&mut self) -> f64 {
        if self.paused {
            return self.time;
        }
        let increment = self.source.next_increment();
        if increment.is_finite() && increment >= 0.0 {
            self.time += increment * self.speed;
        } else {
            tracing::warn!(increment, "ignoring invalid tick increment");
        }
        tracing::trace!(time = self.time, "tick");
        self.time
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), Error> {
        self.speed = check_speed(speed)?;
        Ok(())
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}

fn check_speed(speed: f64) -> Result<f64, Error> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(Error::invalid(
            "speed_multiplier",
            format!("must be a non-negative number, got {}", speed),
        ))
    }
}
