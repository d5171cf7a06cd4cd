#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation clock that turns continuous frame time into discrete ticks.
//!
//! Adapters feed the clock the time elapsed per frame together with the
//! world's latest events. Whenever the accumulated time crosses a whole
//! number the clock emits exactly one [`Command::Step`] per boundary crossed,
//! at most [`MAX_STEPS_PER_FRAME`] per frame, and it answers a rejected tick
//! by rewinding itself and emitting [`Command::Reset`].

use bbcs_core::{Command, Event};

const DEFAULT_TIME_SPEED: f64 = 0.05;

/// Upper bound on the ticks requested by a single [`Clock::handle`] call.
///
/// Boundaries beyond the bound stay pending and are emitted on later frames.
pub const MAX_STEPS_PER_FRAME: u64 = 64;

/// Describes whether the simulation is advancing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SimulationMode {
    /// Time accumulates every frame.
    Running,
    /// Time is frozen mid-simulation; edits stay disabled.
    Paused,
    /// Resting at the authored state; edits are enabled.
    Reset,
}

/// Configuration parameters required to construct the clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockConfig {
    time_speed: f64,
}

impl ClockConfig {
    /// Creates a configuration advancing `time_speed` ticks per unit of frame time.
    #[must_use]
    pub const fn new(time_speed: f64) -> Self {
        Self { time_speed }
    }

    /// Ticks advanced per unit of frame time.
    #[must_use]
    pub const fn time_speed(&self) -> f64 {
        self.time_speed
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SPEED)
    }
}

/// Pure system that schedules ticks from accumulated frame time.
#[derive(Clone, Debug)]
pub struct Clock {
    config: ClockConfig,
    mode: SimulationMode,
    time: f64,
    time_step: u64,
    run_until: Option<f64>,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl Clock {
    /// Creates a clock resting at the authored state.
    #[must_use]
    pub const fn new(config: ClockConfig) -> Self {
        Self {
            config,
            mode: SimulationMode::Reset,
            time: 0.0,
            time_step: 0,
            run_until: None,
        }
    }

    /// Current simulation mode.
    #[must_use]
    pub const fn mode(&self) -> SimulationMode {
        self.mode
    }

    /// Continuous simulation time measured in ticks.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Index of the last tick the clock requested.
    #[must_use]
    pub const fn time_step(&self) -> u64 {
        self.time_step
    }

    /// Fraction of the way from the last requested tick to the next one.
    ///
    /// Renderers use this to interpolate ball positions between ticks.
    #[must_use]
    pub fn phase(&self) -> f64 {
        (self.time - self.time_step as f64).clamp(0.0, 1.0)
    }

    /// Starts running, or pauses when already running.
    pub fn toggle_run(&mut self) {
        if self.mode == SimulationMode::Running {
            self.mode = SimulationMode::Paused;
        } else {
            self.run_until = None;
            self.mode = SimulationMode::Running;
        }
    }

    /// Runs until the next whole tick and then pauses.
    pub fn step_once(&mut self) {
        self.run_until = Some(self.time.floor() + 1.0);
        self.mode = SimulationMode::Running;
    }

    /// Rewinds the clock and asks the world to restore the authored state.
    pub fn reset(&mut self, out: &mut Vec<Command>) {
        self.mode = SimulationMode::Reset;
        self.time = 0.0;
        self.time_step = 0;
        self.run_until = None;
        out.push(Command::Reset);
    }

    /// Consumes world events and frame time to emit tick commands.
    pub fn handle(&mut self, events: &[Event], frame_delta: f64, out: &mut Vec<Command>) {
        let rejected = events.iter().find_map(|event| match event {
            Event::StepRejected { index, error } => Some((*index, *error)),
            _ => None,
        });
        if let Some((index, error)) = rejected {
            log::warn!("illegal move on step {index}: {error}; resetting the simulation");
            self.reset(out);
            return;
        }

        if self.mode == SimulationMode::Running {
            self.time += self.config.time_speed * frame_delta.max(0.0);
            if let Some(limit) = self.run_until {
                if self.time >= limit {
                    self.time = limit;
                    self.run_until = None;
                    self.mode = SimulationMode::Paused;
                }
            }
        }

        let mut emitted = 0;
        while emitted < MAX_STEPS_PER_FRAME && self.time.floor() > self.time_step as f64 {
            emitted += 1;
            self.time_step += 1;
            out.push(Command::Step {
                index: self.time_step,
            });
        }
    }
}
