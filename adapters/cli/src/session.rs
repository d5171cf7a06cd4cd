use bbcs_core::{Command, Event, IllegalMove, StepReport};
use bbcs_system_clock::Clock;
use bbcs_world::{self as world, World};

use crate::settings::Settings;

/// How a bounded run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Every requested tick was committed.
    Completed {
        /// Index of the last committed tick.
        steps: u64,
    },
    /// A tick was rejected; the world still holds the last committed state.
    Rejected {
        /// Index of the rejected tick.
        index: u64,
        /// Condition that made the tick illegal.
        error: IllegalMove,
    },
}

/// Headless frame loop pairing one world with one clock.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    clock: Clock,
    frame_delta: f64,
    events: Vec<Event>,
    commands: Vec<Command>,
}

impl Session {
    pub(crate) fn new(world: World, settings: &Settings) -> Self {
        Self {
            world,
            clock: Clock::new(settings.clock_config()),
            frame_delta: settings.frame_delta,
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Feeds frames to the clock until `steps` ticks committed or one is rejected.
    ///
    /// `observe` sees every committed tick in order.
    pub(crate) fn run(&mut self, steps: u64, mut observe: impl FnMut(&StepReport)) -> Outcome {
        if steps == 0 {
            return Outcome::Completed { steps };
        }

        self.clock.toggle_run();
        loop {
            self.clock
                .handle(&self.events, self.frame_delta, &mut self.commands);
            self.events.clear();
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut self.events);
                match self.events.last() {
                    Some(Event::StepCompleted { report }) => {
                        observe(report);
                        if report.index >= steps {
                            return Outcome::Completed { steps };
                        }
                    }
                    Some(Event::StepRejected { index, error }) => {
                        return Outcome::Rejected {
                            index: *index,
                            error: *error,
                        };
                    }
                    _ => {}
                }
            }
        }
    }
}
