use bbcs_core::{BallColor, BallId, Command, Direction, Event, IllegalMove, Position};
use bbcs_system_clock::{Clock, ClockConfig, SimulationMode, MAX_STEPS_PER_FRAME};
use bbcs_world::{self as world, query, World};

fn running_clock(time_speed: f64) -> Clock {
    let mut clock = Clock::new(ClockConfig::new(time_speed));
    clock.toggle_run();
    clock
}

#[test]
fn emits_one_step_per_boundary_crossed() {
    let mut clock = running_clock(0.5);
    let mut commands = Vec::new();

    clock.handle(&[], 1.0, &mut commands);
    assert!(commands.is_empty());

    clock.handle(&[], 1.0, &mut commands);
    assert_eq!(commands, vec![Command::Step { index: 1 }]);

    commands.clear();
    clock.handle(&[], 5.0, &mut commands);
    assert_eq!(
        commands,
        vec![
            Command::Step { index: 2 },
            Command::Step { index: 3 },
        ]
    );
    assert_eq!(clock.time_step(), 3);
}

#[test]
fn fast_clock_spreads_pending_ticks_over_frames() {
    let mut clock = running_clock(5_000_000.0);
    let mut commands = Vec::new();

    clock.handle(&[], 1.0, &mut commands);
    assert_eq!(commands.len() as u64, MAX_STEPS_PER_FRAME);
    assert_eq!(commands.last(), Some(&Command::Step { index: MAX_STEPS_PER_FRAME }));

    commands.clear();
    clock.handle(&[], 0.0, &mut commands);
    assert_eq!(commands.len() as u64, MAX_STEPS_PER_FRAME);
    assert_eq!(
        commands.first(),
        Some(&Command::Step {
            index: MAX_STEPS_PER_FRAME + 1
        })
    );
    assert_eq!(clock.time_step(), 2 * MAX_STEPS_PER_FRAME);
}

#[test]
fn single_step_pauses_on_the_next_whole_tick() {
    let mut clock = Clock::new(ClockConfig::new(0.3));
    clock.step_once();
    let mut commands = Vec::new();

    for _ in 0..10 {
        clock.handle(&[], 1.0, &mut commands);
    }

    assert_eq!(commands, vec![Command::Step { index: 1 }]);
    assert_eq!(clock.mode(), SimulationMode::Paused);
    assert_eq!(clock.time(), 1.0);

    clock.step_once();
    for _ in 0..10 {
        clock.handle(&[], 1.0, &mut commands);
    }
    assert_eq!(
        commands,
        vec![Command::Step { index: 1 }, Command::Step { index: 2 }]
    );
}

#[test]
fn rejected_step_rewinds_and_requests_a_reset() {
    let mut clock = running_clock(1.0);
    let mut commands = Vec::new();
    clock.handle(&[], 2.0, &mut commands);
    assert_eq!(clock.time_step(), 2);

    commands.clear();
    let events = [Event::StepRejected {
        index: 2,
        error: IllegalMove::Collision {
            first: BallId::new(0),
            second: BallId::new(1),
            position: Position::new(0, 0),
        },
    }];
    clock.handle(&events, 1.0, &mut commands);

    assert_eq!(commands, vec![Command::Reset]);
    assert_eq!(clock.mode(), SimulationMode::Reset);
    assert_eq!(clock.time_step(), 0);
    assert_eq!(clock.time(), 0.0);
}

#[test]
fn clock_driven_session_resets_the_world_after_a_collision() {
    let mut world = World::new();
    let mut events = Vec::new();
    for (y, direction) in [(0, Direction::Up), (4, Direction::Down)] {
        world::apply(
            &mut world,
            Command::PlaceBall {
                position: Position::new(0, y),
                direction,
                color: BallColor::Red,
            },
            &mut events,
        );
    }
    events.clear();

    let mut clock = running_clock(1.0);
    let mut commands = Vec::new();
    let mut collided = false;

    for _ in 0..4 {
        clock.handle(&events, 1.0, &mut commands);
        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        collided |= events
            .iter()
            .any(|event| matches!(event, Event::StepRejected { index: 2, .. }));
        if collided {
            clock.handle(&events, 0.0, &mut commands);
            events.clear();
            for command in commands.drain(..) {
                world::apply(&mut world, command, &mut events);
            }
            break;
        }
    }

    assert!(collided);
    assert_eq!(events, vec![Event::SimulationReset]);
    assert_eq!(query::step_index(&world), 0);
    assert_eq!(clock.mode(), SimulationMode::Reset);
    assert!(query::ball_at(&world, Position::new(0, 4)).is_some());
}
