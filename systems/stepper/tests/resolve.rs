use std::collections::BTreeSet;

use bbcs_core::{
    BallColor, BallId, BallSnapshot, BallView, Direction, Edge, IllegalMove, Position,
};
use bbcs_system_stepper::Stepper;
use proptest::prelude::*;

fn ball(id: u32, x: i32, y: i32, direction: Direction) -> BallSnapshot {
    BallSnapshot {
        id: BallId::new(id),
        position: Position::new(x, y),
        direction,
        color: BallColor::Yellow,
        authored_position: Position::new(x, y),
        authored_direction: direction,
    }
}

fn edge(a: (i32, i32), b: (i32, i32)) -> Edge {
    Edge::between(Position::new(a.0, a.1), Position::new(b.0, b.1)).expect("diagonal edge")
}

#[test]
fn positive_wall_turns_down_into_left() {
    let wall = edge((-2, 4), (-1, 5));
    let walls = BTreeSet::from([wall]);
    let view = BallView::from_snapshots(vec![ball(0, -1, 5, Direction::Down)]);

    let report = Stepper::new()
        .resolve(&view, 0, 1, |edge| walls.contains(&edge))
        .expect("legal step");

    assert_eq!(report.index, 1);
    let moved = &report.moves[0];
    assert_eq!(moved.from, Position::new(-1, 5));
    assert_eq!(moved.to, Position::new(-2, 5));
    assert_eq!(moved.direction, Direction::Left);
    assert_eq!(moved.deflected_by, Some(wall));
}

#[test]
fn negative_wall_turns_right_into_down() {
    let wall = edge((1, 1), (2, 0));
    let walls = BTreeSet::from([wall]);
    let view = BallView::from_snapshots(vec![ball(3, 1, 0, Direction::Right)]);

    let report = Stepper::new()
        .resolve(&view, 1, 2, |edge| walls.contains(&edge))
        .expect("legal step");

    assert_eq!(report.moves[0].to, Position::new(1, -1));
    assert_eq!(report.moves[0].direction, Direction::Down);
}

#[test]
fn ball_off_the_step_sublattice_is_a_parity_violation() {
    let view = BallView::from_snapshots(vec![
        ball(0, 0, 0, Direction::Up),
        ball(1, 1, 0, Direction::Up),
    ]);

    let result = Stepper::new().resolve(&view, 0, 1, |_| false);

    assert_eq!(
        result,
        Err(IllegalMove::ParityViolation {
            ball: BallId::new(1),
            position: Position::new(1, 1),
            step: 1,
        })
    );
}

#[test]
fn ambiguity_is_reported_before_a_collision() {
    let walls = BTreeSet::from([edge((-2, 4), (-1, 5)), edge((-1, 5), (0, 4))]);
    let view = BallView::from_snapshots(vec![
        ball(0, 0, 2, Direction::Up),
        ball(1, 0, 4, Direction::Down),
        ball(2, -1, 5, Direction::Down),
    ]);

    let result = Stepper::new().resolve(&view, 0, 1, |edge| walls.contains(&edge));

    assert_eq!(
        result,
        Err(IllegalMove::AmbiguousDeflection {
            ball: BallId::new(2),
            position: Position::new(-1, 5),
        })
    );
}

#[test]
fn collision_names_the_two_lowest_identifiers_landing_together() {
    let view = BallView::from_snapshots(vec![
        ball(7, 1, 3, Direction::Left),
        ball(2, 0, 2, Direction::Up),
        ball(5, 0, 4, Direction::Down),
    ]);

    let result = Stepper::new().resolve(&view, 0, 1, |_| false);

    assert_eq!(
        result,
        Err(IllegalMove::Collision {
            first: BallId::new(2),
            second: BallId::new(5),
            position: Position::new(0, 3),
        })
    );
}

#[test]
fn simultaneous_collisions_report_the_lowest_colliding_ball() {
    let view = BallView::from_snapshots(vec![
        ball(0, 0, 0, Direction::Right),
        ball(1, 10, 0, Direction::Right),
        ball(2, 12, 0, Direction::Left),
        ball(3, 2, 0, Direction::Left),
    ]);

    let result = Stepper::new().resolve(&view, 0, 1, |_| false);

    assert_eq!(
        result,
        Err(IllegalMove::Collision {
            first: BallId::new(0),
            second: BallId::new(3),
            position: Position::new(1, 0),
        })
    );
}

#[test]
fn stepper_scratch_state_does_not_leak_between_ticks() {
    let mut stepper = Stepper::new();
    let first = BallView::from_snapshots(vec![ball(0, 0, 0, Direction::Right)]);
    let _ = stepper.resolve(&first, 0, 1, |_| false).expect("legal step");

    let second = BallView::from_snapshots(vec![ball(1, 0, 1, Direction::Right)]);
    let report = stepper
        .resolve(&second, 1, 2, |_| false)
        .expect("landing map is cleared every tick");
    assert_eq!(report.moves[0].to, Position::new(1, 1));
}

proptest! {
    #[test]
    fn every_move_advances_exactly_one_unit(
        x in -100i32..100,
        y in -100i32..100,
        heading in 0usize..4,
        walled in proptest::bool::ANY,
    ) {
        let x = if (x + y) % 2 == 0 { x } else { x + 1 };
        let direction = Direction::ALL[heading];
        let [first, _] = direction.flanking_anchors(Position::new(x, y));
        let walls: BTreeSet<Edge> = if walled {
            BTreeSet::from([bbcs_core::wall_coordinates(first.x(), first.y())])
        } else {
            BTreeSet::new()
        };
        let view = BallView::from_snapshots(vec![ball(0, x, y, direction)]);

        let report = Stepper::new()
            .resolve(&view, 0, 1, |edge| walls.contains(&edge))
            .expect("single ball never fails");
        let moved = &report.moves[0];
        let (dx, dy) = moved.direction.vector();

        prop_assert_eq!(moved.to, Position::new(x + dx, y + dy));
        prop_assert_eq!(moved.deflected_by.is_some(), walled);
        if walled {
            prop_assert_ne!(moved.direction, direction);
            prop_assert_ne!(moved.direction, direction.reverse());
        } else {
            prop_assert_eq!(moved.direction, direction);
        }
    }
}
