#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure per-tick transition that resolves ball movement against the walls.
//!
//! The stepper never mutates world state. It reads an immutable [`BallView`],
//! asks the caller whether a wall occupies a given edge, and either returns
//! the complete set of moves for the tick or the first condition that makes
//! the tick illegal. Committing the moves is the world's responsibility, which
//! keeps every tick all-or-nothing.

use std::collections::BTreeMap;

use bbcs_core::{
    wall_coordinates, BallId, BallMove, BallSnapshot, BallView, Edge, IllegalMove, Position,
    StepReport,
};

/// Deterministic tick resolver with reusable scratch storage.
#[derive(Debug, Default)]
pub struct Stepper {
    landing: BTreeMap<Position, BallId>,
}

impl Stepper {
    /// Creates a new stepper with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves tick `index` for every ball in `balls`.
    ///
    /// `completed` is the index of the last committed tick; `index` must be
    /// exactly one greater. The `has_wall` closure should mirror the world's
    /// `query::has_wall` helper.
    ///
    /// Conditions are checked in a fixed order so that the reported failure
    /// is reproducible: ambiguous deflections first, then sublattice parity,
    /// then collisions, each scanning balls by ascending identifier. When
    /// several groups of balls collide, the group containing the lowest
    /// identifier is reported.
    pub fn resolve<F>(
        &mut self,
        balls: &BallView,
        completed: u64,
        index: u64,
        mut has_wall: F,
    ) -> Result<StepReport, IllegalMove>
    where
        F: FnMut(Edge) -> bool,
    {
        let expected = completed.saturating_add(1);
        if index != expected {
            return Err(IllegalMove::OutOfSequence {
                expected,
                received: index,
            });
        }

        let moves = balls
            .iter()
            .map(|ball| resolve_ball(ball, &mut has_wall))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(stray) = moves
            .iter()
            .find(|entry| !entry.to.matches_step_parity(index))
        {
            return Err(IllegalMove::ParityViolation {
                ball: stray.ball,
                position: stray.to,
                step: index,
            });
        }

        self.landing.clear();
        let mut collision: Option<IllegalMove> = None;
        for entry in &moves {
            let Some(&first) = self.landing.get(&entry.to) else {
                let _ = self.landing.insert(entry.to, entry.ball);
                continue;
            };
            let lower = match collision {
                Some(IllegalMove::Collision {
                    first: best_first,
                    second: best_second,
                    ..
                }) => (first, entry.ball) < (best_first, best_second),
                _ => true,
            };
            if lower {
                collision = Some(IllegalMove::Collision {
                    first,
                    second: entry.ball,
                    position: entry.to,
                });
            }
        }

        match collision {
            Some(error) => Err(error),
            None => Ok(StepReport { index, moves }),
        }
    }
}

fn resolve_ball<F>(ball: &BallSnapshot, has_wall: &mut F) -> Result<BallMove, IllegalMove>
where
    F: FnMut(Edge) -> bool,
{
    let mut crossed = ball
        .direction
        .flanking_anchors(ball.position)
        .into_iter()
        .map(|anchor| wall_coordinates(anchor.x(), anchor.y()))
        .filter(|edge| has_wall(*edge));

    let deflected_by = crossed.next();
    if deflected_by.is_some() && crossed.next().is_some() {
        return Err(IllegalMove::AmbiguousDeflection {
            ball: ball.id,
            position: ball.position,
        });
    }

    let direction = match deflected_by {
        Some(edge) => {
            let reflected = edge.orientation().reflect(ball.direction);
            log::trace!(
                "ball {} deflected by {edge} at {}: {} -> {reflected}",
                ball.id,
                ball.position,
                ball.direction
            );
            reflected
        }
        None => ball.direction,
    };

    Ok(BallMove {
        ball: ball.id,
        from: ball.position,
        to: ball.position.offset(direction),
        direction,
        deflected_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbcs_core::{BallColor, Direction};

    fn ball(id: u32, x: i32, y: i32, direction: Direction) -> BallSnapshot {
        BallSnapshot {
            id: BallId::new(id),
            position: Position::new(x, y),
            direction,
            color: BallColor::Blue,
            authored_position: Position::new(x, y),
            authored_direction: direction,
        }
    }

    #[test]
    fn straight_move_keeps_direction() {
        let moved = resolve_ball(&ball(0, 0, 0, Direction::Up), &mut |_| false).expect("legal");
        assert_eq!(moved.to, Position::new(0, 1));
        assert_eq!(moved.direction, Direction::Up);
        assert!(moved.deflected_by.is_none());
    }

    #[test]
    fn both_flanking_walls_make_the_move_ambiguous() {
        let result = resolve_ball(&ball(4, -1, 5, Direction::Down), &mut |_| true);
        assert_eq!(
            result,
            Err(IllegalMove::AmbiguousDeflection {
                ball: BallId::new(4),
                position: Position::new(-1, 5),
            })
        );
    }

    #[test]
    fn out_of_sequence_index_is_rejected() {
        let mut stepper = Stepper::new();
        let view = BallView::from_snapshots(vec![ball(0, 0, 0, Direction::Right)]);
        let result = stepper.resolve(&view, 3, 5, |_| false);
        assert_eq!(
            result,
            Err(IllegalMove::OutOfSequence {
                expected: 4,
                received: 5,
            })
        );
    }
}
