#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the billiard ball simulator.
//!
//! The world owns every entity collection, tracks each ball's authored state
//! separately from its live simulation state, and is the only place where
//! ticks are committed.

mod occupancy;

use std::collections::{BTreeMap, BTreeSet};

use bbcs_core::{
    AnnotationId, BallColor, BallId, Command, ConnectorId, Direction, EditError, Entity, Event,
    IllegalMove, PlacementError, Position, StepReport,
};
use bbcs_system_stepper::Stepper;

use crate::occupancy::Occupancy;

/// Represents the authoritative simulator world state.
#[derive(Debug, Default)]
pub struct World {
    balls: BTreeMap<BallId, Ball>,
    occupancy: Occupancy,
    walls: BTreeSet<bbcs_core::Edge>,
    annotations: BTreeMap<AnnotationId, Annotation>,
    connectors: BTreeMap<ConnectorId, Connector>,
    next_ball_id: u32,
    next_annotation_id: u32,
    next_connector_id: u32,
    step_index: u64,
    stepper: Stepper,
}

impl World {
    /// Creates an empty world resting at step zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_editable(&self) -> bool {
        self.step_index == 0
    }

    fn ball_at_mut(&mut self, position: Position) -> Option<&mut Ball> {
        let id = self.occupancy.occupant(position)?;
        self.balls.get_mut(&id)
    }

    fn rebuild_occupancy(&mut self) {
        self.occupancy
            .fill_with(self.balls.values().map(|ball| (ball.position, ball.id)));
    }

    fn place_ball(
        &mut self,
        position: Position,
        direction: Direction,
        color: BallColor,
    ) -> Result<BallId, PlacementError> {
        if !self.is_editable() {
            return Err(PlacementError::InvalidMode);
        }
        if !position.is_cell() {
            return Err(PlacementError::Misaligned);
        }
        if self.occupancy.occupant(position).is_some() {
            return Err(PlacementError::Occupied);
        }

        let id = BallId::new(self.next_ball_id);
        self.next_ball_id = self.next_ball_id.saturating_add(1);
        let _ = self.balls.insert(
            id,
            Ball {
                id,
                position,
                direction,
                color,
                authored_position: position,
                authored_direction: direction,
            },
        );
        self.occupancy.occupy(id, position);
        Ok(id)
    }

    fn remove_ball(&mut self, position: Position) -> Result<BallId, EditError> {
        if !self.is_editable() {
            return Err(EditError::InvalidMode);
        }
        let id = self.occupancy.occupant(position).ok_or(EditError::Missing)?;
        let _ = self.balls.remove(&id);
        self.occupancy.vacate(position);
        Ok(id)
    }

    fn edit_ball<F>(&mut self, position: Position, edit: F) -> Result<&Ball, EditError>
    where
        F: FnOnce(&mut Ball),
    {
        if !self.is_editable() {
            return Err(EditError::InvalidMode);
        }
        let ball = self.ball_at_mut(position).ok_or(EditError::Missing)?;
        edit(ball);
        Ok(ball)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceBall {
            position,
            direction,
            color,
        } => match world.place_ball(position, direction, color) {
            Ok(ball) => out_events.push(Event::BallPlaced {
                ball,
                position,
                direction,
                color,
            }),
            Err(reason) => out_events.push(Event::BallPlacementRejected { position, reason }),
        },
        Command::RemoveBall { position } => match world.remove_ball(position) {
            Ok(ball) => out_events.push(Event::BallRemoved { ball, position }),
            Err(reason) => out_events.push(Event::BallRemovalRejected { position, reason }),
        },
        Command::RotateBall { position, rotation } => {
            let outcome = world.edit_ball(position, |ball| {
                ball.direction = ball.direction.rotated(rotation);
                ball.authored_direction = ball.direction;
            });
            match outcome {
                Ok(ball) => out_events.push(Event::BallRotated {
                    ball: ball.id,
                    direction: ball.direction,
                }),
                Err(reason) => out_events.push(Event::BallEditRejected { position, reason }),
            }
        }
        Command::RecolorBall { position } => {
            match world.edit_ball(position, |ball| ball.color = ball.color.next()) {
                Ok(ball) => out_events.push(Event::BallRecolored {
                    ball: ball.id,
                    color: ball.color,
                }),
                Err(reason) => out_events.push(Event::BallEditRejected { position, reason }),
            }
        }
        Command::PlaceWall { edge } => {
            if !world.is_editable() {
                out_events.push(Event::WallPlacementRejected {
                    edge,
                    reason: PlacementError::InvalidMode,
                });
            } else if world.walls.insert(edge) {
                out_events.push(Event::WallPlaced { edge });
            } else {
                out_events.push(Event::WallPlacementRejected {
                    edge,
                    reason: PlacementError::Occupied,
                });
            }
        }
        Command::RemoveWall { edge } => {
            if !world.is_editable() {
                out_events.push(Event::WallRemovalRejected {
                    edge,
                    reason: EditError::InvalidMode,
                });
            } else if world.walls.remove(&edge) {
                out_events.push(Event::WallRemoved { edge });
            } else {
                out_events.push(Event::WallRemovalRejected {
                    edge,
                    reason: EditError::Missing,
                });
            }
        }
        Command::PlaceAnnotation { position, text } => {
            let annotation = AnnotationId::new(world.next_annotation_id);
            world.next_annotation_id = world.next_annotation_id.saturating_add(1);
            let _ = world.annotations.insert(
                annotation,
                Annotation {
                    id: annotation,
                    position,
                    text,
                },
            );
            out_events.push(Event::AnnotationPlaced {
                annotation,
                position,
            });
        }
        Command::RemoveAnnotation { annotation } => {
            if world.annotations.remove(&annotation).is_some() {
                out_events.push(Event::AnnotationRemoved { annotation });
            } else {
                out_events.push(Event::DecorationRemovalRejected {
                    entity: Entity::Annotation(annotation),
                    reason: EditError::Missing,
                });
            }
        }
        Command::PlaceConnector { from, to } => {
            let connector = ConnectorId::new(world.next_connector_id);
            world.next_connector_id = world.next_connector_id.saturating_add(1);
            let _ = world.connectors.insert(
                connector,
                Connector {
                    id: connector,
                    from,
                    to,
                },
            );
            out_events.push(Event::ConnectorPlaced { connector });
        }
        Command::RemoveConnector { connector } => {
            if world.connectors.remove(&connector).is_some() {
                out_events.push(Event::ConnectorRemoved { connector });
            } else {
                out_events.push(Event::DecorationRemovalRejected {
                    entity: Entity::Connector(connector),
                    reason: EditError::Missing,
                });
            }
        }
        Command::Reset => {
            reset(world);
            out_events.push(Event::SimulationReset);
        }
        Command::Step { index } => match step(world, index) {
            Ok(report) => out_events.push(Event::StepCompleted { report }),
            Err(error) => out_events.push(Event::StepRejected { index, error }),
        },
    }
}

/// Advances every ball by one tick and commits the result atomically.
///
/// On failure the world is left exactly as it was before the call; callers
/// are expected to [`reset`] before stepping again.
pub fn step(world: &mut World, index: u64) -> Result<StepReport, IllegalMove> {
    let view = query::ball_view(world);
    let walls = &world.walls;
    let report = world
        .stepper
        .resolve(&view, world.step_index, index, |edge| walls.contains(&edge))
        .map_err(|error| {
            log::warn!("illegal move on step {index}: {error}");
            error
        })?;

    for entry in &report.moves {
        if let Some(ball) = world.balls.get_mut(&entry.ball) {
            ball.position = entry.to;
            ball.direction = entry.direction;
        }
    }
    world.rebuild_occupancy();
    world.step_index = index;
    log::debug!(
        "committed step {index}: {} balls, {} deflections",
        report.moves.len(),
        report.deflections()
    );

    Ok(report)
}

/// Restores every ball to its authored state and rewinds the step counter.
pub fn reset(world: &mut World) {
    for ball in world.balls.values_mut() {
        ball.position = ball.authored_position;
        ball.direction = ball.authored_direction;
    }
    world.rebuild_occupancy();
    log::debug!("reset from step {}", world.step_index);
    world.step_index = 0;
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bbcs_core::{
        wall_coordinates, AnnotationId, AnnotationSnapshot, BallId, BallSnapshot, BallView,
        ConnectorId, ConnectorSnapshot, Edge, Entity, Position,
    };

    use super::{Ball, World};

    /// Index of the last committed tick, zero while resting at the authored state.
    #[must_use]
    pub fn step_index(world: &World) -> u64 {
        world.step_index
    }

    /// Reports whether edits are currently accepted.
    #[must_use]
    pub fn is_editable(world: &World) -> bool {
        world.is_editable()
    }

    /// Captures a read-only view of every ball.
    #[must_use]
    pub fn ball_view(world: &World) -> BallView {
        BallView::from_snapshots(world.balls.values().map(Ball::snapshot).collect())
    }

    /// Returns the ball currently standing on the provided position.
    #[must_use]
    pub fn ball_at(world: &World, position: Position) -> Option<BallSnapshot> {
        let id = world.occupancy.occupant(position)?;
        ball(world, id)
    }

    /// Returns the ball with the provided identifier.
    #[must_use]
    pub fn ball(world: &World, id: BallId) -> Option<BallSnapshot> {
        world.balls.get(&id).map(Ball::snapshot)
    }

    /// Reports whether a wall occupies the provided edge.
    #[must_use]
    pub fn has_wall(world: &World, edge: Edge) -> bool {
        world.walls.contains(&edge)
    }

    /// Returns the wall joining two lattice points, in either order.
    #[must_use]
    pub fn wall(world: &World, a: Position, b: Position) -> Option<Edge> {
        Edge::between(a, b).filter(|edge| world.walls.contains(edge))
    }

    /// Reports whether the diagonal joining two points is a positive one.
    #[must_use]
    pub fn is_wall_positive(a: Position, b: Position) -> bool {
        Edge::between(a, b).is_some_and(|edge| edge.orientation().is_positive())
    }

    /// Iterator over every wall in deterministic order.
    pub fn walls(world: &World) -> impl Iterator<Item = Edge> + '_ {
        world.walls.iter().copied()
    }

    /// Returns the annotation with the provided identifier.
    #[must_use]
    pub fn annotation(world: &World, id: AnnotationId) -> Option<AnnotationSnapshot> {
        world.annotations.get(&id).map(|annotation| annotation.snapshot())
    }

    /// Returns the oldest annotation centred on the provided position.
    #[must_use]
    pub fn annotation_at(world: &World, position: Position) -> Option<AnnotationSnapshot> {
        world
            .annotations
            .values()
            .find(|annotation| annotation.position == position)
            .map(|annotation| annotation.snapshot())
    }

    /// Captures every annotation ordered by identifier.
    #[must_use]
    pub fn annotations(world: &World) -> Vec<AnnotationSnapshot> {
        world
            .annotations
            .values()
            .map(|annotation| annotation.snapshot())
            .collect()
    }

    /// Returns the connector with the provided identifier.
    #[must_use]
    pub fn connector(world: &World, id: ConnectorId) -> Option<ConnectorSnapshot> {
        world.connectors.get(&id).map(|connector| connector.snapshot())
    }

    /// Captures every connector ordered by identifier.
    #[must_use]
    pub fn connectors(world: &World) -> Vec<ConnectorSnapshot> {
        world
            .connectors
            .values()
            .map(|connector| connector.snapshot())
            .collect()
    }

    /// Resolves the entity under a point expressed in continuous lattice units.
    ///
    /// Balls win over walls, which win over annotations. Balls and
    /// annotations are matched at the nearest lattice point; walls by the
    /// unit square containing the point.
    #[must_use]
    pub fn pick(world: &World, x: f64, y: f64) -> Option<Entity> {
        let nearest = Position::new(x.round() as i32, y.round() as i32);
        if let Some(ball) = ball_at(world, nearest) {
            return Some(Entity::Ball(ball.id));
        }

        let square = wall_coordinates(x.floor() as i32, y.floor() as i32);
        if has_wall(world, square) {
            return Some(Entity::Wall(square));
        }

        annotation_at(world, nearest).map(|annotation| Entity::Annotation(annotation.id))
    }
}

#[derive(Clone, Debug)]
struct Ball {
    id: BallId,
    position: Position,
    direction: Direction,
    color: BallColor,
    authored_position: Position,
    authored_direction: Direction,
}

impl Ball {
    fn snapshot(&self) -> bbcs_core::BallSnapshot {
        bbcs_core::BallSnapshot {
            id: self.id,
            position: self.position,
            direction: self.direction,
            color: self.color,
            authored_position: self.authored_position,
            authored_direction: self.authored_direction,
        }
    }
}

#[derive(Clone, Debug)]
struct Annotation {
    id: AnnotationId,
    position: Position,
    text: String,
}

impl Annotation {
    fn snapshot(&self) -> bbcs_core::AnnotationSnapshot {
        bbcs_core::AnnotationSnapshot {
            id: self.id,
            position: self.position,
            text: self.text.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Connector {
    id: ConnectorId,
    from: Position,
    to: Position,
}

impl Connector {
    fn snapshot(&self) -> bbcs_core::ConnectorSnapshot {
        bbcs_core::ConnectorSnapshot {
            id: self.id,
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbcs_core::{wall_coordinates, Rotation};

    fn place(world: &mut World, x: i32, y: i32, direction: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceBall {
                position: Position::new(x, y),
                direction,
                color: BallColor::Blue,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn place_ball_rejects_odd_positions() {
        let mut world = World::new();
        let events = place(&mut world, 1, 0, Direction::Right);
        assert_eq!(
            events,
            vec![Event::BallPlacementRejected {
                position: Position::new(1, 0),
                reason: PlacementError::Misaligned,
            }]
        );
        assert!(query::ball_view(&world).is_empty());
    }

    #[test]
    fn place_ball_rejects_occupied_positions() {
        let mut world = World::new();
        let _ = place(&mut world, 2, 2, Direction::Right);
        let events = place(&mut world, 2, 2, Direction::Up);
        assert_eq!(
            events,
            vec![Event::BallPlacementRejected {
                position: Position::new(2, 2),
                reason: PlacementError::Occupied,
            }]
        );
        assert_eq!(query::ball_view(&world).len(), 1);
    }

    #[test]
    fn edits_are_rejected_once_the_simulation_advanced() {
        let mut world = World::new();
        let _ = place(&mut world, 0, 0, Direction::Right);
        let _ = step(&mut world, 1).expect("step");

        let events = place(&mut world, 4, 4, Direction::Right);
        assert_eq!(
            events,
            vec![Event::BallPlacementRejected {
                position: Position::new(4, 4),
                reason: PlacementError::InvalidMode,
            }]
        );

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceWall {
                edge: wall_coordinates(4, 4),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WallPlacementRejected {
                edge: wall_coordinates(4, 4),
                reason: PlacementError::InvalidMode,
            }]
        );
    }

    #[test]
    fn rotation_updates_the_authored_direction() {
        let mut world = World::new();
        let _ = place(&mut world, 0, 0, Direction::Right);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RotateBall {
                position: Position::new(0, 0),
                rotation: Rotation::CounterClockwise,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::BallRotated {
                ball: BallId::new(0),
                direction: Direction::Up,
            }]
        );
        let _ = step(&mut world, 1).expect("step");
        reset(&mut world);
        let ball = query::ball_at(&world, Position::new(0, 0)).expect("ball");
        assert_eq!(ball.direction, Direction::Up);
    }

    #[test]
    fn recolor_cycles_the_palette() {
        let mut world = World::new();
        let _ = place(&mut world, 0, 0, Direction::Right);
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::RecolorBall {
                    position: Position::new(0, 0),
                },
                &mut events,
            );
        }
        let ball = query::ball_at(&world, Position::new(0, 0)).expect("ball");
        assert_eq!(ball.color, BallColor::Yellow);
    }

    #[test]
    fn pick_prefers_balls_over_walls() {
        let mut world = World::new();
        let _ = place(&mut world, 0, 0, Direction::Right);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceWall {
                edge: wall_coordinates(0, 0),
            },
            &mut events,
        );

        assert_eq!(
            query::pick(&world, 0.1, 0.2),
            Some(Entity::Ball(BallId::new(0)))
        );
        assert_eq!(
            query::pick(&world, 0.6, 0.4),
            Some(Entity::Wall(wall_coordinates(0, 0)))
        );
        assert_eq!(query::pick(&world, 5.2, 5.1), None);
    }
}
