#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the billiard ball simulator.
//!
//! This crate defines the lattice model and the message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems such as the simulation clock react to deterministically.

mod lattice;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use lattice::{wall_coordinates, Direction, Edge, Position, Rotation, WallOrientation};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a ball on the cell sublattice.
    PlaceBall {
        /// Cell the ball starts from.
        position: Position,
        /// Direction the ball starts travelling in.
        direction: Direction,
        /// Colour channel of the ball.
        color: BallColor,
    },
    /// Removes the ball standing at the provided position.
    RemoveBall {
        /// Cell occupied by the ball.
        position: Position,
    },
    /// Turns the ball at the provided position by a quarter turn.
    RotateBall {
        /// Cell occupied by the ball.
        position: Position,
        /// Sense of the quarter turn.
        rotation: Rotation,
    },
    /// Advances the ball at the provided position to the next palette colour.
    RecolorBall {
        /// Cell occupied by the ball.
        position: Position,
    },
    /// Places a wall along the provided edge.
    PlaceWall {
        /// Normalised diagonal occupied by the wall.
        edge: Edge,
    },
    /// Removes the wall occupying the provided edge.
    RemoveWall {
        /// Normalised diagonal occupied by the wall.
        edge: Edge,
    },
    /// Attaches a free-floating text annotation to the lattice.
    PlaceAnnotation {
        /// Point the annotation is centred on.
        position: Position,
        /// Text shown by the annotation.
        text: String,
    },
    /// Removes a previously placed annotation.
    RemoveAnnotation {
        /// Identifier of the annotation to remove.
        annotation: AnnotationId,
    },
    /// Draws a decorative connector line between two lattice points.
    PlaceConnector {
        /// First endpoint of the line.
        from: Position,
        /// Second endpoint of the line.
        to: Position,
    },
    /// Removes a previously drawn connector line.
    RemoveConnector {
        /// Identifier of the connector to remove.
        connector: ConnectorId,
    },
    /// Restores every ball to its authored state and rewinds the step counter.
    Reset,
    /// Advances the simulation by a single tick.
    Step {
        /// Index of the tick; must follow the world's current step index.
        index: u64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a ball was placed.
    BallPlaced {
        /// Identifier assigned to the ball.
        ball: BallId,
        /// Cell the ball occupies.
        position: Position,
        /// Direction the ball travels in.
        direction: Direction,
        /// Colour channel of the ball.
        color: BallColor,
    },
    /// Reports that a ball placement request was rejected.
    BallPlacementRejected {
        /// Cell provided in the placement request.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a ball was removed.
    BallRemoved {
        /// Identifier of the removed ball.
        ball: BallId,
        /// Cell the ball occupied.
        position: Position,
    },
    /// Reports that a ball removal request was rejected.
    BallRemovalRejected {
        /// Cell provided in the removal request.
        position: Position,
        /// Specific reason the removal failed.
        reason: EditError,
    },
    /// Confirms that a ball changed its authored direction.
    BallRotated {
        /// Identifier of the rotated ball.
        ball: BallId,
        /// Direction after the rotation.
        direction: Direction,
    },
    /// Confirms that a ball changed colour.
    BallRecolored {
        /// Identifier of the recoloured ball.
        ball: BallId,
        /// Colour after the change.
        color: BallColor,
    },
    /// Reports that a rotate or recolour request was rejected.
    BallEditRejected {
        /// Cell provided in the edit request.
        position: Position,
        /// Specific reason the edit failed.
        reason: EditError,
    },
    /// Confirms that a wall was placed.
    WallPlaced {
        /// Edge occupied by the new wall.
        edge: Edge,
    },
    /// Reports that a wall placement request was rejected.
    WallPlacementRejected {
        /// Edge provided in the placement request.
        edge: Edge,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a wall was removed.
    WallRemoved {
        /// Edge the wall occupied.
        edge: Edge,
    },
    /// Reports that a wall removal request was rejected.
    WallRemovalRejected {
        /// Edge provided in the removal request.
        edge: Edge,
        /// Specific reason the removal failed.
        reason: EditError,
    },
    /// Confirms that an annotation was placed.
    AnnotationPlaced {
        /// Identifier assigned to the annotation.
        annotation: AnnotationId,
        /// Point the annotation is centred on.
        position: Position,
    },
    /// Confirms that an annotation was removed.
    AnnotationRemoved {
        /// Identifier of the removed annotation.
        annotation: AnnotationId,
    },
    /// Confirms that a connector line was placed.
    ConnectorPlaced {
        /// Identifier assigned to the connector.
        connector: ConnectorId,
    },
    /// Confirms that a connector line was removed.
    ConnectorRemoved {
        /// Identifier of the removed connector.
        connector: ConnectorId,
    },
    /// Reports that removing a decorative entity was rejected.
    DecorationRemovalRejected {
        /// Entity targeted by the removal.
        entity: Entity,
        /// Specific reason the removal failed.
        reason: EditError,
    },
    /// Announces that every ball returned to its authored state.
    SimulationReset,
    /// Confirms that a tick was committed.
    StepCompleted {
        /// Movement of every ball during the tick.
        report: StepReport,
    },
    /// Reports that a tick was refused and the world left untouched.
    StepRejected {
        /// Index of the refused tick.
        index: u64,
        /// Condition that made the tick illegal.
        error: IllegalMove,
    },
}

/// Colour channel carried by a ball.
///
/// Colours never influence stepping; they tag balls so that puzzle authors
/// can follow signals through a circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[u8; 3]", into = "[u8; 3]")]
pub enum BallColor {
    /// Blue channel.
    Blue,
    /// Red channel.
    Red,
    /// Yellow channel.
    Yellow,
}

impl BallColor {
    /// The closed palette in cycling order.
    pub const ALL: [BallColor; 3] = [BallColor::Blue, BallColor::Red, BallColor::Yellow];

    /// Next colour in the palette, wrapping around after the last one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Yellow,
            Self::Yellow => Self::Blue,
        }
    }

    /// RGB triple identifying the colour in persisted scenes.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Blue => [0x1f, 0x6f, 0xc5],
            Self::Red => [0xd9, 0x3b, 0x3b],
            Self::Yellow => [0xf2, 0xc1, 0x2e],
        }
    }

    /// Looks up the palette entry with the provided RGB triple.
    #[must_use]
    pub fn from_rgb(rgb: [u8; 3]) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.rgb() == rgb)
    }
}

impl TryFrom<[u8; 3]> for BallColor {
    type Error = UnknownColor;

    fn try_from(rgb: [u8; 3]) -> Result<Self, Self::Error> {
        Self::from_rgb(rgb).ok_or(UnknownColor(rgb))
    }
}

impl From<BallColor> for [u8; 3] {
    fn from(color: BallColor) -> Self {
        color.rgb()
    }
}

/// RGB triple that is not part of the ball palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("colour {0:?} is not part of the ball palette")]
pub struct UnknownColor(pub [u8; 3]);

/// Unique identifier assigned to a ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(u32);

impl BallId {
    /// Creates a new ball identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier assigned to a text annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u32);

impl AnnotationId {
    /// Creates a new annotation identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a connector line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(u32);

impl ConnectorId {
    /// Creates a new connector identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Any entity an editing layer may select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A ball, addressed by identifier.
    Ball(BallId),
    /// A wall, addressed by its edge.
    Wall(Edge),
    /// A text annotation.
    Annotation(AnnotationId),
    /// A decorative connector line.
    Connector(ConnectorId),
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The simulation has advanced past its authored state, so edits are disabled.
    InvalidMode,
    /// The requested position lies off the cell sublattice.
    Misaligned,
    /// Another entity of the same kind already occupies the position.
    Occupied,
}

/// Reasons a request addressing an existing entity may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditError {
    /// The simulation has advanced past its authored state, so edits are disabled.
    InvalidMode,
    /// No matching entity exists.
    Missing,
}

/// Condition that makes a tick impossible to commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum IllegalMove {
    /// The tick index does not directly follow the world's step counter.
    #[error("step {received} is out of sequence, expected step {expected}")]
    OutOfSequence {
        /// Index the world expected next.
        expected: u64,
        /// Index that was requested.
        received: u64,
    },
    /// A ball would cross two walls at once.
    #[error("ball {ball} at {position} would cross two walls at once")]
    AmbiguousDeflection {
        /// Ball whose move is ambiguous.
        ball: BallId,
        /// Position the ball attempted to leave.
        position: Position,
    },
    /// A ball would land on a point of the wrong sublattice for the tick.
    #[error("ball {ball} would land on {position}, off the lattice for step {step}")]
    ParityViolation {
        /// Ball that left the lattice.
        ball: BallId,
        /// Position the ball resolved to.
        position: Position,
        /// Index of the tick being resolved.
        step: u64,
    },
    /// Two balls would occupy the same position.
    #[error("balls {first} and {second} collide at {position}")]
    Collision {
        /// Ball with the lower identifier.
        first: BallId,
        /// Ball with the higher identifier.
        second: BallId,
        /// Position both balls resolved to.
        position: Position,
    },
}

/// Movement of a single ball during a committed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallMove {
    /// Ball that moved.
    pub ball: BallId,
    /// Position before the tick.
    pub from: Position,
    /// Position after the tick.
    pub to: Position,
    /// Direction after the tick.
    pub direction: Direction,
    /// Wall that deflected the ball, if any.
    pub deflected_by: Option<Edge>,
}

/// Outcome of a committed tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Index of the committed tick.
    pub index: u64,
    /// Movement of every ball, ordered by ball identifier.
    pub moves: Vec<BallMove>,
}

impl StepReport {
    /// Number of balls that bounced off a wall during the tick.
    #[must_use]
    pub fn deflections(&self) -> usize {
        self.moves
            .iter()
            .filter(|entry| entry.deflected_by.is_some())
            .count()
    }
}

/// Immutable representation of a single ball's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BallSnapshot {
    /// Unique identifier assigned to the ball.
    pub id: BallId,
    /// Position the ball currently occupies.
    pub position: Position,
    /// Direction the ball currently travels in.
    pub direction: Direction,
    /// Colour channel of the ball.
    pub color: BallColor,
    /// Position the ball was placed at.
    pub authored_position: Position,
    /// Direction the ball was placed with.
    pub authored_direction: Direction,
}

/// Read-only snapshot describing all balls in the world.
#[derive(Clone, Debug, Default)]
pub struct BallView {
    snapshots: Vec<BallSnapshot>,
}

impl BallView {
    /// Creates a new ball view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BallSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured ball snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BallSnapshot> {
        self.snapshots.iter()
    }

    /// Number of balls captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no balls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BallSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a text annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationSnapshot {
    /// Identifier assigned to the annotation.
    pub id: AnnotationId,
    /// Point the annotation is centred on.
    pub position: Position,
    /// Text shown by the annotation.
    pub text: String,
}

/// Immutable representation of a connector line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectorSnapshot {
    /// Identifier assigned to the connector.
    pub id: ConnectorId,
    /// First endpoint of the line.
    pub from: Position,
    /// Second endpoint of the line.
    pub to: Position,
}
