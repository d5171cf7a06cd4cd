//! Integer lattice, movement directions and diagonal wall addressing.
//!
//! Balls live on the cell sublattice: integer points whose coordinate sum is
//! even. A wall occupies one diagonal of a unit square and always joins two
//! cell-sublattice points, so the admissible orientation of a square is fixed
//! by the parity of its lower-left anchor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer point on the simulation lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new lattice position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, growing to the right.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate, growing upwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Parity of the coordinate sum, `0` for cell-sublattice points.
    #[must_use]
    pub fn parity(&self) -> u8 {
        let sum = i64::from(self.x) + i64::from(self.y);
        if sum.rem_euclid(2) == 0 {
            0
        } else {
            1
        }
    }

    /// Reports whether the point belongs to the cell sublattice.
    #[must_use]
    pub fn is_cell(&self) -> bool {
        self.parity() == 0
    }

    /// Reports whether the point is where a ball may stand after `step` ticks.
    ///
    /// Balls are authored on the cell sublattice and every tick moves them by
    /// one unit, so their parity alternates with the step index.
    #[must_use]
    pub fn matches_step_parity(&self, step: u64) -> bool {
        u64::from(self.parity()) == step % 2
    }

    /// Returns the neighbouring point one unit away in `direction`.
    #[must_use]
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.vector();
        self.translate(dx, dy)
    }

    /// Translates the point by an arbitrary integer delta.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl From<[i32; 2]> for Position {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Position> for [i32; 2] {
    fn from(position: Position) -> Self {
        [position.x, position.y]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unit directions a ball may travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Travel towards increasing `x`.
    Right,
    /// Travel towards increasing `y`.
    Up,
    /// Travel towards decreasing `x`.
    Left,
    /// Travel towards decreasing `y`.
    Down,
}

impl Direction {
    /// Every direction in counter-clockwise order starting at `Right`.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Up,
        Direction::Left,
        Direction::Down,
    ];

    /// Unit vector of the direction.
    #[must_use]
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::Up => (0, 1),
            Self::Left => (-1, 0),
            Self::Down => (0, -1),
        }
    }

    /// Recovers a direction from its unit vector.
    #[must_use]
    pub const fn from_vector(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (1, 0) => Some(Self::Right),
            (0, 1) => Some(Self::Up),
            (-1, 0) => Some(Self::Left),
            (0, -1) => Some(Self::Down),
            _ => None,
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Down => Self::Up,
        }
    }

    /// Direction rotated a quarter turn counter-clockwise.
    #[must_use]
    pub const fn rotate_counter_clockwise(self) -> Self {
        match self {
            Self::Right => Self::Up,
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
        }
    }

    /// Direction rotated a quarter turn clockwise.
    #[must_use]
    pub const fn rotate_clockwise(self) -> Self {
        match self {
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::Up => Self::Right,
        }
    }

    /// Applies the provided rotation.
    #[must_use]
    pub const fn rotated(self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::CounterClockwise => self.rotate_counter_clockwise(),
            Rotation::Clockwise => self.rotate_clockwise(),
        }
    }

    /// Reports whether the direction runs along the `x` axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }

    /// Anchors of the two unit squares that flank a unit move from `origin`.
    ///
    /// The diagonal of each square touches the move at its cell-sublattice
    /// endpoint, which makes these the only squares whose wall can deflect
    /// the move.
    #[must_use]
    pub fn flanking_anchors(self, origin: Position) -> [Position; 2] {
        let target = origin.offset(self);
        let low = Position::new(origin.x().min(target.x()), origin.y().min(target.y()));
        if self.is_horizontal() {
            [low, low.translate(0, -1)]
        } else {
            [low, low.translate(-1, 0)]
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Right => "right",
            Self::Up => "up",
            Self::Left => "left",
            Self::Down => "down",
        };
        f.write_str(label)
    }
}

/// Quarter-turn rotation applied to a ball while editing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Rotate a quarter turn counter-clockwise.
    CounterClockwise,
    /// Rotate a quarter turn clockwise.
    Clockwise,
}

/// Which diagonal of its unit square a wall occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WallOrientation {
    /// Diagonal from `(x, y)` to `(x + 1, y + 1)`.
    Positive,
    /// Diagonal from `(x, y + 1)` to `(x + 1, y)`.
    Negative,
}

impl WallOrientation {
    /// Only orientation whose endpoints land on the cell sublattice for the
    /// square anchored at `anchor`.
    #[must_use]
    pub fn for_anchor(anchor: Position) -> Self {
        if anchor.is_cell() {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    /// Reports whether the orientation is the positive diagonal.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Direction a ball travelling in `incoming` leaves a wall with.
    ///
    /// Positive walls exchange right with up and left with down; negative
    /// walls exchange right with down and left with up.
    #[must_use]
    pub const fn reflect(self, incoming: Direction) -> Direction {
        match (self, incoming) {
            (Self::Positive, Direction::Right) => Direction::Up,
            (Self::Positive, Direction::Up) => Direction::Right,
            (Self::Positive, Direction::Left) => Direction::Down,
            (Self::Positive, Direction::Down) => Direction::Left,
            (Self::Negative, Direction::Right) => Direction::Down,
            (Self::Negative, Direction::Down) => Direction::Right,
            (Self::Negative, Direction::Left) => Direction::Up,
            (Self::Negative, Direction::Up) => Direction::Left,
        }
    }
}

/// Normalised wall key: the unordered pair of diagonal endpoints of a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    anchor: Position,
    orientation: WallOrientation,
}

impl Edge {
    /// Creates an edge from its lower-left anchor and orientation.
    ///
    /// Returns `None` when the orientation would place the endpoints off the
    /// cell sublattice.
    #[must_use]
    pub fn new(anchor: Position, orientation: WallOrientation) -> Option<Self> {
        (WallOrientation::for_anchor(anchor) == orientation).then_some(Self {
            anchor,
            orientation,
        })
    }

    /// Normalises an unordered endpoint pair into an edge.
    ///
    /// The endpoints must be diagonal neighbours on the cell sublattice; the
    /// order in which they are supplied is irrelevant.
    #[must_use]
    pub fn between(a: Position, b: Position) -> Option<Self> {
        let dx = i64::from(b.x()) - i64::from(a.x());
        let dy = i64::from(b.y()) - i64::from(a.y());
        if dx.abs() != 1 || dy.abs() != 1 || !a.is_cell() {
            return None;
        }

        let anchor = Position::new(a.x().min(b.x()), a.y().min(b.y()));
        let orientation = if dx == dy {
            WallOrientation::Positive
        } else {
            WallOrientation::Negative
        };
        Self::new(anchor, orientation)
    }

    /// Lower-left corner of the unit square holding the diagonal.
    #[must_use]
    pub const fn anchor(&self) -> Position {
        self.anchor
    }

    /// Diagonal occupied within the square.
    #[must_use]
    pub const fn orientation(&self) -> WallOrientation {
        self.orientation
    }

    /// Start and end points of the diagonal, left to right.
    #[must_use]
    pub const fn endpoints(&self) -> (Position, Position) {
        let x = self.anchor.x();
        let y = self.anchor.y();
        match self.orientation {
            WallOrientation::Positive => (
                self.anchor,
                Position::new(x.saturating_add(1), y.saturating_add(1)),
            ),
            WallOrientation::Negative => (
                Position::new(x, y.saturating_add(1)),
                Position::new(x.saturating_add(1), y),
            ),
        }
    }

    /// Reports whether `position` is one of the diagonal's endpoints.
    #[must_use]
    pub fn touches(&self, position: Position) -> bool {
        let (start, end) = self.endpoints();
        start == position || end == position
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.endpoints();
        write!(f, "{start}-{end}")
    }
}

/// Edge of the unit square anchored at `(x, y)`.
///
/// Even anchors frame the positive diagonal `(x, y)` to `(x + 1, y + 1)`, odd
/// anchors the negative diagonal `(x + 1, y)` to `(x, y + 1)`.
#[must_use]
pub fn wall_coordinates(x: i32, y: i32) -> Edge {
    let anchor = Position::new(x, y);
    Edge {
        anchor,
        orientation: WallOrientation::for_anchor(anchor),
    }
}
