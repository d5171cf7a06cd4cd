#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Versioned JSON codec for authored scenes.
//!
//! Only the authored state is persisted: ball placements with their initial
//! headings, walls, and decorations. The step counter and live ball positions
//! are transient and never written.

use bbcs_core::{
    BallColor, Command, Direction, Edge, Event, PlacementError, Position, UnknownColor,
    WallOrientation,
};
use bbcs_world::{self as world, query, World};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scene format version written by [`serialize`] and accepted by [`deserialize`].
pub const SCENE_VERSION: u64 = 1;

const VERSION_FIELD: &str = "_version";

/// Errors that can occur while decoding a scene.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The document carried no version tag.
    #[error("scene is missing the `_version` field")]
    MissingVersion,
    /// The document used a version this build cannot read.
    #[error("scene version {0} is not supported")]
    UnsupportedVersion(String),
    /// The document was not valid JSON or lacked a required field.
    #[error("could not parse scene payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// A ball heading was not one of the four unit vectors.
    #[error("ball at {position} has invalid heading ({vx}, {vy})")]
    InvalidDirection {
        /// Authored position of the offending ball.
        position: Position,
        /// Horizontal heading component.
        vx: i32,
        /// Vertical heading component.
        vy: i32,
    },
    /// A ball colour was not part of the palette.
    #[error(transparent)]
    UnknownColor(#[from] UnknownColor),
    /// A ball was authored off the cell sublattice.
    #[error("ball at {0} lies off the cell sublattice")]
    MisalignedBall(Position),
    /// Two balls share an authored position.
    #[error("more than one ball is placed at {0}")]
    DuplicateBall(Position),
    /// A wall orientation disagrees with the parity of its anchor square.
    #[error("wall anchored at {anchor} cannot be {}", orientation_label(.positive))]
    MisalignedWall {
        /// Lower-left corner of the wall's square.
        anchor: Position,
        /// Orientation recorded in the document.
        positive: bool,
    },
    /// The same wall appears more than once.
    #[error("wall {0} is listed more than once")]
    DuplicateWall(Edge),
}

#[derive(Debug, Serialize, Deserialize)]
struct SceneFile {
    #[serde(rename = "_version")]
    version: u64,
    balls: Vec<BallRecord>,
    walls: Vec<WallRecord>,
    #[serde(default)]
    texts: Vec<TextRecord>,
    #[serde(default)]
    lines: Vec<LineRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BallRecord {
    x: i32,
    y: i32,
    vx: i32,
    vy: i32,
    color: [u8; 3],
}

#[derive(Debug, Serialize, Deserialize)]
struct WallRecord {
    x: i32,
    y: i32,
    p: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextRecord {
    x: i32,
    y: i32,
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LineRecord {
    p1: Position,
    p2: Position,
}

/// Encodes the authored state of `world` as pretty-printed JSON.
#[must_use]
pub fn serialize(world: &World) -> String {
    let balls = query::ball_view(world)
        .iter()
        .map(|ball| {
            let (vx, vy) = ball.authored_direction.vector();
            BallRecord {
                x: ball.authored_position.x(),
                y: ball.authored_position.y(),
                vx,
                vy,
                color: ball.color.rgb(),
            }
        })
        .collect();
    let walls = query::walls(world)
        .map(|edge| WallRecord {
            x: edge.anchor().x(),
            y: edge.anchor().y(),
            p: edge.orientation().is_positive(),
        })
        .collect();
    let texts = query::annotations(world)
        .into_iter()
        .map(|annotation| TextRecord {
            x: annotation.position.x(),
            y: annotation.position.y(),
            text: annotation.text,
        })
        .collect();
    let lines = query::connectors(world)
        .into_iter()
        .map(|connector| LineRecord {
            p1: connector.from,
            p2: connector.to,
        })
        .collect();

    let scene = SceneFile {
        version: SCENE_VERSION,
        balls,
        walls,
        texts,
        lines,
    };
    serde_json::to_string_pretty(&scene).expect("scene serialization never fails")
}

/// Decodes a scene into a fresh world resting at step zero.
///
/// Nothing is returned unless every entity in the document is valid, so the
/// caller can keep its previous world on failure.
pub fn deserialize(input: &str) -> Result<World, FormatError> {
    decode(input).map_err(|error| {
        log::warn!("rejected scene: {error}");
        error
    })
}

fn orientation_label(positive: &bool) -> &'static str {
    if *positive {
        "positive"
    } else {
        "negative"
    }
}

fn decode(input: &str) -> Result<World, FormatError> {
    let document: serde_json::Value =
        serde_json::from_str(input).map_err(FormatError::InvalidPayload)?;
    let version = document
        .get(VERSION_FIELD)
        .ok_or(FormatError::MissingVersion)?;
    if version.as_u64() != Some(SCENE_VERSION) {
        return Err(FormatError::UnsupportedVersion(version.to_string()));
    }
    let scene: SceneFile =
        serde_json::from_value(document).map_err(FormatError::InvalidPayload)?;

    let mut world = World::new();
    let mut events = Vec::new();

    for record in scene.balls {
        let position = Position::new(record.x, record.y);
        let direction =
            Direction::from_vector(record.vx, record.vy).ok_or(FormatError::InvalidDirection {
                position,
                vx: record.vx,
                vy: record.vy,
            })?;
        let color = BallColor::try_from(record.color)?;
        events.clear();
        world::apply(
            &mut world,
            Command::PlaceBall {
                position,
                direction,
                color,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::BallPlacementRejected {
                reason: PlacementError::Misaligned,
                ..
            }] => return Err(FormatError::MisalignedBall(position)),
            // A fresh world is always editable, so occupancy is the only other reason.
            [Event::BallPlacementRejected { .. }] => {
                return Err(FormatError::DuplicateBall(position))
            }
            _ => {}
        }
    }

    for record in scene.walls {
        let anchor = Position::new(record.x, record.y);
        let orientation = if record.p {
            WallOrientation::Positive
        } else {
            WallOrientation::Negative
        };
        let edge = Edge::new(anchor, orientation).ok_or(FormatError::MisalignedWall {
            anchor,
            positive: record.p,
        })?;
        events.clear();
        world::apply(&mut world, Command::PlaceWall { edge }, &mut events);
        if matches!(events.as_slice(), [Event::WallPlacementRejected { .. }]) {
            return Err(FormatError::DuplicateWall(edge));
        }
    }

    for record in scene.texts {
        world::apply(
            &mut world,
            Command::PlaceAnnotation {
                position: Position::new(record.x, record.y),
                text: record.text,
            },
            &mut events,
        );
    }

    for record in scene.lines {
        world::apply(
            &mut world,
            Command::PlaceConnector {
                from: record.p1,
                to: record.p2,
            },
            &mut events,
        );
    }

    log::debug!(
        "loaded scene with {} balls and {} walls",
        query::ball_view(&world).len(),
        query::walls(&world).count()
    );
    Ok(world)
}
