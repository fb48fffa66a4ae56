//! Geometry helpers for the boss room.
//!
//! The room is a rectangle rotated by 45 degrees in world space. Most checks
//! are cheapest in diagonal coordinates, `u = x + y` (depth into the room) and
//! `v = x - y` (lateral offset from the symmetry axis), so [`RoomLayout`]
//! stores its bands in those terms. Everything here is pure.

use std::f32::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

use crate::env::WallCell;

/// Continuous world position or direction vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    pub fn len(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).len()
    }

    /// Returns the unit vector in the same direction, or `None` for a zero vector.
    pub fn normalize(self) -> Option<Point> {
        let len = self.len();
        if len <= f32::EPSILON {
            return None;
        }
        Some(Self::new(self.x / len, self.y / len))
    }

    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Depth coordinate along the room's diagonal.
    pub fn u(self) -> f32 {
        self.x + self.y
    }

    /// Lateral coordinate across the room's diagonal.
    pub fn v(self) -> f32 {
        self.x - self.y
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;
    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Position on a circle of `radius` around `center`.
///
/// Members of a ring of `count` objects are spread evenly; `phase` rotates
/// the whole ring.
pub fn orbit_point(center: Point, radius: f32, index: usize, count: usize, phase: f32) -> Point {
    let count = count.max(1) as f32;
    let angle = index as f32 * 2.0 * PI / count + phase;
    center + Point::from_angle(angle) * radius
}

/// Axis along which hazard bands are drawn across a room.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HazardAxis {
    /// First point of the axis of symmetry.
    pub start: Point,
    /// Number of diagonal steps covered by the axis; each step moves by `(1, 1)`.
    pub length: u32,
    /// Band width, measured across the axis.
    pub width: f32,
}

impl HazardAxis {
    /// End points of the band crossing the axis at diagonal `offset`.
    ///
    /// The band is perpendicular to the axis and spans the full width.
    pub fn band(&self, offset: u32) -> (Point, Point) {
        let step = offset as f32;
        let center = self.start + Point::new(step, step);
        let half = self.width / 2.0;
        (
            center + Point::new(-half, half),
            center + Point::new(half, -half),
        )
    }
}

/// One of the four boundary walls of the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Wall {
    Left,
    Far,
    Right,
    Close,
}

/// Static geometry of the boss room.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomLayout {
    /// Objects with `u < entry_limit` are inside the room.
    pub entry_limit: f32,
    /// Far wall band: `u < far_wall`.
    pub far_wall: f32,
    /// Close wall band: `u > close_wall`.
    pub close_wall: f32,
    /// Side wall bands: `v > side_wall` (right) and `v < -side_wall` (left).
    pub side_wall: f32,
    /// Wall corners in order: left, top, right, bottom.
    pub corners: [Point; 4],
    /// Axis used for the room-wide hazard bands.
    pub hazard: HazardAxis,
    /// Where players outside the room are teleported when the fight starts.
    pub player_spawn: Point,
    /// Candidate guard spawn positions; three of them are used per spawn.
    pub guard_spawns: [Point; 4],
    /// Wall cells that close the entrance.
    pub entrance: Vec<WallCell>,
}

impl RoomLayout {
    /// Returns true when `pos` lies inside the boss room.
    pub fn contains(&self, pos: Point) -> bool {
        pos.u() < self.entry_limit
    }

    /// Returns the wall band the point is currently in, if any.
    ///
    /// The far and close bands take precedence over the side bands.
    pub fn wall_at(&self, pos: Point) -> Option<Wall> {
        let (u, v) = (pos.u(), pos.v());
        if u < self.far_wall {
            Some(Wall::Far)
        } else if u > self.close_wall {
            Some(Wall::Close)
        } else if v > self.side_wall {
            Some(Wall::Right)
        } else if v < -self.side_wall {
            Some(Wall::Left)
        } else {
            None
        }
    }

    /// Orientation of a wall in radians, derived from its corner points.
    pub fn wall_angle(&self, wall: Wall) -> f32 {
        let [left, top, right, bottom] = self.corners;
        let dir = match wall {
            Wall::Left => bottom - left,
            Wall::Far => left - top,
            Wall::Right => top - right,
            Wall::Close => right - bottom,
        };
        dir.angle()
    }

    /// Reflects `heading` off the wall band `pos` is in.
    ///
    /// Returns the new unit heading and whether a bounce happened. A bounce is
    /// only reported while the heading still points out through that wall, so
    /// an object that is already travelling back inward is left alone.
    pub fn reflect(&self, pos: Point, heading: Point) -> (Point, bool) {
        let Some(wall) = self.wall_at(pos) else {
            return (heading, false);
        };
        let outward = match wall {
            Wall::Far => heading.u() < 0.0,
            Wall::Close => heading.u() > 0.0,
            Wall::Right => heading.v() > 0.0,
            Wall::Left => heading.v() < 0.0,
        };
        if !outward {
            return (heading, false);
        }
        let wall_angle = self.wall_angle(wall);
        let reflected = 2.0 * wall_angle - heading.angle();
        (Point::from_angle(reflected), true)
    }
}

impl Default for RoomLayout {
    fn default() -> Self {
        Self {
            entry_limit: 9820.0,
            far_wall: 8371.0,
            close_wall: 9797.0,
            side_wall: 391.0,
            corners: [
                Point::new(3990.0, 4381.0),
                Point::new(4381.0, 3990.0),
                Point::new(5094.0, 4703.0),
                Point::new(4703.0, 5094.0),
            ],
            hazard: HazardAxis {
                start: Point::new(4197.0, 4197.0),
                length: 690,
                width: 368.0,
            },
            player_spawn: Point::new(4726.0, 4726.0),
            guard_spawns: [
                Point::new(4151.0, 4473.0),
                Point::new(4128.0, 4358.0),
                Point::new(4358.0, 4128.0),
                Point::new(4473.0, 4151.0),
            ],
            entrance: vec![
                WallCell::new(205, 209),
                WallCell::new(206, 208),
                WallCell::new(207, 207),
                WallCell::new(208, 206),
                WallCell::new(209, 205),
            ],
        }
    }
}
