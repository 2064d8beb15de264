use slotmap::SecondaryMap;

use crate::math::GridVector;

use super::half_edge::HalfEdgeId;

/// Axis-aligned direction a half-edge is drawn in.
///
/// Consecutive variants are a quarter turn apart; opposite sides differ by two.
/// Screen coordinates: `Down` is `+y`, `Right` is `+x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Down = 0,
    Right = 1,
    Up = 2,
    Left = 3,
}

/// Direction change between two consecutive half-edges of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Straight,
    /// One quarter turn forward; the convex corner of a bounded face.
    Right,
    Reverse,
    Left,
}

/// Side of every half-edge in a mesh.
pub type SideMap = SecondaryMap<HalfEdgeId, Side>;

impl Side {
    pub const ALL: [Side; 4] = [Side::Down, Side::Right, Side::Up, Side::Left];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }

    /// Rotates by `quarter_turns` (negative turns go backwards).
    #[must_use]
    pub fn rotate(self, quarter_turns: i32) -> Self {
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let index = (self.index() as i32 + quarter_turns).rem_euclid(4) as usize;
        Self::from_index(index)
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        self.rotate(2)
    }

    /// The turn taken when a walk along `self` continues along `next`.
    #[must_use]
    pub fn turn_to(self, next: Side) -> Turn {
        match (next.index() + 4 - self.index()) % 4 {
            0 => Turn::Straight,
            1 => Turn::Right,
            2 => Turn::Reverse,
            _ => Turn::Left,
        }
    }

    /// Unit step along this side in screen coordinates.
    #[must_use]
    pub fn unit(self) -> GridVector {
        match self {
            Self::Down => GridVector::new(0, 1),
            Self::Right => GridVector::new(1, 0),
            Self::Up => GridVector::new(0, -1),
            Self::Left => GridVector::new(-1, 0),
        }
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }
}

impl Turn {
    /// Quarter turns as used by the front-edge search: reversal counts as `-2`.
    #[must_use]
    pub fn winding(self) -> i32 {
        match self {
            Self::Straight => 0,
            Self::Right => 1,
            Self::Reverse => -2,
            Self::Left => -1,
        }
    }

    /// Turn produced by a corner of the given angle code (multiples of 90°).
    ///
    /// `0` and `4` both reverse the direction.
    #[must_use]
    pub fn from_angle(angle: u8) -> Self {
        match angle {
            1 => Self::Right,
            2 => Self::Straight,
            3 => Self::Left,
            _ => Self::Reverse,
        }
    }

    /// Quarter turns this turn rotates a side by.
    #[must_use]
    pub fn quarter_turns(self) -> i32 {
        match self {
            Self::Straight => 0,
            Self::Right => 1,
            Self::Reverse => 2,
            Self::Left => 3,
        }
    }
}
