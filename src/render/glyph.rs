//! Heavy box-drawing glyphs keyed by the arms they connect.

use std::ops::{BitOr, BitOrAssign, Sub};

/// Set of arms leaving the centre of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoxChar(u8);

const GLYPHS: [char; 16] = [
    ' ', '╹', '╸', '┛', '╻', '┃', '┓', '┫', '╺', '┗', '━', '┻', '┏', '┣', '┳', '╋',
];

impl BoxChar {
    pub const EMPTY: Self = Self(0);
    pub const UP: Self = Self(1);
    pub const LEFT: Self = Self(2);
    pub const DOWN: Self = Self(4);
    pub const RIGHT: Self = Self(8);
    pub const VERTICAL: Self = Self(1 | 4);
    pub const HORIZONTAL: Self = Self(2 | 8);

    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn glyph(self) -> char {
        GLYPHS[usize::from(self.0 & 0x0f)]
    }
}

impl BitOr for BoxChar {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BoxChar {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Removes the arms of `rhs`.
impl Sub for BoxChar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 & !rhs.0)
    }
}
