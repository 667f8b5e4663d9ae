//! Single-bit fields of the transfer encodings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadStoreKind {
    Store,
    Load,
}

impl From<bool> for LoadStoreKind {
    fn from(b: bool) -> Self {
        if b { Self::Load } else { Self::Store }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    /// Add offset after transfer.
    Post,

    /// Add offset before transfer.
    Pre,
}

impl From<bool> for Indexing {
    fn from(state: bool) -> Self {
        if state { Self::Pre } else { Self::Post }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offsetting {
    /// Subtract the offset from base.
    Down,

    /// Add the offset to base.
    Up,
}

impl From<bool> for Offsetting {
    fn from(state: bool) -> Self {
        if state { Self::Up } else { Self::Down }
    }
}

impl Offsetting {
    #[must_use]
    pub const fn apply(self, base: u32, offset: u32) -> u32 {
        match self {
            Self::Up => base.wrapping_add(offset),
            Self::Down => base.wrapping_sub(offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_bits() {
        assert_eq!(LoadStoreKind::from(true), LoadStoreKind::Load);
        assert_eq!(Indexing::from(false), Indexing::Post);
        assert_eq!(Offsetting::from(true), Offsetting::Up);
    }

    #[test]
    fn offsets_wrap() {
        assert_eq!(Offsetting::Up.apply(0xFFFF_FFFC, 8), 4);
        assert_eq!(Offsetting::Down.apply(4, 8), 0xFFFF_FFFC);
    }
}
