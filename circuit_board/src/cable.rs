/**
 * @file cable.rs
 * @date 19/10/2026
 * @brief Edge between two pins
 */
use crate::pin::PinId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CableId(pub(crate) usize);

impl fmt::Display for CableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cable#{}", self.0)
    }
}

/// Unordered pair of pins. Only exists while both ends point back at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cable {
    a: PinId,
    b: PinId,
}

impl Cable {
    pub(crate) fn new(a: PinId, b: PinId) -> Self {
        Self { a, b }
    }

    pub fn ends(&self) -> (PinId, PinId) {
        (self.a, self.b)
    }

    pub fn other_end(&self, pin: PinId) -> PinId {
        if self.a == pin { self.b } else { self.a }
    }
}
