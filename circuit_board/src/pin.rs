/**
 * @file pin.rs
 * @date 19/10/2026
 * @brief Signal endpoints of a device
 */
use crate::cable::CableId;
use crate::device::DeviceId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub(crate) usize);

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

impl From<Direction> for circuit_format::Direction {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Input => circuit_format::Direction::Input,
            Direction::Output => circuit_format::Direction::Output,
        }
    }
}

impl From<circuit_format::Direction> for Direction {
    fn from(value: circuit_format::Direction) -> Self {
        match value {
            circuit_format::Direction::Input => Direction::Input,
            circuit_format::Direction::Output => Direction::Output,
        }
    }
}

/// A single boolean endpoint.
/// A pin is bound exactly when it carries a cable.
#[derive(Debug, Clone)]
pub struct Pin {
    value: bool,
    cable: Option<CableId>,
    owner: DeviceId,
}

impl Pin {
    pub(crate) fn new(owner: DeviceId) -> Self {
        Self {
            value: false,
            cable: None,
            owner,
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub(crate) fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    pub fn cable(&self) -> Option<CableId> {
        self.cable
    }

    pub fn is_bound(&self) -> bool {
        self.cable.is_some()
    }

    pub fn is_free(&self) -> bool {
        self.cable.is_none()
    }

    /// The device that physically holds the pin.
    /// A circuit box never owns the pins it aliases.
    pub fn owner(&self) -> DeviceId {
        self.owner
    }

    pub(crate) fn attach(&mut self, cable: CableId) {
        self.cable = Some(cable);
    }

    pub(crate) fn detach(&mut self) -> Option<CableId> {
        self.cable.take()
    }
}
