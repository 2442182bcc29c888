/**
 * @file device.rs
 * @date 19/10/2026
 * @brief Device kinds and their truth tables
 */
use crate::circuit_box::BoxState;
use crate::error::Error;
use crate::pin::{Direction, PinId};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub(crate) usize);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// Every kind of device that can sit on the board.
/// Gate and junction variants carry their variable pin count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    /// Passes its input through only while switched on.
    Switch { status: bool },
    PowerSource,
    Inverter,
    AndGate(usize),
    OrGate(usize),
    NandGate(usize),
    NorGate(usize),
    /// One input fanned out to N outputs.
    Junction(usize),
    CircuitBox(BoxState),
}

impl DeviceKind {
    pub fn switch() -> Self {
        DeviceKind::Switch { status: false }
    }

    pub fn circuit_box(name: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        DeviceKind::CircuitBox(BoxState::new(name, inputs, outputs))
    }

    pub fn name(&self) -> &'static str {
        match self {
            DeviceKind::Switch { .. } => "Switch",
            DeviceKind::PowerSource => "PowerSource",
            DeviceKind::Inverter => "Inverter",
            DeviceKind::AndGate(_) => "AndGate",
            DeviceKind::OrGate(_) => "OrGate",
            DeviceKind::NandGate(_) => "NandGate",
            DeviceKind::NorGate(_) => "NorGate",
            DeviceKind::Junction(_) => "Junction",
            DeviceKind::CircuitBox(_) => "CircuitBox",
        }
    }

    /// Number of (input, output) pins.
    pub fn pin_counts(&self) -> (usize, usize) {
        match self {
            DeviceKind::Switch { .. } | DeviceKind::PowerSource | DeviceKind::Inverter => (1, 1),
            DeviceKind::AndGate(n)
            | DeviceKind::OrGate(n)
            | DeviceKind::NandGate(n)
            | DeviceKind::NorGate(n) => (*n, 1),
            DeviceKind::Junction(n) => (1, *n),
            DeviceKind::CircuitBox(state) => (state.inputs(), state.outputs()),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        let (inputs, outputs) = self.pin_counts();

        let count = match self {
            DeviceKind::AndGate(_)
            | DeviceKind::OrGate(_)
            | DeviceKind::NandGate(_)
            | DeviceKind::NorGate(_) => inputs,
            _ => outputs,
        };

        if count == 0 {
            return Err(Error::InvalidPinCount {
                kind: self.name(),
                count,
            });
        }

        Ok(())
    }

    /// Truth table of the kind over the current input values.
    /// A circuit box has no table of its own, its outputs belong to the devices inside.
    pub fn evaluate(&self, inputs: &[bool], outputs: &mut [bool]) {
        let first = inputs.first().copied().unwrap_or(false);

        match self {
            DeviceKind::Switch { status } => outputs.fill(first && *status),
            DeviceKind::PowerSource => outputs.fill(first),
            DeviceKind::Inverter => outputs.fill(!first),
            DeviceKind::AndGate(_) => outputs.fill(inputs.iter().all(|v| *v)),
            DeviceKind::OrGate(_) => outputs.fill(inputs.iter().any(|v| *v)),
            DeviceKind::NandGate(_) => outputs.fill(!inputs.iter().all(|v| *v)),
            DeviceKind::NorGate(_) => outputs.fill(!inputs.iter().any(|v| *v)),
            DeviceKind::Junction(_) => outputs.fill(first),
            DeviceKind::CircuitBox(_) => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct Device {
    pub(crate) kind: DeviceKind,
    pub(crate) inputs: Vec<PinId>,
    pub(crate) outputs: Vec<PinId>,
}

impl Device {
    pub(crate) fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    pub fn inputs(&self) -> &[PinId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PinId] {
        &self.outputs
    }

    pub fn pins(&self, direction: Direction) -> &[PinId] {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    pub(crate) fn pins_mut(&mut self, direction: Direction) -> &mut Vec<PinId> {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }

    pub fn pin(&self, direction: Direction, index: usize) -> Option<PinId> {
        self.pins(direction).get(index).copied()
    }

    /// Position of `pin` in this device's pin lists.
    pub fn position(&self, pin: PinId) -> Option<(Direction, usize)> {
        [Direction::Input, Direction::Output]
            .into_iter()
            .find_map(|dir| self.pins(dir).iter().position(|p| *p == pin).map(|i| (dir, i)))
    }

    pub fn box_state(&self) -> Option<&BoxState> {
        match &self.kind {
            DeviceKind::CircuitBox(state) => Some(state),
            _ => None,
        }
    }

    pub(crate) fn box_state_mut(&mut self) -> Option<&mut BoxState> {
        match &mut self.kind {
            DeviceKind::CircuitBox(state) => Some(state),
            _ => None,
        }
    }
}
