/**
 * @file circuit_box.rs
 * @date 19/10/2026
 * @brief Circuit boxes, composite devices whose pins alias internal pins
 */
use crate::circuit::Circuit;
use crate::device::DeviceId;
use crate::error::Error;
use crate::inspector::InspectionEvent;
use crate::pin::{Direction, PinId};
use crate::Result;
use std::collections::BTreeSet;

/// Bookkeeping of a circuit box.
/// Pin lists live on the device itself, a bound slot holds the aliased pin id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxState {
    name: String,
    inputs: usize,
    outputs: usize,
    bound_inputs: BTreeSet<usize>,
    bound_outputs: BTreeSet<usize>,
}

impl BoxState {
    pub fn new(name: impl Into<String>, inputs: usize, outputs: usize) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            bound_inputs: BTreeSet::new(),
            bound_outputs: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn outputs(&self) -> usize {
        self.outputs
    }

    pub fn is_bound(&self, direction: Direction, slot: usize) -> bool {
        match direction {
            Direction::Input => self.bound_inputs.contains(&slot),
            Direction::Output => self.bound_outputs.contains(&slot),
        }
    }

    pub fn bound_slots(&self, direction: Direction) -> impl Iterator<Item = usize> + '_ {
        match direction {
            Direction::Input => self.bound_inputs.iter().copied(),
            Direction::Output => self.bound_outputs.iter().copied(),
        }
    }

    fn mark_bound(&mut self, direction: Direction, slot: usize) {
        match direction {
            Direction::Input => self.bound_inputs.insert(slot),
            Direction::Output => self.bound_outputs.insert(slot),
        };
    }
}

impl Circuit {
    pub fn box_state(&self, circuit_box: DeviceId) -> Result<&BoxState> {
        self.device(circuit_box)?
            .box_state()
            .ok_or(Error::WrongKind {
                device: circuit_box,
                expected: "CircuitBox",
            })
    }

    /// Make input slot `box_index` of the box an alias of the target's input pin.
    pub fn bind_input_pin(
        &mut self,
        circuit_box: DeviceId,
        target: DeviceId,
        target_index: usize,
        box_index: usize,
    ) -> Result<()> {
        self.bind(circuit_box, Direction::Input, target, target_index, box_index)
    }

    /// Make output slot `box_index` of the box an alias of the target's output pin.
    pub fn bind_output_pin(
        &mut self,
        circuit_box: DeviceId,
        target: DeviceId,
        target_index: usize,
        box_index: usize,
    ) -> Result<()> {
        self.bind(circuit_box, Direction::Output, target, target_index, box_index)
    }

    fn bind(
        &mut self,
        circuit_box: DeviceId,
        direction: Direction,
        target: DeviceId,
        target_index: usize,
        box_index: usize,
    ) -> Result<()> {
        let state = self.box_state(circuit_box)?;
        let placeholder = self.pin_at(circuit_box, direction, box_index)?;
        let pin = self.pin_at(target, direction, target_index)?;

        if state.is_bound(direction, box_index) {
            return Err(Error::AlreadyBound {
                device: circuit_box,
                direction,
                index: box_index,
            });
        }

        // placeholders disappear once their own slot gets bound
        if self.pins[pin.0].owner() == target && self.device(target)?.box_state().is_some() {
            return Err(Error::UnboundSlot {
                device: target,
                direction,
                index: target_index,
            });
        }

        let slots = self.device(circuit_box)?.pins(direction);
        if let Some(slot) = slots.iter().position(|p| *p == pin) {
            return Err(Error::AlreadyBound {
                device: circuit_box,
                direction,
                index: slot,
            });
        }

        // an alias always starts out unwired, like a fresh box pin
        if self.pins[pin.0].is_bound() {
            return Err(Error::PinAlreadyBound {
                device: target,
                direction,
                index: target_index,
            });
        }

        if self.pins[placeholder.0].is_bound() {
            return Err(Error::PinAlreadyBound {
                device: circuit_box,
                direction,
                index: box_index,
            });
        }

        self.alias_slot(circuit_box, direction, box_index, pin)?;
        Ok(())
    }

    /// Replace a placeholder slot with `pin`, dropping the placeholder.
    pub(crate) fn alias_slot(
        &mut self,
        circuit_box: DeviceId,
        direction: Direction,
        slot: usize,
        pin: PinId,
    ) -> Result<()> {
        let device = self.device_mut(circuit_box)?;
        let placeholder = std::mem::replace(&mut device.pins_mut(direction)[slot], pin);

        if let Some(state) = device.box_state_mut() {
            state.mark_bound(direction, slot);
        }

        if self.pins.get(placeholder.0).is_some_and(|p| p.owner() == circuit_box) {
            self.pins.remove(placeholder.0);
        }

        self.inspector.raise(InspectionEvent::Bound {
            circuit_box,
            direction,
            slot,
            pin,
        });

        Ok(())
    }
}
