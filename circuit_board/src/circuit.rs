/**
 * @file circuit.rs
 * @date 19/10/2026
 * @brief Arena holding every device, pin and cable of one circuit
 */
use crate::cable::{Cable, CableId};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::Error;
use crate::inspector::{InspectionEvent, Inspector, InspectorRef};
use crate::pin::{Direction, Pin, PinId};
use crate::utils::Arena;
use crate::Result;
use std::rc::Rc;

/// A self-contained circuit.
///
/// Devices, pins and cables refer to each other by id only. A circuit box
/// keeps the ids of the pins it aliases in its pin lists, the pins stay owned
/// by the devices inside the box.
#[derive(Default)]
pub struct Circuit {
    pub(crate) devices: Arena<Device>,
    pub(crate) pins: Arena<Pin>,
    pub(crate) cables: Arena<Cable>,
    pub(crate) inspector: InspectorRef,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_inspector(&mut self, inspector: Rc<dyn Inspector>) {
        self.inspector.set_inspector(inspector);
    }

    /// Create a device with fresh pins.
    /// Outputs are computed once from all-false inputs, so a NAND starts high.
    pub fn add_device(&mut self, kind: DeviceKind) -> Result<DeviceId> {
        kind.validate()?;

        let (inputs, outputs) = kind.pin_counts();
        let id = DeviceId(self.devices.insert(Device::new(kind)));

        let input_pins = (0..inputs)
            .map(|_| PinId(self.pins.insert(Pin::new(id))))
            .collect();
        let output_pins = (0..outputs)
            .map(|_| PinId(self.pins.insert(Pin::new(id))))
            .collect();

        let device = &mut self.devices[id.0];
        device.inputs = input_pins;
        device.outputs = output_pins;

        self.recompute(id);
        log::debug!("Created {} as {id}", self.devices[id.0].kind.name());

        Ok(id)
    }

    pub fn device(&self, id: DeviceId) -> Result<&Device> {
        self.devices.get(id.0).ok_or(Error::DeviceNotFound(id))
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device> {
        self.devices.get_mut(id.0).ok_or(Error::DeviceNotFound(id))
    }

    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &Device)> {
        self.devices.iter().map(|(index, device)| (DeviceId(index), device))
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.devices.contains(id.0)
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.get(id.0)
    }

    pub fn cable(&self, id: CableId) -> Option<&Cable> {
        self.cables.get(id.0)
    }

    pub fn cables(&self) -> impl Iterator<Item = (CableId, &Cable)> {
        self.cables.iter().map(|(index, cable)| (CableId(index), cable))
    }

    pub fn cable_count(&self) -> usize {
        self.cables.len()
    }

    /// Pin at `index` on the given side, bound or not.
    pub fn pin_at(&self, device: DeviceId, direction: Direction, index: usize) -> Result<PinId> {
        self.device(device)?
            .pin(direction, index)
            .ok_or(Error::PinNotFound {
                device,
                direction,
                index,
            })
    }

    /// Current value of a pin, the `show` operation.
    pub fn value(&self, device: DeviceId, direction: Direction, index: usize) -> Result<bool> {
        let pin = self.pin_at(device, direction, index)?;
        Ok(self.pins[pin.0].value())
    }

    pub fn input_value(&self, device: DeviceId, index: usize) -> Result<bool> {
        self.value(device, Direction::Input, index)
    }

    pub fn output_value(&self, device: DeviceId, index: usize) -> Result<bool> {
        self.value(device, Direction::Output, index)
    }

    pub fn set_switch(&mut self, device: DeviceId, on: bool) -> Result<()> {
        match &mut self.device_mut(device)?.kind {
            DeviceKind::Switch { status } => *status = on,
            _ => {
                return Err(Error::WrongKind {
                    device,
                    expected: "Switch",
                })
            }
        }

        log::info!("Switch {device} turned {}", if on { "on" } else { "off" });
        self.refresh(device)
    }

    pub fn set_power(&mut self, device: DeviceId, on: bool) -> Result<()> {
        let dev = self.device(device)?;
        if dev.kind != DeviceKind::PowerSource {
            return Err(Error::WrongKind {
                device,
                expected: "PowerSource",
            });
        }

        let input = dev.inputs[0];
        self.pins[input.0].set_value(on);

        log::info!("Power source {device} turned {}", if on { "on" } else { "off" });
        self.refresh(device)
    }

    /// Circuit box whose slots alias a pin owned by `device`, if any.
    pub fn aliasing_box(&self, device: DeviceId) -> Option<DeviceId> {
        self.aliasing_box_of(&[device])
    }

    /// Circuit box outside `group` whose slots alias a pin owned by a member of `group`.
    pub fn aliasing_box_of(&self, group: &[DeviceId]) -> Option<DeviceId> {
        self.devices().find_map(|(id, dev)| {
            let state = dev.box_state()?;
            let aliases = [Direction::Input, Direction::Output].into_iter().any(|dir| {
                state
                    .bound_slots(dir)
                    .filter_map(|slot| dev.pin(dir, slot))
                    .any(|pin| group.contains(&self.pins[pin.0].owner()))
            });

            (!group.contains(&id) && aliases).then_some(id)
        })
    }

    /// Remove a device after tearing down every cable on it.
    ///
    /// Downstream pins are reset to false and refreshed. The device is gone
    /// even if that refresh runs into an oscillation, the error is reported
    /// afterwards.
    pub fn delete(&mut self, device: DeviceId) -> Result<()> {
        if let Some(circuit_box) = self.aliasing_box(device) {
            return Err(Error::AliasedByBox {
                device,
                circuit_box,
            });
        }

        let dev = self.device(device)?;
        let inputs = dev.inputs.clone();
        let outputs = dev.outputs.clone();

        for pin in inputs {
            if let Some(cable) = self.pins[pin.0].cable() {
                self.remove_cable(cable);
            }
        }

        let mut result = Ok(());
        for pin in outputs {
            let Some(cable) = self.pins[pin.0].cable() else {
                continue;
            };

            let peer = self.cables[cable.0].other_end(pin);
            self.remove_cable(cable);
            self.pins[peer.0].set_value(false);

            let downstream = self.pins[peer.0].owner();
            if downstream != device {
                let refreshed = self.refresh(downstream);
                if result.is_ok() {
                    result = refreshed;
                }
            }
        }

        self.release(device);
        log::info!("Deleted {device}");

        result
    }

    /// Drop a set of devices without any propagation.
    /// Cables among them are removed, cables leaving the set just free the far end.
    pub(crate) fn discard(&mut self, devices: &[DeviceId]) {
        for device in devices {
            let Some(dev) = self.devices.get(device.0) else {
                continue;
            };

            let pins = dev.inputs.iter().chain(&dev.outputs).copied().collect::<Vec<_>>();
            for pin in pins {
                if let Some(cable) = self.pins.get(pin.0).and_then(Pin::cable) {
                    self.remove_cable(cable);
                }
            }
        }

        for device in devices {
            self.release(*device);
        }
    }

    /// Free the device slot and every pin it owns.
    fn release(&mut self, device: DeviceId) {
        let Some(dev) = self.devices.remove(device.0) else {
            return;
        };

        for pin in dev.inputs.iter().chain(&dev.outputs) {
            if self.pins.get(pin.0).is_some_and(|p| p.owner() == device) {
                self.pins.remove(pin.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_outputs() {
        let mut circuit = Circuit::new();
        let and = circuit.add_device(DeviceKind::AndGate(2)).unwrap();
        let nand = circuit.add_device(DeviceKind::NandGate(2)).unwrap();
        let nor = circuit.add_device(DeviceKind::NorGate(3)).unwrap();
        let inverter = circuit.add_device(DeviceKind::Inverter).unwrap();

        assert!(!circuit.output_value(and, 0).unwrap());
        assert!(circuit.output_value(nand, 0).unwrap());
        assert!(circuit.output_value(nor, 0).unwrap());
        assert!(circuit.output_value(inverter, 0).unwrap());
    }

    #[test]
    fn test_and_gate_needs_inputs() {
        let mut circuit = Circuit::new();

        assert!(matches!(
            circuit.add_device(DeviceKind::AndGate(0)),
            Err(Error::InvalidPinCount { count: 0, .. })
        ));
        assert_eq!(circuit.devices().count(), 0);
    }

    #[test]
    fn test_show_out_of_range() {
        let mut circuit = Circuit::new();
        let or = circuit.add_device(DeviceKind::OrGate(2)).unwrap();

        assert!(circuit.input_value(or, 1).is_ok());
        assert!(matches!(
            circuit.input_value(or, 2),
            Err(Error::PinNotFound {
                direction: Direction::Input,
                index: 2,
                ..
            })
        ));
        assert!(matches!(
            circuit.output_value(or, 1),
            Err(Error::PinNotFound { .. })
        ));
    }

    #[test]
    fn test_wrong_kind_operations() {
        let mut circuit = Circuit::new();
        let inverter = circuit.add_device(DeviceKind::Inverter).unwrap();

        assert!(matches!(
            circuit.set_switch(inverter, true),
            Err(Error::WrongKind { expected: "Switch", .. })
        ));
        assert!(matches!(
            circuit.set_power(inverter, true),
            Err(Error::WrongKind { expected: "PowerSource", .. })
        ));
    }

    #[test]
    fn test_power_source() {
        let mut circuit = Circuit::new();
        let power = circuit.add_device(DeviceKind::PowerSource).unwrap();

        circuit.set_power(power, true).unwrap();
        assert!(circuit.output_value(power, 0).unwrap());

        circuit.set_power(power, false).unwrap();
        assert!(!circuit.output_value(power, 0).unwrap());
    }

    #[test]
    fn test_delete_resets_downstream() {
        let mut circuit = Circuit::new();
        let power = circuit.add_device(DeviceKind::PowerSource).unwrap();
        let inverter = circuit.add_device(DeviceKind::Inverter).unwrap();
        let and = circuit.add_device(DeviceKind::AndGate(1)).unwrap();

        circuit.connect(power, inverter).unwrap();
        circuit.connect(inverter, and).unwrap();
        circuit.set_power(power, true).unwrap();
        assert!(!circuit.output_value(inverter, 0).unwrap());

        circuit.delete(power).unwrap();

        assert!(!circuit.contains(power));
        assert!(!circuit.input_value(inverter, 0).unwrap());
        assert!(circuit.output_value(inverter, 0).unwrap());
        assert!(circuit.output_value(and, 0).unwrap());
        assert_eq!(circuit.cable_count(), 1);

        circuit.delete(and).unwrap();
        assert_eq!(circuit.cable_count(), 0);
        assert!(circuit.pin(circuit.device(inverter).unwrap().outputs()[0]).unwrap().is_free());
        assert!(matches!(circuit.delete(and), Err(Error::DeviceNotFound(_))));
    }
}
