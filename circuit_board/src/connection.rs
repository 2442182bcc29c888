/**
 * @file connection.rs
 * @date 19/10/2026
 * @brief Connecting and disconnecting devices
 */
use crate::cable::{Cable, CableId};
use crate::circuit::Circuit;
use crate::device::{DeviceId, DeviceKind};
use crate::error::Error;
use crate::inspector::InspectionEvent;
use crate::pin::{Direction, PinId};
use crate::Result;
use std::collections::HashSet;

impl Circuit {
    /// First unbound pin on the given side.
    pub fn free_pin(&self, device: DeviceId, direction: Direction) -> Result<PinId> {
        self.device(device)?
            .pins(direction)
            .iter()
            .copied()
            .find(|pin| self.pins[pin.0].is_free())
            .ok_or(Error::NoFreePin { device, direction })
    }

    /// The pin at `index`, which must not carry a cable yet.
    pub fn free_pin_at(
        &self,
        device: DeviceId,
        direction: Direction,
        index: usize,
    ) -> Result<PinId> {
        let pin = self.pin_at(device, direction, index)?;

        if self.pins[pin.0].is_bound() {
            return Err(Error::PinAlreadyBound {
                device,
                direction,
                index,
            });
        }

        Ok(pin)
    }

    /// Wire the next free output of `source` to the next free input of `target`.
    ///
    /// A cable closing a feedback loop stays connected, the call then
    /// returns `OscillationDetected`.
    pub fn connect(&mut self, source: DeviceId, target: DeviceId) -> Result<DeviceId> {
        let output = self.free_pin(source, Direction::Output)?;
        let input = self.free_pin(target, Direction::Input)?;

        self.attach(output, input)?;
        Ok(target)
    }

    /// Wire the next free output of `source` to a specific input of `target`.
    ///
    /// A cable closing a feedback loop stays connected, the call then
    /// returns `OscillationDetected`.
    pub fn connect_to_input(
        &mut self,
        source: DeviceId,
        target: DeviceId,
        target_input: usize,
    ) -> Result<DeviceId> {
        let output = self.free_pin(source, Direction::Output)?;
        let input = self.free_pin_at(target, Direction::Input, target_input)?;

        self.attach(output, input)?;
        Ok(target)
    }

    /// Wire a specific output of `source` to a specific input of `target`.
    ///
    /// A cable closing a feedback loop stays connected, the call then
    /// returns `OscillationDetected`.
    pub fn connect_pins(
        &mut self,
        source: DeviceId,
        source_output: usize,
        target: DeviceId,
        target_input: usize,
    ) -> Result<DeviceId> {
        let output = self.free_pin_at(source, Direction::Output, source_output)?;
        let input = self.free_pin_at(target, Direction::Input, target_input)?;

        self.attach(output, input)?;
        Ok(target)
    }

    /// Wire one junction output to each target, or nothing at all.
    /// Only the planning is all-or-nothing. Once wiring starts, an oscillation
    /// stops it with the cables made so far kept.
    pub fn connect_all(&mut self, junction: DeviceId, targets: &[DeviceId]) -> Result<()> {
        if !matches!(self.device(junction)?.kind, DeviceKind::Junction(_)) {
            return Err(Error::WrongKind {
                device: junction,
                expected: "Junction",
            });
        }

        let mut outputs = self
            .device(junction)?
            .outputs
            .iter()
            .copied()
            .filter(|pin| self.pins[pin.0].is_free());

        // The same target may be listed twice, each entry takes its own input.
        let mut claimed = HashSet::new();
        let mut plan = Vec::with_capacity(targets.len());

        for &target in targets {
            let input = self
                .device(target)?
                .inputs
                .iter()
                .copied()
                .find(|pin| self.pins[pin.0].is_free() && !claimed.contains(pin))
                .ok_or(Error::NoFreePin {
                    device: target,
                    direction: Direction::Input,
                })?;

            let output = outputs.next().ok_or(Error::NoFreePin {
                device: junction,
                direction: Direction::Output,
            })?;

            claimed.insert(input);
            plan.push((output, input));
        }

        for (output, input) in plan {
            self.attach(output, input)?;
        }

        Ok(())
    }

    /// Remove every cable running from an output of `source` into `target`.
    ///
    /// Each freed input is forced low and its device refreshed, so nothing
    /// downstream keeps a value the cable used to feed. Devices sharing no
    /// cable are left alone. Every matching cable is removed even when one
    /// of the refreshes runs into an oscillation, the first error is
    /// returned afterwards.
    pub fn disconnect(&mut self, source: DeviceId, target: DeviceId) -> Result<()> {
        let outputs = self.device(source)?.outputs.clone();
        let target_inputs = self.device(target)?.inputs.clone();

        let mut result = Ok(());
        for output in outputs {
            let Some(cable) = self.pins[output.0].cable() else {
                continue;
            };

            let peer = self.cables[cable.0].other_end(output);
            if !target_inputs.contains(&peer) {
                continue;
            }

            self.remove_cable(cable);
            self.pins[peer.0].set_value(false);

            let downstream = self.pins[peer.0].owner();
            let refreshed = self.refresh(downstream);
            if result.is_ok() {
                result = refreshed;
            }
        }

        result
    }

    /// Create the cable and push the output value through it.
    fn attach(&mut self, output: PinId, input: PinId) -> Result<CableId> {
        let cable = self.link(output, input);

        self.inspector.raise(InspectionEvent::Connected {
            cable,
            output,
            input,
        });

        self.transfer(output)?;
        Ok(cable)
    }

    /// Create a cable between two free pins without propagating.
    pub(crate) fn link(&mut self, a: PinId, b: PinId) -> CableId {
        let cable = CableId(self.cables.insert(Cable::new(a, b)));
        self.pins[a.0].attach(cable);
        self.pins[b.0].attach(cable);
        cable
    }

    pub(crate) fn remove_cable(&mut self, cable: CableId) {
        let Some(removed) = self.cables.remove(cable.0) else {
            return;
        };

        let (a, b) = removed.ends();
        for pin in [a, b] {
            if let Some(pin) = self.pins.get_mut(pin.0) {
                pin.detach();
            }
        }

        self.inspector
            .raise(InspectionEvent::Disconnected { cable });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit_with(kinds: &[DeviceKind]) -> (Circuit, Vec<DeviceId>) {
        let mut circuit = Circuit::new();
        let ids = kinds
            .iter()
            .map(|kind| circuit.add_device(kind.clone()).unwrap())
            .collect();
        (circuit, ids)
    }

    #[test]
    fn test_connect_transfers_value() {
        let (mut circuit, ids) = circuit_with(&[DeviceKind::NandGate(2), DeviceKind::Inverter]);

        assert_eq!(circuit.connect(ids[0], ids[1]).unwrap(), ids[1]);

        let output = circuit.device(ids[0]).unwrap().outputs()[0];
        let input = circuit.device(ids[1]).unwrap().inputs()[0];
        assert!(circuit.pin(output).unwrap().is_bound());
        assert_eq!(
            circuit.pin(output).unwrap().cable(),
            circuit.pin(input).unwrap().cable()
        );

        // nand idles high, the inverter turns it low
        assert!(circuit.input_value(ids[1], 0).unwrap());
        assert!(!circuit.output_value(ids[1], 0).unwrap());
    }

    #[test]
    fn test_connect_first_fit() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::Inverter,
            DeviceKind::Inverter,
            DeviceKind::OrGate(2),
        ]);

        circuit.connect(ids[0], ids[2]).unwrap();
        circuit.connect(ids[1], ids[2]).unwrap();

        let err = circuit.connect(ids[0], ids[2]).unwrap_err();
        assert!(matches!(
            err,
            Error::NoFreePin {
                direction: Direction::Output,
                ..
            }
        ));

        let third = circuit.add_device(DeviceKind::Inverter).unwrap();
        let err = circuit.connect(third, ids[2]).unwrap_err();
        assert!(matches!(
            err,
            Error::NoFreePin { device, direction: Direction::Input } if device == ids[2]
        ));
        assert_eq!(circuit.cable_count(), 2);
    }

    #[test]
    fn test_connect_to_specific_input() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::Inverter,
            DeviceKind::Inverter,
            DeviceKind::AndGate(2),
        ]);

        circuit.connect_to_input(ids[0], ids[2], 1).unwrap();
        assert!(circuit.input_value(ids[2], 1).unwrap());
        assert!(!circuit.input_value(ids[2], 0).unwrap());

        assert!(matches!(
            circuit.connect_to_input(ids[1], ids[2], 1),
            Err(Error::PinAlreadyBound { index: 1, .. })
        ));
        assert!(matches!(
            circuit.connect_to_input(ids[1], ids[2], 2),
            Err(Error::PinNotFound { index: 2, .. })
        ));
        assert_eq!(circuit.cable_count(), 1);

        circuit.connect_to_input(ids[1], ids[2], 0).unwrap();
        assert!(circuit.output_value(ids[2], 0).unwrap());
    }

    #[test]
    fn test_connect_pins_checks_both_ends() {
        let (mut circuit, ids) = circuit_with(&[DeviceKind::Junction(2), DeviceKind::AndGate(2)]);

        circuit.connect_pins(ids[0], 1, ids[1], 0).unwrap();

        assert!(matches!(
            circuit.connect_pins(ids[0], 1, ids[1], 1),
            Err(Error::PinAlreadyBound {
                direction: Direction::Output,
                index: 1,
                ..
            })
        ));
        assert!(matches!(
            circuit.connect_pins(ids[0], 2, ids[1], 1),
            Err(Error::PinNotFound {
                direction: Direction::Output,
                ..
            })
        ));
        assert!(matches!(
            circuit.connect_pins(ids[0], 0, ids[1], 0),
            Err(Error::PinAlreadyBound {
                direction: Direction::Input,
                index: 0,
                ..
            })
        ));
        assert_eq!(circuit.cable_count(), 1);
    }

    #[test]
    fn test_disconnect_resets_downstream() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::PowerSource,
            DeviceKind::Inverter,
            DeviceKind::Inverter,
        ]);

        circuit.connect(ids[0], ids[1]).unwrap();
        circuit.connect(ids[1], ids[2]).unwrap();
        circuit.set_power(ids[0], true).unwrap();
        assert!(circuit.output_value(ids[2], 0).unwrap());

        circuit.disconnect(ids[0], ids[1]).unwrap();

        let output = circuit.device(ids[0]).unwrap().outputs()[0];
        let input = circuit.device(ids[1]).unwrap().inputs()[0];
        assert!(circuit.pin(output).unwrap().is_free());
        assert!(circuit.pin(input).unwrap().is_free());
        assert!(!circuit.input_value(ids[1], 0).unwrap());
        assert!(circuit.output_value(ids[1], 0).unwrap());
        assert!(!circuit.output_value(ids[2], 0).unwrap());
        assert_eq!(circuit.cable_count(), 1);
    }

    #[test]
    fn test_disconnect_unrelated_is_noop() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::Inverter,
            DeviceKind::Inverter,
            DeviceKind::Inverter,
        ]);

        circuit.connect(ids[0], ids[1]).unwrap();
        circuit.disconnect(ids[0], ids[2]).unwrap();
        circuit.disconnect(ids[1], ids[0]).unwrap();

        assert_eq!(circuit.cable_count(), 1);
        assert!(circuit.input_value(ids[1], 0).unwrap());
    }

    #[test]
    fn test_disconnect_removes_every_cable_through_a_loop() {
        // junction feeds both or inputs, or -> inverter -> junction closes a loop
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::Junction(2),
            DeviceKind::OrGate(2),
            DeviceKind::Inverter,
        ]);
        let (junction, or, inverter) = (ids[0], ids[1], ids[2]);

        circuit.connect_all(junction, &[or, or]).unwrap();
        circuit.connect(or, inverter).unwrap();
        assert!(matches!(
            circuit.connect(inverter, junction),
            Err(Error::OscillationDetected { .. })
        ));
        assert_eq!(circuit.cable_count(), 4);

        assert!(matches!(
            circuit.disconnect(junction, or),
            Err(Error::OscillationDetected { .. })
        ));

        assert_eq!(circuit.cable_count(), 2);
        let dev = circuit.device(junction).unwrap();
        assert!(dev.outputs().iter().all(|p| circuit.pin(*p).unwrap().is_free()));
        let dev = circuit.device(or).unwrap();
        assert!(dev.inputs().iter().all(|p| circuit.pin(*p).unwrap().is_free()));

        // the loop is open now
        circuit.disconnect(or, inverter).unwrap();
        circuit.connect(or, inverter).unwrap();
    }

    #[test]
    fn test_disconnect_two_cables_between_same_pair() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::PowerSource,
            DeviceKind::Junction(2),
            DeviceKind::AndGate(2),
        ]);
        let (power, junction, and) = (ids[0], ids[1], ids[2]);

        circuit.connect(power, junction).unwrap();
        circuit.connect_all(junction, &[and, and]).unwrap();
        circuit.set_power(power, true).unwrap();
        assert!(circuit.output_value(and, 0).unwrap());

        circuit.disconnect(junction, and).unwrap();
        assert_eq!(circuit.cable_count(), 1);
        assert!(!circuit.input_value(and, 0).unwrap());
        assert!(!circuit.input_value(and, 1).unwrap());
        assert!(!circuit.output_value(and, 0).unwrap());
    }

    #[test]
    fn test_connect_all_is_all_or_nothing() {
        let (mut circuit, ids) = circuit_with(&[
            DeviceKind::Junction(2),
            DeviceKind::Inverter,
            DeviceKind::Inverter,
            DeviceKind::Inverter,
        ]);

        // three targets, two outputs
        assert!(matches!(
            circuit.connect_all(ids[0], &ids[1..]),
            Err(Error::NoFreePin { direction: Direction::Output, .. })
        ));
        assert_eq!(circuit.cable_count(), 0);

        circuit.connect(ids[3], ids[2]).unwrap();
        assert!(matches!(
            circuit.connect_all(ids[0], &ids[1..3]),
            Err(Error::NoFreePin { direction: Direction::Input, .. })
        ));
        assert_eq!(circuit.cable_count(), 1);

        circuit.disconnect(ids[3], ids[2]).unwrap();
        circuit.connect_all(ids[0], &ids[1..3]).unwrap();
        assert_eq!(circuit.cable_count(), 2);
    }

    #[test]
    fn test_connect_all_same_target_twice() {
        let (mut circuit, ids) = circuit_with(&[DeviceKind::Junction(3), DeviceKind::OrGate(2)]);

        circuit.connect_all(ids[0], &[ids[1], ids[1]]).unwrap();
        assert_eq!(circuit.cable_count(), 2);

        assert!(matches!(
            circuit.connect_all(ids[0], &[ids[1]]),
            Err(Error::NoFreePin { direction: Direction::Input, .. })
        ));
    }

    #[test]
    fn test_connect_all_requires_junction() {
        let (mut circuit, ids) = circuit_with(&[DeviceKind::Inverter, DeviceKind::Inverter]);

        assert!(matches!(
            circuit.connect_all(ids[0], &ids[1..]),
            Err(Error::WrongKind { expected: "Junction", .. })
        ));
    }
}
