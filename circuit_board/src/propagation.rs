/**
 * @file propagation.rs
 * @date 19/10/2026
 * @brief Depth-first signal propagation along cables
 */
use crate::cable::CableId;
use crate::circuit::Circuit;
use crate::device::DeviceId;
use crate::error::Error;
use crate::inspector::InspectionEvent;
use crate::pin::PinId;
use crate::Result;
use std::collections::HashSet;

impl Circuit {
    /// Apply the device's truth table to its current input values.
    pub(crate) fn recompute(&mut self, device: DeviceId) {
        let dev = &self.devices[device.0];
        let inputs = dev
            .inputs
            .iter()
            .map(|pin| self.pins[pin.0].value())
            .collect::<Vec<_>>();
        let mut outputs = dev
            .outputs
            .iter()
            .map(|pin| self.pins[pin.0].value())
            .collect::<Vec<_>>();

        dev.kind.evaluate(&inputs, &mut outputs);

        for (pin, value) in dev.outputs.clone().into_iter().zip(outputs) {
            self.pins[pin.0].set_value(value);
        }

        self.inspector.raise(InspectionEvent::Recomputed { device });
    }

    /// Recompute a device and push all of its outputs downstream.
    pub fn refresh(&mut self, device: DeviceId) -> Result<()> {
        self.device(device)?;
        self.recompute(device);

        let outputs = self.devices[device.0].outputs.clone();
        for output in outputs {
            self.transfer(output)?;
        }

        Ok(())
    }

    /// Push the value of `output` to everything reachable through cables.
    ///
    /// Every device reached is recomputed before its own outputs are pushed.
    /// Reaching a cable that is already on the current path means the signal
    /// feeds back into itself: the pass stops with `OscillationDetected` and
    /// whatever was transferred until then stays in place.
    pub fn transfer(&mut self, output: PinId) -> Result<()> {
        let mut path = HashSet::new();
        self.push(output, &mut path)
    }

    fn push(&mut self, output: PinId, path: &mut HashSet<CableId>) -> Result<()> {
        let Some(cable) = self.pins[output.0].cable() else {
            return Ok(());
        };

        if !path.insert(cable) {
            self.inspector
                .raise(InspectionEvent::Oscillation { cable });
            return Err(Error::OscillationDetected { cable });
        }

        let value = self.pins[output.0].value();
        let peer = self.cables[cable.0].other_end(output);
        self.pins[peer.0].set_value(value);
        self.inspector
            .raise(InspectionEvent::Transferred { cable, value });

        let device = self.pins[peer.0].owner();
        self.recompute(device);

        let outputs = self.devices[device.0].outputs.clone();
        for next in outputs {
            self.push(next, path)?;
        }

        path.remove(&cable);
        Ok(())
    }
}
