/**
 * @file workbench.rs
 * @date 19/10/2026
 * @brief Named device store on top of a circuit
 */
use crate::circuit::Circuit;
use crate::device::{DeviceId, DeviceKind};
use crate::error::Error;
use crate::persistence::BoxStore;
use crate::pin::Direction;
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// A circuit whose devices are addressed by user-given names.
///
/// Devices rebuilt from a saved circuit box are not named, only the box
/// itself is. They are kept alongside the box so deleting it also clears
/// them out.
#[derive(Default)]
pub struct Workbench {
    circuit: Circuit,
    names: BTreeMap<String, DeviceId>,
    hidden: HashMap<DeviceId, Vec<DeviceId>>,
}

impl Workbench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn id(&self, name: &str) -> Result<DeviceId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    pub fn create(&mut self, name: &str, kind: DeviceKind) -> Result<DeviceId> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let id = self.circuit.add_device(kind)?;
        self.names.insert(name.to_string(), id);

        log::info!("Created {} {name} as {id}", self.circuit.device(id)?.kind().name());
        Ok(id)
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Result<()> {
        let (source, target) = (self.id(source)?, self.id(target)?);
        self.circuit.connect(source, target)?;
        Ok(())
    }

    pub fn connect_to_input(&mut self, source: &str, target: &str, target_input: usize) -> Result<()> {
        let (source, target) = (self.id(source)?, self.id(target)?);
        self.circuit.connect_to_input(source, target, target_input)?;
        Ok(())
    }

    pub fn connect_pins(
        &mut self,
        source: &str,
        source_output: usize,
        target: &str,
        target_input: usize,
    ) -> Result<()> {
        let (source, target) = (self.id(source)?, self.id(target)?);
        self.circuit
            .connect_pins(source, source_output, target, target_input)?;
        Ok(())
    }

    pub fn disconnect(&mut self, source: &str, target: &str) -> Result<()> {
        let (source, target) = (self.id(source)?, self.id(target)?);
        self.circuit.disconnect(source, target)
    }

    /// Delete a device, together with the insides of a loaded circuit box.
    ///
    /// Refused while another box aliases a pin of the device or of those
    /// insides.
    ///
    /// The name is released as soon as the device is gone, even when the
    /// clean-up propagation downstream reports an error.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let id = self.id(name)?;

        let mut group = vec![id];
        group.extend(self.hidden.get(&id).into_iter().flatten().copied());
        if let Some(circuit_box) = self.circuit.aliasing_box_of(&group) {
            return Err(Error::AliasedByBox {
                device: id,
                circuit_box,
            });
        }

        let result = self.circuit.delete(id);

        if self.circuit.contains(id) {
            return result;
        }

        self.names.remove(name);
        if let Some(internals) = self.hidden.remove(&id) {
            self.circuit.discard(&internals);
        }

        result
    }

    pub fn show(&self, direction: Direction, name: &str, index: usize) -> Result<bool> {
        self.circuit.value(self.id(name)?, direction, index)
    }

    pub fn switch(&mut self, name: &str, on: bool) -> Result<()> {
        let id = self.id(name)?;
        self.circuit.set_switch(id, on)
    }

    pub fn power(&mut self, name: &str, on: bool) -> Result<()> {
        let id = self.id(name)?;
        self.circuit.set_power(id, on)
    }

    pub fn connect_all<S: AsRef<str>>(&mut self, junction: &str, targets: &[S]) -> Result<()> {
        let junction = self.id(junction)?;
        let targets = targets
            .iter()
            .map(|name| self.id(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        self.circuit.connect_all(junction, &targets)
    }

    pub fn bind_input_pin(
        &mut self,
        circuit_box: &str,
        target: &str,
        target_index: usize,
        box_index: usize,
    ) -> Result<()> {
        let (circuit_box, target) = (self.id(circuit_box)?, self.id(target)?);
        self.circuit
            .bind_input_pin(circuit_box, target, target_index, box_index)
    }

    pub fn bind_output_pin(
        &mut self,
        circuit_box: &str,
        target: &str,
        target_index: usize,
        box_index: usize,
    ) -> Result<()> {
        let (circuit_box, target) = (self.id(circuit_box)?, self.id(target)?);
        self.circuit
            .bind_output_pin(circuit_box, target, target_index, box_index)
    }

    pub fn save(&mut self, name: &str, store: &BoxStore) -> Result<PathBuf> {
        let id = self.id(name)?;
        self.circuit.save_box(id, store)
    }

    /// Load a saved box and register it under its own name.
    pub fn load(&mut self, name: &str, store: &BoxStore) -> Result<DeviceId> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let loaded = self.circuit.load_box(name, store)?;
        self.names.insert(name.to_string(), loaded.circuit_box);
        self.hidden.insert(loaded.circuit_box, loaded.internals);

        Ok(loaded.circuit_box)
    }

    /// Named devices, sorted by name.
    pub fn list(&self) -> impl Iterator<Item = (&str, &DeviceKind)> + '_ {
        self.names.iter().filter_map(|(name, id)| {
            let device = self.circuit.device(*id).ok()?;
            Some((name.as_str(), device.kind()))
        })
    }
}
