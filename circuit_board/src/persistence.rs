/**
 * @file persistence.rs
 * @date 19/10/2026
 * @brief Saving and loading circuit boxes
 */
use crate::cable::CableId;
use crate::circuit::Circuit;
use crate::device::{DeviceId, DeviceKind};
use crate::error::Error;
use crate::inspector::InspectionEvent;
use crate::pin::{Direction, PinId};
use crate::Result;
use circuit_format::{
    CableRecord, CircuitBoxFile, DeviceKind as KindRecord, DeviceRecord, PinRef, Slot,
    FORMAT_VERSION,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// A circuit box rebuilt from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBox {
    pub circuit_box: DeviceId,
    /// Devices created for the inside of the box, nested boxes included.
    pub internals: Vec<DeviceId>,
}

impl Circuit {
    /// Capture a circuit box as a disconnected black box.
    ///
    /// The boundary cables are lifted and the inputs forced low for the
    /// duration of the capture, then everything is put back and propagated
    /// again, so the live circuit looks untouched afterwards.
    pub fn snapshot_box(&mut self, circuit_box: DeviceId) -> Result<CircuitBoxFile> {
        self.box_state(circuit_box)?;
        let device = self.device(circuit_box)?;
        let inputs = device.inputs.clone();
        let outputs = device.outputs.clone();

        let input_cables = self.detach_boundary(&inputs);
        let output_cables = self.detach_boundary(&outputs);
        for pin in &inputs {
            self.pins[pin.0].set_value(false);
        }

        let snapshot = self
            .run_through(circuit_box, &inputs)
            .and_then(|()| self.encode_box(circuit_box));

        self.restore_boundary(&outputs, output_cables);
        self.restore_boundary(&inputs, input_cables);
        for pin in &inputs {
            if let Some(cable) = self.pins[pin.0].cable() {
                let upstream = self.cables[cable.0].other_end(*pin);
                let value = self.pins[upstream.0].value();
                self.pins[pin.0].set_value(value);
            }
        }

        let restored = self.run_through(circuit_box, &inputs);

        let file = snapshot?;
        restored?;
        Ok(file)
    }

    pub fn save_box(&mut self, circuit_box: DeviceId, store: &BoxStore) -> Result<PathBuf> {
        let file = self.snapshot_box(circuit_box)?;
        let path = store.write(&file)?;

        self.inspector.raise(InspectionEvent::Saved { name: file.name });
        Ok(path)
    }

    pub fn load_box(&mut self, name: &str, store: &BoxStore) -> Result<LoadedBox> {
        let file = store.read(name)?;
        self.instantiate_box(&file)
    }

    /// Rebuild a saved box inside this circuit.
    /// Nothing is left behind when the file turns out to be inconsistent.
    pub fn instantiate_box(&mut self, file: &CircuitBoxFile) -> Result<LoadedBox> {
        if file.version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(file.version));
        }

        let mut created = Vec::new();
        match self.build_box(file, &mut created) {
            Ok(loaded) => {
                self.inspector.raise(InspectionEvent::Loaded {
                    name: file.name.clone(),
                    circuit_box: loaded.circuit_box,
                });
                Ok(loaded)
            }
            Err(err) => {
                self.discard(&created);
                Err(err)
            }
        }
    }

    fn detach_boundary(&mut self, pins: &[PinId]) -> Vec<Option<CableId>> {
        pins.iter().map(|pin| self.pins[pin.0].detach()).collect()
    }

    fn restore_boundary(&mut self, pins: &[PinId], cables: Vec<Option<CableId>>) {
        for (pin, cable) in pins.iter().zip(cables) {
            if let Some(cable) = cable {
                self.pins[pin.0].attach(cable);
            }
        }
    }

    /// Refresh every device sitting behind an input slot.
    fn run_through(&mut self, circuit_box: DeviceId, inputs: &[PinId]) -> Result<()> {
        for pin in inputs {
            let owner = self.pins[pin.0].owner();
            if owner != circuit_box {
                self.refresh(owner)?;
            }
        }

        Ok(())
    }

    /// Every device inside the box: whatever the slots lead to, followed
    /// through cables and through nested boxes aliasing the pins found.
    fn component(&self, root: DeviceId) -> Vec<DeviceId> {
        let mut aliased_by: HashMap<PinId, Vec<DeviceId>> = HashMap::new();
        for (id, dev) in self.devices() {
            if id == root || dev.box_state().is_none() {
                continue;
            }

            for pin in dev.inputs.iter().chain(&dev.outputs) {
                aliased_by.entry(*pin).or_default().push(id);
            }
        }

        let root_dev = &self.devices[root.0];
        let mut queue = root_dev
            .inputs
            .iter()
            .chain(&root_dev.outputs)
            .map(|pin| self.pins[pin.0].owner())
            .collect::<VecDeque<_>>();

        let mut seen = HashSet::from([root]);
        let mut members = Vec::new();

        while let Some(device) = queue.pop_front() {
            if !seen.insert(device) {
                continue;
            }

            members.push(device);
            let dev = &self.devices[device.0];

            for pin in dev.inputs.iter().chain(&dev.outputs) {
                let data = &self.pins[pin.0];
                queue.push_back(data.owner());

                if let Some(cable) = data.cable() {
                    let other = self.cables[cable.0].other_end(*pin);
                    queue.push_back(self.pins[other.0].owner());
                }

                if let Some(boxes) = aliased_by.get(pin) {
                    queue.extend(boxes.iter().copied());
                }
            }
        }

        members
    }

    fn encode_box(&self, circuit_box: DeviceId) -> Result<CircuitBoxFile> {
        let members = self.component(circuit_box);
        let ids = members
            .iter()
            .enumerate()
            .map(|(index, device)| (*device, index as u32))
            .collect::<HashMap<_, _>>();

        let state = self.box_state(circuit_box)?;
        let mut file = CircuitBoxFile::new(
            state.name(),
            self.encode_slots(circuit_box, Direction::Input, &ids)?,
            self.encode_slots(circuit_box, Direction::Output, &ids)?,
        );

        let mut seen = HashSet::new();
        for (index, member) in members.iter().enumerate() {
            let dev = &self.devices[member.0];
            let values = |pins: &[PinId]| -> Vec<bool> {
                pins.iter().map(|p| self.pins[p.0].value()).collect()
            };

            file.devices.push(DeviceRecord {
                id: index as u32,
                kind: self.encode_kind(*member, &ids)?,
                inputs: values(&dev.inputs),
                outputs: values(&dev.outputs),
            });

            for pin in dev.inputs.iter().chain(&dev.outputs) {
                let data = &self.pins[pin.0];
                if data.owner() != *member {
                    continue;
                }

                let Some(cable) = data.cable() else {
                    continue;
                };

                if seen.insert(cable) {
                    let other = self.cables[cable.0].other_end(*pin);
                    file.cables.push(CableRecord {
                        a: self.pin_ref(*pin, &ids)?,
                        b: self.pin_ref(other, &ids)?,
                    });
                }
            }
        }

        Ok(file)
    }

    fn encode_kind(&self, device: DeviceId, ids: &HashMap<DeviceId, u32>) -> Result<KindRecord> {
        Ok(match &self.devices[device.0].kind {
            DeviceKind::Switch { status } => KindRecord::Switch { status: *status },
            DeviceKind::PowerSource => KindRecord::PowerSource,
            DeviceKind::Inverter => KindRecord::Inverter,
            DeviceKind::AndGate(n) => KindRecord::AndGate { inputs: *n as u32 },
            DeviceKind::OrGate(n) => KindRecord::OrGate { inputs: *n as u32 },
            DeviceKind::NandGate(n) => KindRecord::NandGate { inputs: *n as u32 },
            DeviceKind::NorGate(n) => KindRecord::NorGate { inputs: *n as u32 },
            DeviceKind::Junction(n) => KindRecord::Junction { outputs: *n as u32 },
            DeviceKind::CircuitBox(state) => KindRecord::CircuitBox {
                name: state.name().to_string(),
                inputs: self.encode_slots(device, Direction::Input, ids)?,
                outputs: self.encode_slots(device, Direction::Output, ids)?,
            },
        })
    }

    fn encode_slots(
        &self,
        circuit_box: DeviceId,
        direction: Direction,
        ids: &HashMap<DeviceId, u32>,
    ) -> Result<Vec<Slot>> {
        let state = self.box_state(circuit_box)?;

        self.devices[circuit_box.0]
            .pins(direction)
            .iter()
            .enumerate()
            .map(|(slot, pin)| {
                if state.is_bound(direction, slot) {
                    Ok(Slot::Alias {
                        pin: self.pin_ref(*pin, ids)?,
                    })
                } else {
                    Ok(Slot::Placeholder)
                }
            })
            .collect()
    }

    /// Address a pin by its owner's record id and its place on the owner.
    fn pin_ref(&self, pin: PinId, ids: &HashMap<DeviceId, u32>) -> Result<PinRef> {
        let owner = self.pins[pin.0].owner();
        let device = ids.get(&owner).ok_or(Error::DanglingPin(pin))?;
        let (direction, index) = self.devices[owner.0]
            .position(pin)
            .ok_or(Error::DanglingPin(pin))?;

        Ok(PinRef {
            device: *device,
            direction: direction.into(),
            index: index as u32,
        })
    }

    fn build_box(&mut self, file: &CircuitBoxFile, created: &mut Vec<DeviceId>) -> Result<LoadedBox> {
        // pin lists as created, before any slot gets aliased
        let mut built: HashMap<u32, (DeviceId, Vec<PinId>, Vec<PinId>)> = HashMap::new();

        for record in &file.devices {
            let id = self.add_device(decode_kind(&record.kind))?;
            created.push(id);

            let dev = &self.devices[id.0];
            let entry = (id, dev.inputs.clone(), dev.outputs.clone());
            if built.insert(record.id, entry).is_some() {
                return Err(Error::CorruptFile(format!("device id {} used twice", record.id)));
            }
        }

        let resolve = |pin: &PinRef| -> Result<PinId> {
            let (_, inputs, outputs) = built
                .get(&pin.device)
                .ok_or_else(|| Error::CorruptFile(format!("unknown device id {}", pin.device)))?;

            let pins = match Direction::from(pin.direction) {
                Direction::Input => inputs,
                Direction::Output => outputs,
            };

            pins.get(pin.index as usize).copied().ok_or_else(|| {
                Error::CorruptFile(format!(
                    "device {} has no {} pin {}",
                    pin.device,
                    Direction::from(pin.direction),
                    pin.index
                ))
            })
        };

        for record in &file.devices {
            if let KindRecord::CircuitBox { inputs, outputs, .. } = &record.kind {
                let device = built[&record.id].0;
                self.restore_slots(device, Direction::Input, inputs, &resolve)?;
                self.restore_slots(device, Direction::Output, outputs, &resolve)?;
            }
        }

        for record in &file.devices {
            let device = built[&record.id].0;
            self.restore_values(device, Direction::Input, &record.inputs)?;
            self.restore_values(device, Direction::Output, &record.outputs)?;
        }

        for cable in &file.cables {
            let a = resolve(&cable.a)?;
            let b = resolve(&cable.b)?;

            for pin in [a, b] {
                if !self.pins.get(pin.0).is_some_and(|p| p.is_free()) || a == b {
                    return Err(Error::CorruptFile(format!("cannot attach a cable to {pin}")));
                }
            }

            self.link(a, b);
        }

        let circuit_box = self.add_device(DeviceKind::circuit_box(
            &file.name,
            file.inputs.len(),
            file.outputs.len(),
        ))?;
        created.push(circuit_box);

        self.restore_slots(circuit_box, Direction::Input, &file.inputs, &resolve)?;
        self.restore_slots(circuit_box, Direction::Output, &file.outputs, &resolve)?;

        Ok(LoadedBox {
            circuit_box,
            internals: created[..created.len() - 1].to_vec(),
        })
    }

    fn restore_slots(
        &mut self,
        circuit_box: DeviceId,
        direction: Direction,
        slots: &[Slot],
        resolve: impl Fn(&PinRef) -> Result<PinId>,
    ) -> Result<()> {
        for (index, slot) in slots.iter().enumerate() {
            let Slot::Alias { pin: pin_ref } = slot else {
                continue;
            };

            let pin = resolve(pin_ref)?;
            let usable = Direction::from(pin_ref.direction) == direction
                && self.pins.get(pin.0).is_some_and(|p| {
                    self.devices[p.owner().0].box_state().is_none()
                })
                && !self.device(circuit_box)?.pins(direction).contains(&pin);

            if !usable {
                return Err(Error::CorruptFile(format!(
                    "{direction} slot {index} cannot alias {pin}"
                )));
            }

            self.alias_slot(circuit_box, direction, index, pin)?;
        }

        Ok(())
    }

    fn restore_values(&mut self, device: DeviceId, direction: Direction, values: &[bool]) -> Result<()> {
        let pins = self.devices[device.0].pins(direction).to_vec();

        if pins.len() != values.len() {
            return Err(Error::CorruptFile(format!(
                "{device} expects {} {direction} values, found {}",
                pins.len(),
                values.len()
            )));
        }

        for (pin, value) in pins.into_iter().zip(values) {
            self.pins[pin.0].set_value(*value);
        }

        Ok(())
    }
}

fn decode_kind(record: &KindRecord) -> DeviceKind {
    match record {
        KindRecord::Switch { status } => DeviceKind::Switch { status: *status },
        KindRecord::PowerSource => DeviceKind::PowerSource,
        KindRecord::Inverter => DeviceKind::Inverter,
        KindRecord::AndGate { inputs } => DeviceKind::AndGate(*inputs as usize),
        KindRecord::OrGate { inputs } => DeviceKind::OrGate(*inputs as usize),
        KindRecord::NandGate { inputs } => DeviceKind::NandGate(*inputs as usize),
        KindRecord::NorGate { inputs } => DeviceKind::NorGate(*inputs as usize),
        KindRecord::Junction { outputs } => DeviceKind::Junction(*outputs as usize),
        KindRecord::CircuitBox {
            name,
            inputs,
            outputs,
        } => DeviceKind::circuit_box(name, inputs.len(), outputs.len()),
    }
}

/// Directory of saved circuit boxes, one JSON file per box name.
#[derive(Debug, Clone)]
pub struct BoxStore {
    dir: PathBuf,
}

impl BoxStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\']);

        if !valid {
            return Err(Error::InvalidBoxName(name.to_string()));
        }

        Ok(self.dir.join(format!("{name}.json")))
    }

    pub fn write(&self, file: &CircuitBoxFile) -> Result<PathBuf> {
        let path = self.path_for(&file.name)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(file)?)?;

        log::debug!("Wrote circuit box {} to {}", file.name, path.display());
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<CircuitBoxFile> {
        let path = self.path_for(name)?;
        let file: CircuitBoxFile = serde_json::from_str(&fs::read_to_string(&path)?)?;

        if file.version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(file.version));
        }

        if file.name != name {
            return Err(Error::CorruptFile(format!(
                "{} holds circuit box {}",
                path.display(),
                file.name
            )));
        }

        Ok(file)
    }

    /// Names of the saved boxes, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
