//! circuit_format
//! Date: 19/10/2026
//! Description: This module defines the data structures of the on-disk
//! representation of a saved circuit box. The core library converts its
//! arena into these records and back, so a saved box does not depend on
//! how any particular build lays out its memory.

use serde::{Deserialize, Serialize};

/// Version written into every file. Readers must refuse anything else.
pub const FORMAT_VERSION: u32 = 1;

/// Side of a device a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Address of a pin inside a saved box.
/// `device` is the record id, `index` the position in the device's pin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinRef {
    pub device: u32,
    pub direction: Direction,
    pub index: u32,
}

/// State of one boundary slot of a circuit box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Slot {
    /// Never bound, the box still owns a private pin here.
    Placeholder,
    /// Alias of an internal device's pin.
    Alias { pin: PinRef },
}

impl Slot {
    pub fn is_bound(&self) -> bool {
        matches!(self, Slot::Alias { .. })
    }
}

/// Kind of a saved device together with the state that is not a pin value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceKind {
    Switch {
        status: bool,
    },
    PowerSource,
    Inverter,
    AndGate {
        inputs: u32,
    },
    OrGate {
        inputs: u32,
    },
    NandGate {
        inputs: u32,
    },
    NorGate {
        inputs: u32,
    },
    Junction {
        outputs: u32,
    },
    /// A box nested inside the saved one.
    CircuitBox {
        name: String,
        inputs: Vec<Slot>,
        outputs: Vec<Slot>,
    },
}

/// One device of the saved graph.
/// `inputs` and `outputs` hold the value seen at each pin position,
/// aliased box slots included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: u32,
    pub kind: DeviceKind,
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
}

/// A cable between two internal pins, in no particular order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableRecord {
    pub a: PinRef,
    pub b: PinRef,
}

/// A saved circuit box, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBoxFile {
    pub version: u32,
    pub name: String,
    pub inputs: Vec<Slot>,
    pub outputs: Vec<Slot>,
    pub devices: Vec<DeviceRecord>,
    pub cables: Vec<CableRecord>,
}

impl CircuitBoxFile {
    pub fn new(name: impl Into<String>, inputs: Vec<Slot>, outputs: Vec<Slot>) -> Self {
        Self {
            version: FORMAT_VERSION,
            name: name.into(),
            inputs,
            outputs,
            devices: Vec::new(),
            cables: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut file = CircuitBoxFile::new(
            "half_adder",
            vec![Slot::Alias {
                pin: PinRef {
                    device: 0,
                    direction: Direction::Input,
                    index: 1,
                },
            }],
            vec![Slot::Placeholder],
        );

        file.devices.push(DeviceRecord {
            id: 0,
            kind: DeviceKind::AndGate { inputs: 2 },
            inputs: vec![false, false],
            outputs: vec![false],
        });

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["version"], FORMAT_VERSION);
        assert_eq!(json["inputs"][0]["state"], "alias");
        assert_eq!(json["inputs"][0]["pin"]["direction"], "input");
        assert_eq!(json["outputs"][0]["state"], "placeholder");
        assert_eq!(json["devices"][0]["kind"]["type"], "and_gate");
        assert_eq!(json["devices"][0]["kind"]["inputs"], 2);

        let back: CircuitBoxFile = serde_json::from_value(json).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let json = r#"{"id":0,"kind":{"type":"xor_gate"},"inputs":[],"outputs":[]}"#;
        assert!(serde_json::from_str::<DeviceRecord>(json).is_err());
    }
}
