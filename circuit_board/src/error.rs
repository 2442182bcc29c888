use crate::cable::CableId;
use crate::device::DeviceId;
use crate::pin::{Direction, PinId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No free {direction} pin on {device}")]
    NoFreePin {
        device: DeviceId,
        direction: Direction,
    },

    #[error("{device} has no {direction} pin at index {index}")]
    PinNotFound {
        device: DeviceId,
        direction: Direction,
        index: usize,
    },

    #[error("The {direction} pin {index} of {device} is already connected")]
    PinAlreadyBound {
        device: DeviceId,
        direction: Direction,
        index: usize,
    },

    #[error("The {direction} slot {index} of circuit box {device} is already bound")]
    AlreadyBound {
        device: DeviceId,
        direction: Direction,
        index: usize,
    },

    #[error("The {direction} slot {index} of circuit box {device} is not bound")]
    UnboundSlot {
        device: DeviceId,
        direction: Direction,
        index: usize,
    },

    #[error("Oscillation detected on {cable}, propagation stopped")]
    OscillationDetected { cable: CableId },

    #[error("A {kind} needs at least one pin, got {count}")]
    InvalidPinCount { kind: &'static str, count: usize },

    #[error("Device {0} does not exist")]
    DeviceNotFound(DeviceId),

    #[error("{device} is not a {expected}")]
    WrongKind {
        device: DeviceId,
        expected: &'static str,
    },

    #[error("{device} is bound into circuit box {circuit_box}")]
    AliasedByBox {
        device: DeviceId,
        circuit_box: DeviceId,
    },

    #[error("{0} leads out of the circuit box being saved")]
    DanglingPin(PinId),

    #[error("There is no device named {0}")]
    UnknownName(String),

    #[error("A device named {0} already exists")]
    DuplicateName(String),

    #[error("Invalid circuit box name: {0:?}")]
    InvalidBoxName(String),

    #[error("Unsupported circuit file version {0}")]
    UnsupportedVersion(u32),

    #[error("Corrupt circuit file: {0}")]
    CorruptFile(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed circuit file: {0}")]
    Json(#[from] serde_json::Error),
}
