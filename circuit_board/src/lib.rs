/**
 * @file lib.rs
 * @date 19/10/2026
 * @brief Combinational logic circuit simulator library
 */
pub mod cable;
pub mod circuit;
pub mod circuit_box;
pub mod connection;
pub mod device;
pub mod error;
pub mod inspector;
pub mod persistence;
pub mod pin;
pub mod propagation;
pub mod workbench;

mod utils;

pub use cable::{Cable, CableId};
pub use circuit::Circuit;
pub use circuit_box::BoxState;
pub use device::{Device, DeviceId, DeviceKind};
pub use error::Error as CircuitError;
pub use inspector::{InspectionEvent, Inspector, InspectorRef, LogInspector};
pub use persistence::{BoxStore, LoadedBox};
pub use pin::{Direction, Pin, PinId};
pub use workbench::Workbench;

pub use circuit_format as format;

pub type Result<T> = core::result::Result<T, CircuitError>;
