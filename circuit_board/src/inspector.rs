use crate::cable::CableId;
use crate::device::DeviceId;
use crate::pin::{Direction, PinId};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionEvent {
    Connected {
        cable: CableId,
        output: PinId,
        input: PinId,
    },
    Disconnected {
        cable: CableId,
    },
    Transferred {
        cable: CableId,
        value: bool,
    },
    Recomputed {
        device: DeviceId,
    },
    Oscillation {
        cable: CableId,
    },
    Bound {
        circuit_box: DeviceId,
        direction: Direction,
        slot: usize,
        pin: PinId,
    },
    Saved {
        name: String,
    },
    Loaded {
        name: String,
        circuit_box: DeviceId,
    },
}

pub trait Inspector {
    fn handle_event(&self, event: InspectionEvent);
}

#[derive(Clone)]
pub struct InspectorRef {
    inspector: Rc<dyn Inspector>,
}

impl Default for InspectorRef {
    fn default() -> Self {
        Self {
            inspector: Rc::new(LogInspector),
        }
    }
}

impl Inspector for InspectorRef {
    fn handle_event(&self, event: InspectionEvent) {
        self.inspector.handle_event(event);
    }
}

impl InspectorRef {
    pub fn set_inspector(&mut self, inspector: Rc<dyn Inspector>) {
        self.inspector = inspector;
    }

    pub fn raise(&self, event: InspectionEvent) {
        self.inspector.handle_event(event);
    }
}

/// Default inspector, forwards every event to the `log` facade.
pub struct LogInspector;

impl Inspector for LogInspector {
    fn handle_event(&self, event: InspectionEvent) {
        match event {
            InspectionEvent::Connected {
                cable,
                output,
                input,
            } => {
                log::info!("Connected {output} -> {input} with {cable}");
            }

            InspectionEvent::Disconnected { cable } => {
                log::info!("Removed {cable}");
            }

            InspectionEvent::Transferred { cable, value } => {
                log::debug!("Transferred {value} over {cable}");
            }

            InspectionEvent::Recomputed { device } => {
                log::trace!("Recomputed {device}");
            }

            InspectionEvent::Oscillation { cable } => {
                log::warn!("Feedback loop through {cable}, propagation aborted");
            }

            InspectionEvent::Bound {
                circuit_box,
                direction,
                slot,
                pin,
            } => {
                log::info!("Circuit box {circuit_box}: {direction} slot {slot} bound to {pin}");
            }

            InspectionEvent::Saved { name } => {
                log::info!("Circuit box {name} saved");
            }

            InspectionEvent::Loaded { name, circuit_box } => {
                log::info!("Circuit box {name} loaded as {circuit_box}");
            }
        }
    }
}
