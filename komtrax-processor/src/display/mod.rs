//! Device-status display model
//!
//! Provides the write-only view of the operator display:
//! - Named display slots and their values
//! - The `DisplaySink` seam implemented by the UI framework (or a stub)
//! - Slot grouping, labels and colour ranges (`layout`)
//! - A console sink printing the snapshot on push (`console`)

pub mod console;
pub mod layout;

use serde::Serialize;
use serde_json::Number;
use std::fmt;

pub use console::ConsoleDisplay;

/// Named field of the device-status display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplaySlot {
    EquipmentId,
    Model,
    Location,
    OperatingHours,
    IdleHours,
    FuelLevel,
    EngineStatus,
    ActiveAlerts,
    ConnectionStatus,
    LastCommunication,
}

impl DisplaySlot {
    pub const ALL: [DisplaySlot; 10] = [
        DisplaySlot::EquipmentId,
        DisplaySlot::Model,
        DisplaySlot::Location,
        DisplaySlot::OperatingHours,
        DisplaySlot::IdleHours,
        DisplaySlot::FuelLevel,
        DisplaySlot::EngineStatus,
        DisplaySlot::ActiveAlerts,
        DisplaySlot::ConnectionStatus,
        DisplaySlot::LastCommunication,
    ];

    /// Variable name registered with the UI
    pub fn name(self) -> &'static str {
        match self {
            DisplaySlot::EquipmentId => "equipment_id",
            DisplaySlot::Model => "model",
            DisplaySlot::Location => "location",
            DisplaySlot::OperatingHours => "operating_hours",
            DisplaySlot::IdleHours => "idle_hours",
            DisplaySlot::FuelLevel => "fuel_level",
            DisplaySlot::EngineStatus => "engine_status",
            DisplaySlot::ActiveAlerts => "active_alerts",
            DisplaySlot::ConnectionStatus => "connection_status",
            DisplaySlot::LastCommunication => "last_communication",
        }
    }
}

impl fmt::Display for DisplaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar written into a slot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Text(String),
    /// Raw telemetry number, integers stay integers
    Number(Number),
}

impl DisplayValue {
    pub fn text(value: impl Into<String>) -> Self {
        DisplayValue::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DisplayValue::Number(number) => number.as_f64(),
            DisplayValue::Text(_) => None,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Text(text) => f.write_str(text),
            DisplayValue::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for DisplayValue {
    fn from(value: &str) -> Self {
        DisplayValue::Text(value.to_string())
    }
}

/// One slot write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayUpdate {
    pub slot: DisplaySlot,
    pub value: DisplayValue,
}

impl DisplayUpdate {
    pub fn new(slot: DisplaySlot, value: impl Into<DisplayValue>) -> Self {
        Self {
            slot,
            value: value.into(),
        }
    }
}

/// Write side of the operator display.
///
/// The processor never reads values back.
pub trait DisplaySink {
    fn update(&mut self, slot: DisplaySlot, value: DisplayValue);

    /// Publish pending updates, called once at the end of every invocation
    fn push(&mut self) {}

    fn apply(&mut self, updates: Vec<DisplayUpdate>) {
        for DisplayUpdate { slot, value } in updates {
            self.update(slot, value);
        }
    }
}
