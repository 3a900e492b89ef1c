//! Display layout: slot groups, labels, precision and colour ranges

use super::DisplaySlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Green,
    Blue,
    Orange,
    Red,
}

/// Half-open `[min, max)` band of a numeric slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub colour: Colour,
}

const fn range(label: &'static str, min: f64, max: f64, colour: Colour) -> Range {
    Range { label, min, max, colour }
}

const OPERATING_HOURS_RANGES: &[Range] = &[
    range("New", 0.0, 1000.0, Colour::Green),
    range("Normal", 1000.0, 5000.0, Colour::Blue),
    range("High", 5000.0, 10000.0, Colour::Orange),
    range("Service Due", 10000.0, 50000.0, Colour::Red),
];

const IDLE_HOURS_RANGES: &[Range] = &[
    range("Low", 0.0, 500.0, Colour::Green),
    range("Moderate", 500.0, 2000.0, Colour::Orange),
    range("High", 2000.0, 10000.0, Colour::Red),
];

const FUEL_LEVEL_RANGES: &[Range] = &[
    range("Empty", 0.0, 10.0, Colour::Red),
    range("Low", 10.0, 25.0, Colour::Orange),
    range("Normal", 25.0, 75.0, Colour::Green),
    range("Full", 75.0, 100.0, Colour::Blue),
];

/// Submodule of the display, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub name: &'static str,
    pub label: &'static str,
    pub slots: &'static [DisplaySlot],
}

pub static GROUPS: [Group; 4] = [
    Group {
        name: "equipment_info",
        label: "Equipment Information",
        slots: &[DisplaySlot::EquipmentId, DisplaySlot::Model, DisplaySlot::Location],
    },
    Group {
        name: "operating_metrics",
        label: "Operating Metrics",
        slots: &[DisplaySlot::OperatingHours, DisplaySlot::IdleHours, DisplaySlot::FuelLevel],
    },
    Group {
        name: "engine",
        label: "Engine Status",
        slots: &[DisplaySlot::EngineStatus, DisplaySlot::ActiveAlerts],
    },
    Group {
        name: "connection",
        label: "Connection",
        slots: &[DisplaySlot::ConnectionStatus, DisplaySlot::LastCommunication],
    },
];

impl DisplaySlot {
    pub fn label(self) -> &'static str {
        match self {
            DisplaySlot::EquipmentId => "Equipment ID",
            DisplaySlot::Model => "Model",
            DisplaySlot::Location => "GPS Location",
            DisplaySlot::OperatingHours => "Operating Hours",
            DisplaySlot::IdleHours => "Idle Hours",
            DisplaySlot::FuelLevel => "Fuel Level (%)",
            DisplaySlot::EngineStatus => "Engine State",
            DisplaySlot::ActiveAlerts => "Active Fault Codes",
            DisplaySlot::ConnectionStatus => "Status",
            DisplaySlot::LastCommunication => "Last Communication",
        }
    }

    /// Decimal places for numeric slots, `None` for text slots
    pub fn precision(self) -> Option<usize> {
        match self {
            DisplaySlot::OperatingHours | DisplaySlot::IdleHours => Some(1),
            DisplaySlot::FuelLevel => Some(0),
            _ => None,
        }
    }

    pub fn ranges(self) -> &'static [Range] {
        match self {
            DisplaySlot::OperatingHours => OPERATING_HOURS_RANGES,
            DisplaySlot::IdleHours => IDLE_HOURS_RANGES,
            DisplaySlot::FuelLevel => FUEL_LEVEL_RANGES,
            _ => &[],
        }
    }

    /// Range containing `value`; the upper bound of the last band is inclusive
    pub fn classify(self, value: f64) -> Option<&'static Range> {
        let ranges = self.ranges();
        ranges
            .iter()
            .find(|r| value >= r.min && value < r.max)
            .or_else(|| ranges.last().filter(|r| value == r.max))
    }
}
