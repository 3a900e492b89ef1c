//! Equipment telemetry and its normalisation into display updates
//!
//! Expected report format (ISO-15143-3 / AEMP 2.0 compatible):
//!
//! ```json
//! {
//!     "equipment_id": "KOM-12345",
//!     "model": "PC200-8",
//!     "location": {"latitude": 35.6762, "longitude": 139.6503},
//!     "operating_hours": 5432.5,
//!     "idle_hours": 1234.2,
//!     "fuel_level_percent": 75,
//!     "engine_status": "running",
//!     "fault_codes": [],
//!     "last_communication": "2026-02-05T10:30:00Z"
//! }
//! ```
//!
//! Every key is optional. Identity fields fall back to `"N/A"` when absent
//! or falsy, while the numeric metrics are only written when present and
//! non-null. Both rules are kept as reported by the Komtrax integration.

use crate::display::{DisplaySlot, DisplayUpdate, DisplayValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_ALERTS: &str = "None";
pub const UNKNOWN_ENGINE_STATUS: &str = "unknown";

/// Single snapshot report of equipment operating data.
///
/// Kept as a raw JSON object so absent, null and falsy keys stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentTelemetry(Map<String, Value>);

impl EquipmentTelemetry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Value of `key` when present and not null
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Value of `key` when it is truthy
    fn truthy(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| is_truthy(v))
    }

    /// Equipment id for log lines
    pub fn label(&self) -> String {
        self.get("equipment_id")
            .map(display_text)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl From<Map<String, Value>> for EquipmentTelemetry {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Truthiness of a JSON value: null, false, 0, "" and empty containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Text shown for an arbitrary JSON value
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Pass a raw value through to a slot: numbers stay numbers
fn passthrough(value: &Value) -> DisplayValue {
    match value {
        Value::Number(n) => DisplayValue::Number(n.clone()),
        other => DisplayValue::Text(display_text(other)),
    }
}

/// First letter of every run of cased characters upper-cased, the rest
/// lower-cased. Uncased characters (digits, CJK, punctuation) end a run.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if !cased {
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = cased;
    }
    out
}

fn coordinate(location: &Map<String, Value>, key: &str) -> f64 {
    location.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Format a location object as `"{lat:.4}, {lon:.4}"`
pub fn format_location(location: &Map<String, Value>) -> String {
    format!(
        "{:.4}, {:.4}",
        coordinate(location, "latitude"),
        coordinate(location, "longitude")
    )
}

/// Normalise a telemetry report into the display updates it implies.
///
/// Deterministic and side-effect free apart from logging. Every field rule
/// runs; none short-circuits the others.
pub fn normalize(telemetry: &EquipmentTelemetry) -> Vec<DisplayUpdate> {
    debug!("Normalising equipment data: {}", telemetry.label());
    let mut updates = Vec::with_capacity(DisplaySlot::ALL.len());

    // Identity
    for (key, slot) in [
        ("equipment_id", DisplaySlot::EquipmentId),
        ("model", DisplaySlot::Model),
    ] {
        let text = telemetry
            .truthy(key)
            .map(display_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        updates.push(DisplayUpdate::new(slot, DisplayValue::Text(text)));
    }

    // Location
    match telemetry.truthy("location") {
        Some(Value::Object(location)) => {
            updates.push(DisplayUpdate::new(
                DisplaySlot::Location,
                DisplayValue::Text(format_location(location)),
            ));
        }
        Some(other) => warn!("Ignoring non-object location: {}", other),
        None => {}
    }

    // Operating metrics
    for (key, slot) in [
        ("operating_hours", DisplaySlot::OperatingHours),
        ("idle_hours", DisplaySlot::IdleHours),
        ("fuel_level_percent", DisplaySlot::FuelLevel),
    ] {
        if let Some(value) = telemetry.get(key) {
            updates.push(DisplayUpdate::new(slot, passthrough(value)));
        }
    }

    // Engine status
    let engine_status = telemetry
        .get("engine_status")
        .map(display_text)
        .unwrap_or_else(|| UNKNOWN_ENGINE_STATUS.to_string());
    updates.push(DisplayUpdate::new(
        DisplaySlot::EngineStatus,
        DisplayValue::Text(title_case(&engine_status)),
    ));

    // Fault codes
    let alerts = match telemetry.truthy("fault_codes") {
        Some(Value::Array(codes)) => codes.iter().map(display_text).collect::<Vec<_>>().join(", "),
        Some(Value::Object(codes)) => codes.keys().cloned().collect::<Vec<_>>().join(", "),
        Some(code) => display_text(code),
        None => NO_ALERTS.to_string(),
    };
    updates.push(DisplayUpdate::new(DisplaySlot::ActiveAlerts, DisplayValue::Text(alerts)));

    // Connection
    match telemetry.truthy("last_communication") {
        Some(timestamp) => {
            updates.push(DisplayUpdate::new(
                DisplaySlot::LastCommunication,
                DisplayValue::Text(display_text(timestamp)),
            ));
            updates.push(DisplayUpdate::new(DisplaySlot::ConnectionStatus, "Connected"));
        }
        None => updates.push(DisplayUpdate::new(DisplaySlot::ConnectionStatus, "Unknown")),
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn telemetry(value: Value) -> EquipmentTelemetry {
        serde_json::from_value(value).unwrap()
    }

    fn written(updates: &[DisplayUpdate], slot: DisplaySlot) -> Vec<&DisplayValue> {
        updates.iter().filter(|u| u.slot == slot).map(|u| &u.value).collect()
    }

    fn text(updates: &[DisplayUpdate], slot: DisplaySlot) -> Option<String> {
        written(updates, slot).last().map(|v| v.to_string())
    }

    #[test]
    fn test_full_report() {
        let updates = normalize(&telemetry(json!({
            "equipment_id": "KOM-12345",
            "model": "PC200-8",
            "serial_number": "12345",
            "location": {"latitude": 35.6762, "longitude": 139.6503},
            "operating_hours": 5432.5,
            "idle_hours": 1234.2,
            "fuel_level_percent": 75,
            "engine_status": "running",
            "fault_codes": [],
            "last_communication": "2026-02-05T10:30:00Z"
        })));

        assert_eq!(text(&updates, DisplaySlot::EquipmentId).as_deref(), Some("KOM-12345"));
        assert_eq!(text(&updates, DisplaySlot::Model).as_deref(), Some("PC200-8"));
        assert_eq!(text(&updates, DisplaySlot::Location).as_deref(), Some("35.6762, 139.6503"));
        assert_eq!(text(&updates, DisplaySlot::OperatingHours).as_deref(), Some("5432.5"));
        assert_eq!(text(&updates, DisplaySlot::IdleHours).as_deref(), Some("1234.2"));
        assert_eq!(
            written(&updates, DisplaySlot::FuelLevel),
            vec![&DisplayValue::Number(75.into())]
        );
        assert_eq!(text(&updates, DisplaySlot::EngineStatus).as_deref(), Some("Running"));
        assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("None"));
        assert_eq!(
            text(&updates, DisplaySlot::LastCommunication).as_deref(),
            Some("2026-02-05T10:30:00Z")
        );
        assert_eq!(text(&updates, DisplaySlot::ConnectionStatus).as_deref(), Some("Connected"));
        assert_eq!(updates.len(), DisplaySlot::ALL.len());
    }

    #[test]
    fn test_empty_report_writes_defaults_only() {
        let updates = normalize(&EquipmentTelemetry::default());
        let slots: Vec<_> = updates.iter().map(|u| u.slot).collect();
        assert_eq!(
            slots,
            vec![
                DisplaySlot::EquipmentId,
                DisplaySlot::Model,
                DisplaySlot::EngineStatus,
                DisplaySlot::ActiveAlerts,
                DisplaySlot::ConnectionStatus,
            ]
        );
        assert_eq!(text(&updates, DisplaySlot::EquipmentId).as_deref(), Some("N/A"));
        assert_eq!(text(&updates, DisplaySlot::Model).as_deref(), Some("N/A"));
        assert_eq!(text(&updates, DisplaySlot::EngineStatus).as_deref(), Some("Unknown"));
        assert_eq!(text(&updates, DisplaySlot::ConnectionStatus).as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_location_not_written_when_absent_or_empty() {
        for report in [json!({}), json!({"location": {}}), json!({"location": null})] {
            let updates = normalize(&telemetry(report));
            assert!(written(&updates, DisplaySlot::Location).is_empty());
        }
    }

    #[test]
    fn test_location_defaults_missing_coordinate() {
        let updates = normalize(&telemetry(json!({"location": {"latitude": -33.8688}})));
        assert_eq!(text(&updates, DisplaySlot::Location).as_deref(), Some("-33.8688, 0.0000"));

        let updates = normalize(&telemetry(json!({"location": {"latitude": 1, "longitude": 2.123456}})));
        assert_eq!(text(&updates, DisplaySlot::Location).as_deref(), Some("1.0000, 2.1235"));
    }

    #[test]
    fn test_non_object_location_is_skipped() {
        let updates = normalize(&telemetry(json!({"location": "Tokyo"})));
        assert!(written(&updates, DisplaySlot::Location).is_empty());
    }

    // Identity fields default on falsy, metrics only skip on null.
    #[test]
    fn test_default_versus_presence_quirk() {
        let updates = normalize(&telemetry(json!({
            "equipment_id": "",
            "model": null,
            "operating_hours": 0,
            "idle_hours": null,
            "fuel_level_percent": 0
        })));

        assert_eq!(text(&updates, DisplaySlot::EquipmentId).as_deref(), Some("N/A"));
        assert_eq!(text(&updates, DisplaySlot::Model).as_deref(), Some("N/A"));
        assert_eq!(
            written(&updates, DisplaySlot::OperatingHours),
            vec![&DisplayValue::Number(0.into())]
        );
        assert!(written(&updates, DisplaySlot::IdleHours).is_empty());
        assert_eq!(
            written(&updates, DisplaySlot::FuelLevel),
            vec![&DisplayValue::Number(0.into())]
        );
    }

    #[test]
    fn test_numeric_identity_is_shown_as_text() {
        let updates = normalize(&telemetry(json!({"equipment_id": 12345})));
        assert_eq!(text(&updates, DisplaySlot::EquipmentId).as_deref(), Some("12345"));
    }

    #[test]
    fn test_fault_codes() {
        let updates = normalize(&telemetry(json!({"fault_codes": ["E001", "E002"]})));
        assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("E001, E002"));

        let updates = normalize(&telemetry(json!({"fault_codes": ["E001", 42, 7.5]})));
        assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("E001, 42, 7.5"));

        for report in [json!({"fault_codes": []}), json!({}), json!({"fault_codes": null})] {
            let updates = normalize(&telemetry(report));
            assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("None"));
        }

        let updates = normalize(&telemetry(json!({"fault_codes": "E009"})));
        assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("E009"));

        // Keyed codes show the keys
        let updates = normalize(&telemetry(json!({"fault_codes": {"E001": "low oil", "E002": 3}})));
        assert_eq!(text(&updates, DisplaySlot::ActiveAlerts).as_deref(), Some("E001, E002"));
    }

    #[test]
    fn test_engine_status_title_case() {
        let updates = normalize(&telemetry(json!({"engine_status": "running"})));
        assert_eq!(text(&updates, DisplaySlot::EngineStatus).as_deref(), Some("Running"));

        let updates = normalize(&telemetry(json!({"engine_status": null})));
        assert_eq!(text(&updates, DisplaySlot::EngineStatus).as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_title_case_rules() {
        assert_eq!(title_case("running"), "Running");
        assert_eq!(title_case("ENGINE OFF"), "Engine Off");
        assert_eq!(title_case("idle_mode"), "Idle_Mode");
        assert_eq!(title_case("key-on 2nd"), "Key-On 2Nd");
        assert_eq!(title_case(""), "");
        assert_eq!(title_case("日本running"), "日本Running");
        assert_eq!(title_case("ÉTAT arrêt"), "État Arrêt");
    }

    #[test]
    fn test_last_communication_missing_leaves_slot_untouched() {
        let updates = normalize(&telemetry(json!({"last_communication": ""})));
        assert!(written(&updates, DisplaySlot::LastCommunication).is_empty());
        assert_eq!(text(&updates, DisplaySlot::ConnectionStatus).as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let report = telemetry(json!({
            "equipment_id": "KOM-1",
            "fault_codes": ["E1"],
            "location": {"latitude": 1.5, "longitude": 2.5}
        }));
        assert_eq!(normalize(&report), normalize(&report));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!(true)));
    }
}
