//! Inbound events
//!
//! An invocation receives either nothing (scheduled tick) or a channel
//! message. A message whose `command` key is truthy is a command, any other
//! JSON object is an equipment report. The decision is made once, here.

use crate::config::ConfigUpdate;
use crate::telemetry::{display_text, is_truthy, EquipmentTelemetry};
use serde_json::{Map, Value};

/// Control command carried by a message
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch from the API now, if a key is configured
    ForceSync,
    /// Reset the active alerts display
    ClearAlerts,
    /// Replace API settings for the rest of the process lifetime
    UpdateConfig(ConfigUpdate),
    /// Anything else, ignored
    Unknown(String),
}

impl Command {
    /// Parse a command name and the full message it came with
    pub fn parse(name: &str, payload: &Map<String, Value>) -> Self {
        match name {
            "force_sync" => Command::ForceSync,
            "clear_alerts" => Command::ClearAlerts,
            "update_config" => Command::UpdateConfig(config_update(payload)),
            other => Command::Unknown(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::ForceSync => "force_sync",
            Command::ClearAlerts => "clear_alerts",
            Command::UpdateConfig(_) => "update_config",
            Command::Unknown(name) => name,
        }
    }
}

/// Extract the API settings present in an `update_config` payload.
///
/// Non-string values are coerced to text; `null` becomes an empty string,
/// which reads back as "not set".
fn config_update(payload: &Map<String, Value>) -> ConfigUpdate {
    let field = |key: &str| {
        payload.get(key).map(|value| match value {
            Value::Null => String::new(),
            other => display_text(other),
        })
    };

    ConfigUpdate {
        api_endpoint: field("api_endpoint"),
        api_key: field("api_key"),
        equipment_id: field("equipment_id"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// No message: scheduled invocation
    Tick,
    Command(Command),
    Telemetry(EquipmentTelemetry),
    /// Message data that is not a JSON object
    Unsupported(Value),
}

impl InboundEvent {
    /// Classify the optional message data of an invocation
    pub fn from_message(message: Option<Value>) -> Self {
        match message {
            None => InboundEvent::Tick,
            Some(Value::Object(data)) => match data.get("command").filter(|c| is_truthy(c)) {
                Some(command) => {
                    let name = display_text(command);
                    InboundEvent::Command(Command::parse(&name, &data))
                }
                None => InboundEvent::Telemetry(EquipmentTelemetry::new(data)),
            },
            Some(other) => InboundEvent::Unsupported(other),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Tick => "tick",
            InboundEvent::Command(_) => "command",
            InboundEvent::Telemetry(_) => "telemetry",
            InboundEvent::Unsupported(_) => "unsupported",
        }
    }
}

impl From<Option<Value>> for InboundEvent {
    fn from(message: Option<Value>) -> Self {
        Self::from_message(message)
    }
}
