//! Komatsu Komtrax Processor - equipment monitoring integration
//!
//! This processor integrates with the Komatsu Komtrax telematics API
//! (ISO-15143-3 / AEMP 2.0) for equipment monitoring. It can:
//! - Poll the Komtrax API to fetch equipment data
//! - Receive inbound equipment data via channel messages
//! - Handle control commands (force_sync, clear_alerts, update_config)
//! - Update the device display with equipment status, location and metrics

pub mod api_client;
pub mod config;
pub mod display;
pub mod event;
pub mod processor;
pub mod telemetry;

pub use api_client::{EquipmentApi, FetchError, FetchRequest, KomtraxClient};
pub use config::{ConfigUpdate, ProcessorConfig};
pub use display::{ConsoleDisplay, DisplaySink, DisplaySlot, DisplayUpdate, DisplayValue};
pub use event::{Command, InboundEvent};
pub use processor::{EquipmentEventHandler, SyncOutcome};
pub use telemetry::EquipmentTelemetry;
