//! Equipment event handler
//!
//! Runs once per invocation:
//! - Commands: `force_sync`, `clear_alerts`, `update_config`
//! - Equipment reports received as channel messages
//! - Scheduled ticks polling the Komtrax API
//!
//! Invocations are strictly sequential; the config lives in the handler for
//! the process lifetime and only `update_config` mutates it.

use crate::api_client::{telemetry_from_body, EquipmentApi, FetchError, FetchRequest};
use crate::config::{ConfigUpdate, ProcessorConfig};
use crate::display::{DisplaySink, DisplaySlot, DisplayValue};
use crate::event::{Command, InboundEvent};
use crate::telemetry::{self, EquipmentTelemetry, NO_ALERTS};
use tracing::{debug, error, info, info_span, warn, Instrument};

pub const STATUS_CONNECTED: &str = "Connected";
pub const STATUS_ERROR: &str = "Error";
pub const STATUS_NOT_CONFIGURED: &str = "Not Configured";

/// Outcome of a fetch-and-normalise run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Report received and displayed
    Updated,
    /// API answered with an empty body
    NoData,
    /// Fetch failed, display marked as errored
    Failed,
    /// No API key, nothing attempted
    Skipped,
}

pub struct EquipmentEventHandler<A, S> {
    config: ProcessorConfig,
    api: A,
    sink: S,
}

impl<A: EquipmentApi, S: DisplaySink> EquipmentEventHandler<A, S> {
    pub fn new(config: ProcessorConfig, api: A, sink: S) -> Self {
        info!("Setting up Komatsu Komtrax processor");
        Self { config, api, sink }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (ProcessorConfig, A, S) {
        (self.config, self.api, self.sink)
    }

    /// Process one invocation, then push the display
    pub async fn handle(&mut self, event: InboundEvent) {
        let span = info_span!("invocation", id = %uuid::Uuid::new_v4(), kind = event.kind());
        self.process(event).instrument(span).await
    }

    async fn process(&mut self, event: InboundEvent) {
        info!("Processing Komatsu Komtrax event");

        match event {
            InboundEvent::Tick => {
                info!("No message - attempting API fetch");
                if self.config.api_key().is_some() {
                    self.sync().await;
                } else {
                    warn!("API key not configured, cannot fetch data");
                    self.set_connection_status(STATUS_NOT_CONFIGURED);
                }
            }
            InboundEvent::Command(command) => self.handle_command(command).await,
            InboundEvent::Telemetry(report) => self.apply_telemetry(&report),
            InboundEvent::Unsupported(data) => {
                debug!("Ignoring message that is not an object: {}", data);
            }
        }

        self.sink.push();
        info!("Closing Komatsu Komtrax processor invocation");
    }

    /// Execute a control command
    pub async fn handle_command(&mut self, command: Command) {
        info!("Handling command: {}", command.name());

        match command {
            Command::ForceSync => {
                if self.config.api_key().is_some() {
                    self.sync().await;
                } else {
                    warn!("Cannot force sync - API key not configured");
                }
            }
            Command::ClearAlerts => {
                info!("Clearing alerts");
                self.sink.update(DisplaySlot::ActiveAlerts, DisplayValue::text(NO_ALERTS));
            }
            Command::UpdateConfig(update) => self.update_config(&update),
            Command::Unknown(name) => warn!("Unhandled command: {}", name),
        }
    }

    fn update_config(&mut self, update: &ConfigUpdate) {
        if update.is_empty() {
            debug!("update_config carried no known fields");
        }
        self.config.apply(update);
        info!("Configuration updated");
    }

    /// Normalise a report and write it to the display
    pub fn apply_telemetry(&mut self, report: &EquipmentTelemetry) {
        info!("Processing equipment data: {}", report.label());
        self.sink.apply(telemetry::normalize(report));
        info!("UI updated for equipment {}", report.label());
    }

    /// Fetch from the API and display the result.
    ///
    /// Errors are logged and swallowed; the display shows `Error`.
    pub async fn sync(&mut self) -> SyncOutcome {
        let Some(request) = FetchRequest::from_config(&self.config) else {
            warn!("API key not configured, skipping fetch");
            return SyncOutcome::Skipped;
        };

        match self.fetch(&request).await {
            Ok(Some(report)) => {
                self.apply_telemetry(&report);
                self.set_connection_status(STATUS_CONNECTED);
                SyncOutcome::Updated
            }
            Ok(None) => {
                info!("Komtrax API returned no equipment data");
                SyncOutcome::NoData
            }
            Err(e) => {
                error!("Error fetching equipment data: {}", e);
                self.set_connection_status(STATUS_ERROR);
                SyncOutcome::Failed
            }
        }
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Option<EquipmentTelemetry>, FetchError> {
        let body = self.api.fetch(request).await?;
        telemetry_from_body(body)
    }

    fn set_connection_status(&mut self, status: &str) {
        self.sink.update(DisplaySlot::ConnectionStatus, DisplayValue::text(status));
    }
}
