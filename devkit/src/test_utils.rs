/*!
Test Harness pour le processor Komtrax

Facilite l'écriture de tests avec:
- Setup automatique du display enregistreur et de l'API simulée
- Envoi de messages / ticks comme le ferait la plateforme
- Assertions sur les slots du display
*/

use crate::api_stub::MockEquipmentApi;
use crate::display_stub::RecordingDisplay;
use anyhow::Result;
use komtrax_processor::{DisplaySlot, EquipmentEventHandler, InboundEvent, ProcessorConfig};
use serde_json::Value;
use std::collections::HashMap;

/// Harness de test complet autour d'un `EquipmentEventHandler`
pub struct TestHarness {
    pub handler: EquipmentEventHandler<MockEquipmentApi, RecordingDisplay>,
    pub api: MockEquipmentApi,
    pub display: RecordingDisplay,
}

impl TestHarness {
    /// Crée un harness avec la config par défaut (pas de clé API)
    pub fn new() -> Self {
        Self::with_config(ProcessorConfig::default())
    }

    /// Crée un harness avec une clé API configurée
    pub fn with_api_key(api_key: &str) -> Self {
        Self::with_config(ProcessorConfig {
            api_key: Some(api_key.to_string()),
            ..ProcessorConfig::default()
        })
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        // Init logging pour tests
        tracing_subscriber::fmt().with_test_writer().try_init().ok();

        let api = MockEquipmentApi::new();
        let display = RecordingDisplay::new();
        let handler = EquipmentEventHandler::new(config, api.clone(), display.clone());

        Self {
            handler,
            api,
            display,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        self.handler.config()
    }

    /// Simule une invocation avec un message
    pub async fn send_message(&mut self, message: Value) {
        self.handler
            .handle(InboundEvent::from_message(Some(message)))
            .await;
    }

    /// Simule une invocation planifiée (pas de message)
    pub async fn tick(&mut self) {
        self.handler.handle(InboundEvent::Tick).await;
    }

    /// Dernière valeur d'un slot, en texte
    pub fn slot_text(&self, slot: DisplaySlot) -> Option<String> {
        self.display.last_text(slot)
    }

    /// Assert qu'un slot affiche la valeur attendue
    pub fn assert_slot(&self, slot: DisplaySlot, expected: &str) -> Result<()> {
        match self.slot_text(slot) {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => anyhow::bail!(
                "Slot '{}' mismatch: expected {:?}, got {:?}",
                slot,
                expected,
                actual
            ),
            None => anyhow::bail!("Slot '{}' was never written", slot),
        }
    }

    /// Assert qu'un slot n'a jamais été écrit
    pub fn assert_untouched(&self, slot: DisplaySlot) -> Result<()> {
        if self.display.was_written(slot) {
            anyhow::bail!(
                "Slot '{}' was written: {:?}",
                slot,
                self.display.updates_for(slot)
            );
        }
        Ok(())
    }

    /// Stats sur les écritures collectées
    pub fn get_stats(&self) -> TestStats {
        let mut slot_counts = HashMap::new();
        for update in self.display.updates() {
            *slot_counts.entry(update.slot).or_insert(0) += 1;
        }

        TestStats {
            total_updates: self.display.updates().len(),
            slot_counts,
            pushes: self.display.push_count(),
            requests: self.api.request_count(),
        }
    }

    /// Reset le display pour une nouvelle étape du test
    pub fn reset(&mut self) {
        self.display.clear();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct TestStats {
    pub total_updates: usize,
    pub slot_counts: HashMap<DisplaySlot, usize>,
    pub pushes: usize,
    pub requests: usize,
}

impl TestStats {
    pub fn print(&self) {
        println!("📊 Test Statistics:");
        println!("  Total updates: {}", self.total_updates);
        for (slot, count) in &self.slot_counts {
            println!("    {}: {} writes", slot, count);
        }
        println!("  Pushes: {}", self.pushes);
        println!("  API requests: {}", self.requests);
    }
}
