/*!
Display enregistreur pour tests sans UI

Enregistre toutes les écritures de slots et les push, pour distinguer
"slot jamais écrit" de "slot écrit avec la valeur par défaut".
*/

use komtrax_processor::{DisplaySink, DisplaySlot, DisplayUpdate, DisplayValue};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Display stub partagé: les clones voient les mêmes écritures
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    updates: Arc<Mutex<Vec<DisplayUpdate>>>,
    pushes: Arc<Mutex<usize>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toutes les écritures, dans l'ordre
    pub fn updates(&self) -> Vec<DisplayUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Écritures sur un slot donné
    pub fn updates_for(&self, slot: DisplaySlot) -> Vec<DisplayValue> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.slot == slot)
            .map(|u| u.value.clone())
            .collect()
    }

    /// Dernière valeur écrite sur un slot
    pub fn last_value(&self, slot: DisplaySlot) -> Option<DisplayValue> {
        self.updates_for(slot).pop()
    }

    /// Dernière valeur d'un slot, rendue en texte
    pub fn last_text(&self, slot: DisplaySlot) -> Option<String> {
        self.last_value(slot).map(|v| v.to_string())
    }

    pub fn was_written(&self, slot: DisplaySlot) -> bool {
        !self.updates_for(slot).is_empty()
    }

    /// Slots écrits, dans l'ordre de la première écriture
    pub fn written_slots(&self) -> Vec<DisplaySlot> {
        let mut slots = Vec::new();
        for update in self.updates.lock().unwrap().iter() {
            if !slots.contains(&update.slot) {
                slots.push(update.slot);
            }
        }
        slots
    }

    pub fn push_count(&self) -> usize {
        *self.pushes.lock().unwrap()
    }

    /// Reset toutes les écritures enregistrées
    pub fn clear(&self) {
        self.updates.lock().unwrap().clear();
        *self.pushes.lock().unwrap() = 0;
    }
}

impl DisplaySink for RecordingDisplay {
    fn update(&mut self, slot: DisplaySlot, value: DisplayValue) {
        tracing::debug!("[MOCK] display {} <- {}", slot, value);
        self.updates.lock().unwrap().push(DisplayUpdate { slot, value });
    }

    fn push(&mut self) {
        *self.pushes.lock().unwrap() += 1;
    }
}

/// Helper pour créer des messages de test au format Komtrax
pub struct EventBuilder;

impl EventBuilder {
    /// Rapport complet, au format AEMP 2.0
    pub fn full_report<S: Into<String>>(equipment_id: S) -> Value {
        json!({
            "equipment_id": equipment_id.into(),
            "model": "PC200-8",
            "serial_number": "12345",
            "location": {"latitude": 35.6762, "longitude": 139.6503},
            "operating_hours": 5432.5,
            "idle_hours": 1234.2,
            "fuel_level_percent": 75,
            "engine_status": "running",
            "fault_codes": [],
            "last_communication": chrono::Utc::now().to_rfc3339()
        })
    }

    /// Rapport avec codes défaut actifs
    pub fn faulted_report<S: Into<String>>(equipment_id: S, codes: &[&str]) -> Value {
        let mut report = Self::full_report(equipment_id);
        report["fault_codes"] = json!(codes);
        report
    }

    /// Message de commande sans paramètres
    pub fn command<S: Into<String>>(name: S) -> Value {
        json!({ "command": name.into() })
    }

    /// Message `update_config` avec les champs donnés
    pub fn update_config(fields: Value) -> Value {
        let mut message = Self::command("update_config");
        if let (Some(target), Value::Object(fields)) = (message.as_object_mut(), fields) {
            target.extend(fields);
        }
        message
    }
}
