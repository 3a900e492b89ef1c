/*!
# Komtrax DevKit - Stubs et utilitaires de test

Bibliothèque facilitant les tests du processor Komtrax avec:
- Un display qui enregistre chaque écriture de slot
- Une API Komtrax simulée (réponses en file, requêtes enregistrées)
- Des builders de rapports et de commandes
- Un harness réunissant le tout autour d'un `EquipmentEventHandler`
*/

pub mod api_stub;
pub mod display_stub;
pub mod test_utils;

pub use api_stub::MockEquipmentApi;
pub use display_stub::{EventBuilder, RecordingDisplay};
pub use test_utils::TestHarness;
