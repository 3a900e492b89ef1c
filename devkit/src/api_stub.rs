/*!
API Komtrax simulée pour tests sans réseau

Les réponses sont servies dans l'ordre où elles ont été mises en file,
chaque requête est enregistrée pour les assertions.
*/

use async_trait::async_trait;
use komtrax_processor::{EquipmentApi, FetchError, FetchRequest};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockEquipmentApi {
    responses: Arc<Mutex<VecDeque<Result<Value, FetchError>>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockEquipmentApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Met en file une réponse JSON réussie
    pub fn respond_with(&self, body: Value) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Met en file une erreur HTTP de statut
    pub fn fail_with_status(&self, status: u16) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(FetchError::Status(status)));
        self
    }

    /// Met en file une erreur de transport (timeout, connexion refusée)
    pub fn fail_with_transport<S: Into<String>>(&self, message: S) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(FetchError::Transport(message.into())));
        self
    }

    /// Requêtes reçues, dans l'ordre
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<FetchRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EquipmentApi for MockEquipmentApi {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        tracing::info!("[MOCK] GET {}", request.url);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("no mock response queued".into())))
    }
}
