use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::client_errors::{ClientError, Result};
use crate::clients::client_model::{Client, ClientBatch};
use crate::clients::{ClientRepositoryTrait, ClientServiceTrait};

/// Service for the client CRM registry
pub struct ClientService {
    client_repository: Arc<dyn ClientRepositoryTrait>,
}

impl ClientService {
    pub fn new(client_repository: Arc<dyn ClientRepositoryTrait>) -> Self {
        Self { client_repository }
    }
}

impl ClientServiceTrait for ClientService {
    fn import_clients(&self, batch: ClientBatch) -> Result<usize> {
        batch.validate()?;
        let inserted = self.client_repository.create_clients(batch.entries)?;
        debug!("Imported {} client records", inserted);
        Ok(inserted)
    }

    fn get_by_broker_id(&self, broker_id: &str) -> Result<Client> {
        self.client_repository
            .get_by_broker_id(broker_id)?
            .ok_or_else(|| ClientError::NotFound(format!("Broker ID {} not found", broker_id)))
    }

    fn resolve_broker_ids(&self, broker_ids: &[String]) -> Result<HashMap<String, String>> {
        let resolved = self.client_repository.resolve_broker_ids(broker_ids)?;

        let missing: Vec<&str> = broker_ids
            .iter()
            .filter(|id| !resolved.contains_key(*id))
            .map(|id| id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ClientError::NotFound(format!(
                "The following broker IDs were not found: {}",
                missing.join(", ")
            )));
        }

        Ok(resolved)
    }
}
