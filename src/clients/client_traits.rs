use std::collections::HashMap;

use super::client_model::{Client, ClientBatch, NewClientRecord};
use crate::clients::client_errors::Result;

/// Contract for client registry persistence operations.
pub trait ClientRepositoryTrait: Send + Sync {
    /// Inserts CRM records, silently skipping broker ids already present.
    fn create_clients(&self, clients: Vec<NewClientRecord>) -> Result<usize>;
    fn get_by_broker_id(&self, broker_id: &str) -> Result<Option<Client>>;
    fn get_client(&self, client_id: &str) -> Result<Option<Client>>;
    /// Maps broker ids to internal client ids; unknown ids are absent from the map.
    fn resolve_broker_ids(&self, broker_ids: &[String]) -> Result<HashMap<String, String>>;
}

/// Contract for client registry service operations.
pub trait ClientServiceTrait: Send + Sync {
    fn import_clients(&self, batch: ClientBatch) -> Result<usize>;
    fn get_by_broker_id(&self, broker_id: &str) -> Result<Client>;
    /// Resolves every broker id or fails with `NotFound` naming the missing ones.
    fn resolve_broker_ids(&self, broker_ids: &[String]) -> Result<HashMap<String, String>>;
}
