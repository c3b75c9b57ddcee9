use chrono::Utc;
use diesel::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::client_errors::{ClientError, Result};
use crate::clients::client_model::{Client, ClientDB, NewClientRecord};
use crate::db::{get_connection, DbPool};
use crate::schema::clients;

/// Repository for client CRM records
pub struct ClientRepository {
    pool: Arc<DbPool>,
}

impl ClientRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| ClientError::DatabaseError(e.to_string()))
    }
}

impl super::ClientRepositoryTrait for ClientRepository {
    fn create_clients(&self, records: Vec<NewClientRecord>) -> Result<usize> {
        let mut conn = self.connection()?;
        let now = Utc::now().naive_utc();

        let rows: Vec<ClientDB> = records
            .into_iter()
            .map(|record| ClientDB {
                id: Uuid::new_v4().to_string(),
                broker_id: record.broker_id,
                client_name: record.client_name,
                phone_no: record.phone_no,
                email: record.email,
                address: record.address,
                account_open_date: record.account_open_date.naive_utc(),
                account_types: serde_json::to_string(&record.account_types)
                    .unwrap_or_else(|_| "[]".to_string()),
                account_status: record.account_status.as_str().to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        diesel::insert_or_ignore_into(clients::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(ClientError::from)
    }

    fn get_by_broker_id(&self, broker_id: &str) -> Result<Option<Client>> {
        let mut conn = self.connection()?;

        clients::table
            .filter(clients::broker_id.eq(broker_id))
            .select(ClientDB::as_select())
            .first::<ClientDB>(&mut conn)
            .optional()
            .map(|row| row.map(Client::from))
            .map_err(ClientError::from)
    }

    fn get_client(&self, client_id: &str) -> Result<Option<Client>> {
        let mut conn = self.connection()?;

        clients::table
            .find(client_id)
            .select(ClientDB::as_select())
            .first::<ClientDB>(&mut conn)
            .optional()
            .map(|row| row.map(Client::from))
            .map_err(ClientError::from)
    }

    fn resolve_broker_ids(&self, broker_ids: &[String]) -> Result<HashMap<String, String>> {
        let mut conn = self.connection()?;

        let rows: Vec<(String, String)> = clients::table
            .filter(clients::broker_id.eq_any(broker_ids))
            .select((clients::broker_id, clients::id))
            .load(&mut conn)
            .map_err(ClientError::from)?;

        Ok(rows.into_iter().collect())
    }
}
