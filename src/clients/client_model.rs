use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::clients::client_errors::{ClientError, Result};

/// Service tier a client account is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Algo,
    Advisory,
}

/// Lifecycle state of a client account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "INACTIVE" => Ok(AccountStatus::Inactive),
            _ => Err(format!("Unknown account status: {}", s)),
        }
    }
}

/// Domain model for a client CRM record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub broker_id: String,
    pub client_name: String,
    pub phone_no: String,
    pub email: String,
    pub address: String,
    pub account_open_date: DateTime<Utc>,
    pub account_types: Vec<AccountType>,
    pub account_status: AccountStatus,
}

/// Database model for clients
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClientDB {
    pub id: String,
    pub broker_id: String,
    pub client_name: String,
    pub phone_no: String,
    pub email: String,
    pub address: String,
    pub account_open_date: NaiveDateTime,
    pub account_types: String,
    pub account_status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ClientDB> for Client {
    fn from(db: ClientDB) -> Self {
        let account_types: Vec<AccountType> =
            serde_json::from_str(&db.account_types).unwrap_or_default();
        let account_status =
            AccountStatus::from_str(&db.account_status).unwrap_or(AccountStatus::Inactive);
        Client {
            id: db.id,
            broker_id: db.broker_id,
            client_name: db.client_name,
            phone_no: db.phone_no,
            email: db.email,
            address: db.address,
            account_open_date: Utc.from_utc_datetime(&db.account_open_date),
            account_types,
            account_status,
        }
    }
}

/// Input model for one imported CRM record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClientRecord {
    pub client_name: String,
    pub broker_id: String,
    pub phone_no: String,
    pub email: String,
    pub address: String,
    pub account_open_date: DateTime<Utc>,
    pub account_types: Vec<AccountType>,
    pub account_status: AccountStatus,
}

impl NewClientRecord {
    /// Validates the record before it is handed to the repository
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(ClientError::InvalidData(
                "Client name cannot be empty".to_string(),
            ));
        }
        if self.broker_id.trim().is_empty() {
            return Err(ClientError::InvalidData(
                "Broker ID cannot be empty".to_string(),
            ));
        }
        if self.phone_no.len() != 10 || !self.phone_no.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::InvalidData(
                "Phone number must be 10 digits".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(ClientError::InvalidData(
                "Invalid email format".to_string(),
            ));
        }
        if self.account_types.is_empty() {
            return Err(ClientError::InvalidData(
                "At least one account type is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Batch of CRM records accepted by the import path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientBatch {
    pub entries: Vec<NewClientRecord>,
}

impl ClientBatch {
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ClientError::InvalidData(
                "At least one entry is required".to_string(),
            ));
        }
        for entry in &self.entries {
            entry.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NewClientRecord {
        NewClientRecord {
            client_name: "Asha Mehta".to_string(),
            broker_id: "BRK042".to_string(),
            phone_no: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            address: "14 Marine Drive".to_string(),
            account_open_date: Utc::now(),
            account_types: vec![AccountType::Algo],
            account_status: AccountStatus::Active,
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn short_phone_number_is_rejected() {
        let mut record = record();
        record.phone_no = "12345".to_string();
        assert!(matches!(
            record.validate(),
            Err(ClientError::InvalidData(_))
        ));
    }

    #[test]
    fn account_types_must_not_be_empty() {
        let mut record = record();
        record.account_types.clear();
        assert!(record.validate().is_err());
    }

    #[test]
    fn empty_batch_is_rejected() {
        let batch = ClientBatch { entries: vec![] };
        assert!(batch.validate().is_err());
    }
}
