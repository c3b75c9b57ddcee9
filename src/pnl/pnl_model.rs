use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::pnl::pnl_errors::{PnlError, Result};
use crate::utils::parse_decimal_column;

/// Who generated the realised gain or loss. Only `ManagedEntity` rows are
/// stored; `Customer` contributions are re-routed into the cash ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PnlContributor {
    ManagedEntity,
    Customer,
}

impl PnlContributor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PnlContributor::ManagedEntity => "MANAGED_ENTITY",
            PnlContributor::Customer => "CUSTOMER",
        }
    }
}

impl FromStr for PnlContributor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "MANAGED_ENTITY" => Ok(PnlContributor::ManagedEntity),
            "CUSTOMER" => Ok(PnlContributor::Customer),
            _ => Err(format!("Unknown P&L contributor: {}", s)),
        }
    }
}

/// Trading style the realised P&L came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PnlEntryType {
    Intraday,
    Delivery,
}

impl PnlEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PnlEntryType::Intraday => "INTRADAY",
            PnlEntryType::Delivery => "DELIVERY",
        }
    }
}

impl FromStr for PnlEntryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INTRADAY" => Ok(PnlEntryType::Intraday),
            "DELIVERY" => Ok(PnlEntryType::Delivery),
            _ => Err(format!("Unknown P&L entry type: {}", s)),
        }
    }
}

/// Domain model for one realised P&L row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealisedPnlRow {
    pub id: i64,
    pub client_id: String,
    pub amount: Decimal,
    pub entry_type: PnlEntryType,
    pub contributed_by: PnlContributor,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

/// Database model for realised P&L rows
#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::realised_pnl)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RealisedPnlRowDB {
    pub id: i64,
    pub client_id: String,
    pub amount: String,
    pub entry_type: String,
    pub contributed_by: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

/// Insertable model for realised P&L rows
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::realised_pnl)]
pub struct NewRealisedPnlRowDB {
    pub client_id: String,
    pub amount: String,
    pub entry_type: String,
    pub contributed_by: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

impl From<RealisedPnlRowDB> for RealisedPnlRow {
    fn from(db: RealisedPnlRowDB) -> Self {
        RealisedPnlRow {
            id: db.id,
            amount: parse_decimal_column(&db.amount, "amount"),
            entry_type: PnlEntryType::from_str(&db.entry_type).unwrap_or(PnlEntryType::Delivery),
            contributed_by: PnlContributor::from_str(&db.contributed_by)
                .unwrap_or(PnlContributor::ManagedEntity),
            client_id: db.client_id,
            from_date: Utc.from_utc_datetime(&db.from_date),
            to_date: Utc.from_utc_datetime(&db.to_date),
        }
    }
}

/// Input model for one realised P&L row
#[derive(Debug, Clone)]
pub struct NewRealisedPnlRow {
    pub client_id: String,
    pub amount: Decimal,
    pub entry_type: PnlEntryType,
    pub date: DateTime<Utc>,
}

/// One day's realised P&L in a date-range series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Batch of realised P&L rows, one row per index across the parallel arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealisedPnlBatch {
    pub broker_ids: Vec<String>,
    pub amounts: Vec<Decimal>,
    pub entry_types: Vec<PnlEntryType>,
    pub contributors: Vec<PnlContributor>,
    pub dates: Vec<DateTime<Utc>>,
}

impl RealisedPnlBatch {
    pub fn len(&self) -> usize {
        self.broker_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.broker_ids.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let len = self.broker_ids.len();
        if self.amounts.len() != len
            || self.entry_types.len() != len
            || self.contributors.len() != len
            || self.dates.len() != len
        {
            return Err(PnlError::ArityMismatch);
        }
        Ok(())
    }
}

/// Admin override batch for today's algo P&L table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAlgoPnlBatch {
    pub broker_ids: Vec<String>,
    pub amounts: Vec<Decimal>,
}

impl TodayAlgoPnlBatch {
    pub fn validate(&self) -> Result<()> {
        if self.broker_ids.len() != self.amounts.len() {
            return Err(PnlError::ArityMismatch);
        }
        Ok(())
    }
}
