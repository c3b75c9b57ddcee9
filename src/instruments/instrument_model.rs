use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::instruments::instrument_errors::{InstrumentError, Result};
use crate::utils::parse_decimal_column;

/// Venue an instrument trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    Nse,
    Bse,
    Mcx,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Nse => "N",
            Exchange::Bse => "B",
            Exchange::Mcx => "M",
        }
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "N" => Ok(Exchange::Nse),
            "B" => Ok(Exchange::Bse),
            "M" => Ok(Exchange::Mcx),
            _ => Err(format!("Unknown exchange: {}", s)),
        }
    }
}

/// Venue segment the instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeSegment {
    Cash,
    Derivative,
    Currency,
}

impl ExchangeSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeSegment::Cash => "C",
            ExchangeSegment::Derivative => "D",
            ExchangeSegment::Currency => "U",
        }
    }
}

impl FromStr for ExchangeSegment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "C" => Ok(ExchangeSegment::Cash),
            "D" => Ok(ExchangeSegment::Derivative),
            "U" => Ok(ExchangeSegment::Currency),
            _ => Err(format!("Unknown exchange segment: {}", s)),
        }
    }
}

/// Quote service an instrument's price is sourced from. `Brokerage` is the
/// managed brokerage flow; `MutualFund` prices come from the fund NAV feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketFeed {
    Brokerage,
    MutualFund,
}

impl MarketFeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketFeed::Brokerage => "BROKERAGE",
            MarketFeed::MutualFund => "MUTUAL_FUND",
        }
    }
}

impl FromStr for MarketFeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "BROKERAGE" => Ok(MarketFeed::Brokerage),
            "MUTUAL_FUND" => Ok(MarketFeed::MutualFund),
            _ => Err(format!("Unknown market feed: {}", s)),
        }
    }
}

/// Domain model for an instrument (scrip) reference record. The core only
/// ever reads `cmp`; it is written by the quote refresh job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub code: String,
    pub exchange: Exchange,
    pub segment: ExchangeSegment,
    pub feed: MarketFeed,
    pub cmp: Decimal,
}

/// Database model for instruments
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: String,
    pub name: String,
    pub code: String,
    pub exchange: String,
    pub segment: String,
    pub feed: String,
    pub cmp: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        Instrument {
            cmp: parse_decimal_column(&db.cmp, "cmp"),
            exchange: Exchange::from_str(&db.exchange).unwrap_or(Exchange::Nse),
            segment: ExchangeSegment::from_str(&db.segment).unwrap_or(ExchangeSegment::Cash),
            feed: MarketFeed::from_str(&db.feed).unwrap_or(MarketFeed::Brokerage),
            id: db.id,
            name: db.name,
            code: db.code,
        }
    }
}

/// Input model for one imported scrip record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstrumentRecord {
    pub name: String,
    pub code: String,
    pub exchange: Exchange,
    pub segment: ExchangeSegment,
    pub feed: MarketFeed,
    pub cmp: Decimal,
}

impl NewInstrumentRecord {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(InstrumentError::InvalidData(
                "Name cannot be empty".to_string(),
            ));
        }
        if self.code.trim().is_empty() {
            return Err(InstrumentError::InvalidData(
                "Scrip code cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Batch of scrip records accepted by the import path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentBatch {
    pub entries: Vec<NewInstrumentRecord>,
}

impl InstrumentBatch {
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(InstrumentError::InvalidData(
                "At least one entry is required".to_string(),
            ));
        }
        for entry in &self.entries {
            entry.validate()?;
        }
        Ok(())
    }
}
