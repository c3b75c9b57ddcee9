use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::holdings::holdings_errors::{HoldingsError, Result};
use crate::instruments::MarketFeed;
use crate::utils::parse_decimal_column;

/// Who the position belongs to. `ManagedEntity` lots are run by the desk
/// and drive unrealised P&L; `Customer` lots are held on the client's
/// behalf and enter valuations at market value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnedBy {
    ManagedEntity,
    Customer,
}

impl OwnedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnedBy::ManagedEntity => "MANAGED_ENTITY",
            OwnedBy::Customer => "CUSTOMER",
        }
    }
}

impl FromStr for OwnedBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "MANAGED_ENTITY" => Ok(OwnedBy::ManagedEntity),
            "CUSTOMER" => Ok(OwnedBy::Customer),
            _ => Err(format!("Unknown owner classification: {}", s)),
        }
    }
}

/// Where the money funding the lot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundSource {
    InsideAccount,
    OutsideAccount,
}

impl FundSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundSource::InsideAccount => "INSIDE_ACCOUNT",
            FundSource::OutsideAccount => "OUTSIDE_ACCOUNT",
        }
    }
}

impl FromStr for FundSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INSIDE_ACCOUNT" => Ok(FundSource::InsideAccount),
            "OUTSIDE_ACCOUNT" => Ok(FundSource::OutsideAccount),
            _ => Err(format!("Unknown fund source: {}", s)),
        }
    }
}

/// Direction of a holdings transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Domain model for one holdings lot: a BUY event's remaining open
/// position together with the cumulative effect of the sells matched
/// against it. `buy_value` tracks the remaining cost basis
/// (`open_quantity × buy_price`); `open_quantity` reaching zero closes
/// the lot for good.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: i64,
    pub client_id: String,
    pub instrument_id: String,
    pub buy_quantity: Decimal,
    pub buy_price: Decimal,
    pub buy_value: Decimal,
    pub buy_date: DateTime<Utc>,
    pub sell_quantity: Decimal,
    pub sell_price: Decimal,
    pub sell_value: Decimal,
    pub sell_date: Option<DateTime<Utc>>,
    pub open_quantity: Decimal,
    pub unrealised_pnl: Decimal,
    pub market_value: Decimal,
    pub owned_by: OwnedBy,
    pub fund_source: FundSource,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

impl Lot {
    pub fn is_open(&self) -> bool {
        !self.open_quantity.is_zero()
    }
}

/// Database model for holdings lots
#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings_lots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LotDB {
    pub id: i64,
    pub client_id: String,
    pub instrument_id: String,
    pub buy_quantity: String,
    pub buy_price: String,
    pub buy_value: String,
    pub buy_date: NaiveDateTime,
    pub sell_quantity: String,
    pub sell_price: String,
    pub sell_value: String,
    pub sell_date: Option<NaiveDateTime>,
    pub open_quantity: String,
    pub unrealised_pnl: String,
    pub market_value: String,
    pub owned_by: String,
    pub fund_source: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

/// Insertable model for holdings lots
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings_lots)]
pub struct NewLotDB {
    pub client_id: String,
    pub instrument_id: String,
    pub buy_quantity: String,
    pub buy_price: String,
    pub buy_value: String,
    pub buy_date: NaiveDateTime,
    pub sell_quantity: String,
    pub sell_price: String,
    pub sell_value: String,
    pub sell_date: Option<NaiveDateTime>,
    pub open_quantity: String,
    pub unrealised_pnl: String,
    pub market_value: String,
    pub owned_by: String,
    pub fund_source: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

impl From<LotDB> for Lot {
    fn from(db: LotDB) -> Self {
        Lot {
            id: db.id,
            buy_quantity: parse_decimal_column(&db.buy_quantity, "buy_quantity"),
            buy_price: parse_decimal_column(&db.buy_price, "buy_price"),
            buy_value: parse_decimal_column(&db.buy_value, "buy_value"),
            sell_quantity: parse_decimal_column(&db.sell_quantity, "sell_quantity"),
            sell_price: parse_decimal_column(&db.sell_price, "sell_price"),
            sell_value: parse_decimal_column(&db.sell_value, "sell_value"),
            open_quantity: parse_decimal_column(&db.open_quantity, "open_quantity"),
            unrealised_pnl: parse_decimal_column(&db.unrealised_pnl, "unrealised_pnl"),
            market_value: parse_decimal_column(&db.market_value, "market_value"),
            owned_by: OwnedBy::from_str(&db.owned_by).unwrap_or(OwnedBy::ManagedEntity),
            fund_source: FundSource::from_str(&db.fund_source)
                .unwrap_or(FundSource::OutsideAccount),
            buy_date: Utc.from_utc_datetime(&db.buy_date),
            sell_date: db.sell_date.map(|d| Utc.from_utc_datetime(&d)),
            from_date: Utc.from_utc_datetime(&db.from_date),
            to_date: Utc.from_utc_datetime(&db.to_date),
            client_id: db.client_id,
            instrument_id: db.instrument_id,
        }
    }
}

/// Input model for creating a lot from a BUY row
#[derive(Debug, Clone)]
pub struct NewLot {
    pub client_id: String,
    pub instrument_id: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub buy_date: DateTime<Utc>,
    pub owned_by: OwnedBy,
    pub fund_source: FundSource,
}

/// Outcome of matching one sell row against the client's open lots.
#[derive(Debug, Clone, PartialEq)]
pub struct SellApplication {
    /// Total reduction in cost basis across every lot the sell touched.
    pub buy_value_reduction: Decimal,
    pub lots_touched: usize,
}

/// Batch of holdings transactions, one row per index across the parallel
/// arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsTrxBatch {
    pub broker_ids: Vec<String>,
    pub codes: Vec<String>,
    pub feeds: Vec<MarketFeed>,
    pub sides: Vec<TradeSide>,
    pub prices: Vec<Decimal>,
    pub quantities: Vec<Decimal>,
    pub dates: Vec<DateTime<Utc>>,
    pub owned_by: Vec<OwnedBy>,
    pub fund_sources: Vec<FundSource>,
}

impl HoldingsTrxBatch {
    pub fn len(&self) -> usize {
        self.broker_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.broker_ids.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let len = self.broker_ids.len();
        if self.codes.len() != len
            || self.feeds.len() != len
            || self.sides.len() != len
            || self.prices.len() != len
            || self.quantities.len() != len
            || self.dates.len() != len
            || self.owned_by.len() != len
            || self.fund_sources.len() != len
        {
            return Err(HoldingsError::ArityMismatch);
        }
        if let Some(position) = self.quantities.iter().position(|q| !q.is_sign_positive() || q.is_zero()) {
            return Err(HoldingsError::InvalidData(format!(
                "Quantity must be positive in row {}",
                position
            )));
        }
        Ok(())
    }
}
