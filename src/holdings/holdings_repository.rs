use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::constants::max_date;
use crate::db::{get_connection, DbPool};
use crate::holdings::holdings_errors::{HoldingsError, Result};
use crate::holdings::holdings_model::{
    FundSource, Lot, LotDB, NewLot, NewLotDB, OwnedBy, SellApplication,
};
use crate::holdings::lot_matcher::match_sell;
use crate::schema::holdings_lots;

/// Repository for holdings lots
pub struct HoldingsRepository {
    pool: Arc<DbPool>,
}

impl HoldingsRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| HoldingsError::DatabaseError(e.to_string()))
    }
}

/// Loads every lot for the pair and keeps the open ones. Open-ness is
/// decided on parsed decimals; the TEXT column may carry any scale of zero.
fn open_lots_with(
    conn: &mut SqliteConnection,
    client_id: &str,
    instrument_id: &str,
) -> QueryResult<Vec<Lot>> {
    let rows = holdings_lots::table
        .filter(holdings_lots::client_id.eq(client_id))
        .filter(holdings_lots::instrument_id.eq(instrument_id))
        .select(LotDB::as_select())
        .order((holdings_lots::buy_date.asc(), holdings_lots::id.asc()))
        .load::<LotDB>(conn)?;

    Ok(rows
        .into_iter()
        .map(Lot::from)
        .filter(Lot::is_open)
        .collect())
}

impl super::HoldingsRepositoryTrait for HoldingsRepository {
    fn insert_lots(&self, lots: Vec<NewLot>) -> Result<usize> {
        if lots.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection()?;
        let now = Utc::now().naive_utc();

        let rows: Vec<NewLotDB> = lots
            .into_iter()
            .map(|lot| NewLotDB {
                client_id: lot.client_id,
                instrument_id: lot.instrument_id,
                buy_quantity: lot.quantity.to_string(),
                buy_price: lot.price.to_string(),
                buy_value: (lot.price * lot.quantity).to_string(),
                buy_date: lot.buy_date.naive_utc(),
                sell_quantity: Decimal::ZERO.to_string(),
                sell_price: Decimal::ZERO.to_string(),
                sell_value: Decimal::ZERO.to_string(),
                sell_date: None,
                open_quantity: lot.quantity.to_string(),
                unrealised_pnl: Decimal::ZERO.to_string(),
                market_value: Decimal::ZERO.to_string(),
                owned_by: lot.owned_by.as_str().to_string(),
                fund_source: lot.fund_source.as_str().to_string(),
                from_date: now,
                to_date: max_date(),
            })
            .collect();

        diesel::insert_into(holdings_lots::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(HoldingsError::from)
    }

    fn apply_sell(
        &self,
        client_id: &str,
        instrument_id: &str,
        quantity: Decimal,
        price: Decimal,
        sell_date: DateTime<Utc>,
    ) -> Result<SellApplication> {
        let mut conn = self.connection()?;

        conn.transaction::<SellApplication, HoldingsError, _>(|conn| {
            let lots = open_lots_with(conn, client_id, instrument_id)?;
            let consumptions = match_sell(&lots, quantity, price)?;

            let now = Utc::now().naive_utc();
            let mut buy_value_reduction = Decimal::ZERO;
            for consumption in &consumptions {
                diesel::update(holdings_lots::table.find(consumption.lot_id))
                    .set((
                        holdings_lots::sell_quantity.eq(consumption.sell_quantity.to_string()),
                        holdings_lots::sell_price.eq(consumption.sell_price.to_string()),
                        holdings_lots::sell_value.eq(consumption.sell_value.to_string()),
                        holdings_lots::sell_date.eq(Some(sell_date.naive_utc())),
                        holdings_lots::open_quantity.eq(consumption.open_quantity.to_string()),
                        holdings_lots::buy_value.eq(consumption.buy_value.to_string()),
                        holdings_lots::from_date.eq(now),
                        holdings_lots::to_date.eq(max_date()),
                    ))
                    .execute(conn)?;
                buy_value_reduction += consumption.buy_value_reduction;
            }

            Ok(SellApplication {
                buy_value_reduction,
                lots_touched: consumptions.len(),
            })
        })
    }

    fn open_lots(&self, client_id: &str, instrument_id: &str) -> Result<Vec<Lot>> {
        let mut conn = self.connection()?;
        open_lots_with(&mut conn, client_id, instrument_id).map_err(HoldingsError::from)
    }

    fn open_lots_all(&self) -> Result<Vec<Lot>> {
        let mut conn = self.connection()?;

        let rows = holdings_lots::table
            .select(LotDB::as_select())
            .order(holdings_lots::id.asc())
            .load::<LotDB>(&mut conn)
            .map_err(HoldingsError::from)?;

        Ok(rows
            .into_iter()
            .map(Lot::from)
            .filter(Lot::is_open)
            .collect())
    }

    fn update_lot_valuation(
        &self,
        lot_id: i64,
        unrealised_pnl: Decimal,
        market_value: Decimal,
    ) -> Result<()> {
        let mut conn = self.connection()?;

        // Its own transaction: an interrupted refresh leaves every lot
        // either fully updated or untouched.
        conn.transaction::<(), diesel::result::Error, _>(|conn| {
            diesel::update(holdings_lots::table.find(lot_id))
                .set((
                    holdings_lots::unrealised_pnl.eq(unrealised_pnl.to_string()),
                    holdings_lots::market_value.eq(market_value.to_string()),
                ))
                .execute(conn)?;
            Ok(())
        })
        .map_err(HoldingsError::from)
    }

    fn lots_by_ownership(
        &self,
        client_id: &str,
        owned_by: OwnedBy,
        fund_source: FundSource,
    ) -> Result<Vec<Lot>> {
        let mut conn = self.connection()?;

        holdings_lots::table
            .filter(holdings_lots::client_id.eq(client_id))
            .filter(holdings_lots::owned_by.eq(owned_by.as_str()))
            .filter(holdings_lots::fund_source.eq(fund_source.as_str()))
            .select(LotDB::as_select())
            .order(holdings_lots::id.asc())
            .load::<LotDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Lot::from).collect())
            .map_err(HoldingsError::from)
    }

    fn sum_unrealised_pnl(&self, client_id: &str) -> Result<Option<Decimal>> {
        let mut conn = self.connection()?;

        let rows = holdings_lots::table
            .filter(holdings_lots::client_id.eq(client_id))
            .filter(holdings_lots::owned_by.eq(OwnedBy::ManagedEntity.as_str()))
            .select(LotDB::as_select())
            .load::<LotDB>(&mut conn)
            .map_err(HoldingsError::from)?;

        let open: Vec<Lot> = rows
            .into_iter()
            .map(Lot::from)
            .filter(Lot::is_open)
            .collect();
        if open.is_empty() {
            return Ok(None);
        }
        Ok(Some(open.iter().map(|lot| lot.unrealised_pnl).sum()))
    }
}
