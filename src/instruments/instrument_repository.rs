use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::instruments::instrument_errors::{InstrumentError, Result};
use crate::instruments::instrument_model::{
    Instrument, InstrumentDB, MarketFeed, NewInstrumentRecord,
};
use crate::schema::instruments;
use crate::utils::parse_decimal_column;

/// Repository for instrument reference data
pub struct InstrumentRepository {
    pool: Arc<DbPool>,
}

impl InstrumentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| InstrumentError::DatabaseError(e.to_string()))
    }
}

impl super::InstrumentRepositoryTrait for InstrumentRepository {
    fn create_instruments(&self, records: Vec<NewInstrumentRecord>) -> Result<usize> {
        let mut conn = self.connection()?;
        let now = Utc::now().naive_utc();

        let rows: Vec<InstrumentDB> = records
            .into_iter()
            .map(|record| InstrumentDB {
                id: Uuid::new_v4().to_string(),
                name: record.name,
                code: record.code,
                exchange: record.exchange.as_str().to_string(),
                segment: record.segment.as_str().to_string(),
                feed: record.feed.as_str().to_string(),
                cmp: record.cmp.to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect();

        diesel::insert_or_ignore_into(instruments::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(InstrumentError::from)
    }

    fn list_instruments(&self) -> Result<Vec<Instrument>> {
        let mut conn = self.connection()?;

        instruments::table
            .select(InstrumentDB::as_select())
            .order(instruments::code.asc())
            .load::<InstrumentDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Instrument::from).collect())
            .map_err(InstrumentError::from)
    }

    fn resolve_codes(
        &self,
        pairs: &[(String, MarketFeed)],
    ) -> Result<HashMap<(String, MarketFeed), String>> {
        let mut conn = self.connection()?;

        let codes: Vec<&str> = pairs.iter().map(|(code, _)| code.as_str()).collect();
        let rows: Vec<(String, String, String)> = instruments::table
            .filter(instruments::code.eq_any(codes))
            .select((instruments::code, instruments::feed, instruments::id))
            .load(&mut conn)
            .map_err(InstrumentError::from)?;

        let mut resolved = HashMap::new();
        for (code, feed, id) in rows {
            if let Ok(feed) = MarketFeed::from_str(&feed) {
                resolved.insert((code, feed), id);
            }
        }
        Ok(resolved)
    }

    fn quotes_by_ids(&self, instrument_ids: &[String]) -> Result<HashMap<String, Decimal>> {
        let mut conn = self.connection()?;

        let rows: Vec<(String, String)> = instruments::table
            .filter(instruments::id.eq_any(instrument_ids))
            .select((instruments::id, instruments::cmp))
            .load(&mut conn)
            .map_err(InstrumentError::from)?;

        Ok(rows
            .into_iter()
            .map(|(id, cmp)| {
                let cmp = parse_decimal_column(&cmp, "cmp");
                (id, cmp)
            })
            .collect())
    }

    fn update_cmp(&self, instrument_id: &str, cmp: Decimal) -> Result<()> {
        let mut conn = self.connection()?;

        diesel::update(instruments::table.find(instrument_id))
            .set((
                instruments::cmp.eq(cmp.to_string()),
                instruments::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(InstrumentError::from)?;
        Ok(())
    }
}
