use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::constants::max_date;
use crate::db::{get_connection, DbPool};
use crate::pnl::pnl_errors::{PnlError, Result};
use crate::pnl::pnl_model::{
    DailyPnl, NewRealisedPnlRow, NewRealisedPnlRowDB, PnlContributor, RealisedPnlRow,
    RealisedPnlRowDB,
};
use crate::schema::{realised_pnl, today_algo_pnl};
use crate::utils::parse_decimal_column;

/// Repository for realised P&L rows
pub struct PnlRepository {
    pool: Arc<DbPool>,
}

impl PnlRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| PnlError::DatabaseError(e.to_string()))
    }

    fn load_contributed_rows(
        &self,
        client_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<RealisedPnlRow>> {
        let mut conn = self.connection()?;

        let mut query = realised_pnl::table
            .filter(realised_pnl::client_id.eq(client_id))
            .filter(realised_pnl::contributed_by.eq(PnlContributor::ManagedEntity.as_str()))
            .into_boxed();

        if let Some((from, to)) = range {
            query = query
                .filter(realised_pnl::from_date.ge(from.naive_utc()))
                .filter(realised_pnl::from_date.le(to.naive_utc()));
        }

        query
            .select(RealisedPnlRowDB::as_select())
            .order(realised_pnl::from_date.asc())
            .load::<RealisedPnlRowDB>(&mut conn)
            .map(|rows| rows.into_iter().map(RealisedPnlRow::from).collect())
            .map_err(PnlError::from)
    }
}

impl super::PnlRepositoryTrait for PnlRepository {
    fn insert_rows(&self, rows: Vec<NewRealisedPnlRow>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection()?;

        let db_rows: Vec<NewRealisedPnlRowDB> = rows
            .into_iter()
            .map(|row| NewRealisedPnlRowDB {
                client_id: row.client_id,
                amount: row.amount.to_string(),
                entry_type: row.entry_type.as_str().to_string(),
                contributed_by: PnlContributor::ManagedEntity.as_str().to_string(),
                from_date: row.date.naive_utc(),
                to_date: max_date(),
            })
            .collect();

        diesel::insert_into(realised_pnl::table)
            .values(&db_rows)
            .execute(&mut conn)
            .map_err(PnlError::from)
    }

    fn total_realised(&self, client_id: &str) -> Result<Decimal> {
        let rows = self.load_contributed_rows(client_id, None)?;
        Ok(rows.iter().map(|row| row.amount).sum())
    }

    fn range_total(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal> {
        let rows = self.load_contributed_rows(client_id, Some((from, to)))?;
        Ok(rows.iter().map(|row| row.amount).sum())
    }

    fn daily_series(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyPnl>> {
        let rows = self.load_contributed_rows(client_id, Some((from, to)))?;

        let mut by_date: BTreeMap<chrono::NaiveDate, Decimal> = BTreeMap::new();
        for row in rows {
            *by_date.entry(row.from_date.date_naive()).or_default() += row.amount;
        }

        Ok(by_date
            .into_iter()
            .map(|(date, amount)| DailyPnl { date, amount })
            .collect())
    }

    fn rows_for_cashflows(&self, client_id: &str) -> Result<Vec<(DateTime<Utc>, Decimal)>> {
        let rows = self.load_contributed_rows(client_id, None)?;
        Ok(rows.into_iter().map(|row| (row.from_date, row.amount)).collect())
    }

    fn upsert_today_algo_pnl(&self, client_id: &str, amount: Decimal) -> Result<()> {
        let mut conn = self.connection()?;

        diesel::insert_into(today_algo_pnl::table)
            .values((
                today_algo_pnl::client_id.eq(client_id),
                today_algo_pnl::amount.eq(amount.to_string()),
            ))
            .on_conflict(today_algo_pnl::client_id)
            .do_update()
            .set(today_algo_pnl::amount.eq(amount.to_string()))
            .execute(&mut conn)
            .map_err(PnlError::from)?;
        Ok(())
    }

    fn today_algo_pnl(&self, client_id: &str) -> Result<Option<Decimal>> {
        let mut conn = self.connection()?;

        today_algo_pnl::table
            .filter(today_algo_pnl::client_id.eq(client_id))
            .select(today_algo_pnl::amount)
            .first::<String>(&mut conn)
            .optional()
            .map(|row| row.map(|amount| parse_decimal_column(&amount, "amount")))
            .map_err(PnlError::from)
    }
}
