use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::constants::max_date;
use crate::db::{get_connection, DbPool};
use crate::ledger::ledger_errors::{LedgerError, Result};
use crate::ledger::ledger_model::{
    plan_resync, InvestedCashRow, InvestedCashRowDB, LedgerEntry, LedgerEntryDB, LedgerEntryKind,
    NewInvestedCashRowDB, NewLedgerEntry, NewLedgerEntryDB, ResyncAction, CAPITAL_ENTRY_KINDS,
};
use crate::schema::{invested_cash, ledger_entries, withdrawn_cash};
use crate::utils::parse_decimal_column;

/// Repository for the cash ledger and its derived balance tables
pub struct LedgerRepository {
    pool: Arc<DbPool>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<crate::db::DbConnection> {
        get_connection(&self.pool).map_err(|e| LedgerError::DatabaseError(e.to_string()))
    }
}

/// Sum of capital-movement entries, folded in Rust so amounts keep exact
/// decimal arithmetic.
fn capital_balance_with(conn: &mut SqliteConnection, client_id: &str) -> QueryResult<Decimal> {
    let kind_codes: Vec<&str> = CAPITAL_ENTRY_KINDS.iter().map(|k| k.as_str()).collect();

    let amounts: Vec<String> = ledger_entries::table
        .filter(ledger_entries::client_id.eq(client_id))
        .filter(ledger_entries::entry_kind.eq_any(kind_codes))
        .select(ledger_entries::amount)
        .load(conn)?;

    Ok(amounts
        .iter()
        .map(|a| parse_decimal_column(a, "amount"))
        .sum())
}

fn current_invested_row_with(
    conn: &mut SqliteConnection,
    client_id: &str,
) -> QueryResult<Option<InvestedCashRow>> {
    invested_cash::table
        .filter(invested_cash::client_id.eq(client_id))
        .filter(invested_cash::to_date.eq(max_date()))
        .select(InvestedCashRowDB::as_select())
        .first::<InvestedCashRowDB>(conn)
        .optional()
        .map(|row| row.map(InvestedCashRow::from))
}

/// Closes the open-ended invested-cash row at `at` and opens a new one.
fn roll_invested_row_with(
    conn: &mut SqliteConnection,
    client_id: &str,
    amount: Decimal,
    at: DateTime<Utc>,
) -> QueryResult<()> {
    diesel::update(
        invested_cash::table
            .filter(invested_cash::client_id.eq(client_id))
            .filter(invested_cash::to_date.eq(max_date())),
    )
    .set(invested_cash::to_date.eq(at.naive_utc()))
    .execute(conn)?;

    diesel::insert_into(invested_cash::table)
        .values(NewInvestedCashRowDB {
            client_id: client_id.to_string(),
            amount: amount.to_string(),
            from_date: at.naive_utc(),
            to_date: max_date(),
        })
        .execute(conn)?;

    Ok(())
}

fn add_withdrawn_with(
    conn: &mut SqliteConnection,
    client_id: &str,
    delta: Decimal,
) -> QueryResult<()> {
    let existing: Option<String> = withdrawn_cash::table
        .filter(withdrawn_cash::client_id.eq(client_id))
        .select(withdrawn_cash::amount)
        .first(conn)
        .optional()?;

    match existing {
        Some(amount) => {
            let updated = parse_decimal_column(&amount, "amount") + delta;
            diesel::update(
                withdrawn_cash::table.filter(withdrawn_cash::client_id.eq(client_id)),
            )
            .set(withdrawn_cash::amount.eq(updated.to_string()))
            .execute(conn)?;
        }
        None => {
            diesel::insert_into(withdrawn_cash::table)
                .values((
                    withdrawn_cash::client_id.eq(client_id),
                    withdrawn_cash::amount.eq(delta.to_string()),
                ))
                .execute(conn)?;
        }
    }

    Ok(())
}

impl super::LedgerRepositoryTrait for LedgerRepository {
    fn append_and_resync(&self, entry: NewLedgerEntry) -> Result<ResyncAction> {
        let mut conn = self.connection()?;

        conn.transaction::<ResyncAction, diesel::result::Error, _>(|conn| {
            diesel::insert_into(ledger_entries::table)
                .values(NewLedgerEntryDB {
                    client_id: entry.client_id.clone(),
                    amount: entry.amount.to_string(),
                    entry_kind: entry.entry_kind.as_str().to_string(),
                    from_date: entry.date.naive_utc(),
                    to_date: max_date(),
                })
                .execute(conn)?;

            let balance = capital_balance_with(conn, &entry.client_id)?;
            let current = current_invested_row_with(conn, &entry.client_id)?;

            let action = plan_resync(balance, current.map(|row| row.amount));
            match &action {
                ResyncAction::RollInvested { balance } => {
                    roll_invested_row_with(conn, &entry.client_id, *balance, entry.date)?;
                }
                ResyncAction::AccumulateWithdrawn { shortfall } => {
                    add_withdrawn_with(conn, &entry.client_id, *shortfall)?;
                }
                ResyncAction::Unchanged => {}
            }

            Ok(action)
        })
        .map_err(LedgerError::from)
    }

    fn capital_balance(&self, client_id: &str) -> Result<Decimal> {
        let mut conn = self.connection()?;
        capital_balance_with(&mut conn, client_id).map_err(LedgerError::from)
    }

    fn current_invested_row(&self, client_id: &str) -> Result<Option<InvestedCashRow>> {
        let mut conn = self.connection()?;
        current_invested_row_with(&mut conn, client_id).map_err(LedgerError::from)
    }

    fn withdrawn_amount(&self, client_id: &str) -> Result<Option<Decimal>> {
        let mut conn = self.connection()?;

        withdrawn_cash::table
            .filter(withdrawn_cash::client_id.eq(client_id))
            .select(withdrawn_cash::amount)
            .first::<String>(&mut conn)
            .optional()
            .map(|row| row.map(|amount| parse_decimal_column(&amount, "amount")))
            .map_err(LedgerError::from)
    }

    fn entries_by_kinds(
        &self,
        client_id: &str,
        kinds: &[LedgerEntryKind],
    ) -> Result<Vec<LedgerEntry>> {
        let mut conn = self.connection()?;
        let kind_codes: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();

        ledger_entries::table
            .filter(ledger_entries::client_id.eq(client_id))
            .filter(ledger_entries::entry_kind.eq_any(kind_codes))
            .select(LedgerEntryDB::as_select())
            .order(ledger_entries::id.asc())
            .load::<LedgerEntryDB>(&mut conn)
            .map(|rows| rows.into_iter().map(LedgerEntry::from).collect())
            .map_err(LedgerError::from)
    }

    fn charges_total(&self, client_id: &str) -> Result<Decimal> {
        let mut conn = self.connection()?;

        let amounts: Vec<String> = ledger_entries::table
            .filter(ledger_entries::client_id.eq(client_id))
            .filter(ledger_entries::entry_kind.eq(LedgerEntryKind::Charges.as_str()))
            .select(ledger_entries::amount)
            .load(&mut conn)
            .map_err(LedgerError::from)?;

        Ok(amounts
            .iter()
            .map(|a| parse_decimal_column(a, "amount"))
            .sum())
    }

    fn upsert_current_balance(&self, client_id: &str, amount: Decimal) -> Result<()> {
        use crate::schema::current_ledger_balance;

        let mut conn = self.connection()?;

        diesel::insert_into(current_ledger_balance::table)
            .values((
                current_ledger_balance::client_id.eq(client_id),
                current_ledger_balance::amount.eq(amount.to_string()),
            ))
            .on_conflict(current_ledger_balance::client_id)
            .do_update()
            .set(current_ledger_balance::amount.eq(amount.to_string()))
            .execute(&mut conn)
            .map_err(LedgerError::from)?;
        Ok(())
    }

    fn current_balance(&self, client_id: &str) -> Result<Option<Decimal>> {
        use crate::schema::current_ledger_balance;

        let mut conn = self.connection()?;

        current_ledger_balance::table
            .filter(current_ledger_balance::client_id.eq(client_id))
            .select(current_ledger_balance::amount)
            .first::<String>(&mut conn)
            .optional()
            .map(|row| row.map(|amount| parse_decimal_column(&amount, "amount")))
            .map_err(LedgerError::from)
    }
}
