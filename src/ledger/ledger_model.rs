use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ledger::ledger_errors::{LedgerError, Result};
use crate::utils::parse_decimal_column;

/// Classification of a cash movement. `Investment`, `InterDpStockSold` and
/// `CustomerContributedPnl` are capital movements and feed the derived
/// invested-cash balance; `Charges` is a cost and only enters P&L sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    Investment,
    Charges,
    InterDpStockSold,
    CustomerContributedPnl,
}

impl LedgerEntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerEntryKind::Investment => "INVESTMENT",
            LedgerEntryKind::Charges => "CHARGES",
            LedgerEntryKind::InterDpStockSold => "INTER_DP_STOCK_SOLD",
            LedgerEntryKind::CustomerContributedPnl => "CUSTOMER_CONTRIBUTED_PNL",
        }
    }
}

impl FromStr for LedgerEntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INVESTMENT" => Ok(LedgerEntryKind::Investment),
            "CHARGES" => Ok(LedgerEntryKind::Charges),
            "INTER_DP_STOCK_SOLD" => Ok(LedgerEntryKind::InterDpStockSold),
            "CUSTOMER_CONTRIBUTED_PNL" => Ok(LedgerEntryKind::CustomerContributedPnl),
            _ => Err(format!("Unknown ledger entry kind: {}", s)),
        }
    }
}

/// Entry kinds that count toward the derived invested-cash balance.
pub const CAPITAL_ENTRY_KINDS: [LedgerEntryKind; 3] = [
    LedgerEntryKind::Investment,
    LedgerEntryKind::InterDpStockSold,
    LedgerEntryKind::CustomerContributedPnl,
];

/// Domain model for one immutable cash ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    pub client_id: String,
    pub amount: Decimal,
    pub entry_kind: LedgerEntryKind,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

/// Database model for ledger entries
#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub id: i64,
    pub client_id: String,
    pub amount: String,
    pub entry_kind: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

/// Insertable model for ledger entries
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_entries)]
pub struct NewLedgerEntryDB {
    pub client_id: String,
    pub amount: String,
    pub entry_kind: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

impl From<LedgerEntryDB> for LedgerEntry {
    fn from(db: LedgerEntryDB) -> Self {
        LedgerEntry {
            id: db.id,
            amount: parse_decimal_column(&db.amount, "amount"),
            entry_kind: LedgerEntryKind::from_str(&db.entry_kind)
                .unwrap_or(LedgerEntryKind::Investment),
            client_id: db.client_id,
            from_date: Utc.from_utc_datetime(&db.from_date),
            to_date: Utc.from_utc_datetime(&db.to_date),
        }
    }
}

/// Input model for appending one cash movement
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub client_id: String,
    pub amount: Decimal,
    pub entry_kind: LedgerEntryKind,
    pub date: DateTime<Utc>,
}

/// Domain model for a temporally versioned invested-cash snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestedCashRow {
    pub id: i64,
    pub client_id: String,
    pub amount: Decimal,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

/// Database model for invested cash rows
#[derive(Queryable, Selectable, Identifiable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::invested_cash)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvestedCashRowDB {
    pub id: i64,
    pub client_id: String,
    pub amount: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

/// Insertable model for invested cash rows
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::invested_cash)]
pub struct NewInvestedCashRowDB {
    pub client_id: String,
    pub amount: String,
    pub from_date: NaiveDateTime,
    pub to_date: NaiveDateTime,
}

impl From<InvestedCashRowDB> for InvestedCashRow {
    fn from(db: InvestedCashRowDB) -> Self {
        InvestedCashRow {
            id: db.id,
            amount: parse_decimal_column(&db.amount, "amount"),
            client_id: db.client_id,
            from_date: Utc.from_utc_datetime(&db.from_date),
            to_date: Utc.from_utc_datetime(&db.to_date),
        }
    }
}

/// Resolution of a ledger append against the derived cash balances.
#[derive(Debug, Clone, PartialEq)]
pub enum ResyncAction {
    /// Close the current invested-cash row (if any) and open a new one at
    /// the given balance.
    RollInvested { balance: Decimal },
    /// The ledger balance fell below the recorded invested cash; the
    /// shortfall accumulates onto the withdrawn-cash row.
    AccumulateWithdrawn { shortfall: Decimal },
    Unchanged,
}

/// Decides how a freshly derived ledger balance reconciles against the
/// current invested-cash row. Exactly one of the invested/withdrawn tables
/// changes per append, never both.
pub fn plan_resync(ledger_balance: Decimal, current_invested: Option<Decimal>) -> ResyncAction {
    match current_invested {
        None => ResyncAction::RollInvested {
            balance: ledger_balance,
        },
        Some(current) if ledger_balance > current => ResyncAction::RollInvested {
            balance: ledger_balance,
        },
        Some(current) if ledger_balance < current => ResyncAction::AccumulateWithdrawn {
            shortfall: current - ledger_balance,
        },
        Some(_) => ResyncAction::Unchanged,
    }
}

/// Batch of cash movements, one row per index across the parallel arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerBatch {
    pub broker_ids: Vec<String>,
    pub amounts: Vec<Decimal>,
    pub entry_kinds: Vec<LedgerEntryKind>,
    pub dates: Vec<DateTime<Utc>>,
}

impl LedgerBatch {
    pub fn single(
        broker_id: String,
        amount: Decimal,
        entry_kind: LedgerEntryKind,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            broker_ids: vec![broker_id],
            amounts: vec![amount],
            entry_kinds: vec![entry_kind],
            dates: vec![date],
        }
    }

    pub fn len(&self) -> usize {
        self.broker_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.broker_ids.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        let len = self.broker_ids.len();
        if self.amounts.len() != len || self.entry_kinds.len() != len || self.dates.len() != len {
            return Err(LedgerError::ArityMismatch);
        }
        Ok(())
    }
}

/// Admin override batch for the current ledger balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBalanceBatch {
    pub broker_ids: Vec<String>,
    pub amounts: Vec<Decimal>,
}

impl CurrentBalanceBatch {
    pub fn validate(&self) -> Result<()> {
        if self.broker_ids.len() != self.amounts.len() {
            return Err(LedgerError::ArityMismatch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn resync_with_no_current_row_opens_one() {
        assert_eq!(
            plan_resync(dec!(50000), None),
            ResyncAction::RollInvested {
                balance: dec!(50000)
            }
        );
    }

    #[test]
    fn resync_above_current_rolls_the_row() {
        assert_eq!(
            plan_resync(dec!(60000), Some(dec!(50000))),
            ResyncAction::RollInvested {
                balance: dec!(60000)
            }
        );
    }

    #[test]
    fn resync_below_current_accumulates_withdrawal() {
        assert_eq!(
            plan_resync(dec!(40000), Some(dec!(50000))),
            ResyncAction::AccumulateWithdrawn {
                shortfall: dec!(10000)
            }
        );
    }

    #[test]
    fn resync_at_par_is_a_no_op() {
        assert_eq!(plan_resync(dec!(50000), Some(dec!(50000))), ResyncAction::Unchanged);
    }
}
