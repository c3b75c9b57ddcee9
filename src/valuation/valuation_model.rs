use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cash figure together with the client display fields the dashboard
/// cards show alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashSummary {
    pub client_name: String,
    pub broker_id: String,
    pub amount: Decimal,
}

/// Total P&L with its money-weighted annual return. `rate` is absent when
/// the cash-flow series cannot produce one (e.g. a brand-new account whose
/// flows all share today's date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPnl {
    pub amount: Decimal,
    pub rate: Option<Decimal>,
}

/// Outcome of an unrealised P&L / market value refresh run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRefreshSummary {
    pub lots_updated: usize,
}
