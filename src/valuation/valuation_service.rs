use chrono::{DateTime, Utc};
use log::{debug, info};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::ClientRepositoryTrait;
use crate::constants::DECIMAL_PRECISION;
use crate::holdings::{FundSource, HoldingsRepositoryTrait, Lot, OwnedBy};
use crate::instruments::InstrumentRepositoryTrait;
use crate::ledger::{LedgerEntryKind, LedgerRepositoryTrait, CAPITAL_ENTRY_KINDS};
use crate::pnl::{DailyPnl, PnlRepositoryTrait};
use crate::valuation::valuation_errors::{Result, ValuationError};
use crate::valuation::valuation_model::{CashSummary, TotalPnl, ValuationRefreshSummary};
use crate::valuation::valuation_traits::ValuationServiceTrait;
use crate::valuation::xirr::{xirr, CashFlow};

/// Read-side valuation aggregator. Combines lot state, cash ledger state
/// and refreshed market prices into the dashboard metrics; holds no state
/// of its own and never caches.
pub struct ValuationService {
    holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    pnl_repository: Arc<dyn PnlRepositoryTrait>,
    client_repository: Arc<dyn ClientRepositoryTrait>,
    instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
}

impl ValuationService {
    pub fn new(
        holdings_repository: Arc<dyn HoldingsRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        pnl_repository: Arc<dyn PnlRepositoryTrait>,
        client_repository: Arc<dyn ClientRepositoryTrait>,
        instrument_repository: Arc<dyn InstrumentRepositoryTrait>,
    ) -> Self {
        Self {
            holdings_repository,
            ledger_repository,
            pnl_repository,
            client_repository,
            instrument_repository,
        }
    }

    fn check_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<()> {
        if from > to {
            return Err(ValuationError::InvalidRange { from, to });
        }
        Ok(())
    }

    /// Customer-owned outside-account lots enter at market value,
    /// managed-entity lots at remaining cost basis.
    fn asset_components(&self, client_id: &str) -> Result<(Vec<Lot>, Vec<Lot>)> {
        let customer_lots = self.holdings_repository.lots_by_ownership(
            client_id,
            OwnedBy::Customer,
            FundSource::OutsideAccount,
        )?;
        let managed_lots = self.holdings_repository.lots_by_ownership(
            client_id,
            OwnedBy::ManagedEntity,
            FundSource::OutsideAccount,
        )?;
        Ok((customer_lots, managed_lots))
    }

    fn total_pnl_amount(&self, client_id: &str) -> Result<Decimal> {
        let realised = self.pnl_repository.total_realised(client_id)?;
        let charges = self.ledger_repository.charges_total(client_id)?;
        let unrealised = self
            .holdings_repository
            .sum_unrealised_pnl(client_id)?
            .unwrap_or(Decimal::ZERO);
        Ok(realised + charges + unrealised)
    }

    /// Builds the money-weighted return series: every capital movement and
    /// outside-account lot cost flows out, realised P&L and charges flow
    /// back in, and the terminal flows liquidate today's position. Lots
    /// bought before the account opened are clamped to the open date so no
    /// flow predates the account.
    fn return_rate(&self, client_id: &str) -> Result<Option<Decimal>> {
        let open_date = self
            .client_repository
            .get_client(client_id)?
            .map(|client| client.account_open_date)
            .ok_or_else(|| ValuationError::MissingAccountOpenDate(client_id.to_string()))?;
        let open_day = open_date.date_naive();

        let mut flows: Vec<CashFlow> = Vec::new();
        let mut push = |amount: Decimal, date: chrono::NaiveDate| {
            flows.push(CashFlow {
                amount: amount.to_f64().unwrap_or(0.0),
                date,
            });
        };

        for entry in self
            .ledger_repository
            .entries_by_kinds(client_id, &CAPITAL_ENTRY_KINDS)?
        {
            push(-entry.amount, entry.from_date.date_naive());
        }

        let (customer_lots, managed_lots) = self.asset_components(client_id)?;
        for lot in &customer_lots {
            push(-lot.market_value, lot.buy_date.date_naive().max(open_day));
        }
        for lot in &managed_lots {
            push(-lot.buy_value, lot.buy_date.date_naive().max(open_day));
        }

        for (date, amount) in self.pnl_repository.rows_for_cashflows(client_id)? {
            push(amount, date.date_naive());
        }
        for entry in self
            .ledger_repository
            .entries_by_kinds(client_id, &[LedgerEntryKind::Charges])?
        {
            push(entry.amount, entry.from_date.date_naive());
        }

        let invested = self
            .ledger_repository
            .current_invested_row(client_id)?
            .map(|row| row.amount)
            .unwrap_or(Decimal::ZERO);
        let withdrawn = self
            .ledger_repository
            .withdrawn_amount(client_id)?
            .unwrap_or(Decimal::ZERO);
        let unrealised = self
            .holdings_repository
            .sum_unrealised_pnl(client_id)?
            .unwrap_or(Decimal::ZERO);
        let customer_market: Decimal = customer_lots.iter().map(|lot| lot.market_value).sum();
        let managed_cost: Decimal = managed_lots.iter().map(|lot| lot.buy_value).sum();

        let today = Utc::now().date_naive();
        push(unrealised, today);
        push(invested - withdrawn, today);
        push(customer_market, today);
        push(managed_cost, today);

        Ok(xirr(&flows)
            .and_then(Decimal::from_f64)
            .map(|rate| rate.round_dp(DECIMAL_PRECISION)))
    }
}

impl ValuationServiceTrait for ValuationService {
    fn invested_cash(&self, client_id: &str) -> Result<Option<CashSummary>> {
        let row = match self.ledger_repository.current_invested_row(client_id)? {
            Some(row) => row,
            None => return Ok(None),
        };
        let client = self
            .client_repository
            .get_client(client_id)?
            .ok_or_else(|| {
                ValuationError::DatabaseError(format!(
                    "Invested cash row without client record: {}",
                    client_id
                ))
            })?;

        Ok(Some(CashSummary {
            client_name: client.client_name,
            broker_id: client.broker_id,
            amount: row.amount,
        }))
    }

    fn withdrawn_cash(&self, client_id: &str) -> Result<Option<Decimal>> {
        Ok(self.ledger_repository.withdrawn_amount(client_id)?)
    }

    fn deployed_cash(&self, client_id: &str) -> Result<Option<CashSummary>> {
        let invested = match self.invested_cash(client_id)? {
            Some(summary) => summary,
            None => return Ok(None),
        };
        let realised = self.pnl_repository.total_realised(client_id)?;
        let withdrawn = self
            .ledger_repository
            .withdrawn_amount(client_id)?
            .unwrap_or(Decimal::ZERO);

        Ok(Some(CashSummary {
            amount: invested.amount + realised - withdrawn,
            ..invested
        }))
    }

    fn invested_assets(&self, client_id: &str) -> Result<Decimal> {
        let (customer_lots, managed_lots) = self.asset_components(client_id)?;
        let customer_market: Decimal = customer_lots.iter().map(|lot| lot.market_value).sum();
        let managed_cost: Decimal = managed_lots.iter().map(|lot| lot.buy_value).sum();
        Ok(customer_market + managed_cost)
    }

    fn unrealised_pnl(&self, client_id: &str) -> Result<Option<Decimal>> {
        Ok(self.holdings_repository.sum_unrealised_pnl(client_id)?)
    }

    fn realised_pnl_series(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailyPnl>> {
        self.check_range(from, to)?;
        Ok(self.pnl_repository.daily_series(client_id, from, to)?)
    }

    fn realised_pnl_total(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Decimal> {
        self.check_range(from, to)?;
        let range_pnl = self.pnl_repository.range_total(client_id, from, to)?;
        let charges = self.ledger_repository.charges_total(client_id)?;
        Ok(range_pnl + charges)
    }

    fn total_pnl(&self, client_id: &str) -> Result<TotalPnl> {
        let amount = self.total_pnl_amount(client_id)?;
        let rate = self.return_rate(client_id)?;
        Ok(TotalPnl { amount, rate })
    }

    fn portfolio_value(&self, client_id: &str) -> Result<Decimal> {
        let invested = self
            .ledger_repository
            .current_invested_row(client_id)?
            .map(|row| row.amount)
            .unwrap_or(Decimal::ZERO);
        let withdrawn = self
            .ledger_repository
            .withdrawn_amount(client_id)?
            .unwrap_or(Decimal::ZERO);
        let assets = self.invested_assets(client_id)?;
        let total_pnl = self.total_pnl_amount(client_id)?;

        Ok(invested - withdrawn + assets + total_pnl)
    }

    fn today_algo_pnl(&self, client_id: &str) -> Result<Option<Decimal>> {
        Ok(self.pnl_repository.today_algo_pnl(client_id)?)
    }

    fn refresh_valuations(&self) -> Result<ValuationRefreshSummary> {
        let lots = self.holdings_repository.open_lots_all()?;

        let mut instrument_ids: Vec<String> =
            lots.iter().map(|lot| lot.instrument_id.clone()).collect();
        instrument_ids.sort();
        instrument_ids.dedup();
        let quotes: HashMap<String, Decimal> =
            self.instrument_repository.quotes_by_ids(&instrument_ids)?;

        // Every quote is checked before the first write so a stale feed
        // fails the run instead of leaving lots half-priced.
        for lot in &lots {
            if !quotes.contains_key(&lot.instrument_id) {
                return Err(ValuationError::MissingQuote(lot.instrument_id.clone()));
            }
        }

        let mut lots_updated = 0;
        for lot in &lots {
            let cmp = quotes[&lot.instrument_id];
            let market_value = lot.open_quantity * cmp;
            let unrealised_pnl = market_value - lot.open_quantity * lot.buy_price;
            self.holdings_repository
                .update_lot_valuation(lot.id, unrealised_pnl, market_value)?;
            debug!(
                "Refreshed lot {}: market value {}, unrealised {}",
                lot.id, market_value, unrealised_pnl
            );
            lots_updated += 1;
        }

        info!("Valuation refresh updated {} lots", lots_updated);
        Ok(ValuationRefreshSummary { lots_updated })
    }
}
