#[cfg(test)]
mod tests {
    use crate::clients::{
        AccountStatus, AccountType, Client, ClientBatch, ClientError, ClientServiceTrait,
    };
    use crate::constants::max_date;
    use crate::ledger::ledger_model::{
        plan_resync, CurrentBalanceBatch, InvestedCashRow, LedgerBatch, LedgerEntry,
        LedgerEntryKind, NewLedgerEntry, ResyncAction, CAPITAL_ENTRY_KINDS,
    };
    use crate::ledger::{LedgerError, LedgerRepositoryTrait, LedgerService, LedgerServiceTrait};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn open_ended() -> DateTime<Utc> {
        Utc.from_utc_datetime(&max_date())
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    // --- Mock ClientService ---
    struct MockClientService {
        clients: Arc<Mutex<Vec<Client>>>,
    }

    impl MockClientService {
        fn new() -> Self {
            Self {
                clients: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn add_client(&self, id: &str, broker_id: &str) {
            self.clients.lock().unwrap().push(Client {
                id: id.to_string(),
                broker_id: broker_id.to_string(),
                client_name: "Test Client".to_string(),
                phone_no: "9999999999".to_string(),
                email: "test@example.com".to_string(),
                address: "Test Lane".to_string(),
                account_open_date: day(1),
                account_types: vec![AccountType::Algo],
                account_status: AccountStatus::Active,
            });
        }
    }

    impl ClientServiceTrait for MockClientService {
        fn import_clients(&self, _batch: ClientBatch) -> Result<usize, ClientError> {
            unimplemented!()
        }

        fn get_by_broker_id(&self, broker_id: &str) -> Result<Client, ClientError> {
            self.clients
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.broker_id == broker_id)
                .cloned()
                .ok_or_else(|| {
                    ClientError::NotFound(format!("Broker ID {} not found", broker_id))
                })
        }

        fn resolve_broker_ids(
            &self,
            broker_ids: &[String],
        ) -> Result<HashMap<String, String>, ClientError> {
            let clients = self.clients.lock().unwrap();
            Ok(broker_ids
                .iter()
                .filter_map(|id| {
                    clients
                        .iter()
                        .find(|c| &c.broker_id == id)
                        .map(|c| (id.clone(), c.id.clone()))
                })
                .collect())
        }
    }

    // --- Mock LedgerRepository ---
    #[derive(Default)]
    struct MockLedgerRepository {
        entries: Mutex<Vec<LedgerEntry>>,
        invested: Mutex<Vec<InvestedCashRow>>,
        withdrawn: Mutex<HashMap<String, Decimal>>,
        balances: Mutex<HashMap<String, Decimal>>,
    }

    impl MockLedgerRepository {
        fn invested_rows(&self, client_id: &str) -> Vec<InvestedCashRow> {
            self.invested
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.client_id == client_id)
                .cloned()
                .collect()
        }
    }

    impl LedgerRepositoryTrait for MockLedgerRepository {
        fn append_and_resync(
            &self,
            entry: NewLedgerEntry,
        ) -> Result<ResyncAction, LedgerError> {
            let mut entries = self.entries.lock().unwrap();
            let id = entries.len() as i64 + 1;
            entries.push(LedgerEntry {
                id,
                client_id: entry.client_id.clone(),
                amount: entry.amount,
                entry_kind: entry.entry_kind,
                from_date: entry.date,
                to_date: open_ended(),
            });

            let balance: Decimal = entries
                .iter()
                .filter(|e| e.client_id == entry.client_id)
                .filter(|e| CAPITAL_ENTRY_KINDS.contains(&e.entry_kind))
                .map(|e| e.amount)
                .sum();
            drop(entries);

            let mut invested = self.invested.lock().unwrap();
            let current_amount = invested
                .iter()
                .find(|row| row.client_id == entry.client_id && row.to_date == open_ended())
                .map(|row| row.amount);

            let action = plan_resync(balance, current_amount);
            match &action {
                ResyncAction::RollInvested { balance } => {
                    for row in invested.iter_mut() {
                        if row.client_id == entry.client_id && row.to_date == open_ended() {
                            row.to_date = entry.date;
                        }
                    }
                    let id = invested.len() as i64 + 1;
                    invested.push(InvestedCashRow {
                        id,
                        client_id: entry.client_id.clone(),
                        amount: *balance,
                        from_date: entry.date,
                        to_date: open_ended(),
                    });
                }
                ResyncAction::AccumulateWithdrawn { shortfall } => {
                    *self
                        .withdrawn
                        .lock()
                        .unwrap()
                        .entry(entry.client_id.clone())
                        .or_default() += *shortfall;
                }
                ResyncAction::Unchanged => {}
            }

            Ok(action)
        }

        fn capital_balance(&self, client_id: &str) -> Result<Decimal, LedgerError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.client_id == client_id)
                .filter(|e| CAPITAL_ENTRY_KINDS.contains(&e.entry_kind))
                .map(|e| e.amount)
                .sum())
        }

        fn current_invested_row(
            &self,
            client_id: &str,
        ) -> Result<Option<InvestedCashRow>, LedgerError> {
            Ok(self
                .invested
                .lock()
                .unwrap()
                .iter()
                .find(|row| row.client_id == client_id && row.to_date == open_ended())
                .cloned())
        }

        fn withdrawn_amount(&self, client_id: &str) -> Result<Option<Decimal>, LedgerError> {
            Ok(self.withdrawn.lock().unwrap().get(client_id).copied())
        }

        fn entries_by_kinds(
            &self,
            client_id: &str,
            kinds: &[LedgerEntryKind],
        ) -> Result<Vec<LedgerEntry>, LedgerError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.client_id == client_id && kinds.contains(&e.entry_kind))
                .cloned()
                .collect())
        }

        fn charges_total(&self, client_id: &str) -> Result<Decimal, LedgerError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.client_id == client_id)
                .filter(|e| e.entry_kind == LedgerEntryKind::Charges)
                .map(|e| e.amount)
                .sum())
        }

        fn upsert_current_balance(
            &self,
            client_id: &str,
            amount: Decimal,
        ) -> Result<(), LedgerError> {
            self.balances
                .lock()
                .unwrap()
                .insert(client_id.to_string(), amount);
            Ok(())
        }

        fn current_balance(&self, client_id: &str) -> Result<Option<Decimal>, LedgerError> {
            Ok(self.balances.lock().unwrap().get(client_id).copied())
        }
    }

    fn service_with_client() -> (LedgerService, Arc<MockLedgerRepository>) {
        let repository = Arc::new(MockLedgerRepository::default());
        let clients = MockClientService::new();
        clients.add_client("client-1", "BRK001");
        let service = LedgerService::new(repository.clone(), Arc::new(clients));
        (service, repository)
    }

    #[tokio::test]
    async fn first_investment_opens_an_invested_cash_row() {
        let (service, repository) = service_with_client();

        let outcome = service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(50000),
                LedgerEntryKind::Investment,
                day(2),
            ))
            .await
            .unwrap();

        assert_eq!(outcome.applied, 1);
        assert!(outcome.is_clean());
        let rows = repository.invested_rows("client-1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(50000));
        assert_eq!(rows[0].to_date, open_ended());
        assert!(repository
            .withdrawn_amount("client-1")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rising_balance_rolls_the_invested_cash_row() {
        let (service, repository) = service_with_client();

        for (amount, date) in [(dec!(50000), day(2)), (dec!(10000), day(3))] {
            service
                .record_entries(LedgerBatch::single(
                    "BRK001".to_string(),
                    amount,
                    LedgerEntryKind::Investment,
                    date,
                ))
                .await
                .unwrap();
        }

        let rows = repository.invested_rows("client-1");
        assert_eq!(rows.len(), 2);
        // Old row closed at the incoming entry's date.
        assert_eq!(rows[0].amount, dec!(50000));
        assert_eq!(rows[0].to_date, day(3));
        // New current row carries the full balance.
        assert_eq!(rows[1].amount, dec!(60000));
        assert_eq!(rows[1].to_date, open_ended());
    }

    #[tokio::test]
    async fn falling_balance_accumulates_withdrawn_cash() {
        let (service, repository) = service_with_client();

        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(50000),
                LedgerEntryKind::Investment,
                day(2),
            ))
            .await
            .unwrap();
        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(-10000),
                LedgerEntryKind::Investment,
                day(3),
            ))
            .await
            .unwrap();

        // The invested row is untouched; only withdrawn cash moves.
        let rows = repository.invested_rows("client-1");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(50000));
        assert_eq!(
            repository.withdrawn_amount("client-1").unwrap(),
            Some(dec!(10000))
        );

        // After the balance recovers and rolls a fresh row, a later
        // shortfall accumulates on top of the earlier one.
        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(20000),
                LedgerEntryKind::Investment,
                day(4),
            ))
            .await
            .unwrap();
        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(-5000),
                LedgerEntryKind::Investment,
                day(5),
            ))
            .await
            .unwrap();
        assert_eq!(
            repository.withdrawn_amount("client-1").unwrap(),
            Some(dec!(15000))
        );
    }

    #[tokio::test]
    async fn charges_do_not_move_the_capital_balance() {
        let (service, repository) = service_with_client();

        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(50000),
                LedgerEntryKind::Investment,
                day(2),
            ))
            .await
            .unwrap();
        service
            .record_entries(LedgerBatch::single(
                "BRK001".to_string(),
                dec!(-500),
                LedgerEntryKind::Charges,
                day(3),
            ))
            .await
            .unwrap();

        let rows = repository.invested_rows("client-1");
        assert_eq!(rows.len(), 1);
        assert!(repository.withdrawn_amount("client-1").unwrap().is_none());
        assert_eq!(repository.charges_total("client-1").unwrap(), dec!(-500));
    }

    #[tokio::test]
    async fn unknown_broker_skips_only_that_row() {
        let (service, repository) = service_with_client();

        let outcome = service
            .record_entries(LedgerBatch {
                broker_ids: vec!["GHOST".to_string(), "BRK001".to_string()],
                amounts: vec![dec!(1000), dec!(2000)],
                entry_kinds: vec![LedgerEntryKind::Investment, LedgerEntryKind::Investment],
                dates: vec![day(2), day(2)],
            })
            .await
            .unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 0);
        assert_eq!(repository.capital_balance("client-1").unwrap(), dec!(2000));
    }

    #[tokio::test]
    async fn arity_mismatch_rejects_the_batch_before_any_write() {
        let (service, repository) = service_with_client();

        let result = service
            .record_entries(LedgerBatch {
                broker_ids: vec!["BRK001".to_string()],
                amounts: vec![dec!(1000), dec!(2000)],
                entry_kinds: vec![LedgerEntryKind::Investment],
                dates: vec![day(2)],
            })
            .await;

        assert!(matches!(result, Err(LedgerError::ArityMismatch)));
        assert!(repository.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_is_a_valid_current_ledger_balance() {
        let (service, repository) = service_with_client();

        let outcome = service
            .upsert_current_balances(CurrentBalanceBatch {
                broker_ids: vec!["BRK001".to_string()],
                amounts: vec![Decimal::ZERO],
            })
            .await
            .unwrap();

        assert!(outcome.is_clean());
        assert_eq!(
            repository.current_balance("client-1").unwrap(),
            Some(Decimal::ZERO)
        );
    }
}
