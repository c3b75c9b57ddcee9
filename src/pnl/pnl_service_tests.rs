#[cfg(test)]
mod tests {
    use crate::clients::{
        AccountStatus, AccountType, Client, ClientBatch, ClientError, ClientServiceTrait,
    };
    use crate::ledger::{
        CurrentBalanceBatch, LedgerBatch, LedgerEntryKind, LedgerError, LedgerServiceTrait,
    };
    use crate::models::BatchOutcome;
    use crate::pnl::pnl_model::{
        DailyPnl, NewRealisedPnlRow, PnlContributor, PnlEntryType, RealisedPnlBatch,
        TodayAlgoPnlBatch,
    };
    use crate::pnl::{PnlError, PnlRepositoryTrait, PnlService, PnlServiceTrait};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap()
    }

    // --- Mock ClientService ---
    struct MockClientService {
        clients: Vec<Client>,
    }

    impl MockClientService {
        fn with_client(id: &str, broker_id: &str) -> Self {
            Self {
                clients: vec![Client {
                    id: id.to_string(),
                    broker_id: broker_id.to_string(),
                    client_name: "Test Client".to_string(),
                    phone_no: "9999999999".to_string(),
                    email: "test@example.com".to_string(),
                    address: "Test Lane".to_string(),
                    account_open_date: day(1),
                    account_types: vec![AccountType::Algo],
                    account_status: AccountStatus::Active,
                }],
            }
        }
    }

    impl ClientServiceTrait for MockClientService {
        fn import_clients(&self, _batch: ClientBatch) -> Result<usize, ClientError> {
            unimplemented!()
        }

        fn get_by_broker_id(&self, broker_id: &str) -> Result<Client, ClientError> {
            self.clients
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
            Ok(broker_ids
                .iter()
                .filter_map(|id| {
                    self.clients
                        .iter()
                        .find(|c| &c.broker_id == id)
                        .map(|c| (id.clone(), c.id.clone()))
                })
                .collect())
        }
    }

    // --- Mock LedgerService ---
    #[derive(Default)]
    struct MockLedgerService {
        batches: Mutex<Vec<LedgerBatch>>,
    }

    #[async_trait]
    impl LedgerServiceTrait for MockLedgerService {
        async fn record_entries(&self, batch: LedgerBatch) -> Result<BatchOutcome, LedgerError> {
            let applied = batch.len();
            self.batches.lock().unwrap().push(batch);
            Ok(BatchOutcome {
                applied,
                skipped: Vec::new(),
            })
        }

        async fn upsert_current_balances(
            &self,
            _batch: CurrentBalanceBatch,
        ) -> Result<BatchOutcome, LedgerError> {
            unimplemented!()
        }
    }

    // --- Mock PnlRepository ---
    #[derive(Default)]
    struct MockPnlRepository {
        rows: Mutex<Vec<NewRealisedPnlRow>>,
        today_algo: Mutex<HashMap<String, Decimal>>,
    }

    impl PnlRepositoryTrait for MockPnlRepository {
        fn insert_rows(&self, rows: Vec<NewRealisedPnlRow>) -> Result<usize, PnlError> {
            let mut stored = self.rows.lock().unwrap();
            let count = rows.len();
            stored.extend(rows);
            Ok(count)
        }

        fn total_realised(&self, client_id: &str) -> Result<Decimal, PnlError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.client_id == client_id)
                .map(|row| row.amount)
                .sum())
        }

        fn range_total(
            &self,
            client_id: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Decimal, PnlError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.client_id == client_id && row.date >= from && row.date <= to)
                .map(|row| row.amount)
                .sum())
        }

        fn daily_series(
            &self,
            _client_id: &str,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<DailyPnl>, PnlError> {
            unimplemented!()
        }

        fn rows_for_cashflows(
            &self,
            client_id: &str,
        ) -> Result<Vec<(DateTime<Utc>, Decimal)>, PnlError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|row| row.client_id == client_id)
                .map(|row| (row.date, row.amount))
                .collect())
        }

        fn upsert_today_algo_pnl(
            &self,
            client_id: &str,
            amount: Decimal,
        ) -> Result<(), PnlError> {
            self.today_algo
                .lock()
                .unwrap()
                .insert(client_id.to_string(), amount);
            Ok(())
        }

        fn today_algo_pnl(&self, client_id: &str) -> Result<Option<Decimal>, PnlError> {
            Ok(self.today_algo.lock().unwrap().get(client_id).copied())
        }
    }

    struct Fixture {
        service: PnlService,
        repository: Arc<MockPnlRepository>,
        ledger: Arc<MockLedgerService>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(MockPnlRepository::default());
        let ledger = Arc::new(MockLedgerService::default());
        let service = PnlService::new(
            repository.clone(),
            Arc::new(MockClientService::with_client("client-1", "BRK001")),
            ledger.clone(),
        );
        Fixture {
            service,
            repository,
            ledger,
        }
    }

    fn batch_row(contributor: PnlContributor, amount: Decimal) -> RealisedPnlBatch {
        RealisedPnlBatch {
            broker_ids: vec!["BRK001".to_string()],
            amounts: vec![amount],
            entry_types: vec![PnlEntryType::Delivery],
            contributors: vec![contributor],
            dates: vec![day(5)],
        }
    }

    #[tokio::test]
    async fn managed_entity_rows_are_persisted() {
        let fixture = fixture();

        let outcome = fixture
            .service
            .record_pnl(batch_row(PnlContributor::ManagedEntity, dec!(2500)))
            .await
            .unwrap();

        assert!(outcome.is_clean());
        let rows = fixture.repository.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(2500));
        assert!(fixture.ledger.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn customer_rows_are_redirected_to_the_ledger() {
        let fixture = fixture();

        let outcome = fixture
            .service
            .record_pnl(batch_row(PnlContributor::Customer, dec!(1800)))
            .await
            .unwrap();

        assert!(outcome.is_clean());
        // Never lands in the realised P&L table.
        assert!(fixture.repository.rows.lock().unwrap().is_empty());
        // Exactly one ledger entry with matching amount, kind and date.
        let batches = fixture.ledger.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].amounts, vec![dec!(1800)]);
        assert_eq!(
            batches[0].entry_kinds,
            vec![LedgerEntryKind::CustomerContributedPnl]
        );
        assert_eq!(batches[0].dates, vec![day(5)]);
    }

    #[tokio::test]
    async fn unknown_broker_skips_only_that_row() {
        let fixture = fixture();

        let outcome = fixture
            .service
            .record_pnl(RealisedPnlBatch {
                broker_ids: vec!["GHOST".to_string(), "BRK001".to_string()],
                amounts: vec![dec!(100), dec!(200)],
                entry_types: vec![PnlEntryType::Intraday, PnlEntryType::Intraday],
                contributors: vec![
                    PnlContributor::ManagedEntity,
                    PnlContributor::ManagedEntity,
                ],
                dates: vec![day(5), day(5)],
            })
            .await
            .unwrap();

        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].index, 0);
        assert_eq!(fixture.repository.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn arity_mismatch_rejects_the_batch() {
        let fixture = fixture();

        let mut batch = batch_row(PnlContributor::ManagedEntity, dec!(100));
        batch.amounts.push(dec!(200));

        let result = fixture.service.record_pnl(batch).await;
        assert!(matches!(result, Err(PnlError::ArityMismatch)));
        assert!(fixture.repository.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_is_a_valid_today_algo_pnl() {
        let fixture = fixture();

        let outcome = fixture
            .service
            .upsert_today_algo_pnl(TodayAlgoPnlBatch {
                broker_ids: vec!["BRK001".to_string()],
                amounts: vec![Decimal::ZERO],
            })
            .await
            .unwrap();

        assert!(outcome.is_clean());
        assert_eq!(
            fixture.repository.today_algo_pnl("client-1").unwrap(),
            Some(Decimal::ZERO)
        );
    }
}
