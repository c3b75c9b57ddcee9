#[cfg(test)]
mod tests {
    use crate::instruments::instrument_model::{
        Exchange, ExchangeSegment, Instrument, InstrumentBatch, MarketFeed, NewInstrumentRecord,
    };
    use crate::instruments::{
        InstrumentError, InstrumentRepositoryTrait, InstrumentService, InstrumentServiceTrait,
        QuoteProvider,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Mock InstrumentRepository ---
    #[derive(Default)]
    struct MockInstrumentRepository {
        instruments: Mutex<Vec<Instrument>>,
    }

    impl MockInstrumentRepository {
        fn with_instruments(codes: &[(&str, MarketFeed)]) -> Self {
            let repository = Self::default();
            for (index, (code, feed)) in codes.iter().enumerate() {
                repository.instruments.lock().unwrap().push(Instrument {
                    id: format!("scrip-{}", index + 1),
                    name: code.to_string(),
                    code: code.to_string(),
                    exchange: Exchange::Nse,
                    segment: ExchangeSegment::Cash,
                    feed: *feed,
                    cmp: Decimal::ZERO,
                });
            }
            repository
        }
    }

    impl InstrumentRepositoryTrait for MockInstrumentRepository {
        fn create_instruments(
            &self,
            records: Vec<NewInstrumentRecord>,
        ) -> Result<usize, InstrumentError> {
            Ok(records.len())
        }

        fn list_instruments(&self) -> Result<Vec<Instrument>, InstrumentError> {
            Ok(self.instruments.lock().unwrap().clone())
        }

        fn resolve_codes(
            &self,
            pairs: &[(String, MarketFeed)],
        ) -> Result<HashMap<(String, MarketFeed), String>, InstrumentError> {
            let instruments = self.instruments.lock().unwrap();
            Ok(pairs
                .iter()
                .filter_map(|(code, feed)| {
                    instruments
                        .iter()
                        .find(|i| &i.code == code && i.feed == *feed)
                        .map(|i| ((code.clone(), *feed), i.id.clone()))
                })
                .collect())
        }

        fn quotes_by_ids(
            &self,
            instrument_ids: &[String],
        ) -> Result<HashMap<String, Decimal>, InstrumentError> {
            let instruments = self.instruments.lock().unwrap();
            Ok(instruments
                .iter()
                .filter(|i| instrument_ids.contains(&i.id))
                .map(|i| (i.id.clone(), i.cmp))
                .collect())
        }

        fn update_cmp(&self, instrument_id: &str, cmp: Decimal) -> Result<(), InstrumentError> {
            let mut instruments = self.instruments.lock().unwrap();
            let instrument = instruments
                .iter_mut()
                .find(|i| i.id == instrument_id)
                .ok_or_else(|| {
                    InstrumentError::NotFound(format!("Instrument {} not found", instrument_id))
                })?;
            instrument.cmp = cmp;
            Ok(())
        }
    }

    // --- Quote providers ---
    struct FixedQuoteProvider {
        price: Decimal,
    }

    #[async_trait]
    impl QuoteProvider for FixedQuoteProvider {
        async fn latest_price(
            &self,
            _code: &str,
            _feed: MarketFeed,
        ) -> Result<Decimal, InstrumentError> {
            Ok(self.price)
        }
    }

    struct FailingQuoteProvider;

    #[async_trait]
    impl QuoteProvider for FailingQuoteProvider {
        async fn latest_price(
            &self,
            code: &str,
            _feed: MarketFeed,
        ) -> Result<Decimal, InstrumentError> {
            Err(InstrumentError::QuoteProvider(format!(
                "Vendor feed unavailable for {}",
                code
            )))
        }
    }

    #[tokio::test]
    async fn refresh_updates_every_instrument() {
        let repository = Arc::new(MockInstrumentRepository::with_instruments(&[
            ("RELIANCE", MarketFeed::Brokerage),
            ("NIFTYBEES", MarketFeed::MutualFund),
        ]));
        let service = InstrumentService::new(
            repository.clone(),
            Arc::new(FixedQuoteProvider { price: dec!(123.45) }),
        );

        let refreshed = service.refresh_quotes().await.unwrap();

        assert_eq!(refreshed, 2);
        for instrument in repository.instruments.lock().unwrap().iter() {
            assert_eq!(instrument.cmp, dec!(123.45));
        }
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_refresh_run() {
        let repository = Arc::new(MockInstrumentRepository::with_instruments(&[(
            "RELIANCE",
            MarketFeed::Brokerage,
        )]));
        let service = InstrumentService::new(repository.clone(), Arc::new(FailingQuoteProvider));

        let result = service.refresh_quotes().await;

        assert!(matches!(result, Err(InstrumentError::QuoteProvider(_))));
        assert_eq!(
            repository.instruments.lock().unwrap()[0].cmp,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn resolve_codes_names_every_missing_pair() {
        let repository = Arc::new(MockInstrumentRepository::with_instruments(&[(
            "RELIANCE",
            MarketFeed::Brokerage,
        )]));
        let service = InstrumentService::new(repository, Arc::new(FailingQuoteProvider));

        let result = service.resolve_codes(&[
            ("RELIANCE".to_string(), MarketFeed::Brokerage),
            ("UNLISTED".to_string(), MarketFeed::MutualFund),
        ]);

        match result {
            Err(InstrumentError::NotFound(message)) => {
                assert!(message.contains("UNLISTED"));
                assert!(!message.contains("(code: RELIANCE"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_batches_are_rejected() {
        let repository = Arc::new(MockInstrumentRepository::default());
        let service = InstrumentService::new(repository, Arc::new(FailingQuoteProvider));

        let result = service.import_instruments(InstrumentBatch { entries: Vec::new() });
        assert!(matches!(result, Err(InstrumentError::InvalidData(_))));
    }
}
