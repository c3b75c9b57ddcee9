pub(crate) mod instrument_errors;
pub(crate) mod instrument_model;
pub(crate) mod instrument_repository;
pub(crate) mod instrument_service;
pub(crate) mod instrument_traits;
pub(crate) mod quote_provider;

#[cfg(test)]
mod instrument_service_tests;

pub use instrument_errors::InstrumentError;
pub use instrument_model::{
    Exchange, ExchangeSegment, Instrument, InstrumentBatch, InstrumentDB, MarketFeed,
    NewInstrumentRecord,
};
pub use instrument_repository::InstrumentRepository;
pub use instrument_service::InstrumentService;
pub use instrument_traits::{InstrumentRepositoryTrait, InstrumentServiceTrait};
pub use quote_provider::QuoteProvider;
