pub(crate) mod holdings_errors;
pub(crate) mod holdings_model;
pub(crate) mod holdings_repository;
pub(crate) mod holdings_service;
pub(crate) mod holdings_traits;
pub(crate) mod lot_matcher;


pub use holdings_errors::HoldingsError;
pub use holdings_model::{
    FundSource, HoldingsTrxBatch, Lot, LotDB, NewLot, OwnedBy, SellApplication, TradeSide,
};
pub use holdings_repository::HoldingsRepository;
pub use holdings_service::HoldingsService;
pub use holdings_traits::{HoldingsRepositoryTrait, HoldingsServiceTrait};
pub use lot_matcher::{match_sell, LotConsumption};
