pub(crate) mod pnl_errors;
pub(crate) mod pnl_model;
pub(crate) mod pnl_repository;
pub(crate) mod pnl_service;
pub(crate) mod pnl_traits;

#[cfg(test)]
mod pnl_service_tests;

pub use pnl_errors::PnlError;
pub use pnl_model::{
    DailyPnl, NewRealisedPnlRow, PnlContributor, PnlEntryType, RealisedPnlBatch, RealisedPnlRow,
    TodayAlgoPnlBatch,
};
pub use pnl_repository::PnlRepository;
pub use pnl_service::PnlService;
pub use pnl_traits::{PnlRepositoryTrait, PnlServiceTrait};
